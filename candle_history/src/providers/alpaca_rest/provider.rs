use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::{debug, warn};

use crate::{
    models::{candle::Candle, request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, InvalidRateLimitSnafu,
        InvalidTimeoutSnafu, MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{
            params::{AlpacaSettings, construct_params, validate_timeframe},
            response::{AlpacaBar, AlpacaResponse},
        },
    },
};

pub const API_KEY_ENV: &str = "APCA_API_KEY_ID";
pub const SECRET_KEY_ENV: &str = "APCA_API_SECRET_KEY";

pub struct AlpacaProvider {
    client: Client,
    settings: AlpacaSettings,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(settings: AlpacaSettings) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var(API_KEY_ENV).context(MissingEnvVarSnafu)?.into());
        let secret_key =
            SecretString::new(get_env_var(SECRET_KEY_ENV).context(MissingEnvVarSnafu)?.into());
        Self::with_credentials(settings, api_key, secret_key)
    }

    pub fn with_credentials(
        settings: AlpacaSettings,
        api_key: SecretString,
        secret_key: SecretString,
    ) -> Result<Self, ProviderInitError> {
        ensure!(settings.timeout_secs > 0, InvalidTimeoutSnafu);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        let mut secret_value =
            header::HeaderValue::from_str(secret_key.expose_secret()).context(InvalidApiKeySnafu)?;
        secret_value.set_sensitive(true);
        headers.insert("APCA-API-SECRET-KEY", secret_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .context(ClientBuildSnafu)?;

        let per_minute =
            NonZeroU32::new(settings.requests_per_minute).context(InvalidRateLimitSnafu {
                requests_per_minute: settings.requests_per_minute,
            })?;
        let limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            client,
            settings,
            limiter,
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    async fn fetch_page(
        &self,
        params: &BarsRequestParams,
        page_token: Option<&str>,
    ) -> Result<AlpacaResponse, ProviderError> {
        let mut query = construct_params(params, &self.settings);
        if let Some(token) = page_token {
            query.push(("page_token".to_string(), token.to_string()));
        }

        self.limiter.until_ready().await;

        let response = self
            .client
            .get(&self.settings.base_url)
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            warn!(symbol = %params.symbol, status = status.as_u16(), "alpaca request failed");
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        response.json::<AlpacaResponse>().await.context(ReqwestSnafu)
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn validate_timeframe(&self, timeframe: &TimeFrame) -> Result<(), ProviderError> {
        validate_timeframe(timeframe)
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<Candle>, ProviderError> {
        validate_timeframe(&params.timeframe)?;

        let mut bars: Vec<AlpacaBar> = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(&params, next_page_token.as_deref()).await?;
            pages += 1;

            // Only the requested symbol is ever asked for, but the endpoint
            // keys bars by symbol.
            if let Some(mut by_symbol) = page.bars {
                if let Some(symbol_bars) = by_symbol.swap_remove(&params.symbol) {
                    bars.extend(symbol_bars);
                }
            }

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        debug!(
            symbol = %params.symbol,
            start = %params.start,
            end = %params.end,
            pages,
            bars = bars.len(),
            "fetched alpaca bars"
        );

        bars.into_iter().map(AlpacaBar::into_candle).collect()
    }
}
