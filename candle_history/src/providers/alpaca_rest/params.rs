use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::BarsRequestParams,
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

pub const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

/// Alpaca's documented limit for the basic plan.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 200;

/// Maximum page size accepted by the bars endpoint.
pub const PAGE_LIMIT: u32 = 10_000;

/// Default HTTP request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

impl Adjustment {
    fn as_query(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

impl Feed {
    fn as_query(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Alpaca-specific settings, read from the `[alpaca]` table of the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaSettings {
    pub base_url: String,
    pub requests_per_minute: u32,
    /// Per-request timeout covering connect, headers and body.
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
}

impl AlpacaSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            adjustment: None,
            feed: None,
        }
    }
}

/// Checks the amount/unit combinations the bars endpoint accepts.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    let amount = timeframe.amount;
    let message = match timeframe.unit {
        TimeFrameUnit::Minute if !(1..=59).contains(&amount) => {
            "Minute units can only be used with amounts between 1-59"
        }
        TimeFrameUnit::Hour if !(1..=23).contains(&amount) => {
            "Hour units can only be used with amounts between 1-23"
        }
        TimeFrameUnit::Day | TimeFrameUnit::Week if amount != 1 => {
            "Day and Week units can only be used with amount 1"
        }
        TimeFrameUnit::Month if ![1, 2, 3, 6, 12].contains(&amount) => {
            "Month units can only be used with amount 1, 2, 3, 6 and 12"
        }
        _ => return Ok(()),
    };
    ValidationSnafu {
        message: format!("{timeframe}: {message}"),
    }
    .fail()
}

/// Translates a timeframe into Alpaca's `timeframe` query value.
pub fn alpaca_timeframe(timeframe: &TimeFrame) -> String {
    let unit = match timeframe.unit {
        TimeFrameUnit::Minute => "Min",
        TimeFrameUnit::Hour => "Hour",
        TimeFrameUnit::Day => "Day",
        TimeFrameUnit::Week => "Week",
        TimeFrameUnit::Month => "Month",
    };
    format!("{}{}", timeframe.amount, unit)
}

/// Builds the query string for one page of a bars request (without the page token).
pub fn construct_params(
    params: &BarsRequestParams,
    settings: &AlpacaSettings,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbol.clone()),
        ("timeframe".to_string(), alpaca_timeframe(&params.timeframe)),
        ("start".to_string(), params.start.to_rfc3339()),
        ("end".to_string(), params.end.to_rfc3339()),
        ("limit".to_string(), PAGE_LIMIT.to_string()),
        ("sort".to_string(), "asc".to_string()),
    ];
    if let Some(adjustment) = settings.adjustment {
        query.push(("adjustment".to_string(), adjustment.as_query().to_string()));
    }
    if let Some(feed) = settings.feed {
        query.push(("feed".to_string(), feed.as_query().to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn accepts_supported_timeframes() {
        for tf in ["1Min", "59Min", "1Hour", "23Hour", "1Day", "1Week", "6Month"] {
            let tf: TimeFrame = tf.parse().unwrap();
            assert!(validate_timeframe(&tf).is_ok(), "{tf} should be accepted");
        }
    }

    #[test]
    fn rejects_unsupported_timeframes() {
        for tf in ["60Min", "24Hour", "2Day", "2Week", "4Month"] {
            let tf: TimeFrame = tf.parse().unwrap();
            let err = validate_timeframe(&tf).unwrap_err();
            assert!(!err.is_retryable());
            assert!(err.to_string().contains(&tf.to_string()));
        }
    }

    #[test]
    fn query_carries_symbol_bounds_and_options() {
        let params = BarsRequestParams {
            symbol: "AAPL".into(),
            timeframe: TimeFrame::minutes(5).unwrap(),
            start: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap(),
        };
        let settings = AlpacaSettings {
            feed: Some(Feed::Iex),
            ..Default::default()
        };

        let query = construct_params(&params, &settings);
        let get = |k: &str| {
            query
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("symbols"), Some("AAPL"));
        assert_eq!(get("timeframe"), Some("5Min"));
        assert_eq!(get("start"), Some("2024-01-08T00:00:00+00:00"));
        assert_eq!(get("end"), Some("2024-01-09T00:00:00+00:00"));
        assert_eq!(get("feed"), Some("iex"));
        assert_eq!(get("adjustment"), None);
    }
}
