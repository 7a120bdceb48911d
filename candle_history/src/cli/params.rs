use std::path::Path;

use crate::{
    config::{ConfigError, HistoryConfig},
    models::request_params::{HistoryRequest, WindowRequest},
};

use super::commands::Commands;

/// A parsed subcommand, ready to hand to the [`HistoryClient`](crate::HistoryClient).
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Range(HistoryRequest),
    Window(WindowRequest),
}

impl From<Commands> for Retrieval {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Range {
                ticker,
                start,
                end,
                interval,
            } => Retrieval::Range(HistoryRequest {
                ticker: normalize_ticker(&ticker),
                interval,
                start,
                end,
            }),
            Commands::Window {
                ticker,
                days,
                interval,
                gap,
            } => Retrieval::Window(WindowRequest {
                ticker: normalize_ticker(&ticker),
                interval,
                lookback_days: days,
                gap_days: gap,
            }),
        }
    }
}

fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Loads the config file when given, otherwise the defaults. Environment
/// overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<HistoryConfig, ConfigError> {
    match path {
        Some(path) => HistoryConfig::load(path),
        None => {
            let mut config = HistoryConfig::default();
            config.apply_env_overrides()?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeframe::TimeFrame;

    #[test]
    fn window_command_becomes_window_request() {
        let retrieval = Retrieval::from(Commands::Window {
            ticker: " msft ".into(),
            days: 10,
            interval: TimeFrame::day(),
            gap: 2,
        });
        assert_eq!(
            retrieval,
            Retrieval::Window(WindowRequest {
                ticker: "MSFT".into(),
                interval: TimeFrame::day(),
                lookback_days: 10,
                gap_days: 2,
            })
        );
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.calendar_tz, "America/New_York");
    }
}
