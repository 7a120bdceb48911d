use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::models::timeframe::TimeFrame;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (candle_history.toml). Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every candle between two instants
    Range {
        /// Symbol to fetch (e.g. "AAPL")
        #[arg(long)]
        ticker: String,

        /// Start datetime in RFC 3339 format (e.g. "2025-01-02T00:00:00Z")
        #[arg(long)]
        start: DateTime<Utc>,

        /// End datetime in RFC 3339 format (e.g. "2025-01-31T23:59:59Z")
        #[arg(short, long)]
        end: DateTime<Utc>,

        /// Bar interval: 5Min, 1Hour, 1Day, 1Week, 1Month
        #[arg(long, default_value = "1Day")]
        interval: TimeFrame,
    },

    /// Fetch the trailing days of history up to now
    Window {
        #[arg(long)]
        ticker: String,

        /// Number of days to look back
        #[arg(long)]
        days: u32,

        #[arg(long, default_value = "1Day")]
        interval: TimeFrame,

        /// Days between now and the end of the window
        #[arg(long, default_value_t = 0)]
        gap: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_range_command() {
        let cli = Cli::try_parse_from([
            "candle-history",
            "--config",
            "bars.toml",
            "range",
            "--ticker",
            "AAPL",
            "--start",
            "2024-01-08T00:00:00Z",
            "--end",
            "2024-01-09T00:00:00Z",
            "--interval",
            "5Min",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("bars.toml")));
        match cli.command {
            Commands::Range {
                ticker,
                start,
                interval,
                ..
            } => {
                assert_eq!(ticker, "AAPL");
                assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
                assert_eq!(interval, TimeFrame::minutes(5).unwrap());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn window_defaults() {
        let cli =
            Cli::try_parse_from(["candle-history", "window", "--ticker", "MSFT", "--days", "30"])
                .unwrap();
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Window {
                days,
                interval,
                gap,
                ..
            } => {
                assert_eq!(days, 30);
                assert_eq!(interval, TimeFrame::day());
                assert_eq!(gap, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_interval() {
        let result = Cli::try_parse_from([
            "candle-history",
            "window",
            "--ticker",
            "MSFT",
            "--days",
            "3",
            "--interval",
            "fortnight",
        ]);
        assert!(result.is_err());
    }
}
