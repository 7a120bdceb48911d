use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// Bar interval: `amount` × `unit` (e.g. 5 minutes, 1 day).
///
/// Construction only rejects a zero amount. Whether a given combination is
/// acceptable upstream is decided by each provider
/// (see [`DataProvider::validate_timeframe`](crate::providers::DataProvider::validate_timeframe)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        if amount == 0 {
            return Err(TimeFrameError::InvalidAmount {
                unit,
                message: "amount must be greater than zero".into(),
            });
        }
        Ok(Self { amount, unit })
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Minute)
    }

    pub fn hours(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Hour)
    }

    pub const fn day() -> Self {
        Self {
            amount: 1,
            unit: TimeFrameUnit::Day,
        }
    }
}

/// Renders in the provider-neutral short form also used inside cache keys
/// (`5Min`, `1Hour`, `1Day`, `1Week`, `1Month`).
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeFrameUnit::Minute => "Min",
            TimeFrameUnit::Hour => "Hour",
            TimeFrameUnit::Day => "Day",
            TimeFrameUnit::Week => "Week",
            TimeFrameUnit::Month => "Month",
        };
        write!(f, "{}{}", self.amount, unit)
    }
}

/// Accepts `5Min`, `5m`, `1h`, `1Day`, `1d`, and bare unit names such as
/// `minute`, `hour`, `day` (amount 1).
impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimeFrameError::InvalidInput {
                message: "empty timeframe".into(),
            });
        }

        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        let amount = if digits.is_empty() {
            1
        } else {
            digits.parse::<u32>().map_err(|e| TimeFrameError::InvalidInput {
                message: format!("bad amount in {s:?}: {e}"),
            })?
        };

        // "M" alone means month, everything else is case-insensitive.
        let unit = match unit {
            "M" => TimeFrameUnit::Month,
            other => match other.to_ascii_lowercase().as_str() {
                "m" | "min" | "minute" | "minutes" => TimeFrameUnit::Minute,
                "h" | "hr" | "hour" | "hours" => TimeFrameUnit::Hour,
                "d" | "day" | "days" => TimeFrameUnit::Day,
                "w" | "wk" | "week" | "weeks" => TimeFrameUnit::Week,
                "mo" | "month" | "months" => TimeFrameUnit::Month,
                _ => {
                    return Err(TimeFrameError::InvalidInput {
                        message: format!("Invalid timeframe unit: {unit:?}"),
                    });
                }
            },
        };

        Self::new(amount, unit)
    }
}
