use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::ValidationError;

/// Serde adapter writing [`Date`] values as `YYYY-MM-DD` strings.
pub(crate) mod serde_iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(serde::de::Error::custom)
    }
}

/// Number of days covered by [`DateRange::default_ending`].
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Today's date in UTC.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    #[serde(with = "serde_iso_date")]
    start: Date,
    #[serde(with = "serde_iso_date")]
    end: Date,
}

/// Unchecked wire form; [`DateRange::new`] enforces ordering.
#[derive(Deserialize)]
struct RawDateRange {
    #[serde(with = "serde_iso_date")]
    start: Date,
    #[serde(with = "serde_iso_date")]
    end: Date,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ValidationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Like [`DateRange::new`] but also rejects an `end` after `today`.
    pub fn bounded(start: Date, end: Date, today: Date) -> Result<Self, ValidationError> {
        if end > today {
            return Err(ValidationError::FutureEndDate {
                end: format_date(end),
                today: format_date(today),
            });
        }
        Self::new(start, end)
    }

    /// The trailing year ending at `end`.
    pub fn default_ending(end: Date) -> Self {
        let start = end
            .checked_sub(Duration::days(DEFAULT_LOOKBACK_DAYS))
            .unwrap_or(end);
        Self { start, end }
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", format_date(self.start), format_date(self.end))
    }
}
