use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;

/// Normalized stock ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        // Exchange suffixes (`0700.HK`), futures (`GC=F`), FX pairs
        // (`EURUSD=X`) and indices (`^GSPC`) are all valid symbols.
        for (index, ch) in normalized.chars().enumerate() {
            if !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '^' | '=')) {
                return Err(ValidationError::TickerInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

/// Outcome of splitting a comma-separated ticker input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerList {
    /// Valid tickers in input order, duplicates preserved.
    pub tickers: Vec<Ticker>,
    /// Tokens that were non-empty but failed validation.
    pub rejected: Vec<(String, ValidationError)>,
}

/// Split `input` on commas, trim, uppercase, and drop empty entries.
///
/// Duplicates are kept. Tokens that are not valid tickers are collected in
/// [`TickerList::rejected`] instead of failing the whole input.
pub fn parse_tickers(input: &str) -> TickerList {
    let mut list = TickerList::default();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match Ticker::parse(token) {
            Ok(ticker) => list.tickers.push(ticker),
            Err(error) => list.rejected.push((token.to_owned(), error)),
        }
    }

    list
}

/// Quick-pick tickers offered next to the ticker input.
pub const SUGGESTED_TICKERS: [(&str, &str); 5] = [
    ("AAPL", "Apple"),
    ("MSFT", "Microsoft"),
    ("NVDA", "Nvidia"),
    ("TSLA", "Tesla"),
    ("GOOGL", "Google"),
];

/// Ticker input used when the user supplies none.
pub const DEFAULT_TICKER_INPUT: &str = "AAPL, GOOGL, MSFT";
