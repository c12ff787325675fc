//! Provider contract and typed fetch errors.
//!
//! A [`DataSource`] answers three lookups: a daily price series for a
//! ticker and date range, the provider's recent news records for a ticker,
//! and a descriptive [`TickerInfo`] snapshot. Adapters report failures as
//! [`FetchError`]; the [`crate::DataFetcher`] logs them and collapses them
//! to "no data".

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{DateRange, PriceSeries, RawArticle, Ticker, TickerInfo};

/// Failure classification. Only used for logging; callers of the fetcher
/// never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// Network-level failure or timeout.
    Transport,
    /// Provider answered with a non-success HTTP status.
    Status,
    /// Response body could not be decoded.
    Decode,
    /// Provider reported an error in an otherwise valid payload.
    Provider,
    /// Provider answered successfully but had no rows.
    Empty,
}

impl FetchErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Decode => "decode",
            Self::Provider => "provider",
            Self::Empty => "empty",
        }
    }
}

impl Display for FetchErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    pub fn status(status: u16) -> Self {
        Self::new(
            FetchErrorKind::Status,
            format!("provider returned status {status}"),
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Provider, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Empty, message)
    }

    fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (fetch.{})", self.message, self.kind)
    }
}

impl std::error::Error for FetchError {}

/// Boxed future returned by [`DataSource`] methods.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// Market-data provider contract.
///
/// Implementations must be `Send + Sync`; the fetcher holds them behind an
/// `Arc<dyn DataSource>`.
pub trait DataSource: Send + Sync {
    /// Short provider name used in log fields.
    fn name(&self) -> &'static str;

    /// Daily bars for `ticker` with dates inside `range` (both ends inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`FetchErrorKind::Empty`] when the provider has no rows for
    /// the window, and other kinds for transport or payload failures.
    fn prices<'a>(&'a self, ticker: &'a Ticker, range: DateRange) -> FetchFuture<'a, PriceSeries>;

    /// Recent news records for `ticker`, in provider order, unmodified.
    fn news<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a, Vec<RawArticle>>;

    /// Descriptive snapshot for `ticker`.
    fn info<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a, TickerInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_code() {
        let error = FetchError::status(503);
        assert_eq!(error.kind(), FetchErrorKind::Status);
        assert_eq!(error.to_string(), "provider returned status 503 (fetch.status)");
    }
}
