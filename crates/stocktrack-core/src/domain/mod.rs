//! # Domain Models
//!
//! Canonical types shared by the fetcher, aggregator and news normalizer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated, uppercase stock symbol |
//! | [`DateRange`] | Inclusive `[start, end]` calendar range |
//! | [`PriceBar`] | Daily OHLCV record |
//! | [`PriceSeries`] | Chronological bars for one ticker |
//! | [`NewsArticle`] | Canonical `{title, link, source}` record |
//! | [`TickerInfo`] | Name/exchange/currency snapshot |
//!
//! Constructors enforce invariants and return [`crate::ValidationError`]:
//!
//! ```rust
//! use stocktrack_core::{parse_tickers, Ticker};
//!
//! let list = parse_tickers("aapl, , msft");
//! assert_eq!(list.tickers, vec![Ticker::parse("AAPL").unwrap(), Ticker::parse("MSFT").unwrap()]);
//! ```

mod date_range;
mod info;
mod news;
mod price;
mod ticker;

pub use date_range::{format_date, parse_date, today_utc, DateRange, DEFAULT_LOOKBACK_DAYS};
pub(crate) use date_range::serde_iso_date;
pub use info::TickerInfo;
pub use news::{NewsArticle, RawArticle, ABSENT_LINK};
pub use price::{PriceBar, PriceSeries};
pub use ticker::{parse_tickers, Ticker, TickerList, DEFAULT_TICKER_INPUT, SUGGESTED_TICKERS};
