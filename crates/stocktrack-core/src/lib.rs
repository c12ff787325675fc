//! # Stocktrack Core
//!
//! Price and news fetching, caching and aggregation for the stocktrack
//! dashboard.
//!
//! ## Overview
//!
//! - **Domain models** for tickers, date ranges, daily bars, and news
//! - **Data source trait** with a Yahoo Finance adapter (real or offline)
//! - **TTL cache** keyed by call name and arguments, with clear-all
//! - **Fetcher** that memoizes provider calls and degrades failures to "no data"
//! - **Aggregation** of close prices into one table plus summary statistics
//! - **News normalization** across loosely shaped provider records
//! - **Dashboard** render pass producing a serializable report
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`aggregate`] | Price table and summary statistics |
//! | [`cache`] | TTL cache store |
//! | [`config`] | `STOCKTRACK_*` settings |
//! | [`dashboard`] | Render pass and report types |
//! | [`data_source`] | Data source trait and fetch errors |
//! | [`domain`] | Domain models |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Memoized provider access |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | News field fallback and render-time cleanup |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stocktrack_core::{
//!     Dashboard, DashboardRequest, DataFetcher, DateRange, FetchTtls, YahooAdapter, today_utc,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetcher = DataFetcher::new(Arc::new(YahooAdapter::default()), FetchTtls::default());
//!     let dashboard = Dashboard::new(fetcher);
//!
//!     let request = DashboardRequest::new("AAPL, MSFT", DateRange::default_ending(today_utc()));
//!     let report = dashboard.render(&request).await;
//!     for stats in report.prices.iter().flat_map(|section| section.stats()) {
//!         println!("{}: ${:.2}", stats.ticker, stats.current_price);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Session  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Dashboard     │────▶│ Aggregate /      │
//! │  (render pass)  │     │ Normalize        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  DataFetcher    │────▶│ CacheStore (TTL) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Data Source     │────▶│ HTTP Client      │
//! │ (Yahoo adapter) │     │ (reqwest/none)   │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod adapters;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod normalize;

// Adapter implementations
pub use adapters::YahooAdapter;

// Aggregation
pub use aggregate::{build_price_table, compute_stats, Direction, PriceRow, PriceTable, SummaryStats};

// Caching
pub use cache::{CacheKey, CacheMode, CacheStore};

// Configuration
pub use config::{TrackerConfig, DEFAULT_NEWS_LIMIT};

// Render pass
pub use dashboard::{
    Dashboard, DashboardReport, DashboardRequest, InfoEntry, NewsSection, Notice, NoticeLevel,
    PriceSection, RejectedTicker, Sections, TickerMetric, TickerNews,
};

// Data source trait and types
pub use data_source::{DataSource, FetchError, FetchErrorKind, FetchFuture};

// Domain models
pub use domain::{
    format_date, parse_date, parse_tickers, today_utc, DateRange, NewsArticle, PriceBar,
    PriceSeries, RawArticle, Ticker, TickerInfo, TickerList, ABSENT_LINK, DEFAULT_LOOKBACK_DAYS,
    DEFAULT_TICKER_INPUT, SUGGESTED_TICKERS,
};

// Error types
pub use error::{ConfigError, CoreError, ValidationError};

// Fetcher
pub use fetcher::{DataFetcher, FetchTtls};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// News normalization
pub use normalize::{normalize_article, normalize_feed, revalidate_article, select_top_articles};
