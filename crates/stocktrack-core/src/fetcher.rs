//! Memoized provider access.
//!
//! [`DataFetcher`] is the boundary where provider failures stop. Every
//! [`FetchError`] is logged with its kind and converted to "no data":
//! `None` for prices and info, an empty list for news. Results, including
//! "no data", are memoized per call arguments for that call's TTL, so a
//! repeated call inside the window never reaches the provider.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{CacheKey, CacheMode, CacheStore};
use crate::data_source::{DataSource, FetchError, FetchErrorKind};
use crate::{format_date, DateRange, PriceSeries, RawArticle, Ticker, TickerInfo, TrackerConfig};

const FETCH_PRICES: &str = "fetch_prices";
const FETCH_NEWS: &str = "fetch_news";
const FETCH_INFO: &str = "fetch_info";

/// Memoized value for any of the fetcher's calls.
#[derive(Debug, Clone)]
enum Cached {
    Prices(Option<Arc<PriceSeries>>),
    News(Arc<Vec<RawArticle>>),
    Info(Option<Arc<TickerInfo>>),
}

/// Per-call cache lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTtls {
    pub prices: Duration,
    pub news: Duration,
    pub info: Duration,
}

impl From<&TrackerConfig> for FetchTtls {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            prices: config.prices_ttl,
            news: config.news_ttl,
            info: config.info_ttl,
        }
    }
}

impl Default for FetchTtls {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

/// Provider wrapper with TTL memoization and swallow-at-boundary errors.
#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn DataSource>,
    cache: CacheStore<Cached>,
    ttls: FetchTtls,
    mode: CacheMode,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn DataSource>, ttls: FetchTtls) -> Self {
        Self {
            source,
            cache: CacheStore::new(ttls.prices),
            ttls,
            mode: CacheMode::Use,
        }
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.mode
    }

    /// Daily prices for `ticker` over `range`, or `None` when the provider
    /// has no rows or the call fails for any reason.
    pub async fn fetch_prices(&self, ticker: &Ticker, range: DateRange) -> Option<Arc<PriceSeries>> {
        let key = CacheKey::new(
            FETCH_PRICES,
            [
                ticker.to_string(),
                format_date(range.start()),
                format_date(range.end()),
            ],
        );
        if let Some(Cached::Prices(hit)) = self.lookup(&key).await {
            return hit;
        }

        let started = Instant::now();
        let value = match self.source.prices(ticker, range).await {
            Ok(series) if series.is_empty() => {
                self.log_failure(FETCH_PRICES, ticker, &FetchError::empty("series has no rows"));
                None
            }
            Ok(series) => {
                tracing::debug!(
                    ticker = %ticker,
                    rows = series.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "fetched prices"
                );
                Some(Arc::new(series))
            }
            Err(error) => {
                self.log_failure(FETCH_PRICES, ticker, &error);
                None
            }
        };

        self.store(key, Cached::Prices(value.clone()), self.ttls.prices)
            .await;
        value
    }

    /// Raw recent news for `ticker` in provider order; empty on any failure.
    pub async fn fetch_news(&self, ticker: &Ticker) -> Arc<Vec<RawArticle>> {
        let key = CacheKey::new(FETCH_NEWS, [ticker.to_string()]);
        if let Some(Cached::News(hit)) = self.lookup(&key).await {
            return hit;
        }

        let value = match self.source.news(ticker).await {
            Ok(articles) => {
                tracing::debug!(ticker = %ticker, articles = articles.len(), "fetched news");
                Arc::new(articles)
            }
            Err(error) => {
                self.log_failure(FETCH_NEWS, ticker, &error);
                Arc::new(Vec::new())
            }
        };

        self.store(key, Cached::News(Arc::clone(&value)), self.ttls.news)
            .await;
        value
    }

    /// Descriptive snapshot for `ticker`, or `None` on any failure.
    pub async fn fetch_info(&self, ticker: &Ticker) -> Option<Arc<TickerInfo>> {
        let key = CacheKey::new(FETCH_INFO, [ticker.to_string()]);
        if let Some(Cached::Info(hit)) = self.lookup(&key).await {
            return hit;
        }

        let value = match self.source.info(ticker).await {
            Ok(info) => Some(Arc::new(info)),
            Err(error) => {
                self.log_failure(FETCH_INFO, ticker, &error);
                None
            }
        };

        self.store(key, Cached::Info(value.clone()), self.ttls.info)
            .await;
        value
    }

    /// Drop every cached result for every ticker.
    pub async fn clear_cache(&self) {
        let entries = self.cache.len().await;
        self.cache.clear().await;
        tracing::info!(entries, "cache cleared");
    }

    /// Number of memoized results currently held.
    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }

    async fn lookup(&self, key: &CacheKey) -> Option<Cached> {
        if self.mode != CacheMode::Use {
            return None;
        }
        let hit = self.cache.get(key).await;
        let outcome = if hit.is_some() { "hit" } else { "miss" };
        tracing::trace!(key = %key, cache = outcome, "cache lookup");
        hit
    }

    async fn store(&self, key: CacheKey, value: Cached, ttl: Duration) {
        if self.mode == CacheMode::Bypass {
            return;
        }
        self.cache.put(key, value, Some(ttl)).await;
    }

    fn log_failure(&self, call: &'static str, ticker: &Ticker, error: &FetchError) {
        let source = self.source.name();
        if error.kind() == FetchErrorKind::Empty {
            tracing::debug!(call, source, ticker = %ticker, kind = %error.kind(), "{}", error.message());
        } else {
            tracing::warn!(call, source, ticker = %ticker, kind = %error.kind(), "{}", error.message());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::data_source::FetchFuture;
    use crate::PriceBar;
    use time::macros::date;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl DataSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn prices<'a>(&'a self, ticker: &'a Ticker, range: DateRange) -> FetchFuture<'a, PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    return Err(FetchError::transport("boom"));
                }
                let bar = PriceBar::new(range.start(), 1.0, 1.0, 1.0, 1.0, None)
                    .map_err(|e| FetchError::decode(e.to_string()))?;
                Ok(PriceSeries::new(ticker.clone(), vec![bar]))
            })
        }

        fn news<'a>(&'a self, _ticker: &'a Ticker) -> FetchFuture<'a, Vec<RawArticle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(FetchError::decode("bad json"))
                } else {
                    Ok(vec![serde_json::json!({"title": "t"})])
                }
            })
        }

        fn info<'a>(&'a self, _ticker: &'a Ticker) -> FetchFuture<'a, TickerInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Err(FetchError::status(404)) })
        }
    }

    fn range() -> DateRange {
        DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 05)).expect("range")
    }

    fn msft() -> Ticker {
        Ticker::parse("MSFT").expect("ticker")
    }

    #[tokio::test]
    async fn refresh_mode_always_queries_but_still_stores() {
        let source = Arc::new(CountingSource::default());
        let fetcher = DataFetcher::new(source.clone(), FetchTtls::default())
            .with_cache_mode(CacheMode::Refresh);

        fetcher.fetch_prices(&msft(), range()).await;
        fetcher.fetch_prices(&msft(), range()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.cached_entries().await, 1);
    }

    #[tokio::test]
    async fn bypass_mode_never_touches_the_cache() {
        let source = Arc::new(CountingSource::default());
        let fetcher = DataFetcher::new(source.clone(), FetchTtls::default())
            .with_cache_mode(CacheMode::Bypass);

        fetcher.fetch_news(&msft()).await;
        fetcher.fetch_news(&msft()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.cached_entries().await, 0);
    }

    #[tokio::test]
    async fn failures_are_memoized_as_no_data() {
        let source = Arc::new(CountingSource {
            fail: true,
            ..CountingSource::default()
        });
        let fetcher = DataFetcher::new(source.clone(), FetchTtls::default());

        assert!(fetcher.fetch_prices(&msft(), range()).await.is_none());
        assert!(fetcher.fetch_prices(&msft(), range()).await.is_none());
        assert!(fetcher.fetch_info(&msft()).await.is_none());

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn calls_with_same_ticker_use_separate_entries() {
        let source = Arc::new(CountingSource::default());
        let fetcher = DataFetcher::new(source.clone(), FetchTtls::default());

        fetcher.fetch_prices(&msft(), range()).await;
        fetcher.fetch_news(&msft()).await;
        fetcher.fetch_info(&msft()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(fetcher.cached_entries().await, 3);
    }
}
