//! One top-to-bottom render pass over a ticker input.
//!
//! [`Dashboard::render`] parses the input, visits every ticker in input order
//! through the [`DataFetcher`] (one awaited call at a time), and assembles a
//! [`DashboardReport`] holding the price table, per-ticker metrics, news
//! sections, and the notices a front end should show.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::aggregate::{build_price_table, compute_stats, PriceTable, SummaryStats};
use crate::normalize::normalize_feed;
use crate::{
    parse_tickers, CoreError, DataFetcher, DateRange, NewsArticle, PriceSeries, Ticker, TickerInfo,
    DEFAULT_NEWS_LIMIT,
};

pub const PROMPT_ENTER_TICKER: &str = "Enter at least one stock ticker";
pub const NO_PRICE_DATA: &str =
    "Could not fetch data for any of the selected tickers. Please check the ticker symbols.";
pub const NO_NEWS_AT_ALL: &str =
    "No news articles found for the selected tickers. Try clicking Refresh or check back later.";

/// Which parts of the report a pass should fetch and build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub prices: bool,
    pub news: bool,
    pub info: bool,
}

impl Sections {
    pub const FULL: Self = Self {
        prices: true,
        news: true,
        info: false,
    };
    pub const PRICES: Self = Self {
        prices: true,
        news: false,
        info: false,
    };
    pub const NEWS: Self = Self {
        prices: false,
        news: true,
        info: false,
    };
    pub const INFO: Self = Self {
        prices: false,
        news: false,
        info: true,
    };
}

impl Default for Sections {
    fn default() -> Self {
        Self::FULL
    }
}

/// Inputs of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    pub input: String,
    pub range: DateRange,
    pub news_limit: usize,
    pub sections: Sections,
}

impl DashboardRequest {
    pub fn new(input: impl Into<String>, range: DateRange) -> Self {
        Self {
            input: input.into(),
            range,
            news_limit: DEFAULT_NEWS_LIMIT,
            sections: Sections::FULL,
        }
    }

    pub fn with_news_limit(mut self, news_limit: usize) -> Self {
        self.news_limit = news_limit;
        self
    }

    pub fn with_sections(mut self, sections: Sections) -> Self {
        self.sections = sections;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing message produced by a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Set when the message is about a single ticker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<Ticker>,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            ticker: None,
            message: message.into(),
        }
    }

    fn for_ticker(level: NoticeLevel, ticker: &Ticker, message: impl Into<String>) -> Self {
        Self {
            level,
            ticker: Some(ticker.clone()),
            message: message.into(),
        }
    }
}

/// Input token that failed ticker validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTicker {
    pub input: String,
    pub reason: String,
}

/// Metric card for one ticker occurrence; `stats` is `None` when the
/// ticker produced no prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetric {
    pub ticker: Ticker,
    pub stats: Option<SummaryStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSection {
    pub table: PriceTable,
    /// One entry per input ticker, duplicates included.
    pub metrics: Vec<TickerMetric>,
}

impl PriceSection {
    /// Rows of the statistics table, in input order.
    pub fn stats(&self) -> impl Iterator<Item = &SummaryStats> {
        self.metrics.iter().filter_map(|metric| metric.stats.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerNews {
    pub ticker: Ticker,
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSection {
    /// One feed per distinct ticker, in first-seen order.
    pub feeds: Vec<TickerNews>,
}

impl NewsSection {
    pub fn article_count(&self) -> usize {
        self.feeds.iter().map(|feed| feed.articles.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoEntry {
    pub ticker: Ticker,
    pub info: Option<TickerInfo>,
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub tickers: Vec<Ticker>,
    pub rejected: Vec<RejectedTicker>,
    pub range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<NewsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Vec<InfoEntry>>,
    pub notices: Vec<Notice>,
}

impl DashboardReport {
    pub fn has_tickers(&self) -> bool {
        !self.tickers.is_empty()
    }

    pub fn has_price_data(&self) -> bool {
        self.prices
            .as_ref()
            .is_some_and(|section| !section.table.is_empty())
    }

    pub fn has_news(&self) -> bool {
        self.news
            .as_ref()
            .is_some_and(|section| section.article_count() > 0)
    }

    /// JSON rendering of the whole report.
    pub fn to_json(&self, pretty: bool) -> Result<String, CoreError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// True when at least one requested section produced data.
    pub fn has_any_data(&self) -> bool {
        self.has_price_data()
            || self.has_news()
            || self
                .info
                .as_ref()
                .is_some_and(|entries| entries.iter().any(|entry| entry.info.is_some()))
    }
}

/// Render passes over a shared [`DataFetcher`].
#[derive(Clone)]
pub struct Dashboard {
    fetcher: DataFetcher,
}

impl Dashboard {
    pub fn new(fetcher: DataFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &DataFetcher {
        &self.fetcher
    }

    /// Manual refresh: drops every cached result for every ticker.
    pub async fn refresh(&self) {
        self.fetcher.clear_cache().await;
    }

    pub async fn render(&self, request: &DashboardRequest) -> DashboardReport {
        let started = Instant::now();
        let parsed = parse_tickers(&request.input);
        let mut notices = Vec::new();

        let rejected: Vec<RejectedTicker> = parsed
            .rejected
            .iter()
            .map(|(input, error)| RejectedTicker {
                input: input.clone(),
                reason: error.to_string(),
            })
            .collect();
        for entry in &rejected {
            notices.push(Notice::new(
                NoticeLevel::Warning,
                format!("Skipping invalid ticker '{}': {}", entry.input, entry.reason),
            ));
        }

        let tickers = parsed.tickers;
        if tickers.is_empty() {
            notices.push(Notice::new(NoticeLevel::Warning, PROMPT_ENTER_TICKER));
            return DashboardReport {
                tickers,
                rejected,
                range: request.range,
                prices: None,
                news: None,
                info: None,
                notices,
            };
        }

        let prices = if request.sections.prices {
            Some(self.price_section(&tickers, request.range, &mut notices).await)
        } else {
            None
        };
        let news = if request.sections.news {
            Some(
                self.news_section(&tickers, request.news_limit, &mut notices)
                    .await,
            )
        } else {
            None
        };
        let info = if request.sections.info {
            Some(self.info_entries(&tickers, &mut notices).await)
        } else {
            None
        };

        tracing::debug!(
            tickers = tickers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render pass complete"
        );

        DashboardReport {
            tickers,
            rejected,
            range: request.range,
            prices,
            news,
            info,
            notices,
        }
    }

    async fn price_section(
        &self,
        tickers: &[Ticker],
        range: DateRange,
        notices: &mut Vec<Notice>,
    ) -> PriceSection {
        let mut series_by_ticker: HashMap<Ticker, Arc<PriceSeries>> = HashMap::new();
        for ticker in tickers {
            if series_by_ticker.contains_key(ticker) {
                continue;
            }
            if let Some(series) = self.fetcher.fetch_prices(ticker, range).await {
                series_by_ticker.insert(ticker.clone(), series);
            }
        }

        let table = build_price_table(tickers, &series_by_ticker);
        let metrics = tickers
            .iter()
            .map(|ticker| TickerMetric {
                ticker: ticker.clone(),
                stats: compute_stats(ticker, series_by_ticker.get(ticker).map(Arc::as_ref)),
            })
            .collect::<Vec<_>>();

        if table.is_empty() {
            notices.push(Notice::new(NoticeLevel::Error, NO_PRICE_DATA));
        } else {
            for metric in metrics.iter().filter(|metric| metric.stats.is_none()) {
                notices.push(Notice::for_ticker(
                    NoticeLevel::Warning,
                    &metric.ticker,
                    format!("Could not fetch data for {}", metric.ticker),
                ));
            }
        }

        PriceSection { table, metrics }
    }

    async fn news_section(
        &self,
        tickers: &[Ticker],
        limit: usize,
        notices: &mut Vec<Notice>,
    ) -> NewsSection {
        let mut feeds: Vec<TickerNews> = Vec::new();
        for ticker in tickers {
            if feeds.iter().any(|feed| &feed.ticker == ticker) {
                continue;
            }
            let raw = self.fetcher.fetch_news(ticker).await;
            feeds.push(TickerNews {
                ticker: ticker.clone(),
                articles: normalize_feed(&raw, limit),
            });
        }

        let with_articles: Vec<&str> = feeds
            .iter()
            .filter(|feed| !feed.articles.is_empty())
            .map(|feed| feed.ticker.as_str())
            .collect();

        if with_articles.is_empty() {
            notices.push(Notice::new(NoticeLevel::Warning, NO_NEWS_AT_ALL));
        } else {
            notices.push(Notice::new(
                NoticeLevel::Success,
                format!(
                    "News updated - Showing latest articles for {}",
                    with_articles.join(", ")
                ),
            ));
            for feed in feeds.iter().filter(|feed| feed.articles.is_empty()) {
                notices.push(Notice::for_ticker(
                    NoticeLevel::Info,
                    &feed.ticker,
                    format!(
                        "No recent articles found for {}. Try refreshing again soon!",
                        feed.ticker
                    ),
                ));
            }
        }

        NewsSection { feeds }
    }

    async fn info_entries(&self, tickers: &[Ticker], notices: &mut Vec<Notice>) -> Vec<InfoEntry> {
        let mut entries = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let info = self.fetcher.fetch_info(ticker).await;
            if info.is_none() {
                notices.push(Notice::for_ticker(
                    NoticeLevel::Warning,
                    ticker,
                    format!("Could not fetch info for {ticker}"),
                ));
            }
            entries.push(InfoEntry {
                ticker: ticker.clone(),
                info: info.map(|info| TickerInfo::clone(&info)),
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchTtls, YahooAdapter};
    use time::macros::date;

    fn dashboard() -> Dashboard {
        let source = Arc::new(YahooAdapter::default());
        Dashboard::new(DataFetcher::new(source, FetchTtls::default()))
    }

    fn range() -> DateRange {
        DateRange::new(date!(2024 - 03 - 01), date!(2024 - 03 - 29)).expect("range")
    }

    #[tokio::test]
    async fn blank_input_prompts_without_fetching() {
        let dashboard = dashboard();
        let report = dashboard
            .render(&DashboardRequest::new(" , ,", range()))
            .await;

        assert!(!report.has_tickers());
        assert!(report.prices.is_none());
        assert_eq!(report.notices[0].message, PROMPT_ENTER_TICKER);
        assert_eq!(dashboard.fetcher().cached_entries().await, 0);
    }

    #[tokio::test]
    async fn invalid_tokens_become_warnings() {
        let report = dashboard()
            .render(&DashboardRequest::new("AAPL, BAD$", range()).with_sections(Sections::PRICES))
            .await;

        assert_eq!(report.tickers.len(), 1);
        assert_eq!(report.rejected[0].input, "BAD$");
        assert_eq!(report.notices[0].level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn sections_limit_what_is_built() {
        let report = dashboard()
            .render(&DashboardRequest::new("MSFT", range()).with_sections(Sections::NEWS))
            .await;

        assert!(report.prices.is_none());
        assert!(report.has_news());
        assert!(report.has_any_data());
    }
}
