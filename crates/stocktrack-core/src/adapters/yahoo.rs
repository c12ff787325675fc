use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use time::{Date, Duration, OffsetDateTime, Weekday};

use crate::data_source::{DataSource, FetchError, FetchFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::{
    DateRange, PriceBar, PriceSeries, RawArticle, Ticker, TickerInfo, TrackerConfig,
    SUGGESTED_TICKERS,
};

const DEFAULT_NEWS_COUNT: usize = 10;
const REFERER: &str = "https://finance.yahoo.com/";

/// Yahoo Finance adapter supporting both real API calls and an offline mode.
///
/// Real mode uses the public chart endpoint for prices and ticker info and
/// the search endpoint for news. Offline mode (any transport whose
/// [`HttpClient::is_mock`] is true, including the default) serves
/// deterministic synthetic data and never parses a response.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    timeout_ms: u64,
    news_count: usize,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        let config = TrackerConfig::default();
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            base_url: config.base_url,
            timeout_ms: config.timeout_ms,
            news_count: DEFAULT_NEWS_COUNT,
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            auth,
            use_real_api,
            ..Self::default()
        }
    }

    /// Adapter wired to `config`'s base URL, timeout and cookie.
    pub fn from_config(config: &TrackerConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let auth = config
            .cookie
            .clone()
            .map(HttpAuth::Cookie)
            .unwrap_or_default();
        Self {
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
            news_count: DEFAULT_NEWS_COUNT.max(config.news_limit),
            ..Self::with_http_client(http_client, auth)
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn is_real_client(&self) -> bool {
        self.use_real_api
    }

    async fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.is_timeout() {
                FetchError::transport(format!("yahoo request timed out: {}", error.message()))
            } else {
                FetchError::transport(format!("yahoo transport error: {}", error.message()))
            }
        })?;

        if !response.is_success() {
            return Err(FetchError::status(response.status));
        }

        Ok(response.body)
    }

    fn chart_url(&self, ticker: &Ticker, query: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?{}",
            self.base_url,
            urlencoding::encode(ticker.as_str()),
            query
        )
    }
}

impl DataSource for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn prices<'a>(&'a self, ticker: &'a Ticker, range: DateRange) -> FetchFuture<'a, PriceSeries> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_prices(ticker, range).await
            } else {
                Ok(fake_prices(ticker, range))
            }
        })
    }

    fn news<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a, Vec<RawArticle>> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_news(ticker).await
            } else {
                Ok(fake_news(ticker))
            }
        })
    }

    fn info<'a>(&'a self, ticker: &'a Ticker) -> FetchFuture<'a, TickerInfo> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_info(ticker).await
            } else {
                Ok(fake_info(ticker))
            }
        })
    }
}

// Real API implementation methods
impl YahooAdapter {
    async fn fetch_real_prices(
        &self,
        ticker: &Ticker,
        range: DateRange,
    ) -> Result<PriceSeries, FetchError> {
        // period2 is exclusive upstream; extend by a day so `end` is included.
        let period1 = unix_midnight(range.start());
        let period2 = unix_midnight(range.end()) + Duration::days(1).whole_seconds();
        let url = self.chart_url(
            ticker,
            &format!("period1={period1}&period2={period2}&interval=1d&events=history"),
        );

        let body = self.get_body(&url).await?;
        parse_chart_prices(ticker, range, &body)
    }

    async fn fetch_real_news(&self, ticker: &Ticker) -> Result<Vec<RawArticle>, FetchError> {
        let url = format!(
            "{}/v1/finance/search?q={}&quotesCount=0&newsCount={}",
            self.base_url,
            urlencoding::encode(ticker.as_str()),
            self.news_count
        );

        let body = self.get_body(&url).await?;
        parse_search_news(&body)
    }

    async fn fetch_real_info(&self, ticker: &Ticker) -> Result<TickerInfo, FetchError> {
        let url = self.chart_url(ticker, "range=1d&interval=1d");
        let body = self.get_body(&url).await?;
        parse_chart_info(ticker, &body)
    }
}

fn decode_chart(body: &str) -> Result<YahooChartResult, FetchError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::decode(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(FetchError::provider(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::empty("no chart data in response"))
}

/// Convert a chart payload into bars, keeping only dates inside `range`.
///
/// Rows with an unrepresentable timestamp, a missing OHLC value, or that
/// fail [`PriceBar`] validation are dropped.
pub(crate) fn parse_chart_prices(
    ticker: &Ticker,
    range: DateRange,
    body: &str,
) -> Result<PriceSeries, FetchError> {
    let result = decode_chart(body)?;
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Err(FetchError::empty("no quote data in chart"));
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let shifted = ts.saturating_add(result.meta.gmtoffset);
        let local = match OffsetDateTime::from_unix_timestamp(shifted) {
            Ok(local) => local,
            Err(error) => {
                tracing::debug!(ticker = %ticker, ts, %error, "dropping row with invalid timestamp");
                continue;
            }
        };
        let date = local.date();
        if !range.contains(date) {
            continue;
        }

        let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) else {
            continue;
        };
        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64);

        match PriceBar::new(date, *open, *high, *low, *close, volume) {
            Ok(bar) => bars.push(bar),
            Err(error) => {
                tracing::debug!(ticker = %ticker, %date, %error, "dropping invalid bar");
            }
        }
    }

    if bars.is_empty() {
        return Err(FetchError::empty(format!(
            "no price rows for {ticker} in {range}"
        )));
    }

    Ok(PriceSeries::new(ticker.clone(), bars))
}

pub(crate) fn parse_chart_info(ticker: &Ticker, body: &str) -> Result<TickerInfo, FetchError> {
    let meta = decode_chart(body)?.meta;
    Ok(TickerInfo {
        ticker: ticker.clone(),
        name: meta.long_name.or(meta.short_name),
        exchange: meta.full_exchange_name.or(meta.exchange_name),
        currency: meta.currency,
        regular_market_price: meta.regular_market_price,
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
    })
}

/// Extract the raw `news` array from a search payload. A missing or null
/// array means the provider has no news, which is not an error.
pub(crate) fn parse_search_news(body: &str) -> Result<Vec<RawArticle>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::decode(format!("failed to parse yahoo search: {e}")))?;

    match value.get("news") {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(FetchError::decode("yahoo search 'news' is not an array")),
    }
}

fn unix_midnight(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

// Yahoo Finance API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => String::from("unknown error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_name: Option<String>,
    #[serde(default)]
    full_exchange_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    fifty_two_week_high: Option<f64>,
    #[serde(default)]
    fifty_two_week_low: Option<f64>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// Offline data

fn fake_prices(ticker: &Ticker, range: DateRange) -> PriceSeries {
    let seed = ticker_seed(ticker);
    let mut bars = Vec::new();
    let mut date = range.start();
    let mut index = 0_u64;

    loop {
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let base = 90.0 + ((seed + index) % 350) as f64 / 10.0;
            if let Ok(bar) = PriceBar::new(
                date,
                base,
                base + 1.20,
                base - 0.80,
                base + 0.30,
                Some(20_000 + index * 25),
            ) {
                bars.push(bar);
            }
            index += 1;
        }

        match date.next_day() {
            Some(next) if next <= range.end() => date = next,
            _ => break,
        }
    }

    PriceSeries::new(ticker.clone(), bars)
}

/// Synthetic news in the several shapes the real provider has used.
fn fake_news(ticker: &Ticker) -> Vec<RawArticle> {
    let t = ticker.as_str();
    vec![
        json!({
            "title": format!("{t} shares climb after earnings beat"),
            "link": format!("https://finance.example.test/{t}/earnings"),
            "publisher": "Market Wire",
        }),
        json!({
            "headline": format!("Analysts revisit {t} price targets"),
            "url": format!("https://finance.example.test/{t}/targets"),
            "source": "Street Journal",
        }),
        json!({
            "id": format!("{t}-3"),
            "content": {
                "title": format!("What {t}'s guidance means for investors"),
                "canonicalUrl": { "url": format!("https://finance.example.test/{t}/guidance") },
                "provider": { "displayName": "Finance Daily" },
            },
        }),
        json!({
            "title": 42,
            "link": null,
            "publisher": "Ticker Tape",
        }),
        json!({}),
        json!({
            "title": format!("  {t} options activity picks up  "),
            "link": "   ",
        }),
        json!({
            "title": format!("{t} in the week ahead"),
            "link": format!("https://finance.example.test/{t}/week-ahead"),
            "publisher": "Market Wire",
        }),
    ]
}

fn fake_info(ticker: &Ticker) -> TickerInfo {
    let name = SUGGESTED_TICKERS
        .iter()
        .find(|(symbol, _)| *symbol == ticker.as_str())
        .map(|(_, name)| (*name).to_owned());
    let price = 92.0 + (ticker_seed(ticker) % 500) as f64 / 10.0;

    TickerInfo {
        ticker: ticker.clone(),
        name,
        exchange: Some(String::from("NasdaqGS")),
        currency: Some(String::from("USD")),
        regular_market_price: Some(price),
        fifty_two_week_high: Some(price * 1.25),
        fifty_two_week_low: Some(price * 0.75),
    }
}

fn ticker_seed(ticker: &Ticker) -> u64 {
    ticker.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}
