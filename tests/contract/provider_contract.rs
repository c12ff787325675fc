//! Contract tests for the Yahoo adapter against scripted HTTP responses.
//!
//! The transport double records every request and replays canned bodies, so
//! these tests pin down the URLs the adapter builds and how it maps upstream
//! payloads and failures onto domain types and fetch error kinds.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use stocktrack_core::{
    DataSource, DateRange, FetchErrorKind, HttpAuth, HttpClient, HttpError, HttpRequest,
    HttpResponse, Ticker, TrackerConfig, YahooAdapter,
};
use time::macros::date;

#[derive(Default)]
struct ScriptedHttp {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttp {
    fn replying(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl HttpClient for ScriptedHttp {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        let next = self
            .responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("no scripted response")));
        Box::pin(async move { next })
    }
}

fn adapter(http: &Arc<ScriptedHttp>) -> YahooAdapter {
    YahooAdapter::with_http_client(http.clone(), HttpAuth::None)
        .with_base_url("https://yahoo.test/")
}

fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("valid ticker")
}

const CHART_BODY: &str = r#"{
  "chart": {
    "result": [{
      "meta": {
        "currency": "USD",
        "exchangeName": "NMS",
        "fullExchangeName": "NasdaqGS",
        "longName": "Apple Inc.",
        "regularMarketPrice": 189.5,
        "fiftyTwoWeekHigh": 199.6,
        "fiftyTwoWeekLow": 164.1,
        "gmtoffset": -18000
      },
      "timestamp": [1704205800, 1704292200, 1704378600],
      "indicators": {
        "quote": [{
          "open":   [187.15, 184.22, 182.15],
          "high":   [188.44, 185.88, 183.09],
          "low":    [183.89, 183.43, 180.88],
          "close":  [185.64, 184.25, 181.91],
          "volume": [82488700, 58414500, 71983600]
        }]
      }
    }],
    "error": null
  }
}"#;

// =============================================================================
// Chart endpoint
// =============================================================================

#[tokio::test]
async fn prices_request_covers_the_whole_end_day() {
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);
    let range = DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 04)).expect("range");

    let series = adapter(&http)
        .prices(&ticker("AAPL"), range)
        .await
        .expect("prices");

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    // 2024-01-02T00:00Z and 2024-01-05T00:00Z
    assert_eq!(
        requests[0].url,
        "https://yahoo.test/v8/finance/chart/AAPL?period1=1704153600&period2=1704412800&interval=1d&events=history"
    );
    assert_eq!(series.len(), 3);
    assert_eq!(series.first().map(|bar| bar.date), Some(date!(2024 - 01 - 02)));
    assert_eq!(series.last().map(|bar| bar.close), Some(181.91));
    assert_eq!(series.last().and_then(|bar| bar.volume), Some(71_983_600));
}

#[tokio::test]
async fn index_symbols_are_percent_encoded_in_the_path() {
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);

    let _ = adapter(&http).info(&ticker("^GSPC")).await;

    assert!(http.requests()[0]
        .url
        .starts_with("https://yahoo.test/v8/finance/chart/%5EGSPC?"));
}

#[tokio::test]
async fn info_is_read_from_chart_metadata() {
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);

    let info = adapter(&http).info(&ticker("AAPL")).await.expect("info");

    assert_eq!(info.name.as_deref(), Some("Apple Inc."));
    assert_eq!(info.exchange.as_deref(), Some("NasdaqGS"));
    assert_eq!(info.currency.as_deref(), Some("USD"));
    assert_eq!(info.fifty_two_week_low, Some(164.1));
}

#[tokio::test]
async fn cookie_from_config_is_sent_with_every_request() {
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);
    let config = TrackerConfig {
        base_url: String::from("https://yahoo.test"),
        timeout_ms: 2_500,
        cookie: Some(String::from("B=abc")),
        ..TrackerConfig::default()
    };

    let _ = YahooAdapter::from_config(&config, http.clone())
        .info(&ticker("MSFT"))
        .await;

    let request = &http.requests()[0];
    assert_eq!(request.headers.get("cookie").map(String::as_str), Some("B=abc"));
    assert_eq!(request.timeout_ms, 2_500);
}

// =============================================================================
// Search endpoint
// =============================================================================

#[tokio::test]
async fn news_is_returned_raw_in_provider_order() {
    let body = r#"{"news": [{"title": "one", "publisher": "A"}, {"headline": "two"}], "quotes": []}"#;
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(body))]);

    let news = adapter(&http).news(&ticker("TSLA")).await.expect("news");

    assert!(http.requests()[0]
        .url
        .starts_with("https://yahoo.test/v1/finance/search?q=TSLA&quotesCount=0&newsCount="));
    assert_eq!(news.len(), 2);
    assert_eq!(news[0]["title"], "one");
    assert_eq!(news[1]["headline"], "two");
}

#[tokio::test]
async fn missing_news_array_is_an_empty_feed() {
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(r#"{"quotes": []}"#))]);

    let news = adapter(&http).news(&ticker("TSLA")).await.expect("news");

    assert!(news.is_empty());
}

// =============================================================================
// Failure mapping
// =============================================================================

#[tokio::test]
async fn upstream_failures_map_to_fetch_error_kinds() {
    let range = DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 04)).expect("range");
    let cases = [
        (Err(HttpError::timeout("deadline")), FetchErrorKind::Transport),
        (Ok(HttpResponse::with_status(429, "")), FetchErrorKind::Status),
        (Ok(HttpResponse::ok_json("<html>")), FetchErrorKind::Decode),
        (
            Ok(HttpResponse::ok_json(
                r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#,
            )),
            FetchErrorKind::Provider,
        ),
        (
            Ok(HttpResponse::ok_json(r#"{"chart": {"result": [], "error": null}}"#)),
            FetchErrorKind::Empty,
        ),
    ];

    for (response, expected) in cases {
        let http = ScriptedHttp::replying(vec![response]);
        let error = adapter(&http)
            .prices(&ticker("AAPL"), range)
            .await
            .expect_err("failure expected");
        assert_eq!(error.kind(), expected, "unexpected kind for {error}");
    }
}

#[tokio::test]
async fn rows_outside_the_range_are_dropped() {
    let http = ScriptedHttp::replying(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);
    let range = DateRange::new(date!(2024 - 01 - 03), date!(2024 - 01 - 03)).expect("range");

    let series = adapter(&http)
        .prices(&ticker("AAPL"), range)
        .await
        .expect("prices");

    assert_eq!(series.len(), 1);
    assert_eq!(series.first().map(|bar| bar.close), Some(184.25));
}
