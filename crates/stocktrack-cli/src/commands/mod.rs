mod dashboard;
mod info;
mod news;
mod prices;
mod session;
mod suggest;

pub use suggest::Suggestion;

use std::process::ExitCode;
use std::sync::Arc;

use stocktrack_core::{
    parse_date, today_utc, Dashboard, DashboardReport, DataFetcher, DataSource, DateRange,
    FetchTtls, ReqwestHttpClient, TrackerConfig, YahooAdapter,
};
use time::Date;

use crate::cli::{Cli, Command, OutputFormat, RangeArgs};
use crate::error::CliError;

/// Shared state for one invocation.
pub struct Context {
    pub dashboard: Dashboard,
    pub config: TrackerConfig,
    pub format: OutputFormat,
    pub pretty: bool,
}

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let config = load_config(cli)?;
    let context = Context {
        dashboard: build_dashboard(cli, &config),
        config,
        format: cli.format,
        pretty: cli.pretty,
    };

    match &cli.command {
        Command::Dashboard(args) => dashboard::run(args, &context).await,
        Command::Prices(args) => prices::run(args, &context).await,
        Command::News(args) => news::run(args, &context).await,
        Command::Info(args) => info::run(args, &context).await,
        Command::Suggest => suggest::run(&context),
        Command::Session(args) => session::run(args, &context).await,
    }
}

fn load_config(cli: &Cli) -> Result<TrackerConfig, CliError> {
    let mut config = TrackerConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::Command(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }
        config.timeout_ms = timeout_ms;
    }
    Ok(config)
}

fn build_dashboard(cli: &Cli, config: &TrackerConfig) -> Dashboard {
    let source: Arc<dyn DataSource> = if cli.mock {
        Arc::new(YahooAdapter::default())
    } else {
        let http_client = Arc::new(ReqwestHttpClient::new(&config.user_agent));
        Arc::new(YahooAdapter::from_config(config, http_client))
    };
    tracing::debug!(
        source = source.name(),
        mock = cli.mock,
        base_url = %config.base_url,
        "provider configured"
    );

    let fetcher = DataFetcher::new(source, FetchTtls::from(config)).with_cache_mode(cli.cache.into());
    Dashboard::new(fetcher)
}

/// Resolve `--start/--end` against `today`: the end defaults to today, the
/// start to the default lookback before the end.
pub(crate) fn resolve_range(args: &RangeArgs, today: Date) -> Result<DateRange, CliError> {
    let end = match &args.end {
        Some(value) => parse_date(value)?,
        None => today,
    };
    let start = match &args.start {
        Some(value) => parse_date(value)?,
        None => DateRange::default_ending(end).start(),
    };
    Ok(DateRange::bounded(start, end, today)?)
}

pub(crate) fn resolve_range_today(args: &RangeArgs) -> Result<DateRange, CliError> {
    resolve_range(args, today_utc())
}

pub(crate) fn resolve_limit(flag: Option<usize>, config: &TrackerConfig) -> Result<usize, CliError> {
    match flag {
        Some(0) => Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        ))),
        Some(limit) => Ok(limit),
        None => Ok(config.news_limit),
    }
}

/// 2 when the input held no valid ticker, 3 when no requested section
/// produced data, 0 otherwise.
pub(crate) fn report_exit_code(report: &DashboardReport) -> ExitCode {
    if !report.has_tickers() {
        ExitCode::from(2)
    } else if !report.has_any_data() {
        ExitCode::from(3)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn range_args(start: Option<&str>, end: Option<&str>) -> RangeArgs {
        RangeArgs {
            start: start.map(String::from),
            end: end.map(String::from),
        }
    }

    #[test]
    fn range_defaults_to_a_year_ending_today() {
        let today = date!(2024 - 06 - 30);
        let range = resolve_range(&range_args(None, None), today).expect("range");
        assert_eq!(range.end(), today);
        assert_eq!(range.start(), date!(2023 - 07 - 01));
    }

    #[test]
    fn future_end_and_inverted_ranges_are_rejected() {
        let today = date!(2024 - 06 - 30);
        let future = resolve_range(&range_args(None, Some("2024-07-01")), today);
        assert!(matches!(future, Err(CliError::Validation(_))));

        let inverted = resolve_range(&range_args(Some("2024-06-10"), Some("2024-06-01")), today);
        assert!(matches!(inverted, Err(CliError::Validation(_))));
    }

    #[test]
    fn zero_limit_is_a_usage_error() {
        let config = TrackerConfig::default();
        assert_eq!(resolve_limit(None, &config).expect("limit"), config.news_limit);
        assert_eq!(resolve_limit(Some(0), &config).map_err(|e| e.exit_code()).err(), Some(2));
    }
}
