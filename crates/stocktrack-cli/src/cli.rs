//! CLI argument definitions for stocktrack.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dashboard` | Price table, metrics, statistics and news |
//! | `prices` | Price table, metrics and statistics only |
//! | `news` | Latest news per ticker |
//! | `info` | Name/exchange/currency snapshot per ticker |
//! | `suggest` | Suggested tickers |
//! | `session` | Interactive loop over stdin |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use the offline provider |
//! | `--timeout-ms` | config | Per-request timeout in ms |
//! | `--cache` | `use` | Cache behavior (use, refresh, bypass) |
//!
//! # Examples
//!
//! ```bash
//! stocktrack dashboard --tickers "AAPL, NVDA" --start 2024-01-01 --end 2024-06-30
//! stocktrack news --tickers TSLA --limit 3 --format json --pretty
//! stocktrack --mock session
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use stocktrack_core::{CacheMode, DEFAULT_TICKER_INPUT};

/// Stock price and news dashboard for the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stocktrack",
    author,
    version,
    about = "Stock price and news dashboard",
    long_about = "stocktrack fetches daily prices and recent news for a list of tickers \
and renders a price table, per-ticker metrics, performance statistics and a news feed.\n\
\n\
Settings are read from STOCKTRACK_* environment variables (a .env file is loaded \
if present). Flags override the environment."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve deterministic offline data instead of calling the provider.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Per-request timeout in milliseconds (overrides STOCKTRACK_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Cache behavior for provider calls.
    #[arg(long, global = true, value_enum, default_value_t = CacheArg::Use)]
    pub cache: CacheArg,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text tables for terminal display.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheArg {
    /// Serve fresh cached results, fetch on miss.
    Use,
    /// Always fetch, then store.
    Refresh,
    /// Always fetch, never store.
    Bypass,
}

impl From<CacheArg> for CacheMode {
    fn from(value: CacheArg) -> Self {
        match value {
            CacheArg::Use => Self::Use,
            CacheArg::Refresh => Self::Refresh,
            CacheArg::Bypass => Self::Bypass,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full report: price table, metrics, statistics and news.
    ///
    /// # Examples
    ///
    ///   stocktrack dashboard
    ///   stocktrack dashboard --tickers "AAPL, MSFT" --start 2024-01-01
    Dashboard(DashboardArgs),

    /// Price table, current metrics and performance statistics.
    Prices(PricesArgs),

    /// Latest news articles per ticker.
    ///
    /// # Examples
    ///
    ///   stocktrack news --tickers "TSLA, NVDA" --limit 3
    News(NewsArgs),

    /// Ticker name, exchange, currency and 52-week range.
    Info(InfoArgs),

    /// List suggested tickers.
    Suggest,

    /// Interactive dashboard over stdin.
    ///
    /// Each line is a comma-separated ticker list. `:range START END` changes
    /// the date range, `:refresh` clears the cache and re-renders, `:quit`
    /// exits.
    Session(SessionArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// First day of the range (YYYY-MM-DD). Defaults to 365 days before the end.
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the range (YYYY-MM-DD), inclusive. Defaults to today.
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Comma-separated ticker symbols.
    #[arg(long, default_value = DEFAULT_TICKER_INPUT)]
    pub tickers: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Articles per ticker (overrides STOCKTRACK_NEWS_LIMIT).
    #[arg(long)]
    pub news_limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    /// Comma-separated ticker symbols.
    #[arg(long, default_value = DEFAULT_TICKER_INPUT)]
    pub tickers: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Comma-separated ticker symbols.
    #[arg(long, default_value = DEFAULT_TICKER_INPUT)]
    pub tickers: String,

    /// Articles per ticker (overrides STOCKTRACK_NEWS_LIMIT).
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Comma-separated ticker symbols.
    #[arg(long, default_value = DEFAULT_TICKER_INPUT)]
    pub tickers: String,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Articles per ticker (overrides STOCKTRACK_NEWS_LIMIT).
    #[arg(long)]
    pub news_limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stocktrack",
            "news",
            "--tickers",
            "tsla",
            "--format",
            "json",
            "--mock",
        ])
        .expect("parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.mock);
        match cli.command {
            Command::News(args) => assert_eq!(args.tickers, "tsla"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn dashboard_defaults_to_suggested_input() {
        let cli = Cli::try_parse_from(["stocktrack", "dashboard"]).expect("parse");
        match cli.command {
            Command::Dashboard(args) => {
                assert_eq!(args.tickers, DEFAULT_TICKER_INPUT);
                assert!(args.range.start.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
