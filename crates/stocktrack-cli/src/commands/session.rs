use std::io::Write;
use std::process::ExitCode;

use stocktrack_core::{parse_date, today_utc, DashboardRequest, DateRange};
use time::Date;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::SessionArgs;
use crate::error::CliError;
use crate::output;

use super::{resolve_limit, resolve_range_today, Context};

const HELP: &str = "\
Enter comma-separated tickers (e.g. AAPL, MSFT) to render the dashboard.
  :range START END   change the date range (YYYY-MM-DD)
  :refresh           clear cached data and re-render
  :help              show this message
  :quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionInput {
    Tickers(String),
    Range { start: Date, end: Date },
    Refresh,
    Help,
    Quit,
    Blank,
}

fn parse_line(line: &str) -> Result<SessionInput, CliError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(SessionInput::Blank);
    }
    let Some(directive) = line.strip_prefix(':') else {
        return Ok(SessionInput::Tickers(line.to_owned()));
    };

    let mut parts = directive.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("quit" | "q" | "exit"), None, _, _) => Ok(SessionInput::Quit),
        (Some("refresh"), None, _, _) => Ok(SessionInput::Refresh),
        (Some("help"), None, _, _) => Ok(SessionInput::Help),
        (Some("range"), Some(start), Some(end), None) => Ok(SessionInput::Range {
            start: parse_date(start)?,
            end: parse_date(end)?,
        }),
        (Some("range"), ..) => Err(CliError::Command(String::from(
            "usage: :range START END",
        ))),
        _ => Err(CliError::Command(format!(
            "unknown directive ':{directive}' (try :help)"
        ))),
    }
}

pub async fn run(args: &SessionArgs, context: &Context) -> Result<ExitCode, CliError> {
    let mut range = resolve_range_today(&args.range)?;
    let news_limit = resolve_limit(args.news_limit, &context.config)?;
    let mut last_input: Option<String> = None;

    eprintln!("{HELP}");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let rerender = match parse_line(&line) {
            Ok(SessionInput::Quit) => break,
            Ok(SessionInput::Blank) => false,
            Ok(SessionInput::Help) => {
                eprintln!("{HELP}");
                false
            }
            Ok(SessionInput::Tickers(input)) => {
                last_input = Some(input);
                true
            }
            Ok(SessionInput::Refresh) => {
                context.dashboard.refresh().await;
                true
            }
            Ok(SessionInput::Range { start, end }) => {
                match DateRange::bounded(start, end, today_utc()) {
                    Ok(next) => {
                        range = next;
                        eprintln!("range set to {range}");
                        true
                    }
                    Err(error) => {
                        eprintln!("error: {error}");
                        false
                    }
                }
            }
            Err(error) => {
                eprintln!("error: {error}");
                false
            }
        };

        if rerender {
            if let Some(input) = &last_input {
                let request =
                    DashboardRequest::new(input.as_str(), range).with_news_limit(news_limit);
                let report = context.dashboard.render(&request).await;
                output::render_report(&report, context.format, context.pretty)?;
            }
        }
        prompt()?;
    }

    tracing::debug!(
        cached_entries = context.dashboard.fetcher().cached_entries().await,
        "session closed"
    );
    Ok(ExitCode::SUCCESS)
}

fn prompt() -> Result<(), CliError> {
    let mut stderr = std::io::stderr();
    write!(stderr, "> ")?;
    stderr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn plain_lines_are_ticker_input() {
        assert_eq!(
            parse_line("  aapl, msft ").expect("line"),
            SessionInput::Tickers(String::from("aapl, msft"))
        );
        assert_eq!(parse_line("   ").expect("line"), SessionInput::Blank);
    }

    #[test]
    fn directives_are_recognized() {
        assert_eq!(parse_line(":quit").expect("line"), SessionInput::Quit);
        assert_eq!(parse_line(":refresh").expect("line"), SessionInput::Refresh);
        assert_eq!(
            parse_line(":range 2024-01-01 2024-02-01").expect("line"),
            SessionInput::Range {
                start: date!(2024 - 01 - 01),
                end: date!(2024 - 02 - 01),
            }
        );
    }

    #[test]
    fn malformed_directives_are_errors() {
        assert!(parse_line(":range 2024-01-01").is_err());
        assert!(matches!(
            parse_line(":range 2024-13-01 2024-02-01"),
            Err(CliError::Validation(_))
        ));
        assert!(parse_line(":bogus").is_err());
    }
}
