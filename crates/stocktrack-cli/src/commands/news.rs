use std::process::ExitCode;

use stocktrack_core::{today_utc, DashboardRequest, DateRange, Sections};

use crate::cli::NewsArgs;
use crate::error::CliError;
use crate::output;

use super::{report_exit_code, resolve_limit, Context};

pub async fn run(args: &NewsArgs, context: &Context) -> Result<ExitCode, CliError> {
    let limit = resolve_limit(args.limit, &context.config)?;

    // News is not date-bounded; the range only labels the report.
    let request = DashboardRequest::new(args.tickers.as_str(), DateRange::default_ending(today_utc()))
        .with_news_limit(limit)
        .with_sections(Sections::NEWS);
    let report = context.dashboard.render(&request).await;

    output::render_report(&report, context.format, context.pretty)?;
    Ok(report_exit_code(&report))
}
