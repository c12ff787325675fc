use std::process::ExitCode;

use stocktrack_core::{DashboardRequest, Sections};

use crate::cli::DashboardArgs;
use crate::error::CliError;
use crate::output;

use super::{report_exit_code, resolve_limit, resolve_range_today, Context};

pub async fn run(args: &DashboardArgs, context: &Context) -> Result<ExitCode, CliError> {
    let range = resolve_range_today(&args.range)?;
    let news_limit = resolve_limit(args.news_limit, &context.config)?;

    let request = DashboardRequest::new(args.tickers.as_str(), range)
        .with_news_limit(news_limit)
        .with_sections(Sections::FULL);
    let report = context.dashboard.render(&request).await;

    output::render_report(&report, context.format, context.pretty)?;
    Ok(report_exit_code(&report))
}
