use std::process::ExitCode;

use stocktrack_core::{DashboardRequest, Sections};

use crate::cli::PricesArgs;
use crate::error::CliError;
use crate::output;

use super::{report_exit_code, resolve_range_today, Context};

pub async fn run(args: &PricesArgs, context: &Context) -> Result<ExitCode, CliError> {
    let range = resolve_range_today(&args.range)?;
    let request = DashboardRequest::new(args.tickers.as_str(), range).with_sections(Sections::PRICES);
    let report = context.dashboard.render(&request).await;

    output::render_report(&report, context.format, context.pretty)?;
    Ok(report_exit_code(&report))
}
