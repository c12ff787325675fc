use std::process::ExitCode;

use stocktrack_core::{today_utc, DashboardRequest, DateRange, Sections};

use crate::cli::InfoArgs;
use crate::error::CliError;
use crate::output;

use super::{report_exit_code, Context};

pub async fn run(args: &InfoArgs, context: &Context) -> Result<ExitCode, CliError> {
    let request = DashboardRequest::new(args.tickers.as_str(), DateRange::default_ending(today_utc()))
        .with_sections(Sections::INFO);
    let report = context.dashboard.render(&request).await;

    output::render_report(&report, context.format, context.pretty)?;
    Ok(report_exit_code(&report))
}
