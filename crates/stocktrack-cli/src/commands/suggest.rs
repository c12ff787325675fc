use std::process::ExitCode;

use serde::Serialize;
use stocktrack_core::SUGGESTED_TICKERS;

use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub ticker: &'static str,
    pub name: &'static str,
}

pub fn suggestions() -> Vec<Suggestion> {
    SUGGESTED_TICKERS
        .iter()
        .map(|&(ticker, name)| Suggestion { ticker, name })
        .collect()
}

pub fn run(context: &Context) -> Result<ExitCode, CliError> {
    output::render_suggestions(&suggestions(), context.format, context.pretty)?;
    Ok(ExitCode::SUCCESS)
}
