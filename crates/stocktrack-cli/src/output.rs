use std::io::{self, Write};

use stocktrack_core::{
    format_date, DashboardReport, Direction, InfoEntry, NewsSection, NoticeLevel, PriceSection,
};

use crate::cli::OutputFormat;
use crate::commands::Suggestion;
use crate::error::CliError;

pub fn render_report(
    report: &DashboardReport,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = report.to_json(pretty)?;
            println!("{payload}");
        }
        OutputFormat::Table => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&mut out, report)?;
            out.flush()?;
        }
    }

    Ok(())
}

pub fn render_suggestions(
    suggestions: &[Suggestion],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(suggestions)?
            } else {
                serde_json::to_string(suggestions)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => {
            println!("Suggested well-performing stocks:");
            for suggestion in suggestions {
                println!("  {:<6} {}", suggestion.ticker, suggestion.name);
            }
        }
    }

    Ok(())
}

/// Plain-text rendering of a report, section by section.
pub fn write_report<W: Write>(out: &mut W, report: &DashboardReport) -> io::Result<()> {
    for notice in report
        .notices
        .iter()
        .filter(|notice| notice.ticker.is_none())
    {
        writeln!(out, "{}: {}", level_label(notice.level), notice.message)?;
    }
    if !report.has_tickers() {
        return Ok(());
    }

    if let Some(prices) = report.prices.as_ref().filter(|p| !p.table.is_empty()) {
        writeln!(out)?;
        write_prices(out, prices, report)?;
    }
    if let Some(news) = &report.news {
        writeln!(out)?;
        write_news(out, news)?;
    }
    if let Some(info) = &report.info {
        writeln!(out)?;
        write_info(out, info)?;
    }

    Ok(())
}

fn write_prices<W: Write>(
    out: &mut W,
    prices: &PriceSection,
    report: &DashboardReport,
) -> io::Result<()> {
    writeln!(out, "== Stock Price Over Time ({}) ==", report.range)?;
    let mut headers = vec![String::from("Date")];
    headers.extend(prices.table.columns().iter().map(ToString::to_string));
    let rows: Vec<Vec<String>> = prices
        .table
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![format_date(row.date)];
            cells.extend(row.closes.iter().map(|close| match close {
                Some(value) => format!("{value:.2}"),
                None => String::from("-"),
            }));
            cells
        })
        .collect();
    write_table(out, &headers, &rows)?;

    writeln!(out)?;
    writeln!(out, "== Current Stock Data ==")?;
    for metric in &prices.metrics {
        match &metric.stats {
            Some(stats) => writeln!(
                out,
                "  {:<8} {:>12} {:>10} ({})",
                metric.ticker.as_str(),
                money(stats.current_price),
                percent(stats.percent_change),
                match stats.direction {
                    Direction::Up => "up",
                    Direction::Down => "down",
                }
            )?,
            None => writeln!(
                out,
                "  {:<8} warning: Could not fetch data for {}",
                metric.ticker.as_str(),
                metric.ticker
            )?,
        }
    }

    writeln!(out)?;
    writeln!(out, "== Performance Statistics ==")?;
    let headers = [
        "Ticker",
        "Current Price",
        "Period High",
        "Period Low",
        "Average Price",
    ]
    .map(String::from);
    let rows: Vec<Vec<String>> = prices
        .stats()
        .map(|stats| {
            vec![
                stats.ticker.to_string(),
                money(stats.current_price),
                money(stats.period_high),
                money(stats.period_low),
                money(stats.average_price),
            ]
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn write_news<W: Write>(out: &mut W, news: &NewsSection) -> io::Result<()> {
    writeln!(out, "== Latest Stock News ==")?;
    for feed in &news.feeds {
        writeln!(out, "-- {} --", feed.ticker)?;
        if feed.articles.is_empty() {
            writeln!(
                out,
                "  No recent articles found for {}. Try refreshing again soon!",
                feed.ticker
            )?;
            continue;
        }
        for article in &feed.articles {
            writeln!(out, "  * {}", article.title)?;
            if let Some(href) = article.href() {
                writeln!(out, "    {href}")?;
            }
            writeln!(out, "    Source: {}", article.source)?;
        }
    }
    Ok(())
}

fn write_info<W: Write>(out: &mut W, entries: &[InfoEntry]) -> io::Result<()> {
    writeln!(out, "== Ticker Info ==")?;
    let headers = [
        "Ticker", "Name", "Exchange", "Currency", "Price", "52w High", "52w Low",
    ]
    .map(String::from);
    let dash = || String::from("-");
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| match &entry.info {
            Some(info) => vec![
                entry.ticker.to_string(),
                info.name.clone().unwrap_or_else(dash),
                info.exchange.clone().unwrap_or_else(dash),
                info.currency.clone().unwrap_or_else(dash),
                info.regular_market_price.map(money).unwrap_or_else(dash),
                info.fifty_two_week_high.map(money).unwrap_or_else(dash),
                info.fifty_two_week_low.map(money).unwrap_or_else(dash),
            ],
            None => {
                let mut row = vec![entry.ticker.to_string(), String::from("(unavailable)")];
                row.resize(headers.len(), dash());
                row
            }
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn write_table<W: Write>(out: &mut W, headers: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, headers, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

fn level_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    }
}

fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:+.2}%"),
        None => String::from("n/a"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stocktrack_core::{
        Dashboard, DashboardRequest, DataFetcher, DateRange, FetchTtls, YahooAdapter,
    };
    use time::macros::date;

    async fn render(input: &str) -> String {
        let fetcher = DataFetcher::new(Arc::new(YahooAdapter::default()), FetchTtls::default());
        let range = DateRange::new(date!(2024 - 02 - 05), date!(2024 - 02 - 09)).expect("range");
        let report = Dashboard::new(fetcher)
            .render(&DashboardRequest::new(input, range))
            .await;

        let mut buffer = Vec::new();
        write_report(&mut buffer, &report).expect("write");
        String::from_utf8(buffer).expect("utf8")
    }

    #[tokio::test]
    async fn table_output_has_every_section() {
        let text = render("AAPL, MSFT").await;
        assert!(text.contains("== Stock Price Over Time (2024-02-05..=2024-02-09) =="));
        assert!(text.contains("== Performance Statistics =="));
        assert!(text.contains("-- MSFT --"));
        assert!(text.contains("Source: "));
    }

    #[tokio::test]
    async fn empty_input_prints_only_the_prompt() {
        let text = render(" ").await;
        assert_eq!(text.trim(), "warning: Enter at least one stock ticker");
    }

    #[test]
    fn numbers_are_formatted_for_display() {
        assert_eq!(money(185.6449), "$185.64");
        assert_eq!(percent(Some(1.5)), "+1.50%");
        assert_eq!(percent(Some(-0.25)), "-0.25%");
        assert_eq!(percent(None), "n/a");
    }
}
