//! Price aggregation: the multi-ticker close table and per-ticker summaries.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::serde_iso_date;
use crate::{PriceSeries, Ticker};

/// One date of a [`PriceTable`]; `closes[i]` belongs to `columns[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(with = "serde_iso_date")]
    pub date: Date,
    pub closes: Vec<Option<f64>>,
}

/// Date-indexed close prices, one column per ticker.
///
/// Dates missing from a ticker's series are `None`; gaps are never filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    columns: Vec<Ticker>,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn columns(&self) -> &[Ticker] {
        &self.columns
    }

    /// Rows in ascending date order.
    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// True when no ticker contributed a column.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, ticker: &Ticker) -> Option<usize> {
        self.columns.iter().position(|column| column == ticker)
    }

    pub fn value(&self, date: Date, ticker: &Ticker) -> Option<f64> {
        let index = self.column_index(ticker)?;
        self.rows
            .binary_search_by(|row| row.date.cmp(&date))
            .ok()
            .and_then(|row| self.rows[row].closes[index])
    }
}

/// Outer-join the close column of every ticker with a present series.
///
/// Columns follow `tickers` order. Tickers without a series are skipped; a
/// ticker listed twice contributes one column, at its first position.
pub fn build_price_table(
    tickers: &[Ticker],
    series_by_ticker: &HashMap<Ticker, Arc<PriceSeries>>,
) -> PriceTable {
    let mut columns: Vec<Ticker> = Vec::new();
    let mut rows: BTreeMap<Date, Vec<Option<f64>>> = BTreeMap::new();

    for ticker in tickers {
        if columns.contains(ticker) {
            continue;
        }
        let Some(series) = series_by_ticker.get(ticker) else {
            continue;
        };

        let index = columns.len();
        columns.push(ticker.clone());
        for closes in rows.values_mut() {
            closes.push(None);
        }
        for (date, close) in series.closes() {
            let closes = rows.entry(date).or_insert_with(|| vec![None; index + 1]);
            closes[index] = Some(close);
        }
    }

    PriceTable {
        columns,
        rows: rows
            .into_iter()
            .map(|(date, closes)| PriceRow { date, closes })
            .collect(),
    }
}

/// Sign of the move over the window; `Up` includes no change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Summary of one ticker's series over the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub ticker: Ticker,
    /// Close of the last row.
    pub current_price: f64,
    pub first_close: f64,
    /// Highest `high` in the window.
    pub period_high: f64,
    /// Lowest `low` in the window.
    pub period_low: f64,
    /// Arithmetic mean of closes.
    pub average_price: f64,
    /// `current_price - first_close`.
    pub price_change: f64,
    /// Percentage move from first to last close; `None` when the first
    /// close is zero.
    pub percent_change: Option<f64>,
    pub direction: Direction,
}

/// Summary statistics, or `None` for an absent or empty series.
pub fn compute_stats(ticker: &Ticker, series: Option<&PriceSeries>) -> Option<SummaryStats> {
    let series = series?;
    let first = series.first()?;
    let last = series.last()?;
    let bars = series.bars();

    let period_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let period_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let average_price = bars.iter().map(|b| b.close).sum::<f64>() / bars.len() as f64;

    let price_change = last.close - first.close;
    let percent_change = if first.close == 0.0 {
        None
    } else {
        Some(price_change * 100.0 / first.close)
    };

    Some(SummaryStats {
        ticker: ticker.clone(),
        current_price: last.close,
        first_close: first.close,
        period_high,
        period_low,
        average_price,
        price_change,
        percent_change,
        direction: if price_change >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;
    use time::macros::date;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).expect("valid ticker")
    }

    fn series(symbol: &str, rows: &[(Date, f64, f64, f64)]) -> PriceSeries {
        let bars = rows
            .iter()
            .map(|&(date, high, low, close)| {
                PriceBar::new(date, close, high, low, close, None).expect("valid bar")
            })
            .collect();
        PriceSeries::new(ticker(symbol), bars)
    }

    #[test]
    fn stats_over_several_rows() {
        let s = series(
            "AAPL",
            &[
                (date!(2024 - 01 - 02), 11.0, 9.0, 10.0),
                (date!(2024 - 01 - 03), 13.0, 10.0, 12.0),
                (date!(2024 - 01 - 04), 12.5, 7.5, 8.0),
            ],
        );

        let stats = compute_stats(&ticker("AAPL"), Some(&s)).expect("stats");
        assert_eq!(stats.current_price, 8.0);
        assert_eq!(stats.period_high, 13.0);
        assert_eq!(stats.period_low, 7.5);
        assert_eq!(stats.average_price, 10.0);
        assert_eq!(stats.price_change, -2.0);
        assert_eq!(stats.percent_change, Some(-20.0));
        assert_eq!(stats.direction, Direction::Down);
    }

    #[test]
    fn single_row_stats_equal_that_close() {
        let s = series("ONE", &[(date!(2024 - 01 - 02), 42.0, 42.0, 42.0)]);

        let stats = compute_stats(&ticker("ONE"), Some(&s)).expect("stats");
        assert_eq!(stats.current_price, 42.0);
        assert_eq!(stats.period_high, 42.0);
        assert_eq!(stats.period_low, 42.0);
        assert_eq!(stats.average_price, 42.0);
        assert_eq!(stats.percent_change, Some(0.0));
        assert!(compute_stats(&ticker("ONE"), None).is_none());
        let empty = PriceSeries::new(ticker("ONE"), Vec::new());
        assert!(compute_stats(&ticker("ONE"), Some(&empty)).is_none());
    }

    #[test]
    fn zero_first_close_has_no_percent_change() {
        let s = series(
            "PENNY",
            &[
                (date!(2024 - 01 - 02), 0.0, 0.0, 0.0),
                (date!(2024 - 01 - 03), 1.0, 0.5, 1.0),
            ],
        );

        let stats = compute_stats(&ticker("PENNY"), Some(&s)).expect("stats");
        assert_eq!(stats.percent_change, None);
        assert_eq!(stats.price_change, 1.0);
        assert_eq!(stats.direction, Direction::Up);
    }

    #[test]
    fn outer_join_leaves_gaps() {
        let a = series(
            "AAA",
            &[
                (date!(2024 - 01 - 02), 1.0, 1.0, 1.0),
                (date!(2024 - 01 - 03), 2.0, 2.0, 2.0),
            ],
        );
        let b = series(
            "BBB",
            &[
                (date!(2024 - 01 - 03), 5.0, 5.0, 5.0),
                (date!(2024 - 01 - 04), 6.0, 6.0, 6.0),
            ],
        );
        let map = HashMap::from([
            (ticker("AAA"), Arc::new(a)),
            (ticker("BBB"), Arc::new(b)),
        ]);

        let table = build_price_table(&[ticker("AAA"), ticker("BBB")], &map);

        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[0].closes, vec![Some(1.0), None]);
        assert_eq!(table.rows()[1].closes, vec![Some(2.0), Some(5.0)]);
        assert_eq!(table.rows()[2].closes, vec![None, Some(6.0)]);
        assert_eq!(table.value(date!(2024 - 01 - 04), &ticker("BBB")), Some(6.0));
        assert_eq!(table.value(date!(2024 - 01 - 04), &ticker("AAA")), None);
    }

    #[test]
    fn duplicate_tickers_share_one_column() {
        let a = series("AAA", &[(date!(2024 - 01 - 02), 1.0, 1.0, 1.0)]);
        let map = HashMap::from([(ticker("AAA"), Arc::new(a))]);

        let table = build_price_table(&[ticker("AAA"), ticker("AAA")], &map);
        assert_eq!(table.columns(), &[ticker("AAA")]);
    }

    #[test]
    fn repeated_aggregation_gives_identical_results() {
        let a = series(
            "AAA",
            &[
                (date!(2024 - 01 - 02), 1.5, 0.5, 1.0),
                (date!(2024 - 01 - 04), 3.0, 1.0, 2.0),
            ],
        );
        let b = series("BBB", &[(date!(2024 - 01 - 03), 5.0, 4.0, 4.5)]);
        let map = HashMap::from([
            (ticker("AAA"), Arc::new(a)),
            (ticker("BBB"), Arc::new(b)),
        ]);
        let tickers = [ticker("AAA"), ticker("BBB"), ticker("AAA"), ticker("MISSING")];

        let first = build_price_table(&tickers, &map);
        let second = build_price_table(&tickers, &map);
        assert_eq!(first, second);
        assert_eq!(first.rows()[1].closes, vec![None, Some(4.5)]);

        for t in &tickers {
            let series = map.get(t).map(|s| &**s);
            assert_eq!(compute_stats(t, series), compute_stats(t, series));
        }
    }

    #[test]
    fn no_present_series_gives_empty_table() {
        let table = build_price_table(&[ticker("AAA")], &HashMap::new());
        assert!(table.is_empty());
        assert!(table.rows().is_empty());
    }
}
