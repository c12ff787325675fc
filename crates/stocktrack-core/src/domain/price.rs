use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use super::date_range::serde_iso_date;
use crate::{Ticker, ValidationError};

/// Daily OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(with = "serde_iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceBar {
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Chronological daily bars for one ticker.
///
/// Dates are unique and ascending; [`PriceSeries::new`] sorts its input and
/// lets a later bar replace an earlier one with the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: Ticker,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: Ticker, bars: Vec<PriceBar>) -> Self {
        let by_date: BTreeMap<Date, PriceBar> =
            bars.into_iter().map(|bar| (bar.date, bar)).collect();
        Self {
            ticker,
            bars: by_date.into_values().collect(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// `(date, close)` pairs in chronological order.
    pub fn closes(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.bars.iter().map(|bar| (bar.date, bar.close))
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
