use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Descriptive snapshot for a ticker taken from the provider's chart metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: Ticker,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}
