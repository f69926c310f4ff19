// =============================================================================
// Market Data Module
// =============================================================================
//
// Historical daily close prices, ticker validation, and symbol search against
// the Yahoo Finance HTTP API. The alignment logic (inner join of two
// histories on trading dates) is pure and lives here so it can be tested
// without the network.

pub mod yahoo;

pub use yahoo::YahooClient;

use chrono::NaiveDate;

use crate::error::MarketDataError;
use crate::types::Lookback;

/// Daily close-price history for one symbol.
#[derive(Debug, Clone)]
pub struct DailyHistory {
    pub symbol: String,
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
}

/// Two histories joined on their common trading dates, ready for ratio
/// analysis. Invariant: `dates`, `closes_a`, and `closes_b` all have the same
/// length.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub symbol_a: String,
    pub symbol_b: String,
    pub dates: Vec<NaiveDate>,
    pub closes_a: Vec<f64>,
    pub closes_b: Vec<f64>,
}

/// Basic info returned by ticker validation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TickerInfo {
    pub symbol: String,
    pub name: String,
    pub last_price: f64,
}

/// One hit from the ticker search endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TickerMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub quote_type: String,
}

/// Inner-join two histories on their common dates and enforce the minimum
/// overlap for the chosen lookback.
pub fn align_pair(
    a: &DailyHistory,
    b: &DailyHistory,
    lookback: Lookback,
) -> Result<AlignedPair, MarketDataError> {
    let b_index: std::collections::HashMap<NaiveDate, f64> = b
        .dates
        .iter()
        .copied()
        .zip(b.closes.iter().copied())
        .collect();

    let mut dates = Vec::new();
    let mut closes_a = Vec::new();
    let mut closes_b = Vec::new();

    for (date, close_a) in a.dates.iter().zip(a.closes.iter()) {
        if let Some(&close_b) = b_index.get(date) {
            if close_a.is_finite() && close_b.is_finite() {
                dates.push(*date);
                closes_a.push(*close_a);
                closes_b.push(close_b);
            }
        }
    }

    let needed = lookback.min_trading_days();
    if dates.len() < needed {
        return Err(MarketDataError::InsufficientOverlap {
            ticker_a: a.symbol.clone(),
            ticker_b: b.symbol.clone(),
            needed,
            got: dates.len(),
        });
    }

    Ok(AlignedPair {
        symbol_a: a.symbol.clone(),
        symbol_b: b.symbol.clone(),
        dates,
        closes_a,
        closes_b,
    })
}
