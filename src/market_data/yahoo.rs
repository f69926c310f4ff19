// =============================================================================
// Yahoo Finance REST Client — daily history, validation, symbol search
// =============================================================================
//
// Uses the public v8 chart endpoint for history and the v1 search endpoint
// for symbol lookup. Yahoo rejects requests without a browser-like
// User-Agent, so one is installed as a default header. All request plumbing
// failures map to `MarketDataError::Upstream`; an empty or error-bearing
// chart payload maps to `TickerNotFound`.
// =============================================================================

use chrono::DateTime;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::MarketDataError;
use crate::market_data::{align_pair, AlignedPair, DailyHistory, TickerInfo, TickerMatch};
use crate::types::Lookback;

/// Maximum hits returned by a symbol search.
const SEARCH_MAX_RESULTS: usize = 8;

/// Yahoo Finance HTTP client.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

// --- Chart endpoint payload --------------------------------------------------

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Deserialize)]
struct ChartMeta {
    symbol: String,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
}

#[derive(Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

// --- Search endpoint payload -------------------------------------------------

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Deserialize)]
struct SearchQuote {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    longname: Option<String>,
    #[serde(default)]
    exchange: String,
    #[serde(rename = "quoteType", default)]
    quote_type: String,
}

impl YahooClient {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (compatible; pairlens/1.0)"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    /// Fetch daily close history for one symbol over the given range string
    /// (e.g. "1y", "5d").
    #[instrument(skip(self), name = "yahoo::history")]
    pub async fn history(&self, symbol: &str, range: &str) -> Result<DailyHistory, MarketDataError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, symbol, range
        );

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::TickerNotFound(symbol.to_string()));
        }
        let payload: ChartResponse = response.json().await?;

        let result = match payload.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) {
            Some(r) => r,
            None => {
                debug!(symbol, error = ?payload.chart.error, "chart returned no result");
                return Err(MarketDataError::TickerNotFound(symbol.to_string()));
            }
        };

        let timestamps = result.timestamp.unwrap_or_default();
        let closes_raw = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .unwrap_or_default();

        let mut dates = Vec::with_capacity(timestamps.len());
        let mut closes = Vec::with_capacity(timestamps.len());
        for (ts, close) in timestamps.iter().zip(closes_raw.iter()) {
            if let Some(c) = close {
                if c.is_finite() {
                    if let Some(dt) = DateTime::from_timestamp(*ts, 0) {
                        dates.push(dt.date_naive());
                        closes.push(*c);
                    }
                }
            }
        }

        if dates.is_empty() {
            return Err(MarketDataError::TickerNotFound(symbol.to_string()));
        }

        let name = result
            .meta
            .short_name
            .or(result.meta.long_name)
            .unwrap_or_else(|| result.meta.symbol.clone());

        debug!(symbol, days = dates.len(), "history fetched");

        Ok(DailyHistory {
            symbol: result.meta.symbol,
            name,
            dates,
            closes,
        })
    }

    /// Fetch and align close histories for a pair of symbols. The two fetches
    /// run concurrently; missing tickers are reported together when both
    /// fail.
    #[instrument(skip(self), name = "yahoo::fetch_pair")]
    pub async fn fetch_pair(
        &self,
        ticker_a: &str,
        ticker_b: &str,
        lookback: Lookback,
    ) -> Result<AlignedPair, MarketDataError> {
        let (res_a, res_b) = tokio::join!(
            self.history(ticker_a, lookback.as_range()),
            self.history(ticker_b, lookback.as_range())
        );

        let (hist_a, hist_b) = match (res_a, res_b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(MarketDataError::TickerNotFound(_)), Err(MarketDataError::TickerNotFound(_))) => {
                return Err(MarketDataError::TickerNotFound(format!(
                    "{ticker_a}, {ticker_b}"
                )));
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };

        align_pair(&hist_a, &hist_b, lookback)
    }

    // -------------------------------------------------------------------------
    // Validation & search
    // -------------------------------------------------------------------------

    /// Check that a ticker exists; returns its name and latest close.
    #[instrument(skip(self), name = "yahoo::validate")]
    pub async fn validate(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
        let history = self.history(symbol, "5d").await?;
        let last_price = history
            .closes
            .last()
            .copied()
            .ok_or_else(|| MarketDataError::TickerNotFound(symbol.to_string()))?;

        Ok(TickerInfo {
            symbol: history.symbol,
            name: history.name,
            last_price: crate::series::round_dp(last_price, 2),
        })
    }

    /// Free-text symbol search.
    #[instrument(skip(self), name = "yahoo::search")]
    pub async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, MarketDataError> {
        let url = format!(
            "{}/v1/finance/search?q={}&quotesCount={}&newsCount=0",
            self.base_url,
            urlencode(query),
            SEARCH_MAX_RESULTS
        );

        let payload: SearchResponse = self.client.get(&url).send().await?.json().await?;

        Ok(payload
            .quotes
            .into_iter()
            .filter(|q| !q.symbol.is_empty())
            .take(SEARCH_MAX_RESULTS)
            .map(|q| TickerMatch {
                name: q
                    .shortname
                    .or(q.longname)
                    .unwrap_or_default(),
                symbol: q.symbol,
                exchange: q.exchange,
                quote_type: q.quote_type,
            })
            .collect())
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal percent-encoding for query strings: everything outside the
/// unreserved set is escaped.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
