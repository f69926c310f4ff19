// =============================================================================
// Error taxonomy for the analysis pipeline
// =============================================================================
//
// Failure domains are kept separate so each layer can degrade independently:
// a statistical-test failure must never abort the rest of the bundle, and a
// market-data failure must surface a human-readable reason to the API layer.
// =============================================================================

use thiserror::Error;

/// Errors from the core series / ratio computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("price series must be aligned to the same length (a={a}, b={b})")]
    Alignment { a: usize, b: usize },

    #[error("price series is empty")]
    EmptySeries,
}

/// Errors from the numerically fragile statistical tests (ADF, cointegration).
/// These are always caught at the orchestrator and degraded to an undefined
/// result carrying the diagnostic string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatTestError {
    #[error("too few observations: need at least {needed}, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    #[error("regression is degenerate: {0}")]
    Degenerate(String),
}

/// Errors from the market-data collaborator.
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No data returned for: {0}. Check that the ticker(s) are valid.")]
    TickerNotFound(String),

    #[error(
        "Not enough overlapping data for {ticker_a} and {ticker_b} over the selected period \
         (need at least {needed} trading days, got {got})."
    )]
    InsufficientOverlap {
        ticker_a: String,
        ticker_b: String,
        needed: usize,
        got: usize,
    },

    #[error("Error fetching data: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_error_message() {
        let err = AnalysisError::Alignment { a: 10, b: 12 };
        assert_eq!(
            err.to_string(),
            "price series must be aligned to the same length (a=10, b=12)"
        );
    }

    #[test]
    fn insufficient_overlap_message_names_both_tickers() {
        let err = MarketDataError::InsufficientOverlap {
            ticker_a: "AAPL".into(),
            ticker_b: "MSFT".into(),
            needed: 30,
            got: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("AAPL"));
        assert!(msg.contains("MSFT"));
        assert!(msg.contains("30"));
        assert!(msg.contains("12"));
    }
}
