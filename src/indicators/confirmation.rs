// =============================================================================
// Technical Confirmation Classifier
// =============================================================================
//
// Deterministic rule scoring against the latest defined indicator values:
//
//   RSI   > 60 → +1 A    < 40 → +1 B    (50, 60] → +0.5 A    else → +0.5 B
//   MACD  histogram > 0 → +1 A    < 0 → +1 B    = 0 → nothing
//   Ratio ≥ upper band → +1 A    ≤ lower band → +1 B
//         otherwise only a descriptive note about the midline position
//
// FAVORS_A requires at least 2 points (so two full signals or one full plus
// two halves); same for FAVORS_B; anything weaker is NEUTRAL. The threshold
// is deliberately biased against ambiguous readings.
//
// Missing inputs fall back to neutral sentinels (RSI 50, histogram 0,
// ratio/bands 0) so the classifier always produces a verdict; the
// `inputs_complete` flag records whether any sentinel was used.
// =============================================================================

use serde::Serialize;

use crate::series::{last_finite, round_dp};
use crate::types::TechDirection;

/// Outcome of the confirmation classifier, retained verbatim in the response
/// for auditability.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalConfirmation {
    pub direction: TechDirection,
    pub favors_a_count: f64,
    pub favors_b_count: f64,
    pub signals: Vec<String>,
    /// Latest RSI (or the 50 sentinel), rounded to 1 dp.
    pub rsi_value: f64,
    /// Latest MACD histogram (or the 0 sentinel), rounded to 4 dp.
    pub macd_hist: f64,
    /// False when any input was missing and a neutral sentinel was used.
    pub inputs_complete: bool,
}

/// Classify the latest technical readings on the ratio.
pub fn technical_confirmation(
    rsi: &[f64],
    histogram: &[f64],
    ratio: &[f64],
    upper: &[f64],
    middle: &[f64],
    lower: &[f64],
) -> TechnicalConfirmation {
    let latest_rsi = last_finite(rsi);
    let latest_hist = last_finite(histogram);
    let latest_ratio = last_finite(ratio);
    let latest_upper = last_finite(upper);
    let latest_middle = last_finite(middle);
    let latest_lower = last_finite(lower);

    let inputs_complete = latest_rsi.is_some()
        && latest_hist.is_some()
        && latest_ratio.is_some()
        && latest_upper.is_some()
        && latest_lower.is_some();

    let rsi = latest_rsi.unwrap_or(50.0);
    let hist = latest_hist.unwrap_or(0.0);
    let ratio = latest_ratio.unwrap_or(0.0);
    let upper = latest_upper.unwrap_or(0.0);
    let middle = latest_middle.unwrap_or(0.0);
    let lower = latest_lower.unwrap_or(0.0);

    let mut favors_a = 0.0_f64;
    let mut favors_b = 0.0_f64;
    let mut signals = Vec::new();

    // --- RSI on ratio -------------------------------------------------------
    if rsi > 60.0 {
        favors_a += 1.0;
        signals.push(format!("Ratio RSI strong ({rsi:.0} > 60)"));
    } else if rsi < 40.0 {
        favors_b += 1.0;
        signals.push(format!("Ratio RSI weak ({rsi:.0} < 40)"));
    } else if rsi > 50.0 {
        favors_a += 0.5;
        signals.push(format!("Ratio RSI slightly bullish ({rsi:.0})"));
    } else {
        favors_b += 0.5;
        signals.push(format!("Ratio RSI slightly bearish ({rsi:.0})"));
    }

    // --- MACD histogram -----------------------------------------------------
    if hist > 0.0 {
        favors_a += 1.0;
        signals.push("MACD histogram positive (A momentum)".to_string());
    } else if hist < 0.0 {
        favors_b += 1.0;
        signals.push("MACD histogram negative (B momentum)".to_string());
    }

    // --- Bollinger Band position -------------------------------------------
    if ratio >= upper {
        favors_a += 1.0;
        signals.push("Ratio at/above upper Bollinger Band".to_string());
    } else if ratio <= lower {
        favors_b += 1.0;
        signals.push("Ratio at/below lower Bollinger Band".to_string());
    } else if ratio > middle {
        signals.push("Ratio above BB middle (leaning A)".to_string());
    } else {
        signals.push("Ratio below BB middle (leaning B)".to_string());
    }

    let direction = if favors_a >= 2.0 {
        TechDirection::FavorsA
    } else if favors_b >= 2.0 {
        TechDirection::FavorsB
    } else {
        TechDirection::Neutral
    };

    TechnicalConfirmation {
        direction,
        favors_a_count: round_dp(favors_a, 1),
        favors_b_count: round_dp(favors_b, 1),
        signals,
        rsi_value: round_dp(rsi, 1),
        macd_hist: round_dp(hist, 4),
        inputs_complete,
    }
}
