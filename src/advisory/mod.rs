// =============================================================================
// Advisory Adapter — external judgment service
// =============================================================================
//
// Sends the computed statistics, technicals, and rule-based signal to an
// external advisory model (Anthropic Messages API) and normalizes the reply
// into the engine's signal vocabulary. Every failure mode (missing key,
// transport error, malformed reply) degrades to an "unavailable" outcome with
// zero conviction; the advisory path can never abort an analysis.

pub mod client;
pub mod prompt;

pub use client::AdvisoryClient;

use serde::Serialize;

use crate::types::Direction;

/// Normalized advisory judgment. `signal = None` means the service produced
/// no usable direction (unavailable or unparseable).
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryOutcome {
    pub signal: Option<Direction>,
    pub conviction: i64,
    pub recommendation: String,
    pub risk_factors: Vec<String>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub parse_error: bool,
}

impl AdvisoryOutcome {
    /// Degraded outcome used for every failure mode.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            signal: None,
            conviction: 0,
            recommendation: reason.into(),
            risk_factors: Vec::new(),
            available: false,
            model_used: None,
            parse_error: false,
        }
    }
}

/// Map a raw signal string to the engine vocabulary. The legacy BUY/SELL
/// wording maps to FAVOR_A/FAVOR_B; anything unrecognized is NEUTRAL.
pub fn normalize_signal(raw: &str) -> Direction {
    match raw.trim().to_uppercase().as_str() {
        "FAVOR_A" | "BUY" => Direction::FavorA,
        "FAVOR_B" | "SELL" => Direction::FavorB,
        _ => Direction::Neutral,
    }
}

/// Normalize a raw conviction value: legacy 1-5 scale responses are scaled
/// by x20, then clamped to [1, 100].
pub fn normalize_conviction(raw: i64) -> i64 {
    let scaled = if (1..=5).contains(&raw) { raw * 20 } else { raw };
    scaled.clamp(1, 100)
}

/// Pull the JSON object out of a model reply that may be wrapped in code
/// fences or surrounding prose.
pub fn extract_json(text: &str) -> &str {
    if text.contains("```") {
        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if end > start {
                return &text[start..=end];
            }
        }
    }
    text
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_buy_sell_vocabulary() {
        assert_eq!(normalize_signal("BUY"), Direction::FavorA);
        assert_eq!(normalize_signal("SELL"), Direction::FavorB);
        assert_eq!(normalize_signal("buy"), Direction::FavorA);
    }

    #[test]
    fn modern_vocabulary_passes_through() {
        assert_eq!(normalize_signal("FAVOR_A"), Direction::FavorA);
        assert_eq!(normalize_signal("FAVOR_B"), Direction::FavorB);
        assert_eq!(normalize_signal("NEUTRAL"), Direction::Neutral);
    }

    #[test]
    fn unknown_signal_is_neutral() {
        assert_eq!(normalize_signal("HODL"), Direction::Neutral);
        assert_eq!(normalize_signal(""), Direction::Neutral);
    }

    #[test]
    fn legacy_scale_is_multiplied() {
        assert_eq!(normalize_conviction(1), 20);
        assert_eq!(normalize_conviction(3), 60);
        assert_eq!(normalize_conviction(5), 100);
    }

    #[test]
    fn modern_scale_is_clamped() {
        assert_eq!(normalize_conviction(72), 72);
        assert_eq!(normalize_conviction(0), 1);
        assert_eq!(normalize_conviction(150), 100);
        assert_eq!(normalize_conviction(-3), 1);
    }

    #[test]
    fn extract_json_strips_fences() {
        let text = "Here you go:\n```json\n{\"signal\": \"FAVOR_A\"}\n```";
        assert_eq!(extract_json(text), "{\"signal\": \"FAVOR_A\"}");
    }

    #[test]
    fn extract_json_leaves_bare_objects_alone() {
        let text = "{\"signal\": \"NEUTRAL\"}";
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn unavailable_outcome_shape() {
        let out = AdvisoryOutcome::unavailable("no key");
        assert_eq!(out.conviction, 0);
        assert!(!out.available);
        assert!(out.signal.is_none());
        assert!(out.risk_factors.is_empty());
    }

    #[test]
    fn parse_error_flag_omitted_when_false() {
        let out = AdvisoryOutcome::unavailable("x");
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("parse_error"));
        assert!(!json.contains("model_used"));
    }
}
