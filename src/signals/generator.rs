// =============================================================================
// Signal Generator — statistical + technical fusion (pre-advisory)
// =============================================================================
//
// Tallies five scored inputs into favor-A / favor-B counts:
//
//   1. Ratio vs short MA (tri-state)
//   2. Ratio vs long MA (tri-state)
//   3. Momentum direction (UP / DOWN / FLAT)
//   4. RSI on the ratio (> 60 → +1 A, < 40 → +1 B, else ±0.5)
//   5. MACD histogram sign
//
// Decision rule, evaluated in strict priority order:
//   favorA ≥ 3 and ahead  → FAVOR_A, strength = min(favorA / 5, 1)
//   favorB ≥ 3 and ahead  → FAVOR_B
//   favorA ≥ 2 and ahead  → FAVOR_A (weaker wording, same strength formula)
//   favorB ≥ 2 and ahead  → FAVOR_B
//   otherwise             → NEUTRAL, strength 0
//
// Z-score extremes are attached as descriptive context only; they never
// enter the tally.
// =============================================================================

use serde::Serialize;

use crate::indicators::TechnicalConfirmation;
use crate::series::{last_finite, round_dp};
use crate::stats::{MomentumInfo, RatioMaInfo};
use crate::types::{Direction, TrendDirection};

/// Maximum scored inputs: 2 MAs + momentum + RSI + MACD.
const MAX_INPUTS: f64 = 5.0;

/// The rule-based relative-performance signal.
#[derive(Debug, Clone, Serialize)]
pub struct SignalSummary {
    pub direction: Direction,
    pub current_zscore: f64,
    pub strength: f64,
    pub detail: String,
    pub favor_a_count: f64,
    pub favor_b_count: f64,
}

/// Fuse the moving-average position, momentum direction, and technical
/// confirmation readings into a directional signal with a strength score.
pub fn generate_signal(
    zscore: &[f64],
    momentum: &MomentumInfo,
    ma: &RatioMaInfo,
    tech: Option<&TechnicalConfirmation>,
    short_window: usize,
    long_window: usize,
) -> SignalSummary {
    let current_z = last_finite(zscore).unwrap_or(0.0);

    let mut favor_a = 0.0_f64;
    let mut favor_b = 0.0_f64;
    let mut details: Vec<String> = Vec::new();

    // --- 1 & 2. MA position -------------------------------------------------
    match ma.above_ma_short {
        Some(true) => {
            favor_a += 1.0;
            details.push(format!("Ratio above {short_window}d MA"));
        }
        Some(false) => {
            favor_b += 1.0;
            details.push(format!("Ratio below {short_window}d MA"));
        }
        None => {}
    }
    match ma.above_ma_long {
        Some(true) => {
            favor_a += 1.0;
            details.push(format!("Ratio above {long_window}d MA"));
        }
        Some(false) => {
            favor_b += 1.0;
            details.push(format!("Ratio below {long_window}d MA"));
        }
        None => {}
    }

    // --- 3. Momentum ----------------------------------------------------------
    match momentum.direction {
        TrendDirection::Up => {
            favor_a += 1.0;
            details.push("Momentum positive (ratio rising)".to_string());
        }
        TrendDirection::Down => {
            favor_b += 1.0;
            details.push("Momentum negative (ratio falling)".to_string());
        }
        TrendDirection::Flat => {}
    }

    // --- 4 & 5. RSI / MACD on the ratio --------------------------------------
    if let Some(tech) = tech {
        let rsi = tech.rsi_value;
        if rsi > 60.0 {
            favor_a += 1.0;
            details.push(format!("RSI strong at {rsi:.0} (favors A)"));
        } else if rsi < 40.0 {
            favor_b += 1.0;
            details.push(format!("RSI weak at {rsi:.0} (favors B)"));
        } else if rsi > 50.0 {
            favor_a += 0.5;
            details.push(format!("RSI leaning bullish ({rsi:.0})"));
        } else {
            favor_b += 0.5;
            details.push(format!("RSI leaning bearish ({rsi:.0})"));
        }

        if tech.macd_hist > 0.0 {
            favor_a += 1.0;
            details.push("MACD positive (A momentum)".to_string());
        } else if tech.macd_hist < 0.0 {
            favor_b += 1.0;
            details.push("MACD negative (B momentum)".to_string());
        }
    }

    // --- Z-score extremes: context only, never scored -------------------------
    if current_z > 1.5 {
        details.push("Ratio z-score elevated; A may be extended".to_string());
    } else if current_z < -1.5 {
        details.push("Ratio z-score depressed; B may be extended".to_string());
    }

    // --- Decision, in strict priority order -----------------------------------
    let joined = details.join("; ");
    let (direction, strength, detail) = if favor_a >= 3.0 && favor_a > favor_b {
        (
            Direction::FavorA,
            (favor_a / MAX_INPUTS).min(1.0),
            format!("A is outperforming B: {joined}"),
        )
    } else if favor_b >= 3.0 && favor_b > favor_a {
        (
            Direction::FavorB,
            (favor_b / MAX_INPUTS).min(1.0),
            format!("B is outperforming A: {joined}"),
        )
    } else if favor_a >= 2.0 && favor_a > favor_b {
        (
            Direction::FavorA,
            (favor_a / MAX_INPUTS).min(1.0),
            format!("A slightly outperforming B: {joined}"),
        )
    } else if favor_b >= 2.0 && favor_b > favor_a {
        (
            Direction::FavorB,
            (favor_b / MAX_INPUTS).min(1.0),
            format!("B slightly outperforming A: {joined}"),
        )
    } else if details.is_empty() {
        (
            Direction::Neutral,
            0.0,
            "Insufficient data for signal".to_string(),
        )
    } else {
        (
            Direction::Neutral,
            0.0,
            format!("No clear outperformance trend: {joined}"),
        )
    };

    SignalSummary {
        direction,
        current_zscore: round_dp(current_z, 4),
        strength: round_dp(strength, 2),
        detail,
        favor_a_count: round_dp(favor_a, 1),
        favor_b_count: round_dp(favor_b, 1),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TechDirection;

    fn ma_info(above_short: Option<bool>, above_long: Option<bool>) -> RatioMaInfo {
        RatioMaInfo {
            ma_short_series: vec![],
            ma_long_series: vec![],
            current_ratio: Some(1.0),
            ma_short: Some(1.0),
            ma_long: Some(1.0),
            above_ma_short: above_short,
            above_ma_long: above_long,
        }
    }

    fn momentum(direction: TrendDirection) -> MomentumInfo {
        MomentumInfo {
            roc_series: vec![],
            current_roc: 0.0,
            slope: 0.0,
            direction,
        }
    }

    fn tech(rsi_value: f64, macd_hist: f64) -> TechnicalConfirmation {
        TechnicalConfirmation {
            direction: TechDirection::Neutral,
            favors_a_count: 0.0,
            favors_b_count: 0.0,
            signals: vec![],
            rsi_value,
            macd_hist,
            inputs_complete: true,
        }
    }

    #[test]
    fn three_for_a_two_for_b_is_favor_a() {
        // Both MAs above (+2 A), momentum UP (+1 A), RSI < 40 (+1 B),
        // MACD < 0 (+1 B).
        let t = tech(35.0, -0.01);
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Up),
            &ma_info(Some(true), Some(true)),
            Some(&t),
            50,
            200,
        );
        assert_eq!(signal.direction, Direction::FavorA);
        assert!((signal.favor_a_count - 3.0).abs() < 1e-9);
        assert!((signal.favor_b_count - 2.0).abs() < 1e-9);
        assert!((signal.strength - 0.6).abs() < 1e-9);
        assert!(signal.detail.starts_with("A is outperforming B"));
    }

    #[test]
    fn weaker_two_point_branch() {
        // One MA above (+1 A), RSI 55 (+0.5 A), momentum UP (+1 A) → 2.5,
        // below the ≥3 branch but past the ≥2 branch: weaker wording, same
        // strength formula.
        let t = tech(55.0, 0.0);
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Up),
            &ma_info(Some(true), None),
            Some(&t),
            50,
            200,
        );
        assert_eq!(signal.direction, Direction::FavorA);
        assert!((signal.favor_a_count - 2.5).abs() < 1e-9);
        assert!((signal.strength - 0.5).abs() < 1e-9);
        assert!(signal.detail.starts_with("A slightly outperforming B"));
    }

    #[test]
    fn mixed_tally_is_neutral() {
        // 1.5 vs 1.0: below every threshold.
        let t = tech(55.0, -0.01);
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Flat),
            &ma_info(Some(true), None),
            Some(&t),
            50,
            200,
        );
        assert_eq!(signal.direction, Direction::Neutral);
        assert!(signal.strength.abs() < 1e-9);
        assert!(signal.detail.starts_with("No clear outperformance trend"));
    }

    #[test]
    fn tied_tally_is_neutral() {
        // 2 vs 2: neither side is ahead.
        let t = tech(35.0, 0.01);
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Flat),
            &ma_info(Some(true), Some(false)),
            Some(&t),
            50,
            200,
        );
        assert!((signal.favor_a_count - 2.0).abs() < 1e-9);
        assert!((signal.favor_b_count - 2.0).abs() < 1e-9);
        assert_eq!(signal.direction, Direction::Neutral);
    }

    #[test]
    fn no_inputs_at_all() {
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Flat),
            &ma_info(None, None),
            None,
            50,
            200,
        );
        assert_eq!(signal.direction, Direction::Neutral);
        assert_eq!(signal.detail, "Insufficient data for signal");
        assert!(signal.favor_a_count.abs() < 1e-9);
        assert!(signal.favor_b_count.abs() < 1e-9);
    }

    #[test]
    fn strength_caps_at_one() {
        // Everything favors B: 2 MAs + momentum + RSI + MACD = 5 → 5/5 = 1.0.
        let t = tech(30.0, -0.05);
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Down),
            &ma_info(Some(false), Some(false)),
            Some(&t),
            50,
            200,
        );
        assert_eq!(signal.direction, Direction::FavorB);
        assert!((signal.strength - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zscore_extreme_is_context_only() {
        let z = vec![f64::NAN, 2.0];
        let t = tech(55.0, 0.0);
        let signal = generate_signal(
            &z,
            &momentum(TrendDirection::Flat),
            &ma_info(None, None),
            Some(&t),
            50,
            200,
        );
        // Only the RSI half point was scored; the z-score line is narrative.
        assert!((signal.favor_a_count - 0.5).abs() < 1e-9);
        assert_eq!(signal.direction, Direction::Neutral);
        assert!(signal.detail.contains("z-score elevated"));
        assert!((signal.current_zscore - 2.0).abs() < 1e-9);
    }

    #[test]
    fn constant_ratio_scenario_is_neutral() {
        // A constant ratio: MA ties are undefined, momentum FLAT, RSI falls
        // back to the neutral sentinel. Only the 0.5 RSI lean remains.
        let t = tech(50.0, 0.0);
        let signal = generate_signal(
            &[],
            &momentum(TrendDirection::Flat),
            &ma_info(None, None),
            Some(&t),
            50,
            200,
        );
        assert_eq!(signal.direction, Direction::Neutral);
        assert!(signal.strength.abs() < 1e-9);
    }
}
