// =============================================================================
// Conviction Fusion Engine
// =============================================================================
//
// Blends the statistical signal, the technical confirmation, and the advisory
// judgment into one final direction and a 0-100 conviction score.
//
// The score is computed from the winning direction's perspective over a fixed
// ten-criterion rubric, 0-10 points each:
//
//   Statistical (40): 50d MA distance, 200d MA distance, momentum ROC,
//                     return differential
//   Technical  (30): RSI deviation from 50, MACD histogram magnitude,
//                     technical favor-count share
//   Context    (30): correlation strength, Hurst persistence,
//                     technical-direction alignment bonus
//
// Each criterion is asymmetric: alignment earns a base credit plus a capped
// magnitude bonus; the wrong side earns a small closeness consolation only
// when the deviation is tiny. Two pairs with the same directional call can
// therefore land on materially different convictions.
//
// Direction resolution: the statistical signal wins when non-neutral, the
// advisory direction is the fallback, and NEUTRAL forces the conviction to
// exactly 0. With a nonzero advisory conviction the final score is
// round(statPct * 0.6 + advisory * 0.4); otherwise statPct alone. Clamped to
// [1, 100] except for the NEUTRAL override.
// =============================================================================

use serde::Serialize;

use crate::advisory::AdvisoryOutcome;
use crate::analysis::StatisticsSummary;
use crate::indicators::TechnicalConfirmation;
use crate::series::round_dp;
use crate::types::{Direction, TechDirection, TrendDirection};

/// Final fused conviction record, with component sub-scores retained for
/// audit.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedConviction {
    pub direction: Direction,
    pub conviction: i64,
    pub stat_score: f64,
    pub stat_pct: i64,
    pub stat_max: i64,
    pub tech_confirms: bool,
    pub ai_conviction: i64,
}

/// Fuse all three signal families into the final conviction record.
pub fn combine(
    stat_direction: Direction,
    stats: &StatisticsSummary,
    tech: &TechnicalConfirmation,
    advisory: &AdvisoryOutcome,
) -> CombinedConviction {
    let final_direction = if stat_direction != Direction::Neutral {
        stat_direction
    } else {
        match advisory.signal {
            Some(d) if d != Direction::Neutral => d,
            _ => Direction::Neutral,
        }
    };

    let stat_score = if final_direction != Direction::Neutral {
        score_for_direction(final_direction == Direction::FavorA, stats, tech)
    } else {
        0.0
    };

    let tech_confirms = matches!(
        (final_direction, tech.direction),
        (Direction::FavorA, TechDirection::FavorsA) | (Direction::FavorB, TechDirection::FavorsB)
    );

    let stat_pct = stat_score.round() as i64;
    let ai_conviction = advisory.conviction;

    let mut conviction = if ai_conviction > 0 {
        (stat_pct as f64 * 0.6 + ai_conviction as f64 * 0.4).round() as i64
    } else {
        stat_pct
    };
    conviction = conviction.clamp(1, 100);
    if final_direction == Direction::Neutral {
        conviction = 0;
    }

    CombinedConviction {
        direction: final_direction,
        conviction,
        stat_score,
        stat_pct,
        stat_max: 100,
        tech_confirms,
        ai_conviction,
    }
}

/// Score the ten rubric criteria from one direction's perspective (100 max).
fn score_for_direction(
    favor_a: bool,
    stats: &StatisticsSummary,
    tech: &TechnicalConfirmation,
) -> f64 {
    let mut score = 0.0_f64;

    // --- Statistical (4 x 10 = 40 pts) ---------------------------------------

    // 1. 50d MA distance: aligned = base 5 plus up to 5 for distance; the
    //    wrong side gets a small closeness consolation.
    if let (Some(ratio), Some(ma)) = (stats.current_ratio, stats.ratio_ma_50) {
        if ma != 0.0 {
            let pct = (ratio - ma) / ma * 100.0;
            if favor_a && pct > 0.0 || !favor_a && pct < 0.0 {
                score += 10f64.min(5.0 + (pct.abs() * 2.0).min(5.0));
            } else {
                score += (2.0 - pct.abs()).max(0.0);
            }
        }
    }

    // 2. 200d MA distance: same shape, gentler magnitude multiplier for the
    //    slower average.
    if let (Some(ratio), Some(ma)) = (stats.current_ratio, stats.ratio_ma_200) {
        if ma != 0.0 {
            let pct = (ratio - ma) / ma * 100.0;
            if favor_a && pct > 0.0 || !favor_a && pct < 0.0 {
                score += 10f64.min(5.0 + (pct.abs() * 1.5).min(5.0));
            } else {
                score += (2.0 - pct.abs()).max(0.0);
            }
        }
    }

    // 3. Momentum ROC: direction match plus magnitude; a flat reading gets
    //    slight ambiguity credit.
    let roc = stats.momentum_roc;
    if favor_a && roc > 0.0 || !favor_a && roc < 0.0 {
        score += 10f64.min(4.0 + (roc.abs() * 1.5).min(6.0));
    } else if stats.momentum_direction == TrendDirection::Flat {
        score += 2.0;
    }

    // 4. Return differential: shortest period with data.
    if let Some(diff) = stats.relative_returns.first_differential() {
        if favor_a && diff > 0.0 || !favor_a && diff < 0.0 {
            score += 10f64.min(3.0 + (diff.abs() * 0.7).min(7.0));
        }
    }

    // --- Technical (3 x 10 = 30 pts) -----------------------------------------

    // 5. RSI deviation from 50.
    let rsi_dev = tech.rsi_value - 50.0;
    if favor_a && rsi_dev > 0.0 || !favor_a && rsi_dev < 0.0 {
        score += 10f64.min(3.0 + (rsi_dev.abs() * 0.4).min(7.0));
    } else if rsi_dev.abs() < 5.0 {
        score += 2.0;
    }

    // 6. MACD histogram sign + magnitude (ratio-scale values are tiny, hence
    //    the x50).
    let hist = tech.macd_hist;
    if favor_a && hist > 0.0 || !favor_a && hist < 0.0 {
        score += 10f64.min(5.0 + (hist.abs() * 50.0).min(5.0));
    }

    // 7. Share of the technical favor counts.
    let fa = tech.favors_a_count;
    let fb = tech.favors_b_count;
    let total = if fa + fb > 0.0 { fa + fb } else { 1.0 };
    if favor_a && fa > fb {
        score += 10f64.min(fa / total * 10.0);
    } else if !favor_a && fb > fa {
        score += 10f64.min(fb / total * 10.0);
    } else if fa == fb && fa > 0.0 {
        score += 3.0;
    }

    // --- Context (3 x 10 = 30 pts) -------------------------------------------

    // 8. Correlation: a tighter pair makes the ratio signal more meaningful.
    let corr = stats.correlation.unwrap_or(0.0);
    if corr.is_finite() {
        score += 10f64.min(corr.abs() * 10.0);
    }

    // 9. Hurst persistence: above 0.5 scales to 10 at H = 1; below 0.5 keeps
    //    some credit for being near the random-walk boundary.
    if let Some(h) = stats.hurst_exponent {
        if h > 0.5 {
            score += 10f64.min((h - 0.5) * 20.0);
        } else {
            score += (h * 4.0).max(0.0);
        }
    }

    // 10. Technical direction alignment: hard bonus.
    let target = if favor_a {
        TechDirection::FavorsA
    } else {
        TechDirection::FavorsB
    };
    if tech.direction == target {
        score += 10.0;
    } else if tech.direction == TechDirection::Neutral {
        score += 3.0;
    }

    round_dp(score, 1)
}
