// =============================================================================
// Ratio Momentum — Rate of Change with regression-based direction
// =============================================================================
//
// ROC gives the magnitude of the move over the window; the *direction* is
// taken from the sign of an OLS slope fitted over the same trailing window.
// The slope is less sensitive to a single noisy print at the window boundary
// than the raw ROC sign, so the two are deliberately decoupled.
// =============================================================================

use crate::series::{last_finite, round_dp};
use crate::stats::rolling::ols_slope;
use crate::types::TrendDirection;

/// Minimum number of points required for a meaningful slope fit; below this
/// the slope defaults to 0 and the direction to FLAT.
const MIN_SLOPE_POINTS: usize = 5;

/// Momentum summary for the ratio series.
#[derive(Debug, Clone)]
pub struct MomentumInfo {
    /// Full-length ROC series aligned with the ratio (NaN warm-up prefix).
    pub roc_series: Vec<f64>,
    /// Most recent defined ROC value, rounded to 2 dp; 0.0 when none exists.
    pub current_roc: f64,
    /// OLS slope over the trailing window, rounded to 6 dp.
    pub slope: f64,
    /// Sign of the (unrounded) slope.
    pub direction: TrendDirection,
}

/// Rate of change on the price ratio: `(ratio[t] / ratio[t-window] - 1) * 100`,
/// with direction from a linear fit over the last `window` defined points.
pub fn ratio_momentum(ratio: &[f64], window: usize) -> MomentumInfo {
    let n = ratio.len();
    let mut roc_series = vec![f64::NAN; n];

    if window > 0 {
        for i in window..n {
            let prev = ratio[i - window];
            let cur = ratio[i];
            let roc = (cur / prev - 1.0) * 100.0;
            if roc.is_finite() {
                roc_series[i] = roc;
            }
        }
    }

    let current_roc = last_finite(&roc_series).map(|v| round_dp(v, 2)).unwrap_or(0.0);

    // Slope over the trailing `window` defined ratio values (or all of them
    // when fewer are available).
    let defined: Vec<f64> = ratio.iter().copied().filter(|v| v.is_finite()).collect();
    let recent = if defined.len() >= window {
        &defined[defined.len() - window..]
    } else {
        &defined[..]
    };

    let slope = if recent.len() >= MIN_SLOPE_POINTS {
        ols_slope(recent).unwrap_or(0.0)
    } else {
        0.0
    };

    let direction = if slope > 0.0 {
        TrendDirection::Up
    } else if slope < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    MomentumInfo {
        roc_series,
        current_roc,
        slope: round_dp(slope, 6),
        direction,
    }
}
