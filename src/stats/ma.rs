// =============================================================================
// Ratio Moving Averages
// =============================================================================
//
// Short (50d) and long (200d) simple moving averages on the price ratio.
// The above/below flags are tri-state: `Some(true)` strictly above,
// `Some(false)` strictly below, `None` when either side is missing or when
// the ratio sits exactly on the average (an exact tie carries no directional
// information).
// =============================================================================

use crate::series::{last_finite, round_dp};
use crate::stats::rolling::rolling_mean;

/// Moving-average summary for the ratio series.
#[derive(Debug, Clone)]
pub struct RatioMaInfo {
    /// Full-length short-window MA series (NaN warm-up prefix).
    pub ma_short_series: Vec<f64>,
    /// Full-length long-window MA series.
    pub ma_long_series: Vec<f64>,
    /// Latest defined ratio value, rounded to 4 dp.
    pub current_ratio: Option<f64>,
    /// Latest defined short MA, rounded to 4 dp.
    pub ma_short: Option<f64>,
    /// Latest defined long MA, rounded to 4 dp.
    pub ma_long: Option<f64>,
    pub above_ma_short: Option<bool>,
    pub above_ma_long: Option<bool>,
}

/// Compute the short/long moving averages on the ratio and the tri-state
/// position flags.
pub fn ratio_ma(ratio: &[f64], short_window: usize, long_window: usize) -> RatioMaInfo {
    let ma_short_series = rolling_mean(ratio, short_window);
    let ma_long_series = rolling_mean(ratio, long_window);

    let current = last_finite(ratio);
    let cur_short = last_finite(&ma_short_series);
    let cur_long = last_finite(&ma_long_series);

    RatioMaInfo {
        above_ma_short: position_flag(current, cur_short),
        above_ma_long: position_flag(current, cur_long),
        current_ratio: current.map(|v| round_dp(v, 4)),
        ma_short: cur_short.map(|v| round_dp(v, 4)),
        ma_long: cur_long.map(|v| round_dp(v, 4)),
        ma_short_series,
        ma_long_series,
    }
}

fn position_flag(value: Option<f64>, ma: Option<f64>) -> Option<bool> {
    match (value, ma) {
        (Some(v), Some(m)) if v > m => Some(true),
        (Some(v), Some(m)) if v < m => Some(false),
        _ => None, // missing data, or an exact tie
    }
}
