// =============================================================================
// Hurst Exponent — Rescaled Range (R/S) Analysis
// =============================================================================
//
// The Hurst exponent H characterises the long-term memory of the ratio:
//
//   H > 0.5  =>  trending / persistent (outperformance tends to continue)
//   H ~ 0.5  =>  random walk
//   H < 0.5  =>  mean-reverting / anti-persistent
//
// Algorithm:
//   1. Drop undefined entries.
//   2. For each lag k in 2..min(n/2, 100):
//      a. Split the series into non-overlapping windows of length k.
//      b. For each window compute the R/S statistic: range of the cumulative
//         mean-deviation sum divided by the window's sample standard
//         deviation (windows with zero deviation carry no information and
//         are skipped).
//      c. Average R/S across the windows of this lag.
//   3. Regress log(mean R/S) on log(lag); the slope is the Hurst exponent.
//
// Requires at least 20 usable points and at least 5 valid (lag, mean R/S)
// pairs; otherwise the estimate is undefined.
// =============================================================================

use tracing::trace;

use crate::series::round_dp;
use crate::stats::rolling::sample_std;

/// Minimum number of defined data points required for the analysis.
const MIN_POINTS: usize = 20;

/// Minimum number of valid (lag, mean R/S) pairs for the log-log regression.
const MIN_RS_PAIRS: usize = 5;

/// Largest lag ever considered, regardless of series length.
const MAX_LAG_CAP: usize = 100;

/// Estimate the Hurst exponent of `series` via rescaled-range analysis.
///
/// Returns `None` when there is not enough usable data for a trustworthy
/// estimate. The result is rounded to 4 decimal places.
pub fn hurst_exponent(series: &[f64]) -> Option<f64> {
    let ts: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    let n = ts.len();
    if n < MIN_POINTS {
        trace!(len = n, min = MIN_POINTS, "Hurst: insufficient data");
        return None;
    }

    let max_lag = (n / 2).min(MAX_LAG_CAP);
    let mut log_lag: Vec<f64> = Vec::new();
    let mut log_rs: Vec<f64> = Vec::new();

    for lag in 2..max_lag {
        let n_windows = n / lag;
        if n_windows == 0 {
            break;
        }

        let mut rs_sum = 0.0_f64;
        let mut valid = 0_usize;

        for w in 0..n_windows {
            let chunk = &ts[w * lag..(w + 1) * lag];

            let mean = chunk.iter().sum::<f64>() / lag as f64;

            let mut running = 0.0_f64;
            let mut max_dev = f64::NEG_INFINITY;
            let mut min_dev = f64::INFINITY;
            for &val in chunk {
                running += val - mean;
                max_dev = max_dev.max(running);
                min_dev = min_dev.min(running);
            }
            let range = max_dev - min_dev;

            let std = sample_std(chunk);
            if !std.is_finite() || std <= 0.0 {
                continue; // Flat window — no information.
            }

            rs_sum += range / std;
            valid += 1;
        }

        if valid > 0 {
            let mean_rs = rs_sum / valid as f64;
            if mean_rs > 0.0 {
                log_lag.push((lag as f64).ln());
                log_rs.push(mean_rs.ln());
            }
        }
    }

    if log_lag.len() < MIN_RS_PAIRS {
        trace!(
            pairs = log_lag.len(),
            "Hurst: too few valid lags for regression"
        );
        return None;
    }

    // OLS slope of log(mean R/S) against log(lag).
    let m = log_lag.len() as f64;
    let x_mean = log_lag.iter().sum::<f64>() / m;
    let y_mean = log_rs.iter().sum::<f64>() / m;

    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;
    for i in 0..log_lag.len() {
        let dx = log_lag[i] - x_mean;
        numerator += dx * (log_rs[i] - y_mean);
        denominator += dx * dx;
    }

    if denominator.abs() < f64::EPSILON {
        trace!("Hurst: degenerate log-log regression");
        return None;
    }

    let hurst = numerator / denominator;
    trace!(hurst = format!("{:.4}", hurst), lags = log_lag.len(), "Hurst exponent computed");
    Some(round_dp(hurst, 4))
}
