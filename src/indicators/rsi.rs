// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI on the price *ratio* measures whether instrument A is gaining or losing
// strength relative to instrument B.
//
// Step 1 — Compute deltas of consecutive ratio values.
// Step 2 — Split deltas into gains and losses.
// Step 3 — Smooth each side with an exponentially weighted mean using
//          Wilder's smoothing factor α = 1/period. The weighting is the
//          adjusted form (finite-history weights (1-α)^k, renormalised), and
//          no value is emitted until `period` observations have been seen.
// Step 4 — RS = avg_gain / avg_loss, RSI = 100 - 100 / (1 + RS).
//
// The output is full-length and index-aligned with the input: the first
// `period` entries are undefined. A window with no movement at all has
// 0/0 = undefined RSI rather than a fabricated neutral reading — the
// confirmation classifier applies its own neutral sentinel downstream.
// =============================================================================

/// Compute the full RSI series for `values` with the given `period`.
///
/// The returned vector has the same length as the input; undefined entries
/// (warm-up, missing inputs, zero movement) are NaN.
pub fn rsi_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < 2 {
        return out;
    }

    let alpha = 1.0 / period as f64;
    let decay = 1.0 - alpha;

    // Exponentially weighted numerator/denominator for each side.
    let mut gain_num = 0.0_f64;
    let mut loss_num = 0.0_f64;
    let mut weight_sum = 0.0_f64;
    let mut observed = 0_usize;

    for i in 1..n {
        let delta = values[i] - values[i - 1];

        if !delta.is_finite() {
            // Missing observation still ages the existing weights.
            gain_num *= decay;
            loss_num *= decay;
            weight_sum *= decay;
            continue;
        }

        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };

        gain_num = gain + decay * gain_num;
        loss_num = loss + decay * loss_num;
        weight_sum = 1.0 + decay * weight_sum;
        observed += 1;

        if observed < period || weight_sum <= 0.0 {
            continue;
        }

        let avg_gain = gain_num / weight_sum;
        let avg_loss = loss_num / weight_sum;

        out[i] = if avg_loss == 0.0 && avg_gain == 0.0 {
            f64::NAN // No movement in the whole window.
        } else if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn defined(series: &[f64]) -> Vec<f64> {
        series.iter().copied().filter(|v| v.is_finite()).collect()
    }

    #[test]
    fn warmup_prefix_is_undefined() {
        let values: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let rsi = rsi_series(&values, 14);
        assert_eq!(rsi.len(), 40);
        for v in &rsi[..14] {
            assert!(v.is_nan());
        }
        assert!(rsi[14].is_finite());
    }

    #[test]
    fn all_gains_is_one_hundred() {
        let values: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let rsi = rsi_series(&values, 14);
        for v in defined(&rsi) {
            assert!((v - 100.0).abs() < 1e-10, "expected 100, got {v}");
        }
    }

    #[test]
    fn all_losses_is_zero() {
        let values: Vec<f64> = (1..=40).rev().map(|x| x as f64).collect();
        let rsi = rsi_series(&values, 14);
        assert!(!defined(&rsi).is_empty());
        for v in defined(&rsi) {
            assert!(v.abs() < 1e-10, "expected 0, got {v}");
        }
    }

    #[test]
    fn flat_series_is_undefined() {
        // Zero movement on both sides: 0/0, no fabricated neutral value.
        let rsi = rsi_series(&vec![0.5; 40], 14);
        assert!(rsi.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn values_stay_in_range() {
        let values = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 44.01, 44.90,
        ];
        let rsi = rsi_series(&values, 14);
        for v in defined(&rsi) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn mostly_up_series_reads_strong() {
        // 3 up-steps for every down-step: RSI should sit clearly above 50.
        let mut values = vec![100.0];
        for i in 1..60 {
            let step = if i % 4 == 0 { -0.5 } else { 1.0 };
            values.push(values[i - 1] + step);
        }
        let rsi = rsi_series(&values, 14);
        let last = *defined(&rsi).last().unwrap();
        assert!(last > 60.0, "expected strong RSI, got {last:.2}");
    }

    #[test]
    fn period_zero_or_tiny_input() {
        assert!(rsi_series(&[1.0, 2.0, 3.0], 0).iter().all(|v| v.is_nan()));
        assert!(rsi_series(&[1.0], 14).iter().all(|v| v.is_nan()));
        assert!(rsi_series(&[], 14).is_empty());
    }
}
