// =============================================================================
// Price Ratio Engine
// =============================================================================
//
// The ratio A/B is the foundation of the whole pipeline: a rising ratio means
// instrument A is outperforming instrument B. Entries where the division is
// undefined (zero denominator, non-finite result) become NaN rather than an
// error so that a single bad print never poisons the analysis; NaN entries
// are treated as "undefined" by every downstream rolling computation and are
// converted to JSON null at the serialization boundary.
// =============================================================================

use crate::error::AnalysisError;

/// Element-wise price ratio `a[i] / b[i]`.
///
/// Requires the two series to be aligned to the same length. Any division
/// producing a non-finite value yields NaN at that index; the output always
/// has the same length as the inputs.
pub fn compute_ratio(a: &[f64], b: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    if a.len() != b.len() {
        return Err(AnalysisError::Alignment {
            a: a.len(),
            b: b.len(),
        });
    }

    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let r = x / y;
            if r.is_finite() {
                r
            } else {
                f64::NAN
            }
        })
        .collect())
}

/// Cumulative percentage return relative to the first element:
/// `(x[i] / x[0] - 1) * 100`. The first entry is always 0.
pub fn cumulative_returns(series: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    let first = *series.first().ok_or(AnalysisError::EmptySeries)?;
    Ok(series
        .iter()
        .map(|&x| (x / first - 1.0) * 100.0)
        .collect())
}

// =============================================================================
// Boundary rounding & NaN sanitization
// =============================================================================

/// Round to `dp` decimal places.
pub fn round_dp(x: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (x * factor).round() / factor
}

/// Map a scalar to its JSON-safe form: `None` for NaN/±inf, otherwise rounded
/// to `dp` decimal places. No raw non-finite value ever crosses the API
/// boundary.
pub fn clean(x: f64, dp: i32) -> Option<f64> {
    if x.is_finite() {
        Some(round_dp(x, dp))
    } else {
        None
    }
}

/// Sanitize a full series for charting: NaN/inf become null, finite values
/// are rounded to 4 decimal places.
pub fn sanitize_series(series: &[f64]) -> Vec<Option<f64>> {
    series.iter().map(|&v| clean(v, 4)).collect()
}

/// Most recent defined (finite) value of a series, if any.
pub fn last_finite(series: &[f64]) -> Option<f64> {
    series.iter().rev().copied().find(|v| v.is_finite())
}
