// =============================================================================
// Bollinger Bands on the ratio
// =============================================================================
//
// Middle band = rolling SMA, upper/lower = middle ± k·σ where σ is the
// rolling *sample* standard deviation. A ratio pinned to the upper band means
// A is outperforming B unusually strongly for the recent window.
//
// All three bands are full-length and index-aligned with the input, with an
// undefined warm-up prefix of `period - 1`.
// =============================================================================

use crate::stats::rolling::{rolling_mean, rolling_std};

/// Upper / middle / lower band series.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Compute Bollinger Bands for `values` over `period` with `num_std`
/// deviations.
pub fn bollinger_bands(values: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let middle = rolling_mean(values, period);
    let std = rolling_std(values, period);

    let upper: Vec<f64> = middle
        .iter()
        .zip(std.iter())
        .map(|(&m, &s)| m + num_std * s)
        .collect();
    let lower: Vec<f64> = middle
        .iter()
        .zip(std.iter())
        .map(|(&m, &s)| m - num_std * s)
        .collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
