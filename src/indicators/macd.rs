// =============================================================================
// MACD — Moving Average Convergence/Divergence on the ratio
// =============================================================================
//
// MACD line  = EMA(fast) - EMA(slow)
// Signal     = EMA(signal span) of the MACD line
// Histogram  = MACD line - Signal
//
// The EMAs use the standard recursive exponential weighting
// (α = 2 / (span + 1), seeded with the first defined value), not a simple
// rolling mean, so the MACD line is defined from the first ratio value
// onward. All three outputs are full-length and index-aligned with the input.
// =============================================================================

/// MACD line, signal line, and histogram, each aligned with the input series.
#[derive(Debug, Clone)]
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD over `values` with the given spans.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdResult {
    let ema_fast = ema_span(values, fast);
    let ema_slow = ema_span(values, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(&f, &s)| f - s)
        .collect();

    let signal_line = ema_span(&macd_line, signal);

    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(&m, &s)| m - s)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Recursive EMA with smoothing α = 2 / (span + 1), seeded with the first
/// defined value. Undefined inputs carry the previous EMA forward; entries
/// before the first defined input are undefined.
pub fn ema_span(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if span == 0 || n == 0 {
        return out;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_finite() {
            state = Some(match state {
                Some(prev) => v * alpha + prev * (1.0 - alpha),
                None => v,
            });
        }
        if let Some(e) = state {
            out[i] = e;
        }
    }

    out
}
