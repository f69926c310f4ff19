// =============================================================================
// Augmented Dickey-Fuller Test — unit-root test with automatic lag selection
// =============================================================================
//
// Tests H0: the series has a unit root (non-stationary).
//
//   Δy_t = α + β·y_{t-1} + Σ_{j=1..k} γ_j·Δy_{t-j} + ε_t
//
// The lag order k is chosen by minimizing the Akaike information criterion
// over a common sample, then the regression is re-estimated at the chosen lag
// on the maximal sample. The test statistic is τ = β̂ / SE(β̂); the p-value
// comes from MacKinnon's approximate asymptotic distribution, so the usual
// decision rule is simply p < 0.05 ⇒ stationary.
//
// Every numerical failure mode (degenerate regression, perfect fit, sample
// too short) is reported as a typed error; callers degrade to an undefined
// result flagged non-stationary.
// =============================================================================

use crate::error::StatTestError;

/// Result of an ADF test run.
#[derive(Debug, Clone, Copy)]
pub struct AdfReport {
    /// The τ test statistic (more negative ⇒ stronger evidence of
    /// stationarity).
    pub stat: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Lag order selected by AIC.
    pub used_lag: usize,
    /// Number of observations in the final regression.
    pub n_obs: usize,
}

impl AdfReport {
    pub fn is_stationary(&self) -> bool {
        self.p_value < 0.05
    }
}

/// ADF test with a constant term, AIC lag selection, on the defined (finite)
/// entries of `series`.
pub fn adf_test(series: &[f64]) -> Result<AdfReport, StatTestError> {
    let y: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    let (stat, used_lag, n_obs) = adf_tau(&y, true)?;
    Ok(AdfReport {
        stat,
        p_value: mackinnon_p(stat, 1),
        used_lag,
        n_obs,
    })
}

/// Core τ computation shared with the Engle-Granger residual test (which
/// omits the constant because OLS residuals are mean zero by construction).
///
/// Returns `(tau, used_lag, n_obs)`.
pub(crate) fn adf_tau(y: &[f64], with_const: bool) -> Result<(f64, usize, usize), StatTestError> {
    let n = y.len();
    let ntrend = if with_const { 1 } else { 0 };

    if n < 10 {
        return Err(StatTestError::TooFewObservations { needed: 10, got: n });
    }

    // Schwert's rule of thumb, capped so the regression keeps enough
    // degrees of freedom.
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = n / 2 - ntrend - 1;
    let maxlag = schwert.min(cap);

    let dy: Vec<f64> = y.windows(2).map(|w| w[1] - w[0]).collect();

    // A differenced series with no variation (constant or perfectly linear
    // input) admits only a perfect fit; there is no statistic to compute.
    let dy_mean = dy.iter().sum::<f64>() / dy.len() as f64;
    if dy.iter().all(|d| (d - dy_mean).abs() < 1e-12) {
        return Err(StatTestError::Degenerate(
            "differenced series has no variation".into(),
        ));
    }

    // --- Lag selection: compare AIC over the common sample ------------------
    let mut best: Option<(f64, usize)> = None;
    for k in 0..=maxlag {
        // A degenerate candidate (singular design, perfect fit) is skipped;
        // other lag orders may still be estimable.
        let Ok(fit) = fit_adf_regression(y, &dy, k, maxlag, with_const) else {
            continue;
        };
        let Ok(aic) = fit.aic() else {
            continue;
        };
        if best.map(|(b, _)| aic < b).unwrap_or(true) {
            best = Some((aic, k));
        }
    }
    let (_, used_lag) =
        best.ok_or_else(|| StatTestError::Degenerate("no estimable lag order".into()))?;

    // --- Final regression at the chosen lag on the maximal sample -----------
    let fit = fit_adf_regression(y, &dy, used_lag, used_lag, with_const)?;

    let se = fit.se[0];
    if !se.is_finite() || se <= 0.0 {
        return Err(StatTestError::Degenerate(
            "zero standard error on the level coefficient".into(),
        ));
    }
    let tau = fit.params[0] / se;
    if !tau.is_finite() {
        return Err(StatTestError::Degenerate("non-finite test statistic".into()));
    }

    Ok((tau, used_lag, fit.nobs))
}

/// Regress `Δy_t` on `[y_{t-1}, Δy_{t-1..t-k}, (const)]` with rows starting
/// at index `start` of the difference series.
fn fit_adf_regression(
    y: &[f64],
    dy: &[f64],
    k: usize,
    start: usize,
    with_const: bool,
) -> Result<OlsFit, StatTestError> {
    let m = dy.len();
    let nparams = 1 + k + usize::from(with_const);

    if start >= m || m - start < nparams + 1 {
        return Err(StatTestError::TooFewObservations {
            needed: start + nparams + 1,
            got: m,
        });
    }

    let mut targets = Vec::with_capacity(m - start);
    let mut rows = Vec::with_capacity(m - start);
    for t in start..m {
        let mut row = Vec::with_capacity(nparams);
        row.push(y[t]); // lagged level: dy[t] = y[t+1] - y[t]
        for j in 1..=k {
            row.push(dy[t - j]);
        }
        if with_const {
            row.push(1.0);
        }
        rows.push(row);
        targets.push(dy[t]);
    }

    ols(&targets, &rows)
}

// =============================================================================
// Small dense OLS
// =============================================================================

/// Ordinary least squares via the normal equations. The designs here are tiny
/// (a handful of columns), so Gauss-Jordan inversion with partial pivoting is
/// plenty.
pub(crate) struct OlsFit {
    pub params: Vec<f64>,
    pub se: Vec<f64>,
    pub ssr: f64,
    pub nobs: usize,
    pub nparams: usize,
}

impl OlsFit {
    /// Akaike information criterion under the Gaussian likelihood.
    pub fn aic(&self) -> Result<f64, StatTestError> {
        if self.ssr <= 0.0 {
            return Err(StatTestError::Degenerate("perfect fit (zero SSR)".into()));
        }
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        Ok(-2.0 * llf + 2.0 * self.nparams as f64)
    }
}

pub(crate) fn ols(y: &[f64], rows: &[Vec<f64>]) -> Result<OlsFit, StatTestError> {
    let nobs = y.len();
    let nparams = rows.first().map(|r| r.len()).unwrap_or(0);
    if nobs <= nparams || nparams == 0 {
        return Err(StatTestError::TooFewObservations {
            needed: nparams + 1,
            got: nobs,
        });
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0; nparams]; nparams];
    let mut xty = vec![0.0; nparams];
    for (row, &target) in rows.iter().zip(y.iter()) {
        for i in 0..nparams {
            xty[i] += row[i] * target;
            for j in 0..nparams {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let inv = invert(&xtx).ok_or_else(|| {
        StatTestError::Degenerate("singular normal-equations matrix".into())
    })?;

    let params: Vec<f64> = (0..nparams)
        .map(|i| (0..nparams).map(|j| inv[i][j] * xty[j]).sum())
        .collect();

    let ssr: f64 = rows
        .iter()
        .zip(y.iter())
        .map(|(row, &target)| {
            let fitted: f64 = row.iter().zip(params.iter()).map(|(x, b)| x * b).sum();
            (target - fitted).powi(2)
        })
        .sum();

    let sigma2 = ssr / (nobs - nparams) as f64;
    let se: Vec<f64> = (0..nparams).map(|i| (sigma2 * inv[i][i]).sqrt()).collect();

    Ok(OlsFit {
        params,
        se,
        ssr,
        nobs,
        nparams,
    })
}

/// Gauss-Jordan matrix inversion with partial pivoting. Returns `None` for a
/// singular matrix.
fn invert(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut aug: Vec<Vec<f64>> = a
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for col in 0..n {
        // Partial pivot.
        let pivot_row = (col..n).max_by(|&i, &j| {
            aug[i][col]
                .abs()
                .partial_cmp(&aug[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if aug[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    Some(aug.into_iter().map(|r| r[n..].to_vec()).collect())
}

// =============================================================================
// MacKinnon approximate p-values
// =============================================================================
//
// Response-surface approximation of the asymptotic Dickey-Fuller τ
// distribution for regressions with a constant. `n_series = 1` is the plain
// ADF test; `n_series = 2` is the Engle-Granger residual test for a pair.

const TAU_MAX: [f64; 2] = [2.74, 0.92];
const TAU_MIN: [f64; 2] = [-18.83, -18.86];
const TAU_STAR: [f64; 2] = [-1.61, -2.62];
const TAU_SMALL_P: [[f64; 3]; 2] = [
    [2.1659, 1.4412, 0.038269],
    [2.92, 1.5012, 0.039796],
];
const TAU_LARGE_P: [[f64; 4]; 2] = [
    [1.7339, 0.93202, -0.012745, -0.0010368],
    [2.1945, 0.64695, -0.029198, -0.0042377],
];

/// Approximate p-value for a τ statistic from a regression with constant.
pub(crate) fn mackinnon_p(tau: f64, n_series: usize) -> f64 {
    let i = (n_series - 1).min(1);
    if tau > TAU_MAX[i] {
        return 1.0;
    }
    if tau < TAU_MIN[i] {
        return 0.0;
    }

    let z = if tau <= TAU_STAR[i] {
        polyval(&TAU_SMALL_P[i], tau)
    } else {
        polyval(&TAU_LARGE_P[i], tau)
    };
    norm_cdf(z)
}

fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| c * x.powi(i as i32))
        .sum()
}

/// Standard normal CDF via the Abramowitz-Stegun erf approximation.
pub(crate) fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudorandom walk (xorshift64) so tests are reproducible.
    fn pseudorandom_walk(len: usize, seed: u64) -> Vec<f64> {
        let mut v = Vec::with_capacity(len);
        let mut price = 100.0;
        let mut state = seed;
        for _ in 0..len {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let r = (state as f64 / u64::MAX as f64) - 0.5;
            price += r;
            v.push(price);
        }
        v
    }

    fn mean_reverting_series(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let oscillation = if i % 2 == 0 { 5.0 } else { -5.0 };
                100.0 + oscillation + 0.3 * (i as f64).sin()
            })
            .collect()
    }

    #[test]
    fn strongly_mean_reverting_series_is_stationary() {
        let report = adf_test(&mean_reverting_series(200)).expect("test should run");
        assert!(
            report.stat < -3.5,
            "expected strongly negative tau, got {:.4}",
            report.stat
        );
        assert!(report.p_value < 0.05);
        assert!(report.is_stationary());
    }

    #[test]
    fn random_walk_p_value_is_a_probability() {
        let report = adf_test(&pseudorandom_walk(400, 42)).expect("test should run");
        assert!((0.0..=1.0).contains(&report.p_value));
        assert!(report.stat.is_finite());
    }

    #[test]
    fn too_short_series_errors() {
        let err = adf_test(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, StatTestError::TooFewObservations { .. }));
    }

    #[test]
    fn perfectly_linear_series_degrades_to_error() {
        // A noiseless line makes the difference series constant; the
        // regression collapses rather than producing a bogus statistic.
        let line: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert!(adf_test(&line).is_err());
    }

    #[test]
    fn nan_entries_are_dropped_before_testing() {
        let mut series = mean_reverting_series(200);
        series[10] = f64::NAN;
        series[50] = f64::NAN;
        let report = adf_test(&series).expect("test should still run");
        assert!(report.is_stationary());
    }

    #[test]
    fn determinism() {
        let series = pseudorandom_walk(300, 7);
        let a = adf_test(&series).unwrap();
        let b = adf_test(&series).unwrap();
        assert_eq!(a.stat, b.stat);
        assert_eq!(a.p_value, b.p_value);
        assert_eq!(a.used_lag, b.used_lag);
    }

    // ---- MacKinnon surface -------------------------------------------------

    #[test]
    fn mackinnon_bounds() {
        assert_eq!(mackinnon_p(5.0, 1), 1.0);
        assert_eq!(mackinnon_p(-30.0, 1), 0.0);
    }

    #[test]
    fn mackinnon_monotone_in_tau() {
        let p_strong = mackinnon_p(-5.0, 1);
        let p_weak = mackinnon_p(-1.0, 1);
        assert!(p_strong < p_weak);
        assert!(p_strong < 0.01);
        assert!(p_weak > 0.05);
    }

    #[test]
    fn mackinnon_known_region() {
        // The 5% critical value for the constant-only ADF is about -2.86;
        // τ just below it should give p just under 0.05.
        let p = mackinnon_p(-2.9, 1);
        assert!((0.02..0.05).contains(&p), "p = {p}");
        let p = mackinnon_p(-2.8, 1);
        assert!((0.05..0.09).contains(&p), "p = {p}");
    }

    #[test]
    fn norm_cdf_sanity() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((norm_cdf(1.959964) - 0.975).abs() < 1e-4);
        assert!((norm_cdf(-1.959964) - 0.025).abs() < 1e-4);
    }

    // ---- OLS helper --------------------------------------------------------

    #[test]
    fn ols_recovers_known_coefficients() {
        // y = 2x + 3 exactly plus a tiny wiggle so SSR > 0.
        let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64, 1.0]).collect();
        let y: Vec<f64> = (0..50)
            .map(|i| 2.0 * i as f64 + 3.0 + 0.001 * (i as f64).sin())
            .collect();
        let fit = ols(&y, &rows).unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-3);
        assert!((fit.params[1] - 3.0).abs() < 1e-2);
    }

    #[test]
    fn ols_singular_design_errors() {
        // Two identical columns.
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(ols(&y, &rows).is_err());
    }
}
