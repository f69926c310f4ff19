// =============================================================================
// Return differentials over standard trading-day periods
// =============================================================================
//
// For each named period (1mo ≈ 21 trading days, 3mo ≈ 63, 6mo ≈ 126) compute
// both assets' trailing return and their difference. A period whose required
// day count exceeds the available history reports all three fields as
// undefined rather than a partial result.
// =============================================================================

use serde::Serialize;

use crate::series::round_dp;

/// Trailing return comparison for one named period. Either all three fields
/// are present or none are.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PeriodReturns {
    pub return_a: Option<f64>,
    pub return_b: Option<f64>,
    pub differential: Option<f64>,
}

/// Return differentials over the standard 1mo / 3mo / 6mo periods.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RelativeReturns {
    #[serde(rename = "1mo")]
    pub one_month: PeriodReturns,
    #[serde(rename = "3mo")]
    pub three_months: PeriodReturns,
    #[serde(rename = "6mo")]
    pub six_months: PeriodReturns,
}

impl RelativeReturns {
    /// First defined differential in period order (1mo, 3mo, 6mo). Used by
    /// the conviction rubric, which scores the shortest available horizon.
    pub fn first_differential(&self) -> Option<f64> {
        self.one_month
            .differential
            .or(self.three_months.differential)
            .or(self.six_months.differential)
    }
}

/// Trading-day counts for the standard comparison periods.
pub const RETURN_PERIOD_DAYS: [(usize, &str); 3] = [(21, "1mo"), (63, "3mo"), (126, "6mo")];

/// Compute trailing percentage returns for both assets and their difference
/// over each standard period.
pub fn relative_returns(prices_a: &[f64], prices_b: &[f64]) -> RelativeReturns {
    let mut out = RelativeReturns::default();
    out.one_month = period_returns(prices_a, prices_b, 21);
    out.three_months = period_returns(prices_a, prices_b, 63);
    out.six_months = period_returns(prices_a, prices_b, 126);
    out
}

fn period_returns(prices_a: &[f64], prices_b: &[f64], days: usize) -> PeriodReturns {
    let n = prices_a.len();
    if n < days + 1 || prices_b.len() < days + 1 {
        return PeriodReturns::default();
    }

    let ret_a = (prices_a[n - 1] / prices_a[n - days] - 1.0) * 100.0;
    let ret_b = (prices_b[prices_b.len() - 1] / prices_b[prices_b.len() - days] - 1.0) * 100.0;

    if !ret_a.is_finite() || !ret_b.is_finite() {
        return PeriodReturns::default();
    }

    PeriodReturns {
        return_a: Some(round_dp(ret_a, 2)),
        return_b: Some(round_dp(ret_b, 2)),
        differential: Some(round_dp(ret_a - ret_b, 2)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn constant_growth(n: usize, daily: f64) -> Vec<f64> {
        (0..n).map(|i| 100.0 * (1.0 + daily).powi(i as i32)).collect()
    }

    #[test]
    fn short_history_reports_all_fields_undefined() {
        // 30 points: 1mo (needs 22) is defined, 3mo and 6mo are not.
        let a = constant_growth(30, 0.01);
        let b = constant_growth(30, 0.005);
        let rr = relative_returns(&a, &b);
        assert!(rr.one_month.return_a.is_some());
        assert!(rr.three_months.return_a.is_none());
        assert!(rr.three_months.return_b.is_none());
        assert!(rr.three_months.differential.is_none());
        assert!(rr.six_months.differential.is_none());
    }

    #[test]
    fn known_differential() {
        // A is flat, B doubles linearly over the window.
        let n = 130;
        let a = vec![100.0; n];
        let b: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let rr = relative_returns(&a, &b);

        let one = rr.one_month;
        assert_eq!(one.return_a, Some(0.0));
        // b[n-1]/b[n-21] - 1 = 229/209 - 1
        let expected = round_dp((229.0 / 209.0 - 1.0) * 100.0, 2);
        assert_eq!(one.return_b, Some(expected));
        assert_eq!(one.differential, Some(round_dp(0.0 - expected, 2)));
    }

    #[test]
    fn first_differential_prefers_shortest_period() {
        let rr = RelativeReturns {
            one_month: PeriodReturns::default(),
            three_months: PeriodReturns {
                return_a: Some(1.0),
                return_b: Some(0.5),
                differential: Some(0.5),
            },
            six_months: PeriodReturns {
                return_a: Some(9.0),
                return_b: Some(1.0),
                differential: Some(8.0),
            },
        };
        assert_eq!(rr.first_differential(), Some(0.5));
    }

    #[test]
    fn exactly_enough_points_defines_the_period() {
        let a = constant_growth(22, 0.01);
        let b = constant_growth(22, 0.01);
        let rr = relative_returns(&a, &b);
        assert!(rr.one_month.differential.is_some());
        assert!((rr.one_month.differential.unwrap()).abs() < 1e-9);
    }
}
