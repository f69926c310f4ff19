// =============================================================================
// Analysis Orchestrator — the full relative-performance pipeline
// =============================================================================
//
// Data flows strictly forward:
//
//   aligned prices → ratio → { technicals, statistics } → rule-based signal
//
// Technicals are computed first so the confirmation classifier can feed the
// signal generator. The numerically fragile tests (ADF, cointegration, Hurst)
// are fault-isolated here: a failure degrades that field to undefined while
// the rest of the bundle is still computed and returned.
//
// Everything in the returned bundle is already JSON-safe: series are rounded
// to 4 decimal places with NaN mapped to null, summary scalars to 1-2 places
// per field.
// =============================================================================

use serde::Serialize;
use tracing::warn;

use crate::error::AnalysisError;
use crate::indicators::{
    bollinger_bands, macd, rsi_series, technical_confirmation, TechnicalConfirmation,
};
use crate::market_data::AlignedPair;
use crate::runtime_config::RuntimeConfig;
use crate::series::{clean, compute_ratio, cumulative_returns, last_finite, sanitize_series};
use crate::signals::generator::{generate_signal, SignalSummary};
use crate::stats::{
    adf_test, engle_granger, hurst_exponent, ratio_ma, ratio_momentum, relative_returns,
    RelativeReturns,
};
use crate::types::TrendDirection;

// =============================================================================
// Typed result records
// =============================================================================

/// Summary statistics of the pair, the exact record the conviction rubric and
/// advisory prompt consume. Undefined and present-zero are distinct states
/// throughout; scoring logic depends on that difference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatisticsSummary {
    pub current_ratio: Option<f64>,
    pub ratio_ma_50: Option<f64>,
    pub ratio_ma_200: Option<f64>,
    pub ratio_above_ma_50: Option<bool>,
    pub ratio_above_ma_200: Option<bool>,
    pub momentum_roc: f64,
    pub momentum_direction: TrendDirection,
    pub relative_returns: RelativeReturns,
    pub correlation: Option<f64>,
    pub hurst_exponent: Option<f64>,
    pub adf_pvalue: Option<f64>,
    pub is_stationary: bool,
    pub current_zscore: f64,
    pub cointegration: CointSummary,
}

/// Cointegration record. All-undefined with a diagnostic on test failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CointSummary {
    pub test_stat: Option<f64>,
    pub p_value: Option<f64>,
    pub critical_1pct: Option<f64>,
    pub critical_5pct: Option<f64>,
    pub critical_10pct: Option<f64>,
    pub is_cointegrated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ratio chart block: the ratio itself plus both moving averages.
#[derive(Debug, Clone, Serialize)]
pub struct RatioBlock {
    pub dates: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub ma_50: Vec<Option<f64>>,
    pub ma_200: Vec<Option<f64>>,
}

/// Generic dated series block (z-score, rolling correlation).
#[derive(Debug, Clone, Serialize)]
pub struct SeriesBlock {
    pub dates: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// Cumulative-return chart block for both tickers.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnsBlock {
    pub dates: Vec<String>,
    pub returns_a: Vec<Option<f64>>,
    pub returns_b: Vec<Option<f64>>,
}

/// All technical-indicator series on the ratio plus the confirmation verdict.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalsBundle {
    pub rsi: RsiBlock,
    pub macd: MacdBlock,
    pub bollinger: BollingerBlock,
    pub confirmation: TechnicalConfirmation,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsiBlock {
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacdBlock {
    pub macd_line: Vec<Option<f64>>,
    pub signal_line: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BollingerBlock {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Per-ticker RSI comparison (computed on the raw prices, not the ratio).
#[derive(Debug, Clone, Serialize)]
pub struct IndividualRsi {
    pub rsi_a: Vec<Option<f64>>,
    pub rsi_b: Vec<Option<f64>>,
    pub current_rsi_a: Option<f64>,
    pub current_rsi_b: Option<f64>,
}

/// The complete analysis output for one pair request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBundle {
    pub statistics: StatisticsSummary,
    pub ratio: RatioBlock,
    pub zscore: SeriesBlock,
    pub returns: ReturnsBlock,
    pub correlation_rolling: SeriesBlock,
    pub technicals: TechnicalsBundle,
    pub individual_rsi: IndividualRsi,
    pub signal: SignalSummary,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Run the complete relative-performance analysis for an aligned pair.
pub fn run_full_analysis(
    config: &RuntimeConfig,
    pair: &AlignedPair,
) -> Result<AnalysisBundle, AnalysisError> {
    // 1. Price ratio.
    let ratio = compute_ratio(&pair.closes_a, &pair.closes_b)?;

    // 2. Technical indicators on the ratio (first, so the confirmation can
    //    feed the signal generator).
    let rsi = rsi_series(&ratio, config.rsi_period);
    let macd_result = macd(&ratio, config.macd_fast, config.macd_slow, config.macd_signal);
    let bands = bollinger_bands(&ratio, config.bb_period, config.bb_std);
    let confirmation = technical_confirmation(
        &rsi,
        &macd_result.histogram,
        &ratio,
        &bands.upper,
        &bands.middle,
        &bands.lower,
    );

    // 3. Rolling statistics.
    let ma_info = ratio_ma(&ratio, config.ma_short, config.ma_long);
    let zscore = crate::stats::rolling::rolling_zscore(&ratio, config.zscore_window);
    let momentum = ratio_momentum(&ratio, config.momentum_window);

    // 4. Cumulative and relative returns.
    let returns_a = cumulative_returns(&pair.closes_a)?;
    let returns_b = cumulative_returns(&pair.closes_b)?;
    let rel_returns = relative_returns(&pair.closes_a, &pair.closes_b);

    // 5. Correlation.
    let pearson = crate::stats::rolling::pearson(&pair.closes_a, &pair.closes_b);
    let rolling_corr =
        crate::stats::rolling::rolling_correlation(&pair.closes_a, &pair.closes_b, config.corr_window);

    // 6. Regime tests, each independently fault-isolated.
    let (adf_pvalue, is_stationary) = match adf_test(&ratio) {
        Ok(report) => (clean(report.p_value, 4), report.is_stationary()),
        Err(e) => {
            warn!(pair = %pair.symbol_a, error = %e, "ADF test degraded");
            (None, false)
        }
    };

    let cointegration = match engle_granger(&pair.closes_a, &pair.closes_b) {
        Ok(report) => CointSummary {
            test_stat: clean(report.test_stat, 4),
            p_value: clean(report.p_value, 4),
            critical_1pct: clean(report.critical_1pct, 4),
            critical_5pct: clean(report.critical_5pct, 4),
            critical_10pct: clean(report.critical_10pct, 4),
            is_cointegrated: report.is_cointegrated(),
            error: None,
        },
        Err(e) => {
            warn!(pair = %pair.symbol_a, error = %e, "cointegration test degraded");
            CointSummary {
                is_cointegrated: false,
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    };

    let hurst = hurst_exponent(&ratio);

    // 7. Rule-based signal (statistics + technical confirmation).
    let signal = generate_signal(
        &zscore,
        &momentum,
        &ma_info,
        Some(&confirmation),
        config.ma_short,
        config.ma_long,
    );

    // 8. Per-ticker RSI comparison.
    let rsi_a = rsi_series(&pair.closes_a, config.rsi_period);
    let rsi_b = rsi_series(&pair.closes_b, config.rsi_period);
    let individual_rsi = IndividualRsi {
        current_rsi_a: last_finite(&rsi_a).and_then(|v| clean(v, 1)),
        current_rsi_b: last_finite(&rsi_b).and_then(|v| clean(v, 1)),
        rsi_a: sanitize_series(&rsi_a),
        rsi_b: sanitize_series(&rsi_b),
    };

    // 9. Assemble the JSON-safe bundle.
    let dates: Vec<String> = pair
        .dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let statistics = StatisticsSummary {
        current_ratio: ma_info.current_ratio,
        ratio_ma_50: ma_info.ma_short,
        ratio_ma_200: ma_info.ma_long,
        ratio_above_ma_50: ma_info.above_ma_short,
        ratio_above_ma_200: ma_info.above_ma_long,
        momentum_roc: momentum.current_roc,
        momentum_direction: momentum.direction,
        relative_returns: rel_returns,
        correlation: clean(pearson, 4),
        hurst_exponent: hurst,
        adf_pvalue,
        is_stationary,
        current_zscore: signal.current_zscore,
        cointegration,
    };

    Ok(AnalysisBundle {
        statistics,
        ratio: RatioBlock {
            dates: dates.clone(),
            values: sanitize_series(&ratio),
            ma_50: sanitize_series(&ma_info.ma_short_series),
            ma_200: sanitize_series(&ma_info.ma_long_series),
        },
        zscore: SeriesBlock {
            dates: dates.clone(),
            values: sanitize_series(&zscore),
        },
        returns: ReturnsBlock {
            dates: dates.clone(),
            returns_a: sanitize_series(&returns_a),
            returns_b: sanitize_series(&returns_b),
        },
        correlation_rolling: SeriesBlock {
            dates,
            values: sanitize_series(&rolling_corr),
        },
        technicals: TechnicalsBundle {
            rsi: RsiBlock {
                values: sanitize_series(&rsi),
            },
            macd: MacdBlock {
                macd_line: sanitize_series(&macd_result.macd_line),
                signal_line: sanitize_series(&macd_result.signal_line),
                histogram: sanitize_series(&macd_result.histogram),
            },
            bollinger: BollingerBlock {
                upper: sanitize_series(&bands.upper),
                middle: sanitize_series(&bands.middle),
                lower: sanitize_series(&bands.lower),
            },
            confirmation,
        },
        individual_rsi,
        signal,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::AdvisoryOutcome;
    use crate::signals::conviction::combine;
    use crate::types::Direction;
    use chrono::NaiveDate;

    fn make_pair(closes_a: Vec<f64>, closes_b: Vec<f64>) -> AlignedPair {
        let dates: Vec<NaiveDate> = (0..closes_a.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64))
            .collect();
        AlignedPair {
            symbol_a: "AAA".to_string(),
            symbol_b: "BBB".to_string(),
            dates,
            closes_a,
            closes_b,
        }
    }

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

    #[test]
    fn series_blocks_match_input_length() {
        let a = pseudorandom_walk(260, 11);
        let b = pseudorandom_walk(260, 22);
        let pair = make_pair(a, b);
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();

        assert_eq!(bundle.ratio.values.len(), 260);
        assert_eq!(bundle.ratio.ma_50.len(), 260);
        assert_eq!(bundle.ratio.ma_200.len(), 260);
        assert_eq!(bundle.zscore.values.len(), 260);
        assert_eq!(bundle.returns.returns_a.len(), 260);
        assert_eq!(bundle.correlation_rolling.values.len(), 260);
        assert_eq!(bundle.technicals.rsi.values.len(), 260);
        assert_eq!(bundle.technicals.macd.histogram.len(), 260);
        assert_eq!(bundle.technicals.bollinger.upper.len(), 260);
        assert_eq!(bundle.ratio.dates.len(), 260);
    }

    #[test]
    fn cumulative_returns_start_at_zero() {
        let pair = make_pair(pseudorandom_walk(60, 3), pseudorandom_walk(60, 4));
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();
        assert_eq!(bundle.returns.returns_a[0], Some(0.0));
        assert_eq!(bundle.returns.returns_b[0], Some(0.0));
    }

    #[test]
    fn short_history_periods_are_all_undefined() {
        // 40 days: the 3mo (63d) and 6mo (126d) differentials must be
        // entirely undefined while the 1mo one is present.
        let pair = make_pair(pseudorandom_walk(40, 5), pseudorandom_walk(40, 6));
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();
        let rr = &bundle.statistics.relative_returns;
        assert!(rr.one_month.differential.is_some());
        assert!(rr.three_months.return_a.is_none());
        assert!(rr.three_months.return_b.is_none());
        assert!(rr.three_months.differential.is_none());
        assert!(rr.six_months.differential.is_none());
    }

    #[test]
    fn json_serialization_has_no_nan() {
        let pair = make_pair(pseudorandom_walk(80, 7), pseudorandom_walk(80, 8));
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(!json.contains("NaN"));
        // Warm-up prefixes serialize as null, and the document parses back.
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["ratio"]["ma_200"][0].is_null());
    }

    #[test]
    fn constant_ratio_end_to_end_is_neutral_with_zero_conviction() {
        // B = 2 x A at every point: the ratio is exactly 0.5 throughout.
        let a = pseudorandom_walk(300, 9);
        let b: Vec<f64> = a.iter().map(|x| 2.0 * x).collect();
        let pair = make_pair(a, b);
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();

        // Ratio is constant 0.5.
        for v in bundle.ratio.values.iter().flatten() {
            assert!((v - 0.5).abs() < 1e-12);
        }
        // Z-score undefined everywhere (zero rolling std).
        assert!(bundle.zscore.values.iter().all(|v| v.is_none()));
        // Momentum is flat.
        assert_eq!(bundle.statistics.momentum_direction, TrendDirection::Flat);
        // MA ties carry no directional information.
        assert_eq!(bundle.statistics.ratio_above_ma_50, None);
        assert_eq!(bundle.statistics.ratio_above_ma_200, None);
        // Perfect correlation between the legs.
        assert_eq!(bundle.statistics.correlation, Some(1.0));
        // The signal is neutral...
        assert_eq!(bundle.signal.direction, Direction::Neutral);
        assert!(bundle.signal.strength.abs() < 1e-9);
        // ...and fusion forces conviction to exactly 0.
        let advisory = AdvisoryOutcome::unavailable("no key");
        let combined = combine(
            bundle.signal.direction,
            &bundle.statistics,
            &bundle.technicals.confirmation,
            &advisory,
        );
        assert_eq!(combined.direction, Direction::Neutral);
        assert_eq!(combined.conviction, 0);
    }

    #[test]
    fn collinear_pair_degrades_cointegration_with_diagnostic() {
        let a = pseudorandom_walk(300, 9);
        let b: Vec<f64> = a.iter().map(|x| 2.0 * x).collect();
        let pair = make_pair(a, b);
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();

        let coint = &bundle.statistics.cointegration;
        assert!(coint.p_value.is_none());
        assert!(coint.test_stat.is_none());
        assert!(!coint.is_cointegrated);
        assert!(coint.error.is_some());
    }

    #[test]
    fn trending_pair_produces_directional_signal() {
        // A steadily gains on B: every scored input should lean FAVOR_A.
        let n = 280;
        let a: Vec<f64> = (0..n).map(|i| 100.0 * 1.004f64.powi(i as i32)).collect();
        let b: Vec<f64> = (0..n).map(|i| 100.0 * 1.001f64.powi(i as i32)).collect();
        let pair = make_pair(a, b);
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();

        assert_eq!(bundle.statistics.ratio_above_ma_50, Some(true));
        assert_eq!(bundle.statistics.ratio_above_ma_200, Some(true));
        assert_eq!(bundle.statistics.momentum_direction, TrendDirection::Up);
        assert_eq!(bundle.signal.direction, Direction::FavorA);
        assert!(bundle.signal.strength >= 0.6);

        // Fusion without an advisory yields a nonzero conviction.
        let advisory = AdvisoryOutcome::unavailable("no key");
        let combined = combine(
            bundle.signal.direction,
            &bundle.statistics,
            &bundle.technicals.confirmation,
            &advisory,
        );
        assert_eq!(combined.direction, Direction::FavorA);
        assert!(combined.conviction >= 1);
        assert!(combined.tech_confirms);
    }

    #[test]
    fn statistics_summary_serializes_expected_fields() {
        let pair = make_pair(pseudorandom_walk(100, 13), pseudorandom_walk(100, 14));
        let bundle = run_full_analysis(&RuntimeConfig::default(), &pair).unwrap();
        let json = serde_json::to_value(&bundle.statistics).unwrap();
        for key in [
            "current_ratio",
            "ratio_ma_50",
            "ratio_ma_200",
            "ratio_above_ma_50",
            "ratio_above_ma_200",
            "momentum_roc",
            "momentum_direction",
            "relative_returns",
            "correlation",
            "hurst_exponent",
            "adf_pvalue",
            "is_stationary",
            "current_zscore",
            "cointegration",
        ] {
            assert!(json.get(key).is_some(), "missing statistics key {key}");
        }
        assert!(json["relative_returns"].get("1mo").is_some());
    }
}
