// =============================================================================
// Advisory prompt construction
// =============================================================================
//
// Renders the full statistics / technicals / signal context into a structured
// Markdown prompt asking for a JSON-only reply. Undefined metrics are spelled
// out as "N/A (insufficient data)" so the model never sees a bare null.
// =============================================================================

use crate::analysis::StatisticsSummary;
use crate::indicators::TechnicalConfirmation;
use crate::signals::generator::SignalSummary;
use crate::stats::relative_returns::PeriodReturns;

/// Build the advisory prompt for the pair `ticker_a` / `ticker_b`.
pub fn build_prompt(
    ticker_a: &str,
    ticker_b: &str,
    stats: &StatisticsSummary,
    tech: &TechnicalConfirmation,
    signal: &SignalSummary,
) -> String {
    let ret_text = format_return_lines(ticker_a, ticker_b, stats);
    let tech_signals = if tech.signals.is_empty() {
        "N/A".to_string()
    } else {
        tech.signals.join(", ")
    };

    format!(
        r#"You are a quantitative analyst evaluating the relative performance of {ticker_a} vs {ticker_b}.
The question is: **Will {ticker_a} outperform {ticker_b} going forward?**

The price ratio (A/B) is the key metric: a rising ratio means {ticker_a} is outperforming.

## Price Ratio Analysis
- **Current Ratio (A/B)**: {current_ratio}
- **50-day MA of Ratio**: {ma_50}
- **200-day MA of Ratio**: {ma_200}
- **Ratio above 50d MA?**: {above_50}
- **Ratio above 200d MA?**: {above_200}

## Momentum
- **Rate of Change**: {roc}
- **Momentum Direction**: {mom_dir}

## Return Comparison
{ret_text}

## Statistical Context
- **Ratio Z-Score**: {zscore}
- **Pearson Correlation**: {corr}
- **Hurst Exponent (ratio)**: {hurst} (> 0.5 = trending, good for persistence)
- **ADF p-value (ratio)**: {adf_p} (> 0.05 = non-stationary = trend continues)
- **Cointegration p-value**: {coint_p}

## Technical Indicators (on the ratio A/B)
- **RSI**: {tech_rsi}
- **MACD Histogram**: {tech_macd}
- **Technical Signals**: {tech_signals}
- **Technical Direction**: {tech_dir}

## Current Statistical Signal
- **Direction**: {sig_dir}
- **Strength**: {sig_strength}

## Your Task
Respond with a JSON object (and nothing else) containing:
{{
    "signal": "FAVOR_A" or "FAVOR_B" or "NEUTRAL",
    "conviction": <integer 1-100>,
    "recommendation": "<2-3 paragraph analysis explaining which ticker is likely to outperform and why, referencing key metrics>",
    "risk_factors": ["<risk 1>", "<risk 2>", "<risk 3>"]
}}

Where:
- FAVOR_A means: {ticker_a} is likely to outperform {ticker_b}
- FAVOR_B means: {ticker_b} is likely to outperform {ticker_a}
- NEUTRAL means: no clear relative performance edge
- conviction is 1-100 scale: 1-20 = very low, 21-40 = low, 41-60 = moderate, 61-80 = high, 81-100 = very high

Consider:
1. Is the ratio trending (above/below MAs)? Is momentum confirming?
2. What do recent return differentials show? Is one consistently outperforming?
3. Does the Hurst exponent suggest the trend will persist (H > 0.5)?
4. Are technical indicators aligned with the trend direction?
5. What could reverse the trend? (sector rotation, valuation, macro events)"#,
        current_ratio = opt(stats.current_ratio),
        ma_50 = opt(stats.ratio_ma_50),
        ma_200 = opt(stats.ratio_ma_200),
        above_50 = tri_state(stats.ratio_above_ma_50),
        above_200 = tri_state(stats.ratio_above_ma_200),
        roc = format!("{}%", stats.momentum_roc),
        mom_dir = stats.momentum_direction,
        zscore = stats.current_zscore,
        corr = opt(stats.correlation),
        hurst = opt(stats.hurst_exponent),
        adf_p = opt(stats.adf_pvalue),
        coint_p = opt(stats.cointegration.p_value),
        tech_rsi = tech.rsi_value,
        tech_macd = tech.macd_hist,
        tech_dir = tech.direction,
        sig_dir = signal.direction,
        sig_strength = signal.strength,
    )
}

fn opt(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A (insufficient data)".to_string(),
    }
}

fn tri_state(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "N/A (insufficient data for this MA)",
    }
}

fn format_return_lines(ticker_a: &str, ticker_b: &str, stats: &StatisticsSummary) -> String {
    let rr = &stats.relative_returns;
    let periods: [(&str, &PeriodReturns); 3] = [
        ("1mo", &rr.one_month),
        ("3mo", &rr.three_months),
        ("6mo", &rr.six_months),
    ];

    let lines: Vec<String> = periods
        .iter()
        .map(|(label, p)| match (p.return_a, p.return_b, p.differential) {
            (Some(a), Some(b), Some(d)) => format!(
                "  - **{label}**: {ticker_a} {a:+.1}% vs {ticker_b} {b:+.1}% (differential: {d:+.1}%)"
            ),
            _ => format!("  - **{label}**: Insufficient data for this period"),
        })
        .collect();

    if lines.is_empty() {
        "  - No return data available".to_string()
    } else {
        lines.join("\n")
    }
}
