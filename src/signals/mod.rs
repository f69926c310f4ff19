// =============================================================================
// Signals Module
// =============================================================================
//
// Signal fusion pipeline for the analysis engine:
// - Rule-based signal generation (MA position + momentum + RSI + MACD)
// - Conviction fusion (statistical + technical + advisory, 10-criterion
//   weighted rubric)

pub mod conviction;
pub mod generator;

pub use conviction::{combine, CombinedConviction};
pub use generator::{generate_signal, SignalSummary};
