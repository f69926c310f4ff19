// =============================================================================
// Statistical Analyzer Module
// =============================================================================
//
// Pure, side-effect-free statistics on the price ratio and the underlying
// pair: rolling windows, momentum, return differentials, correlation, and the
// regime tests (ADF stationarity, Engle-Granger cointegration, Hurst R/S).
// The fragile tests return typed errors; degradation to partial results
// happens in the analysis orchestrator, never here.

pub mod adf;
pub mod coint;
pub mod hurst;
pub mod ma;
pub mod momentum;
pub mod relative_returns;
pub mod rolling;

pub use adf::{adf_test, AdfReport};
pub use coint::{engle_granger, CointReport};
pub use hurst::hurst_exponent;
pub use ma::{ratio_ma, RatioMaInfo};
pub use momentum::{ratio_momentum, MomentumInfo};
pub use relative_returns::{relative_returns, PeriodReturns, RelativeReturns};
