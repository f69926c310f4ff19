// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator implementations computed on the price
// ratio. Every series output is full-length and index-aligned with its input
// (undefined warm-up entries are NaN); the confirmation classifier reduces
// the latest readings to a single directional verdict.

pub mod bollinger;
pub mod confirmation;
pub mod macd;
pub mod rsi;

pub use bollinger::{bollinger_bands, BollingerBands};
pub use confirmation::{technical_confirmation, TechnicalConfirmation};
pub use macd::{ema_span, macd, MacdResult};
pub use rsi::rsi_series;
