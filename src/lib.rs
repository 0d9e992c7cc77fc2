// =============================================================================
// Pulse — technical-indicator engine for the crypto market dashboard
// =============================================================================
//
// `indicators` holds the pure numeric engine (RSI, MACD, Bollinger Bands,
// Fibonacci retracement, trend forecast).  `report` runs all of them over one
// series; `api` exposes that to the dashboard over HTTP.

pub mod api;
pub mod app_state;
pub mod indicators;
pub mod market;
pub mod report;
pub mod runtime_config;
pub mod types;

pub use indicators::IndicatorError;
pub use report::{analyze, IndicatorReport};
pub use types::{PriceSeries, SeriesError};
