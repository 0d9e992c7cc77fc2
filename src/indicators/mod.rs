// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard.  The series helpers (`calculate_*`) return an empty `Vec` on
// short input; the single-value operations return `Result<_, IndicatorError>`
// so callers are forced to handle the insufficient-data case explicitly.

use thiserror::Error;

pub mod bollinger;
pub mod fibonacci;
pub mod macd;
pub mod moving_average;
pub mod prediction;
pub mod rsi;

pub use bollinger::{bollinger, BollingerBands};
pub use fibonacci::{fibonacci, fibonacci_levels, FibonacciLevel, FIBONACCI_RATIOS};
pub use macd::{macd, macd_extended, MacdResult};
pub use moving_average::{calculate_ema, calculate_sma, population_std_dev};
pub use prediction::{fit_trend, predict, predict_ahead, TrendFit};
pub use rsi::{calculate_rsi, rsi, RsiZone};

pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Why an indicator could not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// The series is shorter than the minimum window of the indicator.
    #[error("{indicator}: insufficient data, need {required} samples, got {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },

    /// A window or multiplier that no amount of data can satisfy.
    #[error("{indicator}: invalid parameter '{name}' = {value}")]
    InvalidParameter {
        indicator: &'static str,
        name: &'static str,
        value: String,
    },

    /// The input is long enough but its magnitudes overflow `f64`.
    #[error("{indicator}: non-finite intermediate value")]
    NonFinite { indicator: &'static str },
}

impl IndicatorError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Fail with `InsufficientData` when `actual < required`.
pub(crate) fn require_samples(
    indicator: &'static str,
    required: usize,
    actual: usize,
) -> Result<()> {
    if actual < required {
        tracing::trace!(indicator, required, actual, "insufficient data");
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            actual,
        });
    }
    Ok(())
}

/// Pass `value` through, or fail with `NonFinite` on inf/NaN.
pub(crate) fn require_finite(indicator: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        tracing::trace!(indicator, value, "non-finite result");
        return Err(IndicatorError::NonFinite { indicator });
    }
    Ok(value)
}

/// `period + 1` samples, or `InvalidParameter` when that overflows.
pub(crate) fn period_plus_one(indicator: &'static str, period: usize) -> Result<usize> {
    period
        .checked_add(1)
        .ok_or_else(|| IndicatorError::InvalidParameter {
            indicator,
            name: "period",
            value: period.to_string(),
        })
}

/// Fail with `InvalidParameter` when a window length is zero.
pub(crate) fn require_period(
    indicator: &'static str,
    name: &'static str,
    period: usize,
) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter {
            indicator,
            name,
            value: period.to_string(),
        });
    }
    Ok(())
}
