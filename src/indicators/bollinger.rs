// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the same trailing window.  The Band Width is the normalised distance:
// BBW = (upper - lower) / middle * 100.

use serde::Serialize;

use super::moving_average::population_std_dev;
use super::{require_finite, require_period, require_samples, IndicatorError, Result};
use crate::types::PriceSeries;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_K: f64 = 2.0;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Band width in percent of the middle band, `None` when `middle == 0`.
    pub width: Option<f64>,
}

/// Calculate Bollinger Bands over the trailing `period` prices.
///
/// - `upper`  = SMA + `k` * σ
/// - `middle` = SMA
/// - `lower`  = SMA - `k` * σ
///
/// A flat window collapses all three bands onto its price exactly.
///
/// Fails with `InsufficientData` when fewer than `period` samples are given,
/// with `InvalidParameter` when `period == 0` or `k` is negative or not
/// finite, and with `NonFinite` when the window's magnitudes overflow `f64`.
pub fn bollinger(prices: &PriceSeries, period: usize, k: f64) -> Result<BollingerBands> {
    require_period("bollinger", "period", period)?;
    if !k.is_finite() || k < 0.0 {
        return Err(IndicatorError::InvalidParameter {
            indicator: "bollinger",
            name: "k",
            value: k.to_string(),
        });
    }
    require_samples("bollinger", period, prices.len())?;

    let closes = prices.as_slice();
    let window = &closes[closes.len() - period..];
    let first = window[0];
    let (middle, std_dev) = if window.iter().all(|&x| x == first) {
        // sum / n is not exact for every price (0.1 * 20 / 20 != 0.1).
        (first, 0.0)
    } else {
        let mean = window.iter().sum::<f64>() / period as f64;
        (mean, population_std_dev(window, mean))
    };
    let middle = require_finite("bollinger", middle)?;
    let std_dev = require_finite("bollinger", std_dev)?;

    let upper = require_finite("bollinger", middle + k * std_dev)?;
    let lower = require_finite("bollinger", middle - k * std_dev)?;
    let width = if middle == 0.0 {
        None
    } else {
        Some(require_finite("bollinger", (upper - lower) / middle * 100.0)?)
    };

    Ok(BollingerBands {
        upper,
        middle,
        lower,
        width,
    })
}
