// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal) of the MACD line history
//   Histogram = MACD line - Signal
//
// Both EMAs run over the full series and are aligned on the close index, so
// the first MACD-line value sits at index `slow - 1`.
// =============================================================================

use serde::Serialize;

use super::moving_average::calculate_ema;
use super::{require_finite, require_period, require_samples, IndicatorError, Result};
use crate::types::PriceSeries;

pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

/// MACD reading at the most recent close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd: f64,
    /// `None` while the MACD line is shorter than the signal period.
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Latest MACD-line value (`fast EMA - slow EMA`).
///
/// Defined from `slow` samples onwards.
pub fn macd(prices: &PriceSeries, fast: usize, slow: usize) -> Result<f64> {
    let line = macd_line(prices, fast, slow)?;
    latest(&line)
}

/// MACD line plus signal line and histogram.
pub fn macd_extended(
    prices: &PriceSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdResult> {
    require_period("macd", "signal", signal_period)?;
    let line = macd_line(prices, fast, slow)?;
    let macd = latest(&line)?;

    let (signal, histogram) = if line.len() < signal_period {
        (None, None)
    } else {
        let signal = latest(&calculate_ema(&line, signal_period))?;
        (Some(signal), Some(require_finite("macd", macd - signal)?))
    };

    Ok(MacdResult {
        macd,
        signal,
        histogram,
    })
}

/// MACD-line history, one value per close from index `slow - 1`.
fn macd_line(prices: &PriceSeries, fast: usize, slow: usize) -> Result<Vec<f64>> {
    require_period("macd", "fast", fast)?;
    require_period("macd", "slow", slow)?;
    if fast >= slow {
        return Err(IndicatorError::InvalidParameter {
            indicator: "macd",
            name: "fast",
            value: format!("{fast} (must be below slow = {slow})"),
        });
    }
    require_samples("macd", slow, prices.len())?;

    let closes = prices.as_slice();
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    // An EMA cut short by overflow would shift the alignment below.
    if fast_ema.len() != closes.len() - fast + 1 || slow_ema.len() != closes.len() - slow + 1 {
        tracing::trace!(fast, slow, "macd ema overflowed");
        return Err(IndicatorError::NonFinite { indicator: "macd" });
    }

    // fast_ema[0] is at close index fast-1, slow_ema[0] at slow-1.
    let offset = slow - fast;
    Ok(slow_ema
        .iter()
        .zip(fast_ema.iter().skip(offset))
        .map(|(s, f)| f - s)
        .collect())
}

/// Last value of an already length-checked history.
fn latest(history: &[f64]) -> Result<f64> {
    let value = history
        .last()
        .copied()
        .ok_or(IndicatorError::NonFinite { indicator: "macd" })?;
    require_finite("macd", value)
}
