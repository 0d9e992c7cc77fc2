// =============================================================================
// Price Prediction — Least-Squares Trend Extrapolation
// =============================================================================
//
// Fits `price = intercept + slope * index` over the whole series by ordinary
// least squares (index 0 = oldest sample) and extrapolates past the last
// index.  Sums are centred on the mean index to keep the fit stable for long
// series of large prices.
//
//   slope     = Σ (x - x̄)(y - ȳ) / Σ (x - x̄)²
//   intercept = ȳ - slope * x̄
//   forecast  = intercept + slope * (n - 1 + steps)
//
// This is a heuristic trend read, not a statistical model: there are no
// confidence bounds and callers should not treat it as authoritative.

use serde::Serialize;

use super::{require_finite, require_samples, IndicatorError, Result};
use crate::types::PriceSeries;

/// Minimum samples needed to fit a line.
pub const MIN_TREND_SAMPLES: usize = 2;

/// Least-squares line through the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 1.0 for a perfectly flat series.
    pub r_squared: f64,
}

impl TrendFit {
    /// Value of the fitted line at `index`.
    pub fn value_at(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }
}

/// Fit a least-squares trend line of price against sample index.
///
/// Fails with `NonFinite` when the sums overflow `f64`.
pub fn fit_trend(prices: &PriceSeries) -> Result<TrendFit> {
    require_samples("predict", MIN_TREND_SAMPLES, prices.len())?;

    let ys = prices.as_slice();
    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = require_finite("predict", ys.iter().sum::<f64>() / n)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (i, &y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    // sxx > 0 for n >= 2.
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    Ok(TrendFit {
        slope: require_finite("predict", slope)?,
        intercept: require_finite("predict", intercept)?,
        r_squared: require_finite("predict", r_squared)?,
    })
}

/// One-step-ahead forecast: the fitted line evaluated at index `n`.
pub fn predict(prices: &PriceSeries) -> Result<f64> {
    predict_ahead(prices, 1)
}

/// Forecast `steps` samples past the most recent one.
pub fn predict_ahead(prices: &PriceSeries, steps: usize) -> Result<f64> {
    if steps == 0 {
        return Err(IndicatorError::InvalidParameter {
            indicator: "predict",
            name: "steps",
            value: steps.to_string(),
        });
    }
    let fit = fit_trend(prices)?;
    let last_index = (prices.len() - 1) as f64;
    require_finite("predict", fit.value_at(last_index + steps as f64))
}
