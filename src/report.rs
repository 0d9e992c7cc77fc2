// =============================================================================
// Indicator Report — every indicator over one series
// =============================================================================
//
// Each indicator is computed independently.  A series too short for an
// indicator leaves that field `None` (serialised as `null`, which the
// dashboard renders as "N/A").  Invalid settings are an error, never `None`.

use serde::Serialize;
use tracing::debug;

use crate::indicators::{
    self, bollinger, fibonacci, fit_trend, macd_extended, predict, rsi, BollingerBands,
    IndicatorError, MacdResult, RsiZone, TrendFit,
};
use crate::runtime_config::IndicatorSettings;
use crate::types::PriceSeries;

/// Indicator values for one price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub samples: usize,
    pub last_price: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    pub macd: Option<MacdResult>,
    pub bollinger: Option<BollingerBands>,
    pub fibonacci: Option<[f64; 6]>,
    pub prediction: Option<f64>,
    pub trend: Option<TrendFit>,
}

/// Compute every indicator over `prices` with the given `settings`.
pub fn analyze(
    prices: &PriceSeries,
    settings: &IndicatorSettings,
) -> Result<IndicatorReport, IndicatorError> {
    let rsi_value = defined(rsi(prices, settings.rsi_period))?;
    let rsi_zone = rsi_value
        .map(|v| RsiZone::classify(v, settings.rsi_overbought, settings.rsi_oversold));

    let report = IndicatorReport {
        samples: prices.len(),
        last_price: prices.last(),
        rsi: rsi_value,
        rsi_zone,
        macd: defined(macd_extended(
            prices,
            settings.macd_fast,
            settings.macd_slow,
            settings.macd_signal,
        ))?,
        bollinger: defined(bollinger(
            prices,
            settings.bollinger_period,
            settings.bollinger_k,
        ))?,
        fibonacci: defined(fibonacci(prices))?,
        prediction: defined(predict(prices))?,
        trend: defined(fit_trend(prices))?,
    };

    debug!(
        samples = report.samples,
        rsi = ?report.rsi,
        prediction = ?report.prediction,
        "indicator report computed"
    );

    Ok(report)
}

/// Map insufficient data to `None`, keep every other error.
fn defined<T>(result: indicators::Result<T>) -> indicators::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(IndicatorError::InsufficientData {
            indicator,
            required,
            actual,
        }) => {
            debug!(indicator, required, actual, "indicator undefined");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
