// =============================================================================
// Market Snapshot — boundary payload from the market-data provider
// =============================================================================
//
// The dashboard fetches per-coin market rows (current price, 24h change and a
// 7-day sparkline) and a sentiment score from its own backend.  The engine
// only needs the sparkline; everything else is passed through untouched.

use serde::{Deserialize, Serialize};

use crate::types::{PriceSeries, SeriesError};

/// `sparkline_in_7d` object of a market row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

/// One market row as received by the dashboard. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub sparkline_in_7d: Sparkline,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

impl MarketSnapshot {
    /// Sparkline prices as a validated series, oldest first.
    ///
    /// `null` gaps in the provider payload are not accepted; the caller must
    /// clean them before posting.
    pub fn price_series(&self) -> Result<PriceSeries, SeriesError> {
        PriceSeries::new(self.sparkline_in_7d.price.clone())
    }
}
