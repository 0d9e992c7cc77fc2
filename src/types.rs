// =============================================================================
// Shared types used across the Pulse indicator engine
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected sample while building a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// Sample is NaN, infinite, or negative.
    #[error("invalid price sample at index {index}: {value}")]
    InvalidSample { index: usize, value: f64 },
}

/// An ordered, validated sequence of prices, oldest sample first.
///
/// Every sample is finite and non-negative. The order given at construction is
/// preserved; index 0 is the earliest sample and `len() - 1` the latest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceSeries {
    samples: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from raw samples, rejecting the first invalid one.
    pub fn new(samples: Vec<f64>) -> Result<Self, SeriesError> {
        if let Some((index, &value)) = samples
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(SeriesError::InvalidSample { index, value });
        }
        Ok(Self { samples })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    /// Highest sample, `None` for an empty series.
    pub fn high(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    /// Lowest sample, `None` for an empty series.
    pub fn low(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::min)
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = SeriesError;

    fn try_from(samples: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(samples)
    }
}

impl TryFrom<&[f64]> for PriceSeries {
    type Error = SeriesError;

    fn try_from(samples: &[f64]) -> Result<Self, Self::Error> {
        Self::new(samples.to_vec())
    }
}

impl From<PriceSeries> for Vec<f64> {
    fn from(series: PriceSeries) -> Self {
        series.samples
    }
}

impl AsRef<[f64]> for PriceSeries {
    fn as_ref(&self) -> &[f64] {
        &self.samples
    }
}
