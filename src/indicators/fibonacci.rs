// =============================================================================
// Fibonacci Retracement
// =============================================================================
//
// Levels between the series high and low at the standard ratios:
//   range = high - low
//   level = high - ratio * range
// Output follows the ratio order, from the high (0%) down to the low (100%).
// A flat series yields six copies of its value; no division is involved.

use serde::Serialize;

use super::{require_samples, IndicatorError, Result};
use crate::types::PriceSeries;

/// Retracement ratios, finest to coarsest.
pub const FIBONACCI_RATIOS: [f64; 6] = [0.0, 0.236, 0.382, 0.5, 0.618, 1.0];

/// One retracement level paired with its ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Retracement levels of `prices` in [`FIBONACCI_RATIOS`] order.
///
/// The first level is exactly the maximum and the last exactly the minimum.
pub fn fibonacci(prices: &PriceSeries) -> Result<[f64; 6]> {
    require_samples("fibonacci", 1, prices.len())?;
    let (Some(high), Some(low)) = (prices.high(), prices.low()) else {
        return Err(IndicatorError::InsufficientData {
            indicator: "fibonacci",
            required: 1,
            actual: 0,
        });
    };
    let range = high - low;

    let mut levels = FIBONACCI_RATIOS.map(|ratio| high - ratio * range);
    // Pin the endpoints to the observed extremes.
    levels[0] = high;
    levels[FIBONACCI_RATIOS.len() - 1] = low;
    Ok(levels)
}

/// Same as [`fibonacci`], with each level labelled by its ratio.
pub fn fibonacci_levels(prices: &PriceSeries) -> Result<Vec<FibonacciLevel>> {
    let levels = fibonacci(prices)?;
    Ok(FIBONACCI_RATIOS
        .iter()
        .zip(levels)
        .map(|(&ratio, price)| FibonacciLevel { ratio, price })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<f64>) -> PriceSeries {
        PriceSeries::new(values).unwrap()
    }

    #[test]
    fn fibonacci_dashboard_example() {
        let prices = series(vec![100.0, 102.0, 101.0, 105.0, 107.0, 106.0, 110.0]);
        let levels = fibonacci(&prices).unwrap();
        let expected = [110.0, 107.64, 106.18, 105.0, 103.82, 100.0];
        for (got, want) in levels.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-10, "got {got}, expected {want}");
        }
    }

    #[test]
    fn fibonacci_endpoints_are_extremes() {
        let prices = series(vec![0.3, 0.1, 0.2, 0.25]);
        let levels = fibonacci(&prices).unwrap();
        assert_eq!(levels[0], 0.3);
        assert_eq!(levels[5], 0.1);
    }

    #[test]
    fn fibonacci_levels_descend() {
        let prices = series(vec![5.0, 9.0, 1.0, 4.0]);
        let levels = fibonacci(&prices).unwrap();
        assert!(levels.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn fibonacci_flat_series() {
        let levels = fibonacci(&series(vec![7.5; 10])).unwrap();
        assert!(levels.iter().all(|&l| l == 7.5));
    }

    #[test]
    fn fibonacci_single_sample() {
        let levels = fibonacci(&series(vec![3.0])).unwrap();
        assert_eq!(levels, [3.0; 6]);
    }

    #[test]
    fn fibonacci_empty_is_insufficient() {
        let err = fibonacci(&PriceSeries::default()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn labelled_levels_follow_ratio_order() {
        let prices = series(vec![100.0, 110.0]);
        let levels = fibonacci_levels(&prices).unwrap();
        assert_eq!(levels.len(), 6);
        assert_eq!(levels[3].ratio, 0.5);
        assert!((levels[3].price - 105.0).abs() < 1e-10);
    }
}
