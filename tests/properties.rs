//! Property-based tests for the indicator engine.
//!
//! These tests verify invariants that must hold for all inputs.

use proptest::prelude::*;

use pulse_engine::indicators::{bollinger, fibonacci, macd, predict, rsi};
use pulse_engine::report::{analyze, IndicatorReport};
use pulse_engine::runtime_config::IndicatorSettings;
use pulse_engine::PriceSeries;

// ============================================================================
// Strategies
// ============================================================================

/// A valid price (positive, finite).
fn valid_price() -> impl Strategy<Value = f64> {
    0.01f64..100_000.0
}

fn price_series(min_len: usize, max_len: usize) -> impl Strategy<Value = PriceSeries> {
    prop::collection::vec(valid_price(), min_len..=max_len)
        .prop_map(|v| PriceSeries::new(v).expect("strategy yields valid prices"))
}

fn constant_series(len: usize) -> impl Strategy<Value = (f64, PriceSeries)> {
    valid_price().prop_map(move |p| (p, PriceSeries::new(vec![p; len]).unwrap()))
}

fn increasing_series(len: usize) -> impl Strategy<Value = PriceSeries> {
    (valid_price(), 0.01f64..10.0).prop_map(move |(start, step)| {
        PriceSeries::new((0..len).map(|i| start + step * i as f64).collect()).unwrap()
    })
}

fn decreasing_series(len: usize) -> impl Strategy<Value = PriceSeries> {
    (0.01f64..10.0).prop_map(move |step| {
        let start = step * len as f64 + 1.0;
        PriceSeries::new((0..len).map(|i| start - step * i as f64).collect()).unwrap()
    })
}

// ============================================================================
// RSI
// ============================================================================

proptest! {
    #[test]
    fn rsi_undefined_below_fifteen(prices in price_series(0, 14)) {
        let err = rsi(&prices, 14).unwrap_err();
        prop_assert!(err.is_insufficient_data());
    }

    #[test]
    fn rsi_bounded(prices in price_series(15, 120)) {
        let value = rsi(&prices, 14).unwrap();
        prop_assert!((0.0..=100.0).contains(&value), "RSI {} out of range", value);
    }

    #[test]
    fn rsi_increasing_is_hundred(prices in increasing_series(40)) {
        let value = rsi(&prices, 14).unwrap();
        prop_assert!((value - 100.0).abs() < 1e-9, "got {}", value);
    }

    #[test]
    fn rsi_decreasing_is_zero(prices in decreasing_series(40)) {
        let value = rsi(&prices, 14).unwrap();
        prop_assert!(value.abs() < 1e-9, "got {}", value);
    }
}

// ============================================================================
// MACD
// ============================================================================

proptest! {
    #[test]
    fn macd_defined_iff_slow_samples(prices in price_series(0, 60)) {
        let result = macd(&prices, 12, 26);
        prop_assert_eq!(result.is_ok(), prices.len() >= 26);
    }
}

// ============================================================================
// Bollinger Bands
// ============================================================================

proptest! {
    #[test]
    fn bollinger_bands_ordered(prices in price_series(20, 100), k in 0.0f64..5.0) {
        let bb = bollinger(&prices, 20, k).unwrap();
        prop_assert!(bb.upper >= bb.middle);
        prop_assert!(bb.middle >= bb.lower);
    }

    #[test]
    fn bollinger_constant_collapses((p, prices) in constant_series(30)) {
        let bb = bollinger(&prices, 20, 2.0).unwrap();
        prop_assert_eq!(bb.upper, p);
        prop_assert_eq!(bb.middle, p);
        prop_assert_eq!(bb.lower, p);
    }
}

// ============================================================================
// Fibonacci
// ============================================================================

proptest! {
    #[test]
    fn fibonacci_endpoints_match_extremes(prices in price_series(1, 100)) {
        let levels = fibonacci(&prices).unwrap();
        prop_assert_eq!(levels[0], prices.high().unwrap());
        prop_assert_eq!(levels[5], prices.low().unwrap());
        prop_assert!(levels.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn fibonacci_constant_is_flat((p, prices) in constant_series(10)) {
        let levels = fibonacci(&prices).unwrap();
        prop_assert!(levels.iter().all(|&l| l == p));
    }
}

// ============================================================================
// Prediction & idempotence
// ============================================================================

/// Every float in the report as raw bits, `None` where the field is null.
fn report_bits(report: &IndicatorReport) -> Vec<Option<u64>> {
    let bits = |v: Option<f64>| v.map(f64::to_bits);
    let mut out = vec![
        bits(report.last_price),
        bits(report.rsi),
        bits(report.macd.map(|m| m.macd)),
        bits(report.macd.and_then(|m| m.signal)),
        bits(report.macd.and_then(|m| m.histogram)),
        bits(report.bollinger.map(|b| b.upper)),
        bits(report.bollinger.map(|b| b.middle)),
        bits(report.bollinger.map(|b| b.lower)),
        bits(report.bollinger.and_then(|b| b.width)),
        bits(report.prediction),
        bits(report.trend.map(|t| t.slope)),
        bits(report.trend.map(|t| t.intercept)),
        bits(report.trend.map(|t| t.r_squared)),
    ];
    match report.fibonacci {
        Some(levels) => out.extend(levels.iter().map(|l| Some(l.to_bits()))),
        None => out.push(None),
    }
    out
}

proptest! {
    #[test]
    fn predict_defined_from_two_samples(prices in price_series(0, 30)) {
        prop_assert_eq!(predict(&prices).is_ok(), prices.len() >= 2);
    }

    #[test]
    fn repeated_calls_are_bit_identical(prices in price_series(0, 80)) {
        let settings = IndicatorSettings::default();
        let a = analyze(&prices, &settings).unwrap();
        let b = analyze(&prices, &settings).unwrap();
        prop_assert_eq!(report_bits(&a), report_bits(&b));
        prop_assert_eq!(a.samples, b.samples);
        prop_assert_eq!(a.rsi_zone, b.rsi_zone);
    }
}
