//! Look-ahead contamination tests for every indicator.
//!
//! Invariant: no derived value at index t may depend on samples after t.
//!
//! Method: compute on a truncated series (samples 0..len) and on the full
//! series (0..400). Indices 0..len must agree. Any difference means a value
//! leaked from the future into the past.

use chartlab_core::domain::{Sample, SourceSeries, VecSeries};
use chartlab_core::engine::IndicatorCache;
use chartlab_core::indicators::{
    AdxParams, AtrParams, BollingerParams, DonchianParams, IchimokuParams, Indicator, MacdParams,
    ParabolicSarParams, RsiParams, StochasticParams,
};

/// Generate N samples of synthetic OHLCV data with realistic variation.
fn make_test_samples(n: usize) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price += change;
        price = f64::max(price, 10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        let high = open.max(close) + 2.0;
        let low = open.min(close) - 2.0;

        samples.push(Sample::new(
            i as f64,
            open,
            high,
            low,
            close,
            1000.0 + i as f64 * 100.0,
        ));
    }

    samples
}

fn all_indicators() -> Vec<Indicator> {
    vec![
        Indicator::Atr(AtrParams { period: 14 }),
        Indicator::Atr(AtrParams { period: 3 }),
        Indicator::Adx(AdxParams { period: 14 }),
        Indicator::Rsi(RsiParams { period: 14 }),
        Indicator::Rsi(RsiParams { period: 2 }),
        Indicator::Macd(MacdParams::default()),
        Indicator::Macd(MacdParams {
            fast: 5,
            slow: 13,
            signal: 4,
        }),
        Indicator::Stochastic(StochasticParams::default()),
        Indicator::Stochastic(StochasticParams {
            k_period: 5,
            d_period: 5,
        }),
        Indicator::Donchian(DonchianParams { period: 20 }),
        Indicator::Obv,
        Indicator::Bollinger(BollingerParams::default()),
        Indicator::Bollinger(BollingerParams {
            period: 7,
            std_dev_factor: 1.5,
        }),
        Indicator::Ichimoku(IchimokuParams {
            tenkan: 3,
            kijun: 8,
            senkou_b: 16,
            displacement: 8,
        }),
        Indicator::ParabolicSar(ParabolicSarParams::default()),
        Indicator::ParabolicSar(ParabolicSarParams {
            af_start: 0.01,
            af_step: 0.01,
            af_max: 0.1,
        }),
    ]
}

/// Assert that every line agrees on 0..truncated_len between a truncated and a
/// full computation.
fn assert_no_lookahead(indicator: &Indicator, full: &[Sample], truncated_len: usize) {
    let full_series = VecSeries::from_samples(full.to_vec());
    let truncated_series = VecSeries::from_samples(full[..truncated_len].to_vec());

    let mut full_cache = IndicatorCache::new();
    let mut truncated_cache = IndicatorCache::new();
    full_cache.ensure_fresh(&full_series, indicator);
    truncated_cache.ensure_fresh(&truncated_series, indicator);

    assert!(full_cache.is_ready(), "{}: full run not ready", indicator.label());
    assert!(
        truncated_cache.is_ready(),
        "{}: truncated run not ready",
        indicator.label()
    );
    assert_eq!(truncated_cache.len(), truncated_series.len());

    for line in 0..indicator.line_count() {
        let t = truncated_cache.line(line).unwrap();
        let f = full_cache.line(line).unwrap();
        for i in 0..truncated_len {
            assert!(
                (t[i] - f[i]).abs() < 1e-10,
                "{} line {line}: look-ahead contamination at {i}: truncated={}, full={}",
                indicator.label(),
                t[i],
                f[i]
            );
        }
    }
}

#[test]
fn no_indicator_looks_ahead() {
    let samples = make_test_samples(400);
    for indicator in all_indicators() {
        for len in [60, 150, 399] {
            assert_no_lookahead(&indicator, &samples, len);
        }
    }
}

#[test]
fn appending_only_extends_lines() {
    let samples = make_test_samples(300);
    let indicator = Indicator::Adx(AdxParams::default());
    let mut series = VecSeries::from_samples(samples[..200].to_vec());
    let mut cache = IndicatorCache::new();

    cache.ensure_fresh(&series, &indicator);
    let before: Vec<f64> = cache.line(0).unwrap().to_vec();

    series.extend(samples[200..].iter().copied());
    cache.ensure_fresh(&series, &indicator);
    let after = cache.line(0).unwrap();

    assert_eq!(after.len(), 300);
    for i in 0..200 {
        assert_eq!(before[i].to_bits(), after[i].to_bits(), "index {i}");
    }
}
