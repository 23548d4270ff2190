//! Simple Moving Average (SMA).
//!
//! Rolling mean of the source values over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::PriceSource;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: PriceSource,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self::with_source(period, PriceSource::Close)
    }

    pub fn with_source(period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("sma_{period}"),
        }
    }
}

/// Arithmetic mean of one window.
///
/// Every window is summed from scratch so SMA, the Bollinger middle band and
/// the CCI mean agree bit for bit on the same data.
pub fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Arithmetic mean of `values` over each window; `None` before index `period - 1`.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    for (offset, window) in values.windows(period).enumerate() {
        result[offset + period - 1] = Some(window_mean(window));
    }

    result
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Sma
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        if candles.len() < self.min_candles() {
            return IndicatorSeries::empty();
        }
        let values = self.source.extract(candles);
        IndicatorSeries::from_values(
            sma_of_series(&values, self.period)
                .into_iter()
                .map(|v| v.map(|value| IndicatorValue::Sma { value }))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    fn values(series: &IndicatorSeries) -> Vec<Option<f64>> {
        series.iter().map(|v| v.map(|v| v.primary())).collect()
    }

    #[test]
    fn sma_5_basic() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = values(&Sma::new(5).compute(&candles));

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_none(), "expected warm-up slot at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result[5].unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(result[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        let result = values(&Sma::new(1).compute(&candles));
        assert_eq!(result, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn sma_reads_configured_source() {
        let candles = make_candles(&[10.0, 12.0]);
        // open = [10, 10], so SMA(2) of opens = 10
        let result = Sma::with_source(2, PriceSource::Open).compute(&candles);
        assert_approx(result.get(1).unwrap().primary(), 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(20).min_candles(), 20);
        assert_eq!(Sma::new(1).lookback(), 0);
    }

    #[test]
    fn sma_matches_bollinger_middle_exactly() {
        use crate::indicators::Bollinger;

        // Large level plus small oscillation: a running sum drifts here.
        let closes: Vec<f64> = (0..5_000)
            .map(|i| 1.0e7 + (i as f64 * 0.37).sin() * 123.456 + (i % 7) as f64 * 0.1)
            .collect();
        let candles = make_candles(&closes);
        let sma = Sma::new(20).compute(&candles);
        let bands = Bollinger::new(20, 2.0).compute(&candles);

        for i in 19..closes.len() {
            let Some(IndicatorValue::Bollinger { middle, .. }) = bands.get(i) else {
                panic!("missing band at {i}");
            };
            assert_eq!(sma.get(i).unwrap().primary(), *middle, "index {i}");
        }
    }

    #[test]
    fn sma_too_few_candles_is_empty() {
        let candles = make_candles(&[10.0, 11.0]);
        assert!(Sma::new(5).compute(&candles).is_empty());
    }
}
