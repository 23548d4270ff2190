//! Commodity Channel Index (CCI).
//!
//! TP = (high + low + close) / 3
//! CCI = (TP - SMA(TP, period)) / (constant * mean_abs_deviation(TP, period)),
//! 0 when the mean deviation is zero.
//! Lookback: period - 1.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::sma::window_mean;

pub const DEFAULT_CONSTANT: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    constant: f64,
    name: String,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        Self::with_constant(period, DEFAULT_CONSTANT)
    }

    pub fn with_constant(period: usize, constant: f64) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        assert!(constant > 0.0, "CCI constant must be > 0");
        Self {
            period,
            constant,
            name: format!("cci_{period}"),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Cci
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        let n = candles.len();
        if n < self.min_candles() {
            return IndicatorSeries::empty();
        }

        let tp: Vec<f64> = candles.iter().map(Candle::typical_price).collect();
        let period = self.period as f64;
        let mut result = vec![None; n];

        for i in (self.period - 1)..n {
            let window = &tp[(i + 1 - self.period)..=i];
            let mean = window_mean(window);
            let mean_dev = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period;
            let value = if mean_dev == 0.0 {
                0.0
            } else {
                (tp[i] - mean) / (self.constant * mean_dev)
            };
            result[i] = Some(IndicatorValue::Cci { value });
        }

        IndicatorSeries::from_values(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlcv, DEFAULT_EPSILON};

    #[test]
    fn cci_known_value() {
        // TP = 10, 11, 12 (high = low = close)
        // mean = 11, mean deviation = 2/3
        // CCI = (12 - 11) / (0.015 * 2/3) = 100
        let candles = make_ohlcv(&[
            (10.0, 10.0, 10.0, 10.0, 1.0),
            (11.0, 11.0, 11.0, 11.0, 1.0),
            (12.0, 12.0, 12.0, 12.0, 1.0),
        ]);
        let series = Cci::new(3).compute(&candles);
        assert!(series.get(1).is_none());
        assert_approx(series.get(2).unwrap().primary(), 100.0, 1e-9);
    }

    #[test]
    fn cci_flat_prices_are_zero() {
        let candles = make_ohlcv(&[(5.0, 6.0, 4.0, 5.0, 1.0); 4]);
        let series = Cci::new(3).compute(&candles);
        assert_approx(series.get(3).unwrap().primary(), 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn cci_constant_scales_inversely() {
        let candles = make_ohlcv(&[
            (10.0, 10.0, 10.0, 10.0, 1.0),
            (11.0, 11.0, 11.0, 11.0, 1.0),
            (12.0, 12.0, 12.0, 12.0, 1.0),
        ]);
        let series = Cci::with_constant(3, 0.03).compute(&candles);
        assert_approx(series.get(2).unwrap().primary(), 50.0, 1e-9);
    }
}
