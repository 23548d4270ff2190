//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(source, period)
//! - Upper: middle + mult * stddev(source, period)
//! - Lower: middle - mult * stddev(source, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::sma::window_mean;
use super::PriceSource;

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    source: PriceSource,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self::with_source(period, multiplier, PriceSource::Close)
    }

    pub fn with_source(period: usize, multiplier: f64, source: PriceSource) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        assert!(multiplier >= 0.0, "Bollinger multiplier must be >= 0");
        Self {
            period,
            multiplier,
            source,
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Bollinger
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        let n = candles.len();
        if n < self.min_candles() {
            return IndicatorSeries::empty();
        }

        let values = self.source.extract(candles);
        let period = self.period as f64;
        let mut result = vec![None; n];

        for i in (self.period - 1)..n {
            let window = &values[(i + 1 - self.period)..=i];
            let mean = window_mean(window);
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period;
            let stddev = variance.sqrt();

            result[i] = Some(IndicatorValue::Bollinger {
                upper: mean + self.multiplier * stddev,
                middle: mean,
                lower: mean - self.multiplier * stddev,
            });
        }

        IndicatorSeries::from_values(result)
    }
}
