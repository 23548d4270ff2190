//! Relative Strength Index (RSI).
//!
//! Seed: simple mean of gains and losses over the first `period` deltas.
//! Then Wilder smoothing: avg = (avg * (period - 1) + x) / period.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss); avg_loss == 0 → RSI = 100.
//! Lookback: period.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::PriceSource;

pub const DEFAULT_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    source: PriceSource,
    overbought: f64,
    oversold: f64,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self::with_zones(period, PriceSource::Close, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD)
    }

    /// RSI with explicit source and zone thresholds carried on every slot.
    pub fn with_zones(period: usize, source: PriceSource, overbought: f64, oversold: f64) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            source,
            overbought,
            oversold,
            name: format!("rsi_{period}"),
        }
    }

    fn slot(&self, avg_gain: f64, avg_loss: f64) -> Option<IndicatorValue> {
        Some(IndicatorValue::Rsi {
            value: compute_rsi(avg_gain, avg_loss),
            overbought: self.overbought,
            oversold: self.oversold,
        })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        let n = candles.len();
        if n < self.min_candles() {
            return IndicatorSeries::empty();
        }

        let values = self.source.extract(candles);
        let period = self.period as f64;
        let mut result = vec![None; n];

        // Seed: average gain and average loss over first `period` changes
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for i in 1..=self.period {
            let ch = values[i] - values[i - 1];
            if ch > 0.0 {
                avg_gain += ch;
            } else {
                avg_loss -= ch;
            }
        }
        avg_gain /= period;
        avg_loss /= period;
        result[self.period] = self.slot(avg_gain, avg_loss);

        // Wilder smoothing for subsequent values
        for i in (self.period + 1)..n {
            let ch = values[i] - values[i - 1];
            let gain = if ch > 0.0 { ch } else { 0.0 };
            let loss = if ch < 0.0 { -ch } else { 0.0 };

            avg_gain = (avg_gain * (period - 1.0) + gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss) / period;

            result[i] = self.slot(avg_gain, avg_loss);
        }

        IndicatorSeries::from_values(result)
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
