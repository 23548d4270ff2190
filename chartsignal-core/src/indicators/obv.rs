//! On-Balance Volume (OBV).
//!
//! Running sum starting at zero on the first candle: volume is added when the
//! close rises, subtracted when it falls, unchanged on a tie.
//! Lookback: 0.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Obv {
    name: String,
}

impl Obv {
    pub fn new() -> Self {
        Self {
            name: "obv".to_string(),
        }
    }
}

impl Default for Obv {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Obv
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        if candles.is_empty() {
            return IndicatorSeries::empty();
        }

        let mut obv = 0.0;
        let mut result = Vec::with_capacity(candles.len());
        result.push(Some(IndicatorValue::Obv { value: obv }));

        for pair in candles.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if cur.close > prev.close {
                obv += cur.volume;
            } else if cur.close < prev.close {
                obv -= cur.volume;
            }
            result.push(Some(IndicatorValue::Obv { value: obv }));
        }

        IndicatorSeries::from_values(result)
    }
}
