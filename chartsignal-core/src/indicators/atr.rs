//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), defined from index 1.
//! First ATR = simple mean of the first `period` true ranges, then Wilder smoothing:
//! atr = (atr * (period - 1) + tr) / period.
//! Lookback: period.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series.
/// TR[0] is `None` (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut tr = vec![None; candles.len()];
    for i in 1..candles.len() {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        tr[i] = Some((h - l).max((h - pc).abs()).max((l - pc).abs()));
    }
    tr
}

/// Wilder average update: `(prev * (period - 1) + x) / period`.
pub fn wilder_step(prev: f64, x: f64, period: usize) -> f64 {
    let p = period as f64;
    (prev * (p - 1.0) + x) / p
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Atr
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        let n = candles.len();
        if n < self.min_candles() {
            return IndicatorSeries::empty();
        }

        let tr: Vec<f64> = true_range(candles)
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        let mut result = vec![None; n];

        let mut atr = tr[1..=self.period].iter().sum::<f64>() / self.period as f64;
        result[self.period] = Some(IndicatorValue::Atr { value: atr });

        for i in (self.period + 1)..n {
            atr = wilder_step(atr, tr[i], self.period);
            result[i] = Some(IndicatorValue::Atr { value: atr });
        }

        IndicatorSeries::from_values(result)
    }
}
