//! Stochastic Oscillator.
//!
//! Raw %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over `k_period`
//! candles, 50 when the range is zero. %K is optionally smoothed by a simple mean
//! over `smooth` values; %D = SMA(%K, d_period).
//! Lookback: k_period + smooth + d_period - 3 (first slot with a defined %D).

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::sma::sma_of_series;

pub const DEFAULT_OVERBOUGHT: f64 = 80.0;
pub const DEFAULT_OVERSOLD: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    smooth: usize,
    overbought: f64,
    oversold: f64,
    name: String,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize, smooth: usize) -> Self {
        Self::with_zones(k_period, d_period, smooth, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD)
    }

    pub fn with_zones(
        k_period: usize,
        d_period: usize,
        smooth: usize,
        overbought: f64,
        oversold: f64,
    ) -> Self {
        assert!(k_period >= 1, "Stochastic %K period must be >= 1");
        assert!(d_period >= 1, "Stochastic %D period must be >= 1");
        assert!(smooth >= 1, "Stochastic smoothing must be >= 1");
        Self {
            k_period,
            d_period,
            smooth,
            overbought,
            oversold,
            name: format!("stochastic_{k_period}_{d_period}_{smooth}"),
        }
    }
}

/// Raw %K; `None` before index `k_period - 1`.
fn raw_k(candles: &[Candle], k_period: usize) -> Vec<Option<f64>> {
    let n = candles.len();
    let mut result = vec![None; n];
    for i in (k_period - 1)..n {
        let window = &candles[(i + 1 - k_period)..=i];
        let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let range = highest - lowest;
        result[i] = Some(if range == 0.0 {
            50.0
        } else {
            100.0 * (candles[i].close - lowest) / range
        });
    }
    result
}

/// Simple mean over a partially defined series, starting at its first defined slot.
fn smooth_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let Some(start) = values.iter().position(|v| v.is_some()) else {
        return vec![None; n];
    };
    let dense: Vec<f64> = values[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
    let mut result = vec![None; start];
    result.extend(sma_of_series(&dense, period));
    result
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Stochastic
    }

    fn lookback(&self) -> usize {
        self.k_period + self.smooth + self.d_period - 3
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        let n = candles.len();
        if n < self.min_candles() {
            return IndicatorSeries::empty();
        }

        let raw = raw_k(candles, self.k_period);
        let k = if self.smooth > 1 {
            smooth_defined(&raw, self.smooth)
        } else {
            raw
        };
        let d = smooth_defined(&k, self.d_period);

        let values = k
            .iter()
            .zip(&d)
            .map(|(k, d)| match (k, d) {
                (Some(k), Some(d)) => Some(IndicatorValue::Stochastic {
                    k: *k,
                    d: *d,
                    overbought: self.overbought,
                    oversold: self.oversold,
                }),
                _ => None,
            })
            .collect();

        IndicatorSeries::from_values(values)
    }
}
