//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = (x[t] - EMA[t-1]) * k + EMA[t-1], with k = 2 / (period + 1).
//! Seed: EMA[period-1] = SMA of the first `period` values.
//! Lookback: period - 1.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::PriceSource;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    source: PriceSource,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self::with_source(period, PriceSource::Close)
    }

    pub fn with_source(period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("ema_{period}"),
        }
    }
}

/// Compute EMA values from a pre-extracted f64 slice.
/// Used by composed indicators (MACD) that need the EMA of an arbitrary series.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    let k = 2.0 / (period as f64 + 1.0);

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        let ema = (values[i] - prev) * k + prev;
        result[i] = Some(ema);
        prev = ema;
    }

    result
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ema
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
            ema_of_series(&values, self.period)
                .into_iter()
                .map(|v| v.map(|value| IndicatorValue::Ema { value }))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::sma::Sma;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&candles);
        assert_approx(result.get(0).unwrap().primary(), 100.0, DEFAULT_EPSILON);
        assert_approx(result.get(1).unwrap().primary(), 200.0, DEFAULT_EPSILON);
        assert_approx(result.get(2).unwrap().primary(), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // Closes: 10, 11, 12, 13, 14
        // k = 2/(3+1) = 0.5
        // Seed at index 2: SMA(10,11,12) = 11.0
        // EMA[3] = (13 - 11) * 0.5 + 11 = 12.0
        // EMA[4] = (14 - 12) * 0.5 + 12 = 13.0
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&candles);

        assert!(result.get(0).is_none());
        assert!(result.get(1).is_none());
        assert_approx(result.get(2).unwrap().primary(), 11.0, DEFAULT_EPSILON);
        assert_approx(result.get(3).unwrap().primary(), 12.0, DEFAULT_EPSILON);
        assert_approx(result.get(4).unwrap().primary(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seed_equals_sma() {
        let candles = make_candles(&[3.0, 7.0, 2.0, 9.0, 4.0, 6.0]);
        let ema = Ema::new(4).compute(&candles);
        let sma = Sma::new(4).compute(&candles);
        assert_eq!(ema.get(3).unwrap().primary(), sma.get(3).unwrap().primary());
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
    }

    #[test]
    fn ema_of_series_matches_indicator() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let indicator_result = Ema::new(3).compute(&candles);
        let series_result = ema_of_series(&closes, 3);
        for (i, expected) in series_result.iter().enumerate() {
            assert_eq!(indicator_result.get(i).map(|v| v.primary()), *expected);
        }
    }
}
