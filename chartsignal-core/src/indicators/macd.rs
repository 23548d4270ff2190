//! MACD: Moving Average Convergence/Divergence.
//!
//! macd = EMA(fast) - EMA(slow), defined from index slow-1.
//! signal = EMA(macd, signal_period), computed over the defined MACD line and
//! therefore starting at index slow + signal_period - 2.
//! histogram = macd - signal.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;

use super::ema::ema_of_series;
use super::PriceSource;

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    source: PriceSource,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_source(fast, slow, signal, PriceSource::Close)
    }

    pub fn with_source(fast: usize, slow: usize, signal: usize, source: PriceSource) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self {
            fast,
            slow,
            signal,
            source,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }

    /// Index of the first slot carrying a signal line.
    pub fn signal_lookback(&self) -> usize {
        self.slow + self.signal - 2
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Macd
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, candles: &[Candle]) -> IndicatorSeries {
        let n = candles.len();
        if n < self.min_candles() {
            return IndicatorSeries::empty();
        }

        let values = self.source.extract(candles);
        let fast = ema_of_series(&values, self.fast);
        let slow = ema_of_series(&values, self.slow);

        let start = self.slow - 1;
        let macd_line: Vec<f64> = (start..n)
            .map(|i| match (fast[i], slow[i]) {
                (Some(f), Some(s)) => f - s,
                // fast < slow, so the fast EMA is always seeded by now
                _ => 0.0,
            })
            .collect();
        let signal_line = ema_of_series(&macd_line, self.signal);

        let mut result = vec![None; n];
        for (offset, &macd) in macd_line.iter().enumerate() {
            let signal = signal_line[offset];
            result[start + offset] = Some(IndicatorValue::Macd {
                macd,
                signal,
                histogram: signal.map(|s| macd - s),
            });
        }

        IndicatorSeries::from_values(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    fn unpack(v: Option<&IndicatorValue>) -> (f64, Option<f64>, Option<f64>) {
        match v {
            Some(IndicatorValue::Macd {
                macd,
                signal,
                histogram,
            }) => (*macd, *signal, *histogram),
            other => panic!("expected MACD slot, got {other:?}"),
        }
    }

    #[test]
    fn macd_warmup_offsets() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64).sin()).collect();
        let candles = make_candles(&closes);
        let indicator = Macd::new(3, 6, 4);
        let result = indicator.compute(&candles);

        assert_eq!(result.len(), 20);
        for i in 0..5 {
            assert!(result.get(i).is_none(), "slot {i} should be warm-up");
        }
        // MACD line defined from slow-1 = 5, signal from slow+signal-2 = 8
        let (_, signal, hist) = unpack(result.get(5));
        assert!(signal.is_none() && hist.is_none());
        let (_, signal, _) = unpack(result.get(7));
        assert!(signal.is_none());
        let (macd, signal, hist) = unpack(result.get(8));
        let signal = signal.unwrap();
        assert_approx(hist.unwrap(), macd - signal, DEFAULT_EPSILON);
        assert_eq!(indicator.signal_lookback(), 8);
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        let candles = make_candles(&closes);
        let result = Macd::new(2, 3, 2).compute(&candles);
        let fast = ema_of_series(&closes, 2);
        let slow = ema_of_series(&closes, 3);
        for i in 2..5 {
            let (macd, _, _) = unpack(result.get(i));
            assert_approx(macd, fast[i].unwrap() - slow[i].unwrap(), DEFAULT_EPSILON);
        }
    }

    #[test]
    fn macd_signal_is_ema_of_macd_line() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        let candles = make_candles(&closes);
        let result = Macd::new(2, 3, 2).compute(&candles);
        let line: Vec<f64> = (2..5).map(|i| unpack(result.get(i)).0).collect();
        // signal seed = mean of first two MACD values, at index 3
        let (_, signal, _) = unpack(result.get(3));
        assert_approx(signal.unwrap(), (line[0] + line[1]) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_too_few_candles() {
        let candles = make_candles(&[1.0; 25]);
        assert!(Macd::new(12, 26, 9).compute(&candles).is_empty());
        let candles = make_candles(&[1.0; 26]);
        assert_eq!(Macd::new(12, 26, 9).compute(&candles).len(), 26);
    }

    #[test]
    #[should_panic]
    fn macd_rejects_fast_not_below_slow() {
        let _ = Macd::new(26, 12, 9);
    }
}
