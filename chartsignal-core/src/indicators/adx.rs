//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. True range, +DM and -DM from consecutive candles (defined from index 1)
//! 2. Wilder-smoothed sums of TR, +DM, -DM: seed = sum of the first `period`
//!    values, then s = s - s / period + x
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = simple mean of the last `period` DX values
//!
//! Lookback: 2 * period - 1.

use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorValue};
use crate::domain::Candle;
use crate::indicators::atr::true_range;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

/// +DM and -DM per Wilder; index 0 is zero.
fn directional_movement(candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
    let n = candles.len();
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];

    for i in 1..n {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;

        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    (plus_dm, minus_dm)
}

/// Wilder running sum; `None` before index `period`.
fn wilder_sum(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if n <= period {
        return result;
    }

    let mut sum: f64 = values[1..=period].iter().sum();
    result[period] = Some(sum);
    for i in (period + 1)..n {
        sum = sum - sum / period as f64 + values[i];
        result[i] = Some(sum);
    }
    result
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Adx
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
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
        let (plus_dm, minus_dm) = directional_movement(candles);

        let smooth_tr = wilder_sum(&tr, self.period);
        let smooth_plus = wilder_sum(&plus_dm, self.period);
        let smooth_minus = wilder_sum(&minus_dm, self.period);

        // (+DI, -DI, DX) from index `period`
        let mut di = vec![None; n];
        for i in self.period..n {
            let (Some(str_), Some(sp), Some(sm)) = (smooth_tr[i], smooth_plus[i], smooth_minus[i])
            else {
                continue;
            };
            let (plus_di, minus_di) = if str_ == 0.0 {
                (0.0, 0.0)
            } else {
                (100.0 * sp / str_, 100.0 * sm / str_)
            };
            let di_sum = plus_di + minus_di;
            let dx = if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            };
            di[i] = Some((plus_di, minus_di, dx));
        }

        let mut result = vec![None; n];
        for i in self.lookback()..n {
            let window = &di[(i + 1 - self.period)..=i];
            let dx_sum: f64 = window.iter().flatten().map(|(_, _, dx)| dx).sum();
            if let Some((plus_di, minus_di, _)) = di[i] {
                result[i] = Some(IndicatorValue::Adx {
                    adx: dx_sum / self.period as f64,
                    plus_di,
                    minus_di,
                });
            }
        }

        IndicatorSeries::from_values(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlcv;

    fn ohlc(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let with_volume: Vec<_> = data.iter().map(|&(o, h, l, c)| (o, h, l, c, 1000.0)).collect();
        make_ohlcv(&with_volume)
    }

    fn unpack(v: &IndicatorValue) -> (f64, f64, f64) {
        match v {
            IndicatorValue::Adx {
                adx,
                plus_di,
                minus_di,
            } => (*adx, *plus_di, *minus_di),
            other => panic!("expected ADX slot, got {other:?}"),
        }
    }

    #[test]
    fn adx_bounds() {
        let candles = ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let series = Adx::new(3).compute(&candles);

        for v in series.iter().flatten() {
            let (adx, plus_di, minus_di) = unpack(v);
            assert!((0.0..=100.0).contains(&adx), "ADX out of bounds: {adx}");
            assert!(plus_di >= 0.0 && minus_di >= 0.0);
        }
    }

    #[test]
    fn adx_strong_trend_is_elevated() {
        let data: Vec<_> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let series = Adx::new(5).compute(&ohlc(&data));

        let (adx, plus_di, minus_di) = unpack(series.get(19).unwrap());
        // Every candle moves up by 5 with no downward movement: -DM is always zero.
        assert_eq!(minus_di, 0.0);
        assert!(plus_di > 0.0);
        assert!((adx - 100.0).abs() < 1e-9, "pure uptrend should give ADX 100, got {adx}");
    }

    #[test]
    fn adx_warmup() {
        let data: Vec<_> = (0..12)
            .map(|i| {
                let base = 100.0 + (i % 3) as f64;
                (base, base + 2.0, base - 2.0, base + 1.0)
            })
            .collect();
        let series = Adx::new(3).compute(&ohlc(&data));
        // lookback = 2 * 3 - 1 = 5
        assert!(series.get(4).is_none());
        assert!(series.get(5).is_some());
    }

    #[test]
    fn adx_lookback() {
        assert_eq!(Adx::new(14).lookback(), 27);
        assert_eq!(Adx::new(14).min_candles(), 28);
    }

    #[test]
    fn adx_too_few_candles() {
        let candles = ohlc(&[(100.0, 105.0, 95.0, 102.0); 5]);
        assert!(Adx::new(3).compute(&candles).is_empty());
    }
}
