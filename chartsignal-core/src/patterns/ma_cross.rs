//! Moving average cross: golden cross and death cross of price over an MA.
//!
//! Bullish "Golden Cross" when the previous close is below the previous MA and
//! the current close is above the current MA; "Death Cross" is the mirror.
//! When both EMA and SMA series are supplied only the EMA is checked.

use crate::components::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::{Candle, Pattern, PatternType, Strength};

use super::{defined_pairs, DetectionRule};

pub const GOLDEN_CROSS: &str = "Golden Cross";
pub const DEATH_CROSS: &str = "Death Cross";

#[derive(Debug, Clone)]
pub struct MaCross {
    kind: IndicatorKind,
    name: String,
}

impl MaCross {
    /// `kind` must be `Sma` or `Ema`.
    pub fn new(kind: IndicatorKind) -> Self {
        assert!(
            matches!(kind, IndicatorKind::Sma | IndicatorKind::Ema),
            "MA cross needs an SMA or EMA series"
        );
        Self {
            kind,
            name: format!("{kind}_cross"),
        }
    }
}

impl DetectionRule for MaCross {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        if self.kind == IndicatorKind::Sma && indicators.get(IndicatorKind::Ema).is_some() {
            return Vec::new();
        }
        let Some(series) = indicators.get(self.kind) else {
            return Vec::new();
        };
        let label = self.kind.label().to_ascii_uppercase();

        let mut patterns = Vec::new();
        for (i, prev, cur) in defined_pairs(series, candles) {
            let (prev_ma, cur_ma) = (prev.primary(), cur.primary());
            let (prev_close, cur_close) = (candles[i - 1].close, candles[i].close);

            let found = if prev_close < prev_ma && cur_close > cur_ma {
                Some((GOLDEN_CROSS, PatternType::Bullish, "above"))
            } else if prev_close > prev_ma && cur_close < cur_ma {
                Some((DEATH_CROSS, PatternType::Bearish, "below"))
            } else {
                None
            };

            if let Some((name, pattern_type, side)) = found {
                patterns.push(
                    Pattern::new(
                        name,
                        pattern_type,
                        Strength::Medium,
                        candles[i].timestamp,
                        format!("Close crossed {side} {label} ({cur_close:.4} vs {cur_ma:.4})"),
                    )
                    .with_evidence("close", cur_close)
                    .with_evidence("ma", cur_ma)
                    .with_evidence("prev_close", prev_close)
                    .with_evidence("prev_ma", prev_ma),
                );
            }
        }
        patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::indicator::{IndicatorSeries, IndicatorValue};
    use crate::indicators::make_candles;
    use crate::patterns::test_support::set_of;

    fn sma(values: &[Option<f64>]) -> Vec<Option<IndicatorValue>> {
        values.iter().map(|v| v.map(|value| IndicatorValue::Sma { value })).collect()
    }

    #[test]
    fn golden_cross_on_close_crossing_above() {
        let candles = make_candles(&[100.0, 98.0, 103.0]);
        let set = set_of(IndicatorKind::Sma, sma(&[None, Some(100.0), Some(101.0)]));
        let patterns = MaCross::new(IndicatorKind::Sma).detect(&candles, &set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, GOLDEN_CROSS);
        assert_eq!(patterns[0].pattern_type, PatternType::Bullish);
        assert_eq!(patterns[0].strength, Strength::Medium);
        assert_eq!(patterns[0].timestamp, candles[2].timestamp);
        assert_eq!(patterns[0].evidence["ma"], 101.0);
    }

    #[test]
    fn death_cross_on_close_crossing_below() {
        let candles = make_candles(&[100.0, 102.0, 99.0]);
        let set = set_of(IndicatorKind::Sma, sma(&[None, Some(100.0), Some(100.5)]));
        let patterns = MaCross::new(IndicatorKind::Sma).detect(&candles, &set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, DEATH_CROSS);
        assert!(patterns[0].is_bearish());
    }

    #[test]
    fn touching_the_ma_is_not_a_cross() {
        let candles = make_candles(&[100.0, 100.0, 103.0]);
        let set = set_of(IndicatorKind::Sma, sma(&[None, Some(100.0), Some(101.0)]));
        assert!(MaCross::new(IndicatorKind::Sma).detect(&candles, &set).is_empty());
    }

    #[test]
    fn sma_rule_defers_to_ema() {
        let candles = make_candles(&[100.0, 98.0, 103.0]);
        let mut set = set_of(IndicatorKind::Sma, sma(&[None, Some(100.0), Some(101.0)]));
        set.insert(
            IndicatorKind::Ema,
            IndicatorSeries::from_values(vec![
                None,
                Some(IndicatorValue::Ema { value: 90.0 }),
                Some(IndicatorValue::Ema { value: 91.0 }),
            ]),
        );
        assert!(MaCross::new(IndicatorKind::Sma).detect(&candles, &set).is_empty());
        // Close was above the EMA on both candles: no EMA cross either
        assert!(MaCross::new(IndicatorKind::Ema).detect(&candles, &set).is_empty());
    }
}
