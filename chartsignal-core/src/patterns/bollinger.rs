//! Bollinger band bounces and breakouts.
//!
//! Bounce (medium): the previous candle touched a band and the current candle
//! closes back inside both bands. Breakout (strong): the close moves from
//! inside to outside a band.

use crate::components::indicator::{IndicatorKind, IndicatorSet, IndicatorValue};
use crate::domain::{Candle, Pattern, PatternType, Strength};

use super::{defined_pairs, DetectionRule};

pub const BOLLINGER_LOWER_BOUNCE: &str = "Bollinger Lower Bounce";
pub const BOLLINGER_UPPER_BOUNCE: &str = "Bollinger Upper Bounce";
pub const BOLLINGER_UPPER_BREAKOUT: &str = "Bollinger Upper Breakout";
pub const BOLLINGER_LOWER_BREAKOUT: &str = "Bollinger Lower Breakout";

#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerBands;

impl DetectionRule for BollingerBands {
    fn name(&self) -> &str {
        "bollinger_bands"
    }

    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        let Some(series) = indicators.get(IndicatorKind::Bollinger) else {
            return Vec::new();
        };

        let mut patterns = Vec::new();
        for (i, prev, cur) in defined_pairs(series, candles) {
            let (
                IndicatorValue::Bollinger {
                    upper: prev_upper,
                    lower: prev_lower,
                    ..
                },
                IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                },
            ) = (*prev, *cur)
            else {
                continue;
            };
            let (before, candle) = (&candles[i - 1], &candles[i]);
            let close = candle.close;
            let inside = close > lower && close < upper;

            let found = if before.low <= prev_lower && inside {
                Some((
                    BOLLINGER_LOWER_BOUNCE,
                    PatternType::Bullish,
                    Strength::Medium,
                    "Price bounced off the lower band",
                ))
            } else if before.high >= prev_upper && inside {
                Some((
                    BOLLINGER_UPPER_BOUNCE,
                    PatternType::Bearish,
                    Strength::Medium,
                    "Price rejected at the upper band",
                ))
            } else if before.close <= prev_upper && close > upper {
                Some((
                    BOLLINGER_UPPER_BREAKOUT,
                    PatternType::Bullish,
                    Strength::Strong,
                    "Close broke out above the upper band",
                ))
            } else if before.close >= prev_lower && close < lower {
                Some((
                    BOLLINGER_LOWER_BREAKOUT,
                    PatternType::Bearish,
                    Strength::Strong,
                    "Close broke down below the lower band",
                ))
            } else {
                None
            };

            if let Some((name, pattern_type, strength, text)) = found {
                patterns.push(
                    Pattern::new(
                        name,
                        pattern_type,
                        strength,
                        candle.timestamp,
                        format!("{text} (close {close:.4}, bands {lower:.4}..{upper:.4})"),
                    )
                    .with_evidence("close", close)
                    .with_evidence("upper", upper)
                    .with_evidence("middle", middle)
                    .with_evidence("lower", lower),
                );
            }
        }
        patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlcv;
    use crate::patterns::test_support::set_of;

    fn bands(upper: f64, middle: f64, lower: f64) -> Option<IndicatorValue> {
        Some(IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        })
    }

    #[test]
    fn lower_bounce() {
        let candles = make_ohlcv(&[
            (97.0, 97.5, 94.0, 95.0, 1000.0),
            (95.0, 98.0, 94.5, 97.5, 1000.0),
        ]);
        let set = set_of(
            IndicatorKind::Bollinger,
            vec![bands(106.0, 100.0, 95.0), bands(106.0, 100.0, 95.0)],
        );
        let patterns = BollingerBands.detect(&candles, &set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, BOLLINGER_LOWER_BOUNCE);
        assert_eq!(patterns[0].strength, Strength::Medium);
    }

    #[test]
    fn upper_bounce() {
        let candles = make_ohlcv(&[
            (104.0, 106.5, 103.0, 105.0, 1000.0),
            (105.0, 105.5, 102.0, 103.0, 1000.0),
        ]);
        let set = set_of(
            IndicatorKind::Bollinger,
            vec![bands(106.0, 100.0, 94.0), bands(106.0, 100.0, 94.0)],
        );
        let patterns = BollingerBands.detect(&candles, &set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, BOLLINGER_UPPER_BOUNCE);
        assert!(patterns[0].is_bearish());
    }

    #[test]
    fn upper_breakout() {
        let candles = make_ohlcv(&[
            (103.0, 104.0, 102.0, 103.5, 1000.0),
            (103.5, 108.0, 103.0, 107.5, 1000.0),
        ]);
        let set = set_of(
            IndicatorKind::Bollinger,
            vec![bands(106.0, 100.0, 94.0), bands(106.5, 100.5, 94.5)],
        );
        let patterns = BollingerBands.detect(&candles, &set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, BOLLINGER_UPPER_BREAKOUT);
        assert_eq!(patterns[0].strength, Strength::Strong);
    }

    #[test]
    fn lower_breakout() {
        let candles = make_ohlcv(&[
            (97.0, 98.0, 96.0, 96.5, 1000.0),
            (96.5, 97.0, 92.0, 93.0, 1000.0),
        ]);
        let set = set_of(
            IndicatorKind::Bollinger,
            vec![bands(106.0, 100.0, 94.0), bands(105.5, 99.5, 93.5)],
        );
        let patterns = BollingerBands.detect(&candles, &set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name, BOLLINGER_LOWER_BREAKOUT);
    }

    #[test]
    fn quiet_inside_the_bands() {
        let candles = make_ohlcv(&[
            (100.0, 101.0, 99.0, 100.5, 1000.0),
            (100.5, 101.5, 99.5, 101.0, 1000.0),
        ]);
        let set = set_of(
            IndicatorKind::Bollinger,
            vec![bands(106.0, 100.0, 94.0), bands(106.0, 100.0, 94.0)],
        );
        assert!(BollingerBands.detect(&candles, &set).is_empty());
    }
}
