//! MACD crossover and histogram sign flip.
//!
//! Crossover (medium): MACD line crosses the signal line. Histogram flip
//! (weak): histogram changes sign. Both need a defined signal line on the
//! previous and current slot.

use crate::components::indicator::{IndicatorKind, IndicatorSet, IndicatorValue};
use crate::domain::{Candle, Pattern, PatternType, Strength};

use super::{defined_pairs, DetectionRule};

pub const MACD_BULLISH_CROSSOVER: &str = "MACD Bullish Crossover";
pub const MACD_BEARISH_CROSSOVER: &str = "MACD Bearish Crossover";
pub const MACD_HISTOGRAM_POSITIVE: &str = "MACD Histogram Positive";
pub const MACD_HISTOGRAM_NEGATIVE: &str = "MACD Histogram Negative";

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdCrossover;

impl DetectionRule for MacdCrossover {
    fn name(&self) -> &str {
        "macd_crossover"
    }

    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        let Some(series) = indicators.get(IndicatorKind::Macd) else {
            return Vec::new();
        };

        let mut patterns = Vec::new();
        for (i, prev, cur) in defined_pairs(series, candles) {
            let (
                IndicatorValue::Macd {
                    macd: prev_macd,
                    signal: Some(prev_signal),
                    histogram: Some(prev_hist),
                },
                IndicatorValue::Macd {
                    macd,
                    signal: Some(signal),
                    histogram: Some(hist),
                },
            ) = (*prev, *cur)
            else {
                continue;
            };
            let ts = candles[i].timestamp;

            let cross = if prev_macd <= prev_signal && macd > signal {
                Some((MACD_BULLISH_CROSSOVER, PatternType::Bullish, "above"))
            } else if prev_macd >= prev_signal && macd < signal {
                Some((MACD_BEARISH_CROSSOVER, PatternType::Bearish, "below"))
            } else {
                None
            };
            if let Some((name, pattern_type, side)) = cross {
                patterns.push(
                    Pattern::new(
                        name,
                        pattern_type,
                        Strength::Medium,
                        ts,
                        format!("MACD crossed {side} its signal line ({macd:.4} vs {signal:.4})"),
                    )
                    .with_evidence("macd", macd)
                    .with_evidence("signal", signal)
                    .with_evidence("prev_macd", prev_macd)
                    .with_evidence("prev_signal", prev_signal),
                );
            }

            let flip = if prev_hist < 0.0 && hist > 0.0 {
                Some((MACD_HISTOGRAM_POSITIVE, PatternType::Bullish, "positive"))
            } else if prev_hist > 0.0 && hist < 0.0 {
                Some((MACD_HISTOGRAM_NEGATIVE, PatternType::Bearish, "negative"))
            } else {
                None
            };
            if let Some((name, pattern_type, sign)) = flip {
                patterns.push(
                    Pattern::new(
                        name,
                        pattern_type,
                        Strength::Weak,
                        ts,
                        format!("MACD histogram turned {sign} ({prev_hist:.4} -> {hist:.4})"),
                    )
                    .with_evidence("histogram", hist)
                    .with_evidence("prev_histogram", prev_hist),
                );
            }
        }
        patterns
    }
}
