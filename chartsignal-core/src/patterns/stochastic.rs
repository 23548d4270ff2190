//! Stochastic %K/%D crossovers and zone exits.
//!
//! A %K/%D crossover while %K sits beyond the oversold (bullish) or overbought
//! (bearish) level is strong. A plain exit of %K from a zone is medium.

use crate::components::indicator::{IndicatorKind, IndicatorSet, IndicatorValue};
use crate::domain::{Candle, Pattern, PatternType, Strength};

use super::{defined_pairs, DetectionRule};

pub const STOCHASTIC_BULLISH_CROSSOVER: &str = "Stochastic Bullish Crossover";
pub const STOCHASTIC_BEARISH_CROSSOVER: &str = "Stochastic Bearish Crossover";
pub const STOCHASTIC_OVERSOLD_EXIT: &str = "Stochastic Oversold Exit";
pub const STOCHASTIC_OVERBOUGHT_EXIT: &str = "Stochastic Overbought Exit";

#[derive(Debug, Clone, Copy, Default)]
pub struct StochasticCrossover;

impl DetectionRule for StochasticCrossover {
    fn name(&self) -> &str {
        "stochastic_crossover"
    }

    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        let Some(series) = indicators.get(IndicatorKind::Stochastic) else {
            return Vec::new();
        };

        let mut patterns = Vec::new();
        for (i, prev, cur) in defined_pairs(series, candles) {
            let (
                IndicatorValue::Stochastic {
                    k: prev_k,
                    d: prev_d,
                    ..
                },
                IndicatorValue::Stochastic {
                    k,
                    d,
                    overbought,
                    oversold,
                },
            ) = (*prev, *cur)
            else {
                continue;
            };
            let ts = candles[i].timestamp;
            let make = |name: &str,
                        pattern_type: PatternType,
                        strength: Strength,
                        description: String| {
                Pattern::new(name, pattern_type, strength, ts, description)
                    .with_evidence("k", k)
                    .with_evidence("d", d)
                    .with_evidence("prev_k", prev_k)
                    .with_evidence("prev_d", prev_d)
            };

            if prev_k <= prev_d && k > d && k < oversold {
                patterns.push(make(
                    STOCHASTIC_BULLISH_CROSSOVER,
                    PatternType::Bullish,
                    Strength::Strong,
                    format!("%K crossed above %D below {oversold} ({k:.2} vs {d:.2})"),
                ));
            } else if prev_k >= prev_d && k < d && k > overbought {
                patterns.push(make(
                    STOCHASTIC_BEARISH_CROSSOVER,
                    PatternType::Bearish,
                    Strength::Strong,
                    format!("%K crossed below %D above {overbought} ({k:.2} vs {d:.2})"),
                ));
            }

            if prev_k < oversold && k >= oversold {
                patterns.push(make(
                    STOCHASTIC_OVERSOLD_EXIT,
                    PatternType::Bullish,
                    Strength::Medium,
                    format!("%K left the oversold zone ({prev_k:.2} -> {k:.2})"),
                ));
            } else if prev_k > overbought && k <= overbought {
                patterns.push(make(
                    STOCHASTIC_OVERBOUGHT_EXIT,
                    PatternType::Bearish,
                    Strength::Medium,
                    format!("%K left the overbought zone ({prev_k:.2} -> {k:.2})"),
                ));
            }
        }
        patterns
    }
}
