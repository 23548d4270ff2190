//! RSI rules: oversold/overbought zone exits and single-step divergence.

use crate::components::indicator::{IndicatorKind, IndicatorSet, IndicatorValue};
use crate::domain::{Candle, Pattern, PatternType, Strength};

use super::{defined_pairs, DetectionRule};

pub const RSI_OVERSOLD_EXIT: &str = "RSI Oversold Exit";
pub const RSI_OVERBOUGHT_EXIT: &str = "RSI Overbought Exit";
pub const RSI_BULLISH_DIVERGENCE: &str = "RSI Bullish Divergence";
pub const RSI_BEARISH_DIVERGENCE: &str = "RSI Bearish Divergence";

/// Divergence is only checked once this many candles are available.
pub const DIVERGENCE_MIN_CANDLES: usize = 5;

/// RSI crossing up through `oversold` (bullish) or down through `overbought` (bearish).
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiZoneExit;

impl DetectionRule for RsiZoneExit {
    fn name(&self) -> &str {
        "rsi_zone_exit"
    }

    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        let Some(series) = indicators.get(IndicatorKind::Rsi) else {
            return Vec::new();
        };

        let mut patterns = Vec::new();
        for (i, prev, cur) in defined_pairs(series, candles) {
            let (
                IndicatorValue::Rsi { value: prev_rsi, .. },
                IndicatorValue::Rsi {
                    value: rsi,
                    overbought,
                    oversold,
                },
            ) = (*prev, *cur)
            else {
                continue;
            };

            let found = if prev_rsi < oversold && rsi >= oversold {
                Some((
                    RSI_OVERSOLD_EXIT,
                    PatternType::Bullish,
                    format!("RSI crossed up through {oversold} ({prev_rsi:.2} -> {rsi:.2})"),
                    oversold,
                ))
            } else if prev_rsi > overbought && rsi <= overbought {
                Some((
                    RSI_OVERBOUGHT_EXIT,
                    PatternType::Bearish,
                    format!("RSI crossed down through {overbought} ({prev_rsi:.2} -> {rsi:.2})"),
                    overbought,
                ))
            } else {
                None
            };

            if let Some((name, pattern_type, description, level)) = found {
                patterns.push(
                    Pattern::new(
                        name,
                        pattern_type,
                        Strength::Strong,
                        candles[i].timestamp,
                        description,
                    )
                    .with_evidence("rsi", rsi)
                    .with_evidence("prev_rsi", prev_rsi)
                    .with_evidence("level", level),
                );
            }
        }
        patterns
    }
}

/// RSI rising while the low falls (bullish), or RSI falling while the high rises (bearish).
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiDivergence;

impl DetectionRule for RsiDivergence {
    fn name(&self) -> &str {
        "rsi_divergence"
    }

    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        if candles.len() < DIVERGENCE_MIN_CANDLES {
            return Vec::new();
        }
        let Some(series) = indicators.get(IndicatorKind::Rsi) else {
            return Vec::new();
        };

        let mut patterns = Vec::new();
        for (i, prev, cur) in defined_pairs(series, candles) {
            if i + 1 < DIVERGENCE_MIN_CANDLES {
                continue;
            }
            let (prev_rsi, rsi) = (prev.primary(), cur.primary());
            let (before, candle) = (&candles[i - 1], &candles[i]);

            if rsi > prev_rsi && candle.low < before.low {
                patterns.push(
                    Pattern::new(
                        RSI_BULLISH_DIVERGENCE,
                        PatternType::Bullish,
                        Strength::Strong,
                        candle.timestamp,
                        format!("RSI rose to {rsi:.2} while the low fell to {:.4}", candle.low),
                    )
                    .with_evidence("rsi", rsi)
                    .with_evidence("prev_rsi", prev_rsi)
                    .with_evidence("low", candle.low)
                    .with_evidence("prev_low", before.low),
                );
            } else if rsi < prev_rsi && candle.high > before.high {
                patterns.push(
                    Pattern::new(
                        RSI_BEARISH_DIVERGENCE,
                        PatternType::Bearish,
                        Strength::Strong,
                        candle.timestamp,
                        format!("RSI fell to {rsi:.2} while the high rose to {:.4}", candle.high),
                    )
                    .with_evidence("rsi", rsi)
                    .with_evidence("prev_rsi", prev_rsi)
                    .with_evidence("high", candle.high)
                    .with_evidence("prev_high", before.high),
                );
            }
        }
        patterns
    }
}
