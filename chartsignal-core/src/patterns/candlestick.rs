//! Candlestick shapes on the most recent one to three candles.
//!
//! All thresholds are ratios of body or shadow length to the candle range
//! (`high - low`). A zero-range candle never matches a ratio test.

use crate::components::indicator::IndicatorSet;
use crate::domain::{Candle, Pattern, PatternType, Strength};

use super::DetectionRule;

pub const HAMMER: &str = "Hammer";
pub const HANGING_MAN: &str = "Hanging Man";
pub const BULLISH_ENGULFING: &str = "Bullish Engulfing";
pub const BEARISH_ENGULFING: &str = "Bearish Engulfing";
pub const DOJI: &str = "Doji";
pub const MORNING_STAR: &str = "Morning Star";
pub const EVENING_STAR: &str = "Evening Star";

pub const HAMMER_MAX_BODY: f64 = 0.3;
pub const HAMMER_MAX_UPPER_SHADOW: f64 = 0.1;
pub const HAMMER_MIN_LOWER_SHADOW: f64 = 0.6;
pub const DOJI_MAX_BODY: f64 = 0.05;
/// Minimum body/range of the first candle of a star.
pub const STAR_MIN_FIRST_BODY: f64 = 0.5;
/// Maximum body of the middle star candle relative to the first candle's body.
pub const STAR_MAX_MIDDLE_BODY: f64 = 0.3;

/// `part / range`, `None` for a zero-range candle.
fn ratio(part: f64, candle: &Candle) -> Option<f64> {
    let range = candle.range();
    (range > 0.0).then(|| part / range)
}

fn is_hammer_shape(c: &Candle) -> bool {
    match (
        ratio(c.body(), c),
        ratio(c.upper_shadow(), c),
        ratio(c.lower_shadow(), c),
    ) {
        (Some(body), Some(upper), Some(lower)) => {
            body <= HAMMER_MAX_BODY
                && upper <= HAMMER_MAX_UPPER_SHADOW
                && lower >= HAMMER_MIN_LOWER_SHADOW
        }
        _ => false,
    }
}

fn is_doji(c: &Candle) -> bool {
    ratio(c.body(), c).is_some_and(|body| body <= DOJI_MAX_BODY)
}

fn shape_evidence(pattern: Pattern, c: &Candle) -> Pattern {
    pattern
        .with_evidence("open", c.open)
        .with_evidence("high", c.high)
        .with_evidence("low", c.low)
        .with_evidence("close", c.close)
}

/// Hammer shape on the latest candle, whatever came before it.
fn hammer(candles: &[Candle]) -> Option<Pattern> {
    let cur = candles.last()?;
    if !is_hammer_shape(cur) {
        return None;
    }
    Some(shape_evidence(
        Pattern::new(
            HAMMER,
            PatternType::Bullish,
            Strength::Medium,
            cur.timestamp,
            "Small body near the high with a long lower shadow",
        ),
        cur,
    ))
}

/// Hammer shape opening above the previous close. Reported in addition to
/// the hammer on the same candle.
fn hanging_man(candles: &[Candle]) -> Option<Pattern> {
    let [prev, cur] = candles.get(candles.len().checked_sub(2)?..)? else {
        return None;
    };
    if !is_hammer_shape(cur) || prev.close >= cur.open {
        return None;
    }
    Some(
        shape_evidence(
            Pattern::new(
                HANGING_MAN,
                PatternType::Bearish,
                Strength::Medium,
                cur.timestamp,
                "Hammer shape after an advance",
            ),
            cur,
        )
        .with_evidence("prev_close", prev.close),
    )
}

fn engulfing(candles: &[Candle]) -> Option<Pattern> {
    let [prev, cur] = candles.get(candles.len().checked_sub(2)?..)? else {
        return None;
    };
    let (name, pattern_type, text) = if prev.is_bearish()
        && cur.is_bullish()
        && cur.open <= prev.close
        && cur.close >= prev.open
    {
        (
            BULLISH_ENGULFING,
            PatternType::Bullish,
            "Bullish body engulfs the prior bearish body",
        )
    } else if prev.is_bullish()
        && cur.is_bearish()
        && cur.open >= prev.close
        && cur.close <= prev.open
    {
        (
            BEARISH_ENGULFING,
            PatternType::Bearish,
            "Bearish body engulfs the prior bullish body",
        )
    } else {
        return None;
    };
    Some(
        Pattern::new(name, pattern_type, Strength::Strong, cur.timestamp, text)
            .with_evidence("open", cur.open)
            .with_evidence("close", cur.close)
            .with_evidence("prev_open", prev.open)
            .with_evidence("prev_close", prev.close),
    )
}

fn doji(candles: &[Candle]) -> Option<Pattern> {
    let cur = candles.last()?;
    if !is_doji(cur) {
        return None;
    }
    Some(shape_evidence(
        Pattern::new(
            DOJI,
            PatternType::Neutral,
            Strength::Weak,
            cur.timestamp,
            "Open and close nearly equal",
        ),
        cur,
    ))
}

fn star(candles: &[Candle]) -> Option<Pattern> {
    let [first, middle, last] = candles.get(candles.len().checked_sub(3)?..)? else {
        return None;
    };
    if !ratio(first.body(), first).is_some_and(|b| b >= STAR_MIN_FIRST_BODY) {
        return None;
    }
    if middle.body() > STAR_MAX_MIDDLE_BODY * first.body() {
        return None;
    }
    let midpoint = (first.open + first.close) / 2.0;

    let (name, pattern_type, text) = if first.is_bearish()
        && middle.body_top() < first.close
        && last.open > middle.body_top()
        && last.is_bullish()
        && last.close > midpoint
    {
        (
            MORNING_STAR,
            PatternType::Bullish,
            "Bearish candle, gapped small body, bullish close past the midpoint",
        )
    } else if first.is_bullish()
        && middle.body_bottom() > first.close
        && last.open < middle.body_bottom()
        && last.is_bearish()
        && last.close < midpoint
    {
        (
            EVENING_STAR,
            PatternType::Bearish,
            "Bullish candle, gapped small body, bearish close past the midpoint",
        )
    } else {
        return None;
    };
    Some(
        Pattern::new(name, pattern_type, Strength::Strong, last.timestamp, text)
            .with_evidence("first_open", first.open)
            .with_evidence("first_close", first.close)
            .with_evidence("middle_body", middle.body())
            .with_evidence("close", last.close)
            .with_evidence("midpoint", midpoint),
    )
}

/// Candlestick shape detector. Needs no indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Candlestick;

impl DetectionRule for Candlestick {
    fn name(&self) -> &str {
        "candlestick"
    }

    fn detect(&self, candles: &[Candle], _indicators: &IndicatorSet) -> Vec<Pattern> {
        [
            hammer(candles),
            hanging_man(candles),
            engulfing(candles),
            doji(candles),
            star(candles),
        ]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlcv;

    fn detect(data: &[(f64, f64, f64, f64, f64)]) -> Vec<Pattern> {
        Candlestick.detect(&make_ohlcv(data), &IndicatorSet::new())
    }

    fn names(patterns: &[Pattern]) -> Vec<&str> {
        patterns.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn hammer_after_decline() {
        // range 10, body 2, upper 1, lower 7
        let patterns = detect(&[
            (100.0, 100.5, 97.5, 98.0, 1000.0),
            (97.5, 100.5, 90.5, 99.5, 1000.0),
        ]);
        assert_eq!(names(&patterns), vec![HAMMER]);
        assert!(patterns[0].is_bullish());
    }

    #[test]
    fn hanging_man_after_advance() {
        let patterns = detect(&[
            (95.0, 97.5, 94.5, 97.0, 1000.0),
            (97.5, 100.5, 90.5, 99.5, 1000.0),
        ]);
        assert_eq!(names(&patterns), vec![HAMMER, HANGING_MAN]);
        assert!(patterns[0].is_bullish());
        assert!(patterns[1].is_bearish());
        assert_eq!(patterns[1].evidence["prev_close"], 97.0);
    }

    #[test]
    fn hammer_thresholds_are_inclusive() {
        // range 10: body exactly 3, upper exactly 1, lower exactly 6
        let patterns = detect(&[(96.0, 100.0, 90.0, 99.0, 1000.0)]);
        assert_eq!(names(&patterns), vec![HAMMER]);
        // upper shadow 1.5 breaks the rule
        assert!(detect(&[(95.5, 100.0, 90.0, 98.5, 1000.0)]).is_empty());
    }

    #[test]
    fn bullish_engulfing() {
        let patterns = detect(&[
            (101.0, 101.5, 98.5, 99.0, 1000.0),
            (98.5, 102.5, 98.0, 102.0, 1000.0),
        ]);
        assert_eq!(names(&patterns), vec![BULLISH_ENGULFING]);
        assert_eq!(patterns[0].strength, Strength::Strong);
    }

    #[test]
    fn bearish_engulfing() {
        let patterns = detect(&[
            (99.0, 101.5, 98.5, 101.0, 1000.0),
            (101.5, 102.0, 97.5, 98.0, 1000.0),
        ]);
        assert_eq!(names(&patterns), vec![BEARISH_ENGULFING]);
    }

    #[test]
    fn doji_is_neutral_and_weak() {
        let patterns = detect(&[(100.0, 105.0, 95.0, 100.4, 1000.0)]);
        assert_eq!(names(&patterns), vec![DOJI]);
        assert_eq!(patterns[0].pattern_type, PatternType::Neutral);
        assert_eq!(patterns[0].strength, Strength::Weak);
    }

    #[test]
    fn zero_range_candle_matches_nothing() {
        assert!(detect(&[(100.0, 100.0, 100.0, 100.0, 1000.0)]).is_empty());
    }

    #[test]
    fn morning_star() {
        let patterns = detect(&[
            (110.0, 111.0, 99.0, 100.0, 1000.0),
            (98.0, 99.0, 96.0, 97.0, 1000.0),
            (99.0, 109.0, 98.5, 108.0, 1000.0),
        ]);
        assert!(names(&patterns).contains(&MORNING_STAR));
        let star = patterns.iter().find(|p| p.name == MORNING_STAR).unwrap();
        assert_eq!(star.evidence["midpoint"], 105.0);
    }

    #[test]
    fn evening_star() {
        let patterns = detect(&[
            (100.0, 111.0, 99.0, 110.0, 1000.0),
            (112.0, 114.0, 111.0, 113.0, 1000.0),
            (111.0, 111.5, 101.0, 102.0, 1000.0),
        ]);
        assert!(names(&patterns).contains(&EVENING_STAR));
    }

    #[test]
    fn star_needs_a_gap() {
        // middle body overlaps the first close
        let patterns = detect(&[
            (110.0, 111.0, 99.0, 100.0, 1000.0),
            (100.5, 101.0, 98.0, 99.5, 1000.0),
            (101.5, 109.0, 101.0, 108.0, 1000.0),
        ]);
        assert!(!names(&patterns).contains(&MORNING_STAR));
    }
}
