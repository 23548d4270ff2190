//! Pattern detection: crossovers, zone exits, divergences and candlestick shapes.
//!
//! The detector holds an explicit registry of `(IndicatorKind, rule)` pairs.
//! A rule only runs when its indicator series is present and non-empty in the
//! supplied `IndicatorSet`; absent indicators silently skip their rules.
//! Candlestick shapes need no indicator and are evaluated on the latest candle.
//!
//! Rules compare slot `i` against slot `i - 1` and must only read data from
//! `candles[0..=i]`.

pub mod bollinger;
pub mod candlestick;
pub mod ma_cross;
pub mod macd;
pub mod rsi;
pub mod stochastic;

use tracing::debug;

use crate::components::indicator::{IndicatorKind, IndicatorSeries, IndicatorSet, IndicatorValue};
use crate::domain::{Candle, Pattern};

pub use bollinger::BollingerBands;
pub use candlestick::Candlestick;
pub use ma_cross::MaCross;
pub use macd::MacdCrossover;
pub use rsi::{RsiDivergence, RsiZoneExit};
pub use stochastic::StochasticCrossover;

/// A single pattern rule.
///
/// Rules are pure: same candles and indicators in, same patterns out.
pub trait DetectionRule: Send + Sync {
    /// Human-readable name (e.g., "rsi_zone_exit").
    fn name(&self) -> &str;

    /// All patterns this rule finds over the candle history.
    fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern>;
}

/// Registry-driven pattern detector.
pub struct PatternDetector {
    rules: Vec<(IndicatorKind, Box<dyn DetectionRule>)>,
    candlestick: Option<Candlestick>,
}

impl PatternDetector {
    /// Detector with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            candlestick: None,
        }
    }

    /// Register a rule gated on `kind`.
    pub fn with_rule(mut self, kind: IndicatorKind, rule: impl DetectionRule + 'static) -> Self {
        self.rules.push((kind, Box::new(rule)));
        self
    }

    pub fn with_candlesticks(mut self) -> Self {
        self.candlestick = Some(Candlestick);
        self
    }

    /// Registered `(kind, rule name)` pairs, in evaluation order.
    pub fn registry(&self) -> impl Iterator<Item = (IndicatorKind, &str)> {
        self.rules.iter().map(|(kind, rule)| (*kind, rule.name()))
    }

    /// Run every applicable rule. Output is sorted by `(timestamp, name)` and
    /// contains at most one pattern per key.
    pub fn detect(&self, candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
        let mut patterns = Vec::new();

        for (kind, rule) in &self.rules {
            if indicators.get(*kind).is_none() {
                debug!(rule = rule.name(), indicator = %kind, "indicator absent, rule skipped");
                continue;
            }
            patterns.extend(rule.detect(candles, indicators));
        }

        if let Some(candlestick) = &self.candlestick {
            patterns.extend(candlestick.detect(candles, indicators));
        }

        patterns.sort_by(|a, b| a.key().cmp(&b.key()));
        patterns.dedup_by(|a, b| a.key() == b.key());
        patterns
    }
}

impl Default for PatternDetector {
    /// Every built-in rule plus candlestick shapes.
    fn default() -> Self {
        Self::empty()
            .with_rule(IndicatorKind::Ema, MaCross::new(IndicatorKind::Ema))
            .with_rule(IndicatorKind::Sma, MaCross::new(IndicatorKind::Sma))
            .with_rule(IndicatorKind::Rsi, RsiZoneExit)
            .with_rule(IndicatorKind::Rsi, RsiDivergence)
            .with_rule(IndicatorKind::Macd, MacdCrossover)
            .with_rule(IndicatorKind::Bollinger, BollingerBands)
            .with_rule(IndicatorKind::Stochastic, StochasticCrossover)
            .with_candlesticks()
    }
}

/// Convenience: detect with the default registry.
pub fn detect(candles: &[Candle], indicators: &IndicatorSet) -> Vec<Pattern> {
    PatternDetector::default().detect(candles, indicators)
}

/// Consecutive defined slots `(i, series[i-1], series[i])` for `i >= 1`,
/// bounded by the candle count.
pub(crate) fn defined_pairs<'a>(
    series: &'a IndicatorSeries,
    candles: &'a [Candle],
) -> impl Iterator<Item = (usize, &'a IndicatorValue, &'a IndicatorValue)> + 'a {
    let n = series.len().min(candles.len());
    (1..n).filter_map(move |i| Some((i, series.get(i - 1)?, series.get(i)?)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::components::indicator::{IndicatorKind, IndicatorSeries, IndicatorSet, IndicatorValue};

    /// Build a one-kind `IndicatorSet` from explicit slots.
    pub fn set_of(kind: IndicatorKind, values: Vec<Option<IndicatorValue>>) -> IndicatorSet {
        let mut set = IndicatorSet::new();
        set.insert(kind, IndicatorSeries::from_values(values));
        set
    }
}
