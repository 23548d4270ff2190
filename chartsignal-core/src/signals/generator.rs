//! Signal generator: recency filter, direction split, price levels.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::{
    Candle, Direction, Pattern, PatternEvidence, Signal, Strength, SupportingPatterns, Timeframe,
};

use super::risk::RiskParameters;

/// `|take_profit - entry| / |entry - stop_loss|`, or 0 when the stop sits on the entry.
pub fn risk_reward_ratio(entry: f64, stop_loss: f64, take_profit: f64) -> f64 {
    let risk = (entry - stop_loss).abs();
    if risk == 0.0 {
        return 0.0;
    }
    (take_profit - entry).abs() / risk
}

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    timeframe: Timeframe,
    risk: RiskParameters,
}

impl SignalGenerator {
    pub fn new(timeframe: Timeframe) -> Self {
        Self::with_risk(timeframe, RiskParameters::default())
    }

    pub fn with_risk(timeframe: Timeframe, risk: RiskParameters) -> Self {
        Self { timeframe, risk }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn risk(&self) -> &RiskParameters {
        &self.risk
    }

    /// Signals stamped with the current wall-clock time.
    pub fn generate(&self, candles: &[Candle], patterns: &[Pattern]) -> Vec<Signal> {
        self.generate_at(candles, patterns, Utc::now())
    }

    /// Signals with an explicit generation time.
    ///
    /// Returns at most one buy and one sell signal (buy first).
    pub fn generate_at(
        &self,
        candles: &[Candle],
        patterns: &[Pattern],
        generated_at: DateTime<Utc>,
    ) -> Vec<Signal> {
        let Some(latest) = candles.last() else {
            return Vec::new();
        };
        let start = self.window_start(latest.timestamp);
        let recent: Vec<&Pattern> = patterns
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= latest.timestamp)
            .collect();

        let mut signals = Vec::new();
        for direction in [Direction::Buy, Direction::Sell] {
            let members: Vec<&Pattern> = recent
                .iter()
                .copied()
                .filter(|p| match direction {
                    Direction::Buy => p.is_bullish(),
                    Direction::Sell => p.is_bearish(),
                })
                .collect();
            if members.len() < self.risk.min_patterns {
                if !members.is_empty() {
                    debug!(
                        ?direction,
                        patterns = members.len(),
                        required = self.risk.min_patterns,
                        "not enough patterns for a signal"
                    );
                }
                continue;
            }
            signals.push(self.build(latest, direction, &members, generated_at));
        }
        signals
    }

    fn window_start(&self, latest: DateTime<Utc>) -> DateTime<Utc> {
        let span = Duration::seconds(
            self.timeframe.duration().num_seconds() * i64::from(self.risk.recency_candles),
        );
        latest
            .checked_sub_signed(span)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn build(
        &self,
        latest: &Candle,
        direction: Direction,
        members: &[&Pattern],
        generated_at: DateTime<Utc>,
    ) -> Signal {
        let strength = if members.iter().any(|p| p.strength == Strength::Strong) {
            Strength::Strong
        } else {
            Strength::Medium
        };

        let entry = latest.close;
        let range = latest.range();
        let stop_distance = range * self.risk.stop_loss_range_factor;
        let target_distance = range * self.risk.take_profit_range_factor;
        let (stop_loss, take_profit) = match direction {
            Direction::Buy => ((entry - stop_distance).max(0.0), entry + target_distance),
            Direction::Sell => (entry + stop_distance, (entry - target_distance).max(0.0)),
        };

        Signal {
            timeframe: self.timeframe,
            timestamp: latest.timestamp,
            direction,
            strength,
            entry_price: entry,
            stop_loss,
            take_profit,
            risk_reward_ratio: risk_reward_ratio(entry, stop_loss, take_profit),
            success_probability: self.risk.probability(strength),
            supporting_patterns: SupportingPatterns {
                names: members.iter().map(|p| p.name.clone()).collect(),
                evidence: members
                    .iter()
                    .map(|p| PatternEvidence {
                        name: p.name.clone(),
                        timestamp: p.timestamp,
                        evidence: p.evidence.clone(),
                    })
                    .collect(),
                generated_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternType;
    use crate::indicators::{make_candles, make_ohlcv};
    use chrono::TimeZone;

    fn at(candles: &[Candle], i: usize) -> DateTime<Utc> {
        candles[i].timestamp
    }

    fn pattern(name: &str, t: PatternType, s: Strength, ts: DateTime<Utc>) -> Pattern {
        Pattern::new(name, t, s, ts, "test").with_evidence("x", 1.0)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn risk_reward_example() {
        assert_eq!(risk_reward_ratio(100.0, 97.0, 106.0), 2.0);
        assert_eq!(risk_reward_ratio(100.0, 100.0, 106.0), 0.0);
    }

    #[test]
    fn buy_signal_levels() {
        // latest candle: range 10, close 105
        let candles = make_ohlcv(&[
            (100.0, 101.0, 99.0, 100.0, 1000.0),
            (100.0, 106.0, 96.0, 105.0, 1000.0),
        ]);
        let patterns = vec![
            pattern("A", PatternType::Bullish, Strength::Medium, at(&candles, 1)),
            pattern("B", PatternType::Bullish, Strength::Medium, at(&candles, 1)),
        ];
        let signals = SignalGenerator::new(Timeframe::Day1).generate_at(&candles, &patterns, now());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Buy);
        assert_eq!(s.strength, Strength::Medium);
        assert_eq!(s.entry_price, 105.0);
        assert!((s.stop_loss - 102.0).abs() < 1e-9);
        assert!((s.take_profit - 109.0).abs() < 1e-9);
        assert!((s.risk_reward_ratio - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.success_probability, 0.55);
        assert_eq!(s.timestamp, at(&candles, 1));
        assert_eq!(s.supporting_patterns.names, vec!["A", "B"]);
        assert_eq!(s.supporting_patterns.evidence.len(), 2);
        assert_eq!(s.supporting_patterns.generated_at, now());
    }

    #[test]
    fn sell_signal_mirrors_levels_and_clamps_target() {
        // close 2, range 10: target would be -2
        let candles = make_ohlcv(&[(5.0, 11.0, 1.0, 2.0, 1000.0)]);
        let ts = at(&candles, 0);
        let patterns = vec![
            pattern("A", PatternType::Bearish, Strength::Strong, ts),
            pattern("B", PatternType::Bearish, Strength::Weak, ts),
        ];
        let signals = SignalGenerator::new(Timeframe::Hour1).generate_at(&candles, &patterns, now());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Sell);
        assert_eq!(s.strength, Strength::Strong);
        assert!((s.stop_loss - 5.0).abs() < 1e-9);
        assert_eq!(s.take_profit, 0.0);
        assert_eq!(s.success_probability, 0.70);
    }

    #[test]
    fn single_pattern_is_not_enough() {
        let candles = make_candles(&[100.0, 101.0]);
        let patterns = vec![pattern("A", PatternType::Bullish, Strength::Strong, at(&candles, 1))];
        assert!(SignalGenerator::new(Timeframe::Day1)
            .generate_at(&candles, &patterns, now())
            .is_empty());
    }

    #[test]
    fn stale_patterns_are_ignored() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        // window is 3 days back from index 9: indices 6..=9
        let patterns = vec![
            pattern("old", PatternType::Bullish, Strength::Strong, at(&candles, 5)),
            pattern("edge", PatternType::Bullish, Strength::Medium, at(&candles, 6)),
            pattern("new", PatternType::Bullish, Strength::Medium, at(&candles, 9)),
        ];
        let signals = SignalGenerator::new(Timeframe::Day1).generate_at(&candles, &patterns, now());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].supporting_patterns.names, vec!["edge", "new"]);
        assert_eq!(signals[0].strength, Strength::Medium);
    }

    #[test]
    fn neutral_patterns_never_count() {
        let candles = make_candles(&[100.0, 101.0]);
        let ts = at(&candles, 1);
        let patterns = vec![
            pattern("Doji", PatternType::Neutral, Strength::Weak, ts),
            pattern("Doji 2", PatternType::Neutral, Strength::Weak, ts),
        ];
        assert!(SignalGenerator::new(Timeframe::Day1)
            .generate_at(&candles, &patterns, now())
            .is_empty());
    }

    #[test]
    fn both_directions_at_once() {
        let candles = make_candles(&[100.0, 101.0]);
        let ts = at(&candles, 1);
        let patterns = vec![
            pattern("A", PatternType::Bullish, Strength::Medium, ts),
            pattern("B", PatternType::Bullish, Strength::Medium, ts),
            pattern("C", PatternType::Bearish, Strength::Medium, ts),
            pattern("D", PatternType::Bearish, Strength::Medium, ts),
        ];
        let signals = SignalGenerator::new(Timeframe::Day1).generate_at(&candles, &patterns, now());
        let directions: Vec<Direction> = signals.iter().map(|s| s.direction).collect();
        assert_eq!(directions, vec![Direction::Buy, Direction::Sell]);
    }

    #[test]
    fn no_candles_no_signals() {
        let ts = now();
        let patterns = vec![
            pattern("A", PatternType::Bullish, Strength::Medium, ts),
            pattern("B", PatternType::Bullish, Strength::Medium, ts),
        ];
        assert!(SignalGenerator::new(Timeframe::Day1).generate(&[], &patterns).is_empty());
    }

    #[test]
    fn custom_risk_parameters() {
        let candles = make_ohlcv(&[(100.0, 110.0, 90.0, 100.0, 1000.0)]);
        let ts = at(&candles, 0);
        let patterns = vec![pattern("A", PatternType::Bullish, Strength::Medium, ts)];
        let risk = RiskParameters {
            min_patterns: 1,
            stop_loss_range_factor: 0.5,
            take_profit_range_factor: 1.0,
            ..RiskParameters::default()
        };
        let signals =
            SignalGenerator::with_risk(Timeframe::Day1, risk).generate_at(&candles, &patterns, now());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].stop_loss, 90.0);
        assert_eq!(signals[0].take_profit, 120.0);
        assert_eq!(signals[0].risk_reward_ratio, 2.0);
    }
}
