//! Risk parameters for signal synthesis.
//!
//! These are tunable heuristics, not derived quantities. The defaults keep
//! the historical behaviour: a three-candle recency window, stop-loss at 30%
//! and take-profit at 40% of the latest candle's range.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Strength;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("min_patterns must be >= 1")]
    NoPatternsRequired,
    #[error("{name} must be a non-negative number, got {value}")]
    InvalidFactor { name: &'static str, value: f64 },
    #[error("{name} must be in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParameters {
    /// Patterns older than this many candle durations before the latest
    /// candle are ignored.
    pub recency_candles: u32,
    /// Minimum same-direction patterns needed for a signal.
    pub min_patterns: usize,
    pub stop_loss_range_factor: f64,
    pub take_profit_range_factor: f64,
    pub strong_probability: f64,
    pub medium_probability: f64,
    pub weak_probability: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            recency_candles: 3,
            min_patterns: 2,
            stop_loss_range_factor: 0.3,
            take_profit_range_factor: 0.4,
            strong_probability: 0.70,
            medium_probability: 0.55,
            weak_probability: 0.40,
        }
    }
}

impl RiskParameters {
    pub fn probability(&self, strength: Strength) -> f64 {
        match strength {
            Strength::Strong => self.strong_probability,
            Strength::Medium => self.medium_probability,
            Strength::Weak => self.weak_probability,
        }
    }

    pub fn validate(&self) -> Result<(), RiskError> {
        if self.min_patterns == 0 {
            return Err(RiskError::NoPatternsRequired);
        }
        for (name, v) in [
            ("stop_loss_range_factor", self.stop_loss_range_factor),
            ("take_profit_range_factor", self.take_profit_range_factor),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(RiskError::InvalidFactor { name, value: v });
            }
        }
        for (name, p) in [
            ("strong_probability", self.strong_probability),
            ("medium_probability", self.medium_probability),
            ("weak_probability", self.weak_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(RiskError::InvalidProbability { name, value: p });
            }
        }
        Ok(())
    }
}
