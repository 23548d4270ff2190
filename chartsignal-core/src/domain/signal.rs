//! Trading signals: the terminal output of an analysis run.
//!
//! A signal is immutable once emitted. Later analysis runs create new signals
//! rather than mutating old ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pattern::{Evidence, Strength};
use super::timeframe::Timeframe;

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

/// Raw evidence of one contributing pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEvidence {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub evidence: Evidence,
}

/// Names and evidence of the patterns a signal was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingPatterns {
    pub names: Vec<String>,
    pub evidence: Vec<PatternEvidence>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timeframe: Timeframe,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub strength: Strength,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: f64,
    pub success_probability: f64,
    pub supporting_patterns: SupportingPatterns,
}
