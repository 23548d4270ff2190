//! Detected chart and indicator patterns.
//!
//! Patterns are derived facts: immutable once produced and keyed by
//! `(timestamp, name)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directional reading of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Bullish,
    Bearish,
    Neutral,
}

/// Conviction level shared by patterns and signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

/// Indicator or candle values that triggered a pattern.
pub type Evidence = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub strength: Strength,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub evidence: Evidence,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        pattern_type: PatternType,
        strength: Strength,
        timestamp: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern_type,
            strength,
            timestamp,
            description: description.into(),
            evidence: Evidence::new(),
        }
    }

    /// Attach one evidence value (builder style).
    pub fn with_evidence(mut self, key: &str, value: f64) -> Self {
        self.evidence.insert(key.to_string(), value);
        self
    }

    /// Identity of the pattern.
    pub fn key(&self) -> (DateTime<Utc>, &str) {
        (self.timestamp, self.name.as_str())
    }

    pub fn is_bullish(&self) -> bool {
        self.pattern_type == PatternType::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.pattern_type == PatternType::Bearish
    }
}
