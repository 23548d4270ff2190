//! Indicator trait, indicator kinds, and the aligned value series they produce.
//!
//! Indicators are pure functions: candle history in, value series out. The
//! series is aligned 1:1 with the input candles; warm-up slots are `None`
//! rather than zero so callers can never mistake them for real readings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// Supported indicator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Macd,
    Rsi,
    Bollinger,
    Stochastic,
    Adx,
    Cci,
    Obv,
    Atr,
}

impl IndicatorKind {
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Stochastic => "stochastic",
            IndicatorKind::Adx => "adx",
            IndicatorKind::Cci => "cci",
            IndicatorKind::Obv => "obv",
            IndicatorKind::Atr => "atr",
        }
    }

    pub fn all() -> &'static [IndicatorKind] {
        &[
            IndicatorKind::Sma,
            IndicatorKind::Ema,
            IndicatorKind::Macd,
            IndicatorKind::Rsi,
            IndicatorKind::Bollinger,
            IndicatorKind::Stochastic,
            IndicatorKind::Adx,
            IndicatorKind::Cci,
            IndicatorKind::Obv,
            IndicatorKind::Atr,
        ]
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IndicatorKind {
    type Err = super::factory::IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "bb" | "bbands" => Some(IndicatorKind::Bollinger),
            "stoch" => Some(IndicatorKind::Stochastic),
            other => IndicatorKind::all()
                .iter()
                .copied()
                .find(|k| k.label() == other),
        };
        kind.ok_or_else(|| super::factory::IndicatorError::UnknownIndicator(s.to_string()))
    }
}

/// One defined slot of an indicator series, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorValue {
    Sma {
        value: f64,
    },
    Ema {
        value: f64,
    },
    /// `signal` and `histogram` stay `None` until the signal EMA has warmed up.
    Macd {
        macd: f64,
        signal: Option<f64>,
        histogram: Option<f64>,
    },
    Rsi {
        value: f64,
        overbought: f64,
        oversold: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
        overbought: f64,
        oversold: f64,
    },
    Adx {
        adx: f64,
        plus_di: f64,
        minus_di: f64,
    },
    Cci {
        value: f64,
    },
    Obv {
        value: f64,
    },
    Atr {
        value: f64,
    },
}

impl IndicatorValue {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorValue::Sma { .. } => IndicatorKind::Sma,
            IndicatorValue::Ema { .. } => IndicatorKind::Ema,
            IndicatorValue::Macd { .. } => IndicatorKind::Macd,
            IndicatorValue::Rsi { .. } => IndicatorKind::Rsi,
            IndicatorValue::Bollinger { .. } => IndicatorKind::Bollinger,
            IndicatorValue::Stochastic { .. } => IndicatorKind::Stochastic,
            IndicatorValue::Adx { .. } => IndicatorKind::Adx,
            IndicatorValue::Cci { .. } => IndicatorKind::Cci,
            IndicatorValue::Obv { .. } => IndicatorKind::Obv,
            IndicatorValue::Atr { .. } => IndicatorKind::Atr,
        }
    }

    /// Headline number of the slot (MACD line, Bollinger middle, %K, ADX, ...).
    pub fn primary(&self) -> f64 {
        match *self {
            IndicatorValue::Sma { value }
            | IndicatorValue::Ema { value }
            | IndicatorValue::Rsi { value, .. }
            | IndicatorValue::Cci { value }
            | IndicatorValue::Obv { value }
            | IndicatorValue::Atr { value } => value,
            IndicatorValue::Macd { macd, .. } => macd,
            IndicatorValue::Bollinger { middle, .. } => middle,
            IndicatorValue::Stochastic { k, .. } => k,
            IndicatorValue::Adx { adx, .. } => adx,
        }
    }
}

/// Indicator output aligned 1:1 with the candle series.
///
/// An empty series (length 0) means the indicator could not be computed at
/// all: too little history or an unsupported kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    values: Vec<Option<IndicatorValue>>,
}

impl IndicatorSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Option<IndicatorValue>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Defined slot at `index`; `None` for warm-up slots and out-of-range indices.
    pub fn get(&self, index: usize) -> Option<&IndicatorValue> {
        self.values.get(index).and_then(|v| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&IndicatorValue>> {
        self.values.iter().map(|v| v.as_ref())
    }

    pub fn values(&self) -> &[Option<IndicatorValue>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Option<IndicatorValue>> {
        self.values
    }

    /// Index of the first defined slot.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|v| v.is_some())
    }
}

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No slot at index t may depend on candle data from index t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "macd_12_26_9").
    fn name(&self) -> &str;

    fn kind(&self) -> IndicatorKind;

    /// Index of the first defined slot.
    fn lookback(&self) -> usize;

    /// Minimum number of candles for a non-empty series.
    fn min_candles(&self) -> usize {
        self.lookback() + 1
    }

    /// Compute the indicator for the entire candle series.
    ///
    /// Returns an empty series when `candles.len() < min_candles()`, otherwise
    /// a series of the same length as `candles` whose first `lookback()`
    /// slots are `None`.
    fn compute(&self, candles: &[Candle]) -> IndicatorSeries;
}

/// Container for the indicator series of one analysis run, keyed by kind.
///
/// One series per kind: inserting a second series of the same kind replaces
/// the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    series: BTreeMap<IndicatorKind, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: IndicatorKind, series: IndicatorSeries) {
        self.series.insert(kind, series);
    }

    /// Full series for `kind`. Empty series are reported as absent.
    pub fn get(&self, kind: IndicatorKind) -> Option<&IndicatorSeries> {
        self.series.get(&kind).filter(|s| !s.is_empty())
    }

    /// Defined slot of `kind` at `index`.
    pub fn value(&self, kind: IndicatorKind, index: usize) -> Option<&IndicatorValue> {
        self.get(kind).and_then(|s| s.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndicatorKind, &IndicatorSeries)> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
