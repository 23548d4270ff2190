//! Indicator store capability: injected read-through cache for indicator series.
//!
//! The core never owns a store. Callers pass one in; `calculate_cached` loads
//! the series if every requested timestamp is present, otherwise computes it
//! and upserts the result.
//!
//! Recursive indicators (EMA, RSI, ATR, ADX, MACD, OBV) depend on where the
//! candle window starts, so the first timestamp of the window is part of the
//! `SeriesKey`. Within one key a slot only depends on the candles up to its own
//! timestamp, so a shorter window with the same start reads back exactly what
//! a fresh computation would produce, and rewriting a slot is idempotent per
//! `(indicator, pair, timeframe, window start, timestamp, parameters)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::factory::{create_indicator, IndicatorError};
use crate::components::indicator::{Indicator, IndicatorKind, IndicatorSeries};
use crate::components::params::{self, Params};
use crate::domain::{Candle, Pair, Timeframe};

/// Identity of one cached series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub kind: IndicatorKind,
    pub pair: Pair,
    pub timeframe: Timeframe,
    /// `params::fingerprint` of the merged parameters.
    pub params_fingerprint: String,
    /// Timestamp of the first candle the series was computed from.
    pub window_start: DateTime<Utc>,
}

impl SeriesKey {
    pub fn new(
        kind: IndicatorKind,
        pair: &str,
        timeframe: Timeframe,
        overrides: &Params,
        window_start: DateTime<Utc>,
    ) -> Self {
        let merged = params::merge(kind, overrides);
        Self {
            kind,
            pair: pair.to_string(),
            timeframe,
            params_fingerprint: params::fingerprint(kind, &merged),
            window_start,
        }
    }

    /// Same indicator, pair, timeframe and parameters; any window start.
    pub fn same_series(&self, other: &SeriesKey) -> bool {
        self.kind == other.kind
            && self.pair == other.pair
            && self.timeframe == other.timeframe
            && self.params_fingerprint == other.params_fingerprint
    }
}

/// Storage for computed indicator series.
pub trait IndicatorStore: Send + Sync {
    /// Series aligned with `timestamps`, or `None` unless every timestamp is stored.
    fn load(&self, key: &SeriesKey, timestamps: &[DateTime<Utc>]) -> Option<IndicatorSeries>;

    /// Insert or overwrite one slot per timestamp.
    fn upsert(&self, key: &SeriesKey, timestamps: &[DateTime<Utc>], series: &IndicatorSeries);
}

/// Store that never holds anything; every lookup recomputes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl IndicatorStore for NoStore {
    fn load(&self, _key: &SeriesKey, _timestamps: &[DateTime<Utc>]) -> Option<IndicatorSeries> {
        None
    }

    fn upsert(&self, _key: &SeriesKey, _timestamps: &[DateTime<Utc>], _series: &IndicatorSeries) {}
}

/// Read-through calculation: load from `store`, else compute and upsert.
///
/// Returns exactly what `calculate` would. Short history yields an empty
/// series without touching the store, and empty results are never stored.
pub fn calculate_cached(
    store: &dyn IndicatorStore,
    pair: &str,
    timeframe: Timeframe,
    kind: IndicatorKind,
    candles: &[Candle],
    overrides: &Params,
) -> Result<IndicatorSeries, IndicatorError> {
    let indicator = create_indicator(kind, overrides)?;
    let Some(first) = candles.first() else {
        return Ok(IndicatorSeries::empty());
    };
    if candles.len() < indicator.min_candles() {
        debug!(
            indicator = %kind,
            candles = candles.len(),
            required = indicator.min_candles(),
            "insufficient history, store not consulted"
        );
        return Ok(IndicatorSeries::empty());
    }

    let key = SeriesKey::new(kind, pair, timeframe, overrides, first.timestamp);
    let timestamps: Vec<DateTime<Utc>> = candles.iter().map(|c| c.timestamp).collect();

    if let Some(series) = store.load(&key, &timestamps) {
        debug!(indicator = %kind, pair, %timeframe, "indicator cache hit");
        return Ok(series);
    }

    let series = indicator.compute(candles);
    if !series.is_empty() {
        store.upsert(&key, &timestamps, &series);
    }
    Ok(series)
}
