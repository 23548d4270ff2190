//! In-memory indicator store shared across batch workers.

use std::collections::{BTreeMap, HashMap};

use chartsignal_core::components::{IndicatorSeries, IndicatorValue};
use chartsignal_core::domain::Timeframe;
use chartsignal_core::store::{IndicatorStore, SeriesKey};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

type Slots = BTreeMap<DateTime<Utc>, Option<IndicatorValue>>;

/// Process-local `IndicatorStore`. Readers never block each other.
///
/// Holds at most one window per series (indicator, pair, timeframe,
/// parameters): upserting a window with a new start drops the slots of the
/// previous window of that series. Memory is therefore bounded by the number
/// of distinct series times the candle limit. `evict_unit` and `clear` free
/// it explicitly.
#[derive(Debug, Default)]
pub struct MemoryIndicatorStore {
    series: RwLock<HashMap<SeriesKey, Slots>>,
}

impl MemoryIndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored windows.
    pub fn len(&self) -> usize {
        self.series.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.read().is_empty()
    }

    /// Total stored slots across all windows.
    pub fn slot_count(&self) -> usize {
        self.series.read().values().map(BTreeMap::len).sum()
    }

    /// Drop every window of one `(pair, timeframe)` unit. Returns how many
    /// windows were removed.
    pub fn evict_unit(&self, pair: &str, timeframe: Timeframe) -> usize {
        let mut store = self.series.write();
        let before = store.len();
        store.retain(|key, _| !(key.pair == pair && key.timeframe == timeframe));
        before - store.len()
    }

    pub fn clear(&self) {
        self.series.write().clear();
    }
}

impl IndicatorStore for MemoryIndicatorStore {
    fn load(&self, key: &SeriesKey, timestamps: &[DateTime<Utc>]) -> Option<IndicatorSeries> {
        let series = self.series.read();
        let slots = series.get(key)?;
        let values = timestamps
            .iter()
            .map(|ts| slots.get(ts).copied())
            .collect::<Option<Vec<_>>>()?;
        Some(IndicatorSeries::from_values(values))
    }

    fn upsert(&self, key: &SeriesKey, timestamps: &[DateTime<Utc>], series: &IndicatorSeries) {
        let mut store = self.series.write();
        let before = store.len();
        store.retain(|k, _| k == key || !k.same_series(key));
        if store.len() != before {
            debug!(indicator = %key.kind, pair = %key.pair, "replaced stale indicator window");
        }
        let slots = store.entry(key.clone()).or_default();
        for (ts, value) in timestamps.iter().zip(series.values()) {
            slots.insert(*ts, *value);
        }
    }
}
