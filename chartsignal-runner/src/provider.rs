//! Candle providers: where a unit's candle history comes from.
//!
//! Two implementations:
//! 1. `CsvCandleProvider` reads `{dir}/{PAIR}_{timeframe}.csv`
//! 2. `SyntheticProvider` generates a deterministic random walk
//!
//! Synthetic data is a developer-only mode for demos and tests.

use std::path::{Path, PathBuf};

use chartsignal_core::domain::{Candle, Timeframe};
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DataSourceConfig;

/// Errors from the candle provider layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no candle file for {pair} {timeframe} at {}", path.display())]
    Missing {
        pair: String,
        timeframe: Timeframe,
        path: PathBuf,
    },

    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} row {row}: {reason}", path.display())]
    InvalidRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },
}

/// Source of ascending candle sequences.
pub trait CandleProvider: Send + Sync {
    /// Provider name for logs and reports (e.g., "csv", "synthetic").
    fn name(&self) -> &str;

    /// The most recent `limit` candles for `(pair, timeframe)`, ascending by timestamp.
    fn candles(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError>;
}

/// Build the provider described by the config.
pub fn provider_from_config(data: &DataSourceConfig) -> Box<dyn CandleProvider> {
    match data {
        DataSourceConfig::Csv { dir } => Box::new(CsvCandleProvider::new(dir)),
        DataSourceConfig::Synthetic { seed } => Box::new(SyntheticProvider::new(*seed)),
    }
}

// ─── CSV files ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Parse an RFC 3339 timestamp or integer unix seconds.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| format!("unix timestamp out of range: {secs}"));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp {raw:?}: {e}"))
}

/// Reads candle history from CSV files with headers
/// `timestamp,open,high,low,close,volume`.
#[derive(Debug, Clone)]
pub struct CsvCandleProvider {
    dir: PathBuf,
}

impl CsvCandleProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, pair: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{pair}_{timeframe}.csv"))
    }

    /// Load every row of one file, sorted ascending with duplicate timestamps removed.
    pub fn load_file(path: &Path) -> Result<Vec<Candle>, ProviderError> {
        let csv_err = |source| ProviderError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

        let mut candles = Vec::new();
        for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(csv_err)?;
            // header is line 1
            let line = i + 2;
            let invalid = |reason: String| ProviderError::InvalidRow {
                path: path.to_path_buf(),
                row: line,
                reason,
            };
            let timestamp = parse_timestamp(&row.timestamp).map_err(invalid)?;
            let candle = Candle::new(timestamp, row.open, row.high, row.low, row.close, row.volume);
            if !candle.is_sane() {
                return Err(invalid(format!("inconsistent OHLCV values {candle:?}")));
            }
            candles.push(candle);
        }

        candles.sort_by_key(|c| c.timestamp);
        let before = candles.len();
        candles.dedup_by_key(|c| c.timestamp);
        if candles.len() != before {
            warn!(
                path = %path.display(),
                dropped = before - candles.len(),
                "duplicate candle timestamps dropped"
            );
        }
        Ok(candles)
    }
}

impl CandleProvider for CsvCandleProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn candles(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let path = self.path_for(pair, timeframe);
        if !path.exists() {
            return Err(ProviderError::Missing {
                pair: pair.to_string(),
                timeframe,
                path,
            });
        }
        let mut candles = Self::load_file(&path)?;
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        debug!(pair, %timeframe, candles = candles.len(), "loaded csv candles");
        Ok(candles)
    }
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Deterministic random-walk candles.
///
/// The RNG is seeded from BLAKE3 over `(seed, pair, timeframe)`, so a unit
/// always sees the same series regardless of scheduling order. The last
/// candle sits on `anchor`.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    seed: u64,
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        let anchor = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { seed, anchor }
    }

    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    fn rng_for(&self, pair: &str, timeframe: Timeframe) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(pair.as_bytes());
        hasher.update(b"/");
        hasher.update(timeframe.label().as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }
}

impl CandleProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn candles(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let mut rng = self.rng_for(pair, timeframe);
        let step = timeframe.duration();
        let mut price = 100.0_f64;
        let mut candles = Vec::with_capacity(limit);

        for i in 0..limit {
            let back = i32::try_from(limit - 1 - i).unwrap_or(i32::MAX);
            let timestamp = self
                .anchor
                .checked_sub_signed(step * back)
                .unwrap_or(DateTime::<Utc>::MIN_UTC);

            let change: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + change);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000.0..5_000_000.0);

            candles.push(Candle::new(timestamp, open, high, low, close, volume));
            price = close;
        }
        Ok(candles)
    }
}
