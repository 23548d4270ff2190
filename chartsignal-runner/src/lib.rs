//! ChartSignal Runner: batch analysis across `(pair, timeframe)` units.
//!
//! This crate builds on `chartsignal-core` to provide:
//! - TOML batch configuration
//! - Candle providers (CSV files, deterministic synthetic random walk)
//! - A shared in-memory indicator store
//! - Parallel batch execution with per-unit failure isolation
//! - JSON and CSV report export

pub mod batch;
pub mod config;
pub mod export;
pub mod provider;
pub mod store;

pub use batch::{run_batch, run_batch_at, BatchReport, UnitError, UnitReport, UnitStatus, SCHEMA_VERSION};
pub use config::{AnalysisConfig, ConfigError, ConfigHash, DataSourceConfig, UnitConfig};
pub use export::{export_json, export_signals_csv, import_json, load_report, write_report, ExportError};
pub use provider::{provider_from_config, CandleProvider, CsvCandleProvider, ProviderError, SyntheticProvider};
pub use store::MemoryIndicatorStore;
