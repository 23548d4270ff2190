//! Batch orchestration across `(pair, timeframe)` units.
//!
//! Units are independent. A failing unit (provider error, invalid indicator
//! parameters, or a panic inside the engine) is recorded with a status and
//! message and never aborts the rest of the batch.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chartsignal_core::components::IndicatorKind;
use chartsignal_core::domain::{Pair, Pattern, Signal, Timeframe};
use chartsignal_core::store::IndicatorStore;
use chartsignal_core::{analyze_at, AnalysisError, AnalysisOutput, AnalysisUnit};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AnalysisConfig, ConfigHash};
use crate::provider::{CandleProvider, ProviderError};

/// Report format version. Readers reject newer versions.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitStatus {
    Completed,
    Failed { message: String },
}

impl UnitStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, UnitStatus::Completed)
    }
}

/// Outcome of one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub pair: Pair,
    pub timeframe: Timeframe,
    pub status: UnitStatus,
    pub candle_count: usize,
    /// Indicators that produced a non-empty series.
    pub indicators: Vec<IndicatorKind>,
    pub skipped_indicators: Vec<String>,
    pub patterns: Vec<Pattern>,
    pub signals: Vec<Signal>,
}

impl UnitReport {
    fn completed(output: AnalysisOutput) -> Self {
        let indicators = output
            .indicators
            .iter()
            .filter(|(_, series)| !series.is_empty())
            .map(|(kind, _)| *kind)
            .collect();
        Self {
            pair: output.unit.pair,
            timeframe: output.unit.timeframe,
            status: UnitStatus::Completed,
            candle_count: output.candle_count,
            indicators,
            skipped_indicators: output.skipped_indicators,
            patterns: output.patterns,
            signals: output.signals,
        }
    }

    fn failed(unit: &AnalysisUnit, message: String) -> Self {
        Self {
            pair: unit.pair.clone(),
            timeframe: unit.timeframe,
            status: UnitStatus::Failed { message },
            candle_count: 0,
            indicators: Vec::new(),
            skipped_indicators: Vec::new(),
            patterns: Vec::new(),
            signals: Vec::new(),
        }
    }
}

/// Full batch result, in unit declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub schema_version: u32,
    pub config_hash: ConfigHash,
    pub provider: String,
    pub generated_at: DateTime<Utc>,
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.units.iter().filter(|u| u.status.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.units.len() - self.completed()
    }

    pub fn signals(&self) -> impl Iterator<Item = (&UnitReport, &Signal)> {
        self.units
            .iter()
            .flat_map(|u| u.signals.iter().map(move |s| (u, s)))
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: unknown payload".to_string()
    }
}

fn run_unit(
    unit: &AnalysisUnit,
    config: &AnalysisConfig,
    provider: &dyn CandleProvider,
    store: &dyn IndicatorStore,
    generated_at: DateTime<Utc>,
) -> Result<AnalysisOutput, UnitError> {
    let candles = provider.candles(&unit.pair, unit.timeframe, config.candle_limit)?;
    let output = analyze_at(
        unit,
        &candles,
        &config.indicators,
        store,
        &config.risk,
        generated_at,
    )?;
    Ok(output)
}

fn run_isolated(
    unit: &AnalysisUnit,
    config: &AnalysisConfig,
    provider: &dyn CandleProvider,
    store: &dyn IndicatorStore,
    generated_at: DateTime<Utc>,
) -> UnitReport {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        run_unit(unit, config, provider, store, generated_at)
    }));
    match outcome {
        Ok(Ok(output)) => {
            info!(
                unit = %unit,
                patterns = output.patterns.len(),
                signals = output.signals.len(),
                "unit complete"
            );
            UnitReport::completed(output)
        }
        Ok(Err(e)) => {
            warn!(unit = %unit, error = %e, "unit failed");
            UnitReport::failed(unit, e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload);
            warn!(unit = %unit, error = %message, "unit panicked");
            UnitReport::failed(unit, message)
        }
    }
}

/// Run every unit of `config`, stamping signals with the current time.
pub fn run_batch(
    config: &AnalysisConfig,
    provider: &dyn CandleProvider,
    store: &dyn IndicatorStore,
) -> BatchReport {
    run_batch_at(config, provider, store, Utc::now())
}

/// Run every unit of `config` with an explicit generation time.
pub fn run_batch_at(
    config: &AnalysisConfig,
    provider: &dyn CandleProvider,
    store: &dyn IndicatorStore,
    generated_at: DateTime<Utc>,
) -> BatchReport {
    let units = config.analysis_units();
    info!(
        units = units.len(),
        provider = provider.name(),
        parallel = config.parallel,
        "starting batch"
    );

    let reports: Vec<UnitReport> = if config.parallel {
        units
            .par_iter()
            .map(|unit| run_isolated(unit, config, provider, store, generated_at))
            .collect()
    } else {
        units
            .iter()
            .map(|unit| run_isolated(unit, config, provider, store, generated_at))
            .collect()
    };

    let report = BatchReport {
        schema_version: SCHEMA_VERSION,
        config_hash: config.config_hash(),
        provider: provider.name().to_string(),
        generated_at,
        units: reports,
    };
    info!(
        completed = report.completed(),
        failed = report.failed(),
        signals = report.signals().count(),
        "batch finished"
    );
    report
}
