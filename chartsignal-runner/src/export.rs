//! Report export: pretty JSON for the full batch and a flat CSV of signals.
//!
//! Persisted reports carry a `schema_version`. Newer versions are rejected on
//! load.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::batch::{BatchReport, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("signal CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &BatchReport) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Deserialize a `BatchReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BatchReport, ExportError> {
    let report: BatchReport = serde_json::from_str(json)?;
    if report.schema_version > SCHEMA_VERSION {
        return Err(ExportError::UnsupportedSchema {
            found: report.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// One row per signal across all completed units.
///
/// Columns: pair, timeframe, timestamp, direction, strength, entry_price,
/// stop_loss, take_profit, risk_reward_ratio, success_probability, patterns
pub fn export_signals_csv(report: &BatchReport) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "pair",
        "timeframe",
        "timestamp",
        "direction",
        "strength",
        "entry_price",
        "stop_loss",
        "take_profit",
        "risk_reward_ratio",
        "success_probability",
        "patterns",
    ])?;

    for (unit, s) in report.signals() {
        wtr.write_record([
            unit.pair.as_str(),
            unit.timeframe.label(),
            &s.timestamp.to_rfc3339(),
            &format!("{:?}", s.direction).to_lowercase(),
            &format!("{:?}", s.strength).to_lowercase(),
            &format!("{:.6}", s.entry_price),
            &format!("{:.6}", s.stop_loss),
            &format!("{:.6}", s.take_profit),
            &format!("{:.4}", s.risk_reward_ratio),
            &format!("{:.2}", s.success_probability),
            &s.supporting_patterns.names.join(";"),
        ])?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

// ─── Report directory ───────────────────────────────────────────────

/// Write `report.json` and `signals.csv` into `output_dir` (created if
/// missing). Returns the path of `report.json`.
pub fn write_report(report: &BatchReport, output_dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(io_error(output_dir))?;

    let json_path = output_dir.join("report.json");
    std::fs::write(&json_path, export_json(report)?).map_err(io_error(&json_path))?;

    let csv_path = output_dir.join("signals.csv");
    std::fs::write(&csv_path, export_signals_csv(report)?).map_err(io_error(&csv_path))?;

    Ok(json_path)
}

/// Load `report.json` from a report directory.
pub fn load_report(dir: &Path) -> Result<BatchReport, ExportError> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path).map_err(io_error(&path))?;
    import_json(&json)
}
