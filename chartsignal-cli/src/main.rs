//! ChartSignal CLI: batch analysis and one-off indicator commands.
//!
//! Commands:
//! - `analyze`: run a batch from a TOML config and write `report.json` + `signals.csv`
//! - `indicator`: compute one indicator over a CSV file and print the aligned series as JSON

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chartsignal_core::components::{calculate_named, ParamValue, Params};
use chartsignal_runner::{
    provider_from_config, run_batch, write_report, AnalysisConfig, BatchReport,
    CsvCandleProvider, MemoryIndicatorStore, UnitStatus,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chartsignal",
    about = "ChartSignal CLI: technical indicators, chart patterns and trading signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch analysis from a TOML config file.
    Analyze {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for report.json and signals.csv.
        #[arg(long, default_value = "reports")]
        out: PathBuf,
    },
    /// Compute one indicator over a candle CSV file.
    Indicator {
        /// CSV with headers timestamp,open,high,low,close,volume.
        #[arg(long)]
        csv: PathBuf,

        /// Indicator name: sma, ema, macd, rsi, bollinger, stochastic, adx, cci, obv, atr.
        #[arg(long)]
        name: String,

        /// Parameter override as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value = value.trim();
    let value = match value.parse::<f64>() {
        Ok(n) => ParamValue::Number(n),
        Err(_) => ParamValue::Text(value.to_string()),
    };
    Ok((key.to_string(), value))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { config, out } => run_analyze(config, out),
        Commands::Indicator { csv, name, params } => run_indicator(csv, name, params),
    }
}

fn run_analyze(config_path: PathBuf, out: PathBuf) -> Result<()> {
    let config = AnalysisConfig::from_file(&config_path)?;
    let provider = provider_from_config(&config.data);
    let store = MemoryIndicatorStore::new();

    info!(config = %config_path.display(), hash = %config.config_hash(), "loaded config");

    let report = run_batch(&config, provider.as_ref(), &store);
    print_summary(&report);

    let path = write_report(&report, &out)?;
    println!("Report saved to: {}", path.display());

    if report.completed() == 0 {
        bail!("every unit failed");
    }
    Ok(())
}

fn run_indicator(csv: PathBuf, name: String, params: Vec<(String, ParamValue)>) -> Result<()> {
    let candles = CsvCandleProvider::load_file(&csv)?;
    let overrides: Params = params.into_iter().collect();

    let series = calculate_named(&name, &candles, &overrides)
        .with_context(|| format!("failed to compute '{name}'"))?;
    if series.is_empty() {
        eprintln!(
            "'{name}' produced no values ({} candles; unknown name or insufficient history)",
            candles.len()
        );
    }

    let rows: Vec<serde_json::Value> = candles
        .iter()
        .zip(series.iter())
        .map(|(c, v)| serde_json::json!({ "timestamp": c.timestamp, "value": v }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("=== Batch Result ===");
    println!("Provider:       {}", report.provider);
    println!("Config hash:    {}", &report.config_hash[..12.min(report.config_hash.len())]);
    println!(
        "Units:          {} ({} completed, {} failed)",
        report.units.len(),
        report.completed(),
        report.failed()
    );
    println!("Signals:        {}", report.signals().count());
    println!();

    for unit in &report.units {
        match &unit.status {
            UnitStatus::Completed => println!(
                "  {:<12} {:<4} {:>4} candles  {:>3} patterns  {:>2} signals",
                unit.pair,
                unit.timeframe,
                unit.candle_count,
                unit.patterns.len(),
                unit.signals.len()
            ),
            UnitStatus::Failed { message } => {
                println!("  {:<12} {:<4} FAILED: {message}", unit.pair, unit.timeframe)
            }
        }
    }

    for (unit, s) in report.signals() {
        println!();
        println!(
            "{} {} {:?} ({:?}) @ {:.4}",
            unit.pair, unit.timeframe, s.direction, s.strength, s.entry_price
        );
        println!(
            "  SL {:.4}  TP {:.4}  R:R {:.2}  p={:.2}",
            s.stop_loss, s.take_profit, s.risk_reward_ratio, s.success_probability
        );
        println!("  Patterns: {}", s.supporting_patterns.names.join(", "));
    }
}
