//! ChartSignal Core: indicator calculator, pattern detector, signal generator.
//!
//! This crate contains the analysis engine:
//! - Domain types (candles, timeframes, patterns, signals)
//! - Ten technical indicators behind one `Indicator` trait
//! - Registry-driven pattern detection
//! - Signal synthesis with stop-loss, take-profit and risk/reward
//! - An injected `IndicatorStore` capability for read-through caching
//!
//! Everything here is synchronous and free of I/O.

pub mod analysis;
pub mod components;
pub mod domain;
pub mod indicators;
pub mod patterns;
pub mod signals;
pub mod store;

pub use analysis::{analyze, analyze_at, AnalysisError, AnalysisOutput, AnalysisUnit};
