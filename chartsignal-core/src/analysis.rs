//! Single-unit analysis pipeline.
//!
//! candles → indicator series (through the injected store) → patterns → signals.
//! One call covers one `(pair, timeframe)` unit and shares no state with any
//! other call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::components::factory::IndicatorError;
use crate::components::indicator::{IndicatorKind, IndicatorSet};
use crate::components::params::IndicatorRequest;
use crate::domain::{Candle, Pair, Pattern, Signal, Timeframe};
use crate::patterns::PatternDetector;
use crate::signals::{RiskError, RiskParameters, SignalGenerator};
use crate::store::{calculate_cached, IndicatorStore};

/// One `(pair, timeframe)` analysis target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisUnit {
    pub pair: Pair,
    pub timeframe: Timeframe,
}

impl AnalysisUnit {
    pub fn new(pair: impl Into<Pair>, timeframe: Timeframe) -> Self {
        Self {
            pair: pair.into(),
            timeframe,
        }
    }
}

impl std::fmt::Display for AnalysisUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pair, self.timeframe)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub unit: AnalysisUnit,
    pub candle_count: usize,
    pub indicators: IndicatorSet,
    pub patterns: Vec<Pattern>,
    pub signals: Vec<Signal>,
    /// Requested indicator names that are not supported.
    pub skipped_indicators: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("indicator '{name}' on {unit}: {source}")]
    Indicator {
        name: String,
        unit: AnalysisUnit,
        #[source]
        source: IndicatorError,
    },
    #[error("invalid risk parameters: {0}")]
    InvalidRisk(#[from] RiskError),
}

/// Run the full pipeline, stamping signals with the current time.
pub fn analyze(
    unit: &AnalysisUnit,
    candles: &[Candle],
    requests: &[IndicatorRequest],
    store: &dyn IndicatorStore,
    risk: &RiskParameters,
) -> Result<AnalysisOutput, AnalysisError> {
    analyze_at(unit, candles, requests, store, risk, Utc::now())
}

/// Run the full pipeline with an explicit signal generation time.
pub fn analyze_at(
    unit: &AnalysisUnit,
    candles: &[Candle],
    requests: &[IndicatorRequest],
    store: &dyn IndicatorStore,
    risk: &RiskParameters,
    generated_at: DateTime<Utc>,
) -> Result<AnalysisOutput, AnalysisError> {
    risk.validate()?;

    let mut indicators = IndicatorSet::new();
    let mut skipped_indicators = Vec::new();

    for request in requests {
        let kind = match request.name.parse::<IndicatorKind>() {
            Ok(kind) => kind,
            Err(_) => {
                warn!(unit = %unit, indicator = %request.name, "unsupported indicator skipped");
                skipped_indicators.push(request.name.clone());
                continue;
            }
        };
        let series = calculate_cached(
            store,
            &unit.pair,
            unit.timeframe,
            kind,
            candles,
            &request.params,
        )
        .map_err(|source| AnalysisError::Indicator {
            name: request.name.clone(),
            unit: unit.clone(),
            source,
        })?;
        if indicators.get(kind).is_some() {
            warn!(unit = %unit, indicator = %kind, "indicator requested twice, last request wins");
        }
        indicators.insert(kind, series);
    }

    let patterns = PatternDetector::default().detect(candles, &indicators);
    let signals = SignalGenerator::with_risk(unit.timeframe, risk.clone())
        .generate_at(candles, &patterns, generated_at);

    debug!(
        unit = %unit,
        candles = candles.len(),
        indicators = indicators.len(),
        patterns = patterns.len(),
        signals = signals.len(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        unit: unit.clone(),
        candle_count: candles.len(),
        indicators,
        patterns,
        signals,
        skipped_indicators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;
    use crate::store::NoStore;

    fn unit() -> AnalysisUnit {
        AnalysisUnit::new("BTCUSDT", Timeframe::Day1)
    }

    #[test]
    fn unknown_indicator_is_skipped() {
        let candles = make_candles(&[100.0; 30]);
        let requests = vec![IndicatorRequest::new("ichimoku"), IndicatorRequest::new("sma")];
        let out = analyze(&unit(), &candles, &requests, &NoStore, &RiskParameters::default()).unwrap();
        assert_eq!(out.skipped_indicators, vec!["ichimoku"]);
        assert!(out.indicators.get(IndicatorKind::Sma).is_some());
    }

    #[test]
    fn invalid_parameter_fails_the_unit() {
        let candles = make_candles(&[100.0; 30]);
        let requests = vec![IndicatorRequest::new("rsi").with_param("length", -3.0)];
        let err = analyze(&unit(), &candles, &requests, &NoStore, &RiskParameters::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Indicator { .. }));
        assert!(err.to_string().contains("BTCUSDT/1d"));
    }

    #[test]
    fn invalid_risk_is_rejected() {
        let risk = RiskParameters {
            min_patterns: 0,
            ..RiskParameters::default()
        };
        let err = analyze(&unit(), &[], &[], &NoStore, &risk).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRisk(RiskError::NoPatternsRequired)));
    }

    #[test]
    fn empty_candles_produce_empty_output() {
        let requests = vec![IndicatorRequest::new("ema"), IndicatorRequest::new("macd")];
        let out = analyze(&unit(), &[], &requests, &NoStore, &RiskParameters::default()).unwrap();
        assert_eq!(out.candle_count, 0);
        assert!(out.patterns.is_empty());
        assert!(out.signals.is_empty());
        assert!(out.indicators.get(IndicatorKind::Ema).is_none());
    }
}
