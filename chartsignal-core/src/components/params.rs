//! Indicator requests and parameter maps.
//!
//! A request is `{name, params}` where `params` is a flat key → value map merged
//! over per-kind defaults. `BTreeMap` keeps key order deterministic, so the
//! canonical JSON of a merged map hashes to a stable fingerprint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::factory::IndicatorError;
use super::indicator::IndicatorKind;
use crate::indicators::PriceSource;

/// A single parameter value: numeric or textual (e.g. `source = "hlc3"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

pub type Params = BTreeMap<String, ParamValue>;

/// Declarative indicator request, as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRequest {
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

impl IndicatorRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// Default parameters for `kind`.
pub fn defaults(kind: IndicatorKind) -> Params {
    let num = |k: &str, v: f64| (k.to_string(), ParamValue::Number(v));
    let close = || ("source".to_string(), ParamValue::Text("close".to_string()));
    let pairs = match kind {
        IndicatorKind::Sma | IndicatorKind::Ema => vec![num("length", 14.0), close()],
        IndicatorKind::Macd => vec![
            num("fast", 12.0),
            num("slow", 26.0),
            num("signal", 9.0),
            close(),
        ],
        IndicatorKind::Rsi => vec![
            num("length", 14.0),
            num("overbought", 70.0),
            num("oversold", 30.0),
            close(),
        ],
        IndicatorKind::Bollinger => vec![num("length", 20.0), num("std_dev", 2.0), close()],
        IndicatorKind::Stochastic => vec![
            num("k_length", 14.0),
            num("d_length", 3.0),
            num("smooth", 3.0),
            num("overbought", 80.0),
            num("oversold", 20.0),
        ],
        IndicatorKind::Adx | IndicatorKind::Atr => vec![num("length", 14.0)],
        IndicatorKind::Cci => vec![num("length", 20.0), num("constant", 0.015)],
        IndicatorKind::Obv => Vec::new(),
    };
    pairs.into_iter().collect()
}

/// Merge caller overrides over the defaults of `kind`.
///
/// Unknown keys are kept so the fingerprint reflects exactly what was asked for.
pub fn merge(kind: IndicatorKind, overrides: &Params) -> Params {
    let mut merged = defaults(kind);
    for (k, v) in overrides {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// Deterministic fingerprint of a merged parameter map.
pub fn fingerprint(kind: IndicatorKind, merged: &Params) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.label().as_bytes());
    hasher.update(b"|");
    // serde_json with BTreeMap produces deterministic key order
    match serde_json::to_vec(merged) {
        Ok(bytes) => {
            hasher.update(&bytes);
        }
        Err(_) => {
            for (k, v) in merged {
                hasher.update(format!("{k}={v:?};").as_bytes());
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Largest accepted window length. Keeps derived lookbacks such as
/// `2 * length` for ADX far from `usize` overflow.
pub const MAX_LENGTH: usize = 100_000;

/// Numeric parameter. Text values are parsed; NaN and infinities are rejected
/// in either form.
pub fn param_f64(params: &Params, key: &str) -> Result<f64, IndicatorError> {
    let v = match params.get(key) {
        Some(ParamValue::Number(v)) => *v,
        Some(ParamValue::Text(t)) => {
            t.trim()
                .parse::<f64>()
                .map_err(|_| IndicatorError::InvalidParameter {
                    name: key.to_string(),
                    reason: format!("expected a number, got {t:?}"),
                })?
        }
        None => return Err(IndicatorError::MissingParameter(key.to_string())),
    };
    if !v.is_finite() {
        return Err(IndicatorError::InvalidParameter {
            name: key.to_string(),
            reason: format!("expected a finite number, got {v}"),
        });
    }
    Ok(v)
}

/// Window length: an integer in `1..=MAX_LENGTH`.
pub fn param_length(params: &Params, key: &str) -> Result<usize, IndicatorError> {
    let v = param_f64(params, key)?;
    if v < 1.0 || v.fract() != 0.0 {
        return Err(IndicatorError::InvalidParameter {
            name: key.to_string(),
            reason: format!("length must be a positive integer, got {v}"),
        });
    }
    if v > MAX_LENGTH as f64 {
        return Err(IndicatorError::InvalidParameter {
            name: key.to_string(),
            reason: format!("length must be <= {MAX_LENGTH}, got {v}"),
        });
    }
    Ok(v as usize)
}

pub fn param_source(params: &Params) -> Result<PriceSource, IndicatorError> {
    match params.get("source") {
        None => Ok(PriceSource::Close),
        Some(ParamValue::Text(t)) => t
            .parse()
            .map_err(|reason| IndicatorError::InvalidParameter {
                name: "source".to_string(),
                reason,
            }),
        Some(ParamValue::Number(v)) => Err(IndicatorError::InvalidParameter {
            name: "source".to_string(),
            reason: format!("expected a price field name, got {v}"),
        }),
    }
}
