//! Factory system: converts an indicator kind plus parameters into a runtime
//! `Indicator`, and the `calculate` entry points built on top of it.

use tracing::{debug, warn};

use super::indicator::{Indicator, IndicatorKind, IndicatorSeries};
use super::params::{self, param_f64, param_length, param_source, Params};
use crate::domain::Candle;
use crate::indicators::{Adx, Atr, Bollinger, Cci, Ema, Macd, Obv, Rsi, Sma, Stochastic};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during indicator construction.
///
/// Only truly invalid inputs are errors; short candle history is not.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

fn invalid(name: &str, reason: impl Into<String>) -> IndicatorError {
    IndicatorError::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
}

// ─── Indicator factory ───────────────────────────────────────────────

/// Create an indicator from a kind and caller parameters (merged over defaults).
pub fn create_indicator(
    kind: IndicatorKind,
    overrides: &Params,
) -> Result<Box<dyn Indicator>, IndicatorError> {
    let p = params::merge(kind, overrides);
    match kind {
        IndicatorKind::Sma => Ok(Box::new(Sma::with_source(
            param_length(&p, "length")?,
            param_source(&p)?,
        ))),
        IndicatorKind::Ema => Ok(Box::new(Ema::with_source(
            param_length(&p, "length")?,
            param_source(&p)?,
        ))),
        IndicatorKind::Macd => {
            let fast = param_length(&p, "fast")?;
            let slow = param_length(&p, "slow")?;
            let signal = param_length(&p, "signal")?;
            if fast >= slow {
                return Err(invalid("fast", format!("must be < slow ({fast} >= {slow})")));
            }
            Ok(Box::new(Macd::with_source(
                fast,
                slow,
                signal,
                param_source(&p)?,
            )))
        }
        IndicatorKind::Rsi => Ok(Box::new(Rsi::with_zones(
            param_length(&p, "length")?,
            param_source(&p)?,
            param_f64(&p, "overbought")?,
            param_f64(&p, "oversold")?,
        ))),
        IndicatorKind::Bollinger => {
            let std_dev = param_f64(&p, "std_dev")?;
            if std_dev < 0.0 {
                return Err(invalid("std_dev", format!("must be >= 0, got {std_dev}")));
            }
            Ok(Box::new(Bollinger::with_source(
                param_length(&p, "length")?,
                std_dev,
                param_source(&p)?,
            )))
        }
        IndicatorKind::Stochastic => Ok(Box::new(Stochastic::with_zones(
            param_length(&p, "k_length")?,
            param_length(&p, "d_length")?,
            param_length(&p, "smooth")?,
            param_f64(&p, "overbought")?,
            param_f64(&p, "oversold")?,
        ))),
        IndicatorKind::Adx => Ok(Box::new(Adx::new(param_length(&p, "length")?))),
        IndicatorKind::Cci => {
            let constant = param_f64(&p, "constant")?;
            if constant <= 0.0 {
                return Err(invalid("constant", format!("must be > 0, got {constant}")));
            }
            Ok(Box::new(Cci::with_constant(
                param_length(&p, "length")?,
                constant,
            )))
        }
        IndicatorKind::Obv => Ok(Box::new(Obv::new())),
        IndicatorKind::Atr => Ok(Box::new(Atr::new(param_length(&p, "length")?))),
    }
}

/// Minimum candle count for which `kind` with `overrides` produces a non-empty series.
pub fn minimum_required(kind: IndicatorKind, overrides: &Params) -> Result<usize, IndicatorError> {
    Ok(create_indicator(kind, overrides)?.min_candles())
}

/// Compute `kind` over `candles`.
///
/// Returns an empty series when the history is shorter than
/// `minimum_required(kind, params)`; returns `Err` only for invalid parameters.
pub fn calculate(
    kind: IndicatorKind,
    candles: &[Candle],
    overrides: &Params,
) -> Result<IndicatorSeries, IndicatorError> {
    let indicator = create_indicator(kind, overrides)?;
    if candles.len() < indicator.min_candles() {
        debug!(
            indicator = indicator.name(),
            candles = candles.len(),
            required = indicator.min_candles(),
            "insufficient history, returning empty series"
        );
        return Ok(IndicatorSeries::empty());
    }
    Ok(indicator.compute(candles))
}

/// Compute an indicator by its configured name.
///
/// Unknown names yield an empty series (logged), never an error.
pub fn calculate_named(
    name: &str,
    candles: &[Candle],
    overrides: &Params,
) -> Result<IndicatorSeries, IndicatorError> {
    match name.parse::<IndicatorKind>() {
        Ok(kind) => calculate(kind, candles, overrides),
        Err(_) => {
            warn!(indicator = name, "unsupported indicator, returning empty series");
            Ok(IndicatorSeries::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::params::ParamValue;
    use crate::indicators::make_candles;

    fn params(pairs: &[(&str, f64)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
            .collect()
    }

    #[test]
    fn minimum_required_per_kind() {
        let none = Params::new();
        assert_eq!(minimum_required(IndicatorKind::Sma, &none).unwrap(), 14);
        assert_eq!(minimum_required(IndicatorKind::Ema, &none).unwrap(), 14);
        assert_eq!(minimum_required(IndicatorKind::Rsi, &none).unwrap(), 15);
        assert_eq!(minimum_required(IndicatorKind::Atr, &none).unwrap(), 15);
        assert_eq!(minimum_required(IndicatorKind::Macd, &none).unwrap(), 26);
        assert_eq!(minimum_required(IndicatorKind::Bollinger, &none).unwrap(), 20);
        assert_eq!(minimum_required(IndicatorKind::Cci, &none).unwrap(), 20);
        assert_eq!(minimum_required(IndicatorKind::Stochastic, &none).unwrap(), 18);
        assert_eq!(minimum_required(IndicatorKind::Adx, &none).unwrap(), 28);
        assert_eq!(minimum_required(IndicatorKind::Obv, &none).unwrap(), 1);
    }

    #[test]
    fn short_history_is_empty_not_error() {
        let candles = make_candles(&[1.0, 2.0, 3.0]);
        for kind in IndicatorKind::all() {
            if *kind == IndicatorKind::Obv {
                continue;
            }
            let series = calculate(*kind, &candles, &Params::new()).unwrap();
            assert!(series.is_empty(), "{kind} should be empty on 3 candles");
        }
    }

    #[test]
    fn series_aligned_with_candles() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let candles = make_candles(&closes);
        for kind in IndicatorKind::all() {
            let series = calculate(*kind, &candles, &Params::new()).unwrap();
            assert_eq!(series.len(), candles.len(), "{kind} misaligned");
            let first = series.first_defined().unwrap();
            let indicator = create_indicator(*kind, &Params::new()).unwrap();
            assert_eq!(first, indicator.lookback(), "{kind} warm-up mismatch");
            assert!(series.iter().skip(first).all(|v| v.map(|v| v.kind()) == Some(*kind)));
        }
    }

    #[test]
    fn unknown_name_yields_empty_series() {
        let candles = make_candles(&[1.0; 30]);
        let series = calculate_named("ichimoku", &candles, &Params::new()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn invalid_parameters_are_errors() {
        let candles = make_candles(&[1.0; 30]);
        assert!(calculate(IndicatorKind::Sma, &candles, &params(&[("length", -5.0)])).is_err());
        assert!(calculate(IndicatorKind::Rsi, &candles, &params(&[("length", 0.0)])).is_err());
        assert!(calculate(
            IndicatorKind::Macd,
            &candles,
            &params(&[("fast", 26.0), ("slow", 12.0)])
        )
        .is_err());
        assert!(calculate(IndicatorKind::Cci, &candles, &params(&[("constant", 0.0)])).is_err());
        let bad_source: Params = [("source".to_string(), ParamValue::Text("vwap".into()))].into();
        assert!(calculate(IndicatorKind::Ema, &candles, &bad_source).is_err());
    }

    #[test]
    fn non_finite_text_parameters_are_errors() {
        let candles = make_candles(&[1.0; 30]);
        let text = |k: &str, v: &str| -> Params { [(k.to_string(), ParamValue::Text(v.into()))].into() };

        let err = calculate(IndicatorKind::Bollinger, &candles, &text("std_dev", "NaN")).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter { ref name, .. } if name == "std_dev"));
        assert!(calculate(IndicatorKind::Cci, &candles, &text("constant", "inf")).is_err());
        assert!(calculate(IndicatorKind::Rsi, &candles, &text("overbought", "NaN")).is_err());
    }

    #[test]
    fn huge_lengths_are_errors() {
        let candles = make_candles(&[1.0; 30]);
        assert!(calculate(IndicatorKind::Adx, &candles, &params(&[("length", 1e300)])).is_err());
        assert!(minimum_required(IndicatorKind::Stochastic, &params(&[("smooth", 1e19)])).is_err());
        assert!(minimum_required(IndicatorKind::Macd, &params(&[("signal", 1e300)])).is_err());
    }

    #[test]
    fn overrides_reach_the_indicator() {
        let candles = make_candles(&[1.0, 2.0, 3.0, 4.0]);
        let series = calculate(IndicatorKind::Sma, &candles, &params(&[("length", 2.0)])).unwrap();
        assert_eq!(series.first_defined(), Some(1));
        assert_eq!(series.get(3).unwrap().primary(), 3.5);
    }
}
