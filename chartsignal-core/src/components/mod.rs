//! Indicator components: the trait, its tagged value series, request
//! parameters and the factory that turns `(kind, params)` into a runtime
//! indicator.

pub mod factory;
pub mod indicator;
pub mod params;

pub use factory::{calculate, calculate_named, create_indicator, minimum_required, IndicatorError};
pub use indicator::{Indicator, IndicatorKind, IndicatorSeries, IndicatorSet, IndicatorValue};
pub use params::{IndicatorRequest, ParamValue, Params};
