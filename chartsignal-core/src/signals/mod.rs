//! Signal generation: turns recent same-direction patterns into trade signals.
//!
//! The generator is a pure batch transform: candles and patterns in, at most
//! one buy and one sell signal out. It never looks at positions or orders.

pub mod generator;
pub mod risk;

pub use generator::{risk_reward_ratio, SignalGenerator};
pub use risk::{RiskError, RiskParameters};
