//! Domain types for the signal engine.

pub mod candle;
pub mod pattern;
pub mod signal;
pub mod timeframe;

pub use candle::Candle;
pub use pattern::{Evidence, Pattern, PatternType, Strength};
pub use signal::{Direction, PatternEvidence, Signal, SupportingPatterns};
pub use timeframe::{Timeframe, UnknownTimeframe};

/// Trading pair identifier (e.g. "BTCUSDT").
pub type Pair = String;
