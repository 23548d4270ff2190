//! Price source selection for single-input indicators.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::Candle;

/// Which candle field (or blend) an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    Hl2,
    Hlc3,
    Ohlc4,
    Volume,
}

impl PriceSource {
    pub fn label(&self) -> &'static str {
        match self {
            PriceSource::Open => "open",
            PriceSource::High => "high",
            PriceSource::Low => "low",
            PriceSource::Close => "close",
            PriceSource::Hl2 => "hl2",
            PriceSource::Hlc3 => "hlc3",
            PriceSource::Ohlc4 => "ohlc4",
            PriceSource::Volume => "volume",
        }
    }

    pub fn value(&self, candle: &Candle) -> f64 {
        match self {
            PriceSource::Open => candle.open,
            PriceSource::High => candle.high,
            PriceSource::Low => candle.low,
            PriceSource::Close => candle.close,
            PriceSource::Hl2 => (candle.high + candle.low) / 2.0,
            PriceSource::Hlc3 => candle.typical_price(),
            PriceSource::Ohlc4 => (candle.open + candle.high + candle.low + candle.close) / 4.0,
            PriceSource::Volume => candle.volume,
        }
    }

    pub fn extract(&self, candles: &[Candle]) -> Vec<f64> {
        candles.iter().map(|c| self.value(c)).collect()
    }
}

impl FromStr for PriceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PriceSource::Open),
            "high" => Ok(PriceSource::High),
            "low" => Ok(PriceSource::Low),
            "close" => Ok(PriceSource::Close),
            "hl2" => Ok(PriceSource::Hl2),
            "hlc3" => Ok(PriceSource::Hlc3),
            "ohlc4" => Ok(PriceSource::Ohlc4),
            "volume" => Ok(PriceSource::Volume),
            other => Err(format!("unknown price source: {other}")),
        }
    }
}
