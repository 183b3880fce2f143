//! Daily bias from open-interest dominance, volume expansion and dealer positioning
//!
//! A coarser read than the envelope pipeline: it only decides which side is
//! allowed for the day and reports a normalized 0.0-1.0 confidence.

use crate::config::BiasWeights;
use crate::models::IndicatorSnapshot;
use crate::risk::BlockedBehavior;
use serde::{Deserialize, Serialize};

pub const BIAS_INVALIDATION: &str = "OI dominance flip or loss of exchange volume expansion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasDirection {
    LongOnly,
    ShortOnly,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasRegime {
    Trend,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasExecution {
    Day,
    NoTrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasDriver {
    CallOiDominance,
    PutOiDominance,
    ExchangeVolumeExpansion,
    PositiveDealerGamma,
    NegativeDealerGamma,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBias {
    pub symbol: String,
    pub regime: BiasRegime,
    pub direction: BiasDirection,
    /// 0.0-1.0, two decimals
    pub confidence: f64,
    pub disallowed: Vec<BlockedBehavior>,
    pub drivers: Vec<BiasDriver>,
    pub execution_mode: BiasExecution,
    pub invalidation: String,
}

#[derive(Debug, Clone, Default)]
pub struct DailyBiasEngine {
    weights: BiasWeights,
}

impl DailyBiasEngine {
    pub fn new(weights: BiasWeights) -> Self {
        Self { weights }
    }

    pub fn evaluate(&self, snapshot: &IndicatorSnapshot) -> DailyBias {
        let w = &self.weights;
        let calls = snapshot.calls_total;
        let puts = snapshot.puts_total;

        let call_dominant = calls > puts * w.dominance_multiple;
        let put_dominant = puts > calls * w.dominance_multiple;
        let volume_expansion = snapshot.today_volume > snapshot.avg20_volume;

        // Absent gamma or OI deltas count for neither side
        let gamma = snapshot.dealer_gamma;
        let positive_dealer = gamma.is_some_and(|g| g >= 0.0)
            || snapshot.put_oi_change.is_some_and(|d| d < 0.0);
        let negative_dealer = gamma.is_some_and(|g| g <= 0.0)
            || snapshot.call_oi_change.is_some_and(|d| d < 0.0);

        let (direction, drivers) = if call_dominant && volume_expansion && positive_dealer {
            (
                BiasDirection::LongOnly,
                vec![
                    BiasDriver::CallOiDominance,
                    BiasDriver::ExchangeVolumeExpansion,
                    BiasDriver::PositiveDealerGamma,
                ],
            )
        } else if put_dominant && volume_expansion && negative_dealer {
            (
                BiasDirection::ShortOnly,
                vec![
                    BiasDriver::PutOiDominance,
                    BiasDriver::ExchangeVolumeExpansion,
                    BiasDriver::NegativeDealerGamma,
                ],
            )
        } else {
            (BiasDirection::Neutral, Vec::new())
        };

        let oi_total = calls + puts;
        let oi_strength = if oi_total > 0.0 {
            (calls - puts).abs() / oi_total
        } else {
            0.0
        };
        let volume_strength = if snapshot.avg20_volume > 0.0 {
            (snapshot.today_volume / snapshot.avg20_volume).min(1.0)
        } else {
            0.0
        };
        let dealer_alignment = match direction {
            BiasDirection::LongOnly if positive_dealer => 1.0,
            BiasDirection::ShortOnly if negative_dealer => 1.0,
            _ => 0.0,
        };

        let raw = w.oi_weight * oi_strength
            + w.volume_weight * volume_strength
            + w.dealer_weight * dealer_alignment;
        let confidence = if raw.is_finite() {
            (raw.clamp(0.0, 1.0) * 100.0).round() / 100.0
        } else {
            0.0
        };

        let disallowed = match direction {
            BiasDirection::LongOnly => vec![BlockedBehavior::Short],
            BiasDirection::ShortOnly => vec![BlockedBehavior::Long],
            BiasDirection::Neutral => vec![BlockedBehavior::Long, BlockedBehavior::Short],
        };

        tracing::debug!(
            "{}: bias {:?} oi={:.2} vol={:.2} dealer={} -> {}",
            snapshot.symbol,
            direction,
            oi_strength,
            volume_strength,
            dealer_alignment,
            confidence
        );

        DailyBias {
            symbol: snapshot.symbol.clone(),
            regime: if volume_expansion {
                BiasRegime::Trend
            } else {
                BiasRegime::Range
            },
            direction,
            confidence,
            disallowed,
            drivers,
            execution_mode: match direction {
                BiasDirection::Neutral => BiasExecution::NoTrade,
                BiasDirection::LongOnly | BiasDirection::ShortOnly => BiasExecution::Day,
            },
            invalidation: BIAS_INVALIDATION.to_string(),
        }
    }
}
