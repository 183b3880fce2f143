//! Intraday tape narrative from the options chain alone
//!
//! Descriptive, not gating: it never changes the envelope's permission.

use crate::config::RegimeThresholds;
use crate::models::{Direction, IndicatorSnapshot, Regime};
use crate::regime::RegimeClassifier;
use crate::risk::TradePlaybook;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionGate {
    ShortBiasIntraday,
    LongBiasIntraday,
    MeanReversionOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TapeExecution {
    ShortScalpsFavored,
    LongScalpsFavored,
    SelectiveReducedSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNarrative {
    pub symbol: String,
    pub regime: Regime,
    /// Direction read from the chain: skew plus which side carries more OI
    pub tape_direction: Direction,
    pub direction_gate: DirectionGate,
    pub execution_mode: TapeExecution,
    pub playbook: TradePlaybook,
    pub allowed_trades: Vec<String>,
    pub primary_risk: String,
    pub put_call_ratio: f64,
    pub calls_total: f64,
    pub puts_total: f64,
    pub max_pain: f64,
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeBuilder {
    classifier: RegimeClassifier,
    thresholds: RegimeThresholds,
}

impl NarrativeBuilder {
    pub fn new(thresholds: RegimeThresholds) -> Self {
        Self {
            classifier: RegimeClassifier::new(thresholds.clone()),
            thresholds,
        }
    }

    /// Skew must be extreme and the dominant side must also carry more OI
    pub fn tape_direction(&self, snapshot: &IndicatorSnapshot) -> Direction {
        let ratio = snapshot.put_call_ratio;
        if ratio >= self.thresholds.bear_threshold && snapshot.puts_total > snapshot.calls_total {
            Direction::Down
        } else if ratio > 0.0
            && ratio <= self.thresholds.bull_threshold
            && snapshot.calls_total > snapshot.puts_total
        {
            Direction::Up
        } else {
            Direction::Neutral
        }
    }

    pub fn build(&self, snapshot: &IndicatorSnapshot) -> DailyNarrative {
        let regime = self.classifier.classify(snapshot.put_call_ratio);
        let direction = self.tape_direction(snapshot);

        let direction_gate = match direction {
            Direction::Down => DirectionGate::ShortBiasIntraday,
            Direction::Up => DirectionGate::LongBiasIntraday,
            Direction::Neutral | Direction::NoTrade => DirectionGate::MeanReversionOnly,
        };

        let execution_mode = match (regime, direction) {
            (Regime::BearControlled, Direction::Down) => TapeExecution::ShortScalpsFavored,
            (Regime::BullControlled, Direction::Up) => TapeExecution::LongScalpsFavored,
            _ => TapeExecution::SelectiveReducedSize,
        };

        let playbook = TradePlaybook::for_direction(direction);

        DailyNarrative {
            symbol: snapshot.symbol.clone(),
            regime,
            tape_direction: direction,
            direction_gate,
            execution_mode,
            playbook,
            allowed_trades: playbook.trades().iter().map(|t| t.to_string()).collect(),
            primary_risk: playbook.primary_risk().to_string(),
            put_call_ratio: snapshot.put_call_ratio,
            calls_total: snapshot.calls_total,
            puts_total: snapshot.puts_total,
            max_pain: snapshot.max_pain,
        }
    }
}
