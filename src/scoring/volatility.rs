use crate::config::VolatilityThresholds;
use crate::risk::ExecutionMode;
use serde::{Deserialize, Serialize};

/// Broad-market volatility state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityState {
    Expansion,
    Compression,
    Neutral,
    Unknown,
}

/// Volatility context echoed in every envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub level: Option<f64>,
    pub state: VolatilityState,
    pub note: Option<String>,
}

/// Result of passing a confidence through the gate
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub confidence: u8,
    /// Highest execution mode still permitted, if the gate restricts it
    pub mode_ceiling: Option<ExecutionMode>,
    pub note: Option<String>,
}

/// Volatility Gate
///
/// Under expanding volatility, trend continuation is disabled: execution is
/// limited to mean reversion and confidence is capped.
#[derive(Debug, Clone, Default)]
pub struct VolatilityGate {
    thresholds: VolatilityThresholds,
}

impl VolatilityGate {
    pub fn new(thresholds: VolatilityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, level: Option<f64>) -> VolatilityState {
        match level {
            None => VolatilityState::Unknown,
            Some(v) if !v.is_finite() => VolatilityState::Unknown,
            Some(v) if v >= self.thresholds.expansion_level => VolatilityState::Expansion,
            Some(v) if v <= self.thresholds.compression_level => VolatilityState::Compression,
            Some(_) => VolatilityState::Neutral,
        }
    }

    pub fn apply(&self, state: VolatilityState, confidence: u8) -> GateOutcome {
        match state {
            VolatilityState::Expansion => GateOutcome {
                confidence: confidence.min(self.thresholds.expansion_confidence_cap),
                mode_ceiling: Some(ExecutionMode::MeanReversionOnly),
                note: Some("Volatility expansion: trend continuation disabled".to_string()),
            },
            VolatilityState::Compression | VolatilityState::Neutral | VolatilityState::Unknown => {
                GateOutcome {
                    confidence,
                    mode_ceiling: None,
                    note: None,
                }
            }
        }
    }

    pub fn report(&self, level: Option<f64>, outcome: &GateOutcome) -> VolatilityReport {
        VolatilityReport {
            level,
            state: self.classify(level),
            note: outcome.note.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_levels() {
        let gate = VolatilityGate::default();
        assert_eq!(gate.classify(None), VolatilityState::Unknown);
        assert_eq!(gate.classify(Some(22.0)), VolatilityState::Expansion);
        assert_eq!(gate.classify(Some(30.5)), VolatilityState::Expansion);
        assert_eq!(gate.classify(Some(15.0)), VolatilityState::Compression);
        assert_eq!(gate.classify(Some(18.0)), VolatilityState::Neutral);
        assert_eq!(gate.classify(Some(f64::NAN)), VolatilityState::Unknown);
    }

    #[test]
    fn test_expansion_caps_confidence_and_mode() {
        let gate = VolatilityGate::default();
        let outcome = gate.apply(VolatilityState::Expansion, 80);

        assert_eq!(outcome.confidence, 55);
        assert_eq!(outcome.mode_ceiling, Some(ExecutionMode::MeanReversionOnly));
        assert!(outcome.note.unwrap().contains("trend continuation disabled"));
    }

    #[test]
    fn test_expansion_keeps_lower_confidence() {
        let gate = VolatilityGate::default();
        assert_eq!(gate.apply(VolatilityState::Expansion, 30).confidence, 30);
    }

    #[test]
    fn test_other_states_pass_through() {
        let gate = VolatilityGate::default();
        for state in [
            VolatilityState::Compression,
            VolatilityState::Neutral,
            VolatilityState::Unknown,
        ] {
            let outcome = gate.apply(state, 90);
            assert_eq!(outcome.confidence, 90);
            assert_eq!(outcome.mode_ceiling, None);
            assert_eq!(outcome.note, None);
        }
    }
}
