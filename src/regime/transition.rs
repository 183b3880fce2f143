use crate::config::TransitionThresholds;
use crate::models::{Direction, Driver, Regime};
use crate::regime::direction::ShortPressure;
use serde::{Deserialize, Serialize};

/// Outcome of the transition check, reported alongside the envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    pub detected: bool,
    pub from: Regime,
    pub to: Regime,
    pub causes: Vec<Driver>,
}

/// Regime Transition Detector
///
/// Looks for two weak signals that a controlled regime is breaking down:
/// - Pressure divergence: the short-volume tape disagrees with the direction
/// - Borrow weakening: borrow cost is falling below the squeeze-relevant level
///
/// Either one alone is noise. Only when both fire is the regime overridden
/// to TRANSITIONAL.
#[derive(Debug, Clone, Default)]
pub struct TransitionDetector {
    thresholds: TransitionThresholds,
}

impl TransitionDetector {
    pub fn new(thresholds: TransitionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn pressure_divergence(&self, pressure: &ShortPressure, direction: Direction) -> bool {
        let midpoint = self.thresholds.divergence_midpoint;
        match direction {
            Direction::Down => {
                pressure.short_volume_ratio < midpoint && pressure.short_interest_change >= 0.0
            }
            Direction::Up => {
                pressure.short_volume_ratio > midpoint && pressure.short_interest_change <= 0.0
            }
            Direction::Neutral | Direction::NoTrade => false,
        }
    }

    pub fn borrow_weakening(&self, borrow_rate: f64) -> bool {
        borrow_rate < self.thresholds.borrow_weakening_rate
    }

    pub fn detect(
        &self,
        regime: Regime,
        direction: Direction,
        pressure: &ShortPressure,
    ) -> RegimeTransition {
        let mut causes = Vec::new();

        if self.pressure_divergence(pressure, direction) {
            causes.push(Driver::PressureDivergence);
        }
        if self.borrow_weakening(pressure.borrow_rate) {
            causes.push(Driver::BorrowWeakening);
        }

        if causes.len() >= 2 {
            tracing::debug!(
                "Regime transition: {} -> TRANSITIONAL ({:?})",
                regime,
                causes
            );
            return RegimeTransition {
                detected: true,
                from: regime,
                to: Regime::Transitional,
                causes,
            };
        }

        RegimeTransition {
            detected: false,
            from: regime,
            to: regime,
            causes: Vec::new(),
        }
    }
}
