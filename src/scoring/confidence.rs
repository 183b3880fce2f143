use crate::config::{BorrowTierMode, ConfidenceWeights};
use crate::models::{Direction, Driver, Regime};
use crate::regime::{ShortPressure, TimeframeRead};
use serde::{Deserialize, Serialize};

/// Sub-scores behind a confidence value, kept for explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Positioning pressure (0-40)
    pub structural: f64,
    /// Borrow friction (0-20)
    pub borrow: f64,
    /// Regime/direction agreement
    pub alignment: f64,
    pub multiplier: f64,
    pub confidence: u8,
    pub drivers: Vec<Driver>,
}

/// Confidence Scorer
///
/// Weighted sum of independently capped sub-scores, shrunk by a regime
/// multiplier when the regime itself is unstable, then rounded and clamped
/// to 0-100.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
}

impl ConfidenceScorer {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self { weights }
    }

    pub fn floor(&self) -> u8 {
        self.weights.floor
    }

    /// Positioning pressure in the direction already detected
    pub fn structural_component(&self, pressure: &ShortPressure, direction: Direction) -> f64 {
        let w = &self.weights;
        let (ratio_confirms, change_confirms) = match direction {
            Direction::Down => (
                pressure.short_volume_ratio > w.bearish_ratio_cutoff,
                pressure.short_interest_change > 0.0,
            ),
            Direction::Up => (
                pressure.short_volume_ratio < w.bullish_ratio_cutoff,
                pressure.short_interest_change < 0.0,
            ),
            Direction::Neutral | Direction::NoTrade => (false, false),
        };

        let mut score = 0.0;
        if ratio_confirms {
            score += w.structural_ratio_points;
        }
        if change_confirms {
            score += w.structural_change_points;
        }
        score
    }

    pub fn borrow_component(&self, borrow_rate: f64) -> f64 {
        let w = &self.weights;
        let high = borrow_rate > w.borrow_high_rate;
        let low = borrow_rate > w.borrow_low_rate;

        let points = match w.borrow_tier_mode {
            BorrowTierMode::Exclusive => {
                if high {
                    w.borrow_high_points
                } else if low {
                    w.borrow_low_points
                } else {
                    0.0
                }
            }
            BorrowTierMode::Additive => {
                let mut sum = 0.0;
                if high {
                    sum += w.borrow_high_points;
                }
                if low {
                    sum += w.borrow_low_points;
                }
                sum
            }
        };

        points.min(w.borrow_cap)
    }

    pub fn regime_multiplier(&self, regime: Regime) -> f64 {
        let m = &self.weights.regime_multipliers;
        match regime {
            Regime::BearControlled | Regime::BullControlled => m.trending,
            Regime::Transitional => m.transitional,
            Regime::Mixed => m.mixed,
            Regime::Unknown => m.unknown,
        }
    }

    pub fn score(
        &self,
        pressure: &ShortPressure,
        regime: Regime,
        direction: Direction,
    ) -> ConfidenceBreakdown {
        let structural = self.structural_component(pressure, direction);
        let borrow = self.borrow_component(pressure.borrow_rate);
        let alignment = if direction.aligns_with(regime) {
            self.weights.alignment_points
        } else {
            0.0
        };
        let multiplier = self.regime_multiplier(regime);

        let raw = (structural + borrow + alignment) * multiplier;
        let confidence = to_confidence(raw);

        let mut drivers = Vec::new();
        if structural > 0.0 {
            match direction {
                Direction::Down => drivers.push(Driver::ShortReload),
                Direction::Up => drivers.push(Driver::ShortCovering),
                Direction::Neutral | Direction::NoTrade => {}
            }
        }
        if borrow > 0.0 {
            drivers.push(Driver::ElevatedBorrow);
        }
        if alignment > 0.0 {
            drivers.push(Driver::RegimeAlignment);
        }

        tracing::debug!(
            "Confidence: structural={} borrow={} alignment={} x{:.1} ({}) = {}",
            structural,
            borrow,
            alignment,
            multiplier,
            regime,
            confidence
        );

        ConfidenceBreakdown {
            structural,
            borrow,
            alignment,
            multiplier,
            confidence,
            drivers,
        }
    }

    /// Discard any directional call below the floor
    ///
    /// Returns true when the read was reset.
    pub fn apply_floor(&self, read: &mut TimeframeRead, drivers: &mut Vec<Driver>) -> bool {
        if read.confidence >= self.weights.floor {
            return false;
        }

        read.direction = Direction::NoTrade;
        read.regime = Regime::Mixed;
        drivers.retain(|d| !d.is_directional());
        if !drivers.contains(&Driver::LowStructuralConviction) {
            drivers.push(Driver::LowStructuralConviction);
        }
        true
    }
}

/// Round to the nearest integer and clamp to 0-100
pub fn to_confidence(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressure(ratio: f64, change: f64, borrow: f64) -> ShortPressure {
        ShortPressure {
            short_volume_ratio: ratio,
            short_interest_change: change,
            borrow_rate: borrow,
        }
    }

    #[test]
    fn test_full_bear_alignment_scores_eighty() {
        let scorer = ConfidenceScorer::default();
        let breakdown = scorer.score(
            &pressure(0.62, 0.04, 12.0),
            Regime::BearControlled,
            Direction::Down,
        );

        assert_eq!(breakdown.structural, 40.0);
        assert_eq!(breakdown.borrow, 20.0);
        assert_eq!(breakdown.alignment, 20.0);
        assert_eq!(breakdown.confidence, 80);
        assert_eq!(
            breakdown.drivers,
            vec![Driver::ShortReload, Driver::ElevatedBorrow, Driver::RegimeAlignment]
        );
    }

    #[test]
    fn test_transitional_regime_shrinks_confidence() {
        let scorer = ConfidenceScorer::default();
        let breakdown = scorer.score(
            &pressure(0.62, 0.04, 7.0),
            Regime::Transitional,
            Direction::Down,
        );

        // (40 + 10 + 0) * 0.6
        assert_eq!(breakdown.confidence, 30);
        assert_eq!(breakdown.multiplier, 0.6);
    }

    #[test]
    fn test_mixed_regime_rounds_half_up() {
        let scorer = ConfidenceScorer::default();
        let breakdown = scorer.score(&pressure(0.3, -0.02, 6.0), Regime::Mixed, Direction::Up);

        // (40 + 10) * 0.4 = 20
        assert_eq!(breakdown.confidence, 20);
        assert_eq!(to_confidence(12.5), 13);
    }

    #[test]
    fn test_exclusive_borrow_tiers() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.borrow_component(12.0), 20.0);
        assert_eq!(scorer.borrow_component(10.0), 10.0);
        assert_eq!(scorer.borrow_component(6.0), 10.0);
        assert_eq!(scorer.borrow_component(5.0), 0.0);
    }

    #[test]
    fn test_additive_borrow_tiers() {
        let weights = ConfidenceWeights {
            borrow_tier_mode: BorrowTierMode::Additive,
            borrow_high_points: 10.0,
            borrow_low_points: 10.0,
            ..ConfidenceWeights::default()
        };
        let scorer = ConfidenceScorer::new(weights.clone());
        assert_eq!(scorer.borrow_component(12.0), 20.0);
        assert_eq!(scorer.borrow_component(6.0), 10.0);

        let exclusive = ConfidenceScorer::new(ConfidenceWeights {
            borrow_tier_mode: BorrowTierMode::Exclusive,
            ..weights
        });
        assert_eq!(exclusive.borrow_component(12.0), 10.0);
    }

    #[test]
    fn test_additive_borrow_respects_cap() {
        let scorer = ConfidenceScorer::new(ConfidenceWeights {
            borrow_tier_mode: BorrowTierMode::Additive,
            ..ConfidenceWeights::default()
        });

        // 20 + 10 capped at 20
        assert_eq!(scorer.borrow_component(15.0), 20.0);
    }

    #[test]
    fn test_neutral_direction_has_no_structural_points() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(
            scorer.structural_component(&pressure(0.9, 0.5, 0.0), Direction::Neutral),
            0.0
        );
    }

    #[test]
    fn test_floor_resets_to_no_trade() {
        let scorer = ConfidenceScorer::default();
        let mut read = TimeframeRead {
            regime: Regime::BearControlled,
            direction: Direction::Down,
            confidence: 14,
        };
        let mut drivers = vec![Driver::ShortReload, Driver::ElevatedBorrow, Driver::RegimeAlignment];

        assert!(scorer.apply_floor(&mut read, &mut drivers));
        assert_eq!(read.direction, Direction::NoTrade);
        assert_eq!(read.regime, Regime::Mixed);
        // The discarded direction's tags go with it
        assert_eq!(
            drivers,
            vec![Driver::ElevatedBorrow, Driver::LowStructuralConviction]
        );

        // Idempotent: a second pass does not duplicate the tag
        assert!(scorer.apply_floor(&mut read, &mut drivers));
        assert_eq!(
            drivers
                .iter()
                .filter(|d| **d == Driver::LowStructuralConviction)
                .count(),
            1
        );
    }

    #[test]
    fn test_floor_keeps_confident_reads() {
        let scorer = ConfidenceScorer::default();
        let mut read = TimeframeRead {
            regime: Regime::BullControlled,
            direction: Direction::Up,
            confidence: 15,
        };
        let mut drivers = Vec::new();

        assert!(!scorer.apply_floor(&mut read, &mut drivers));
        assert_eq!(read.direction, Direction::Up);
        assert!(drivers.is_empty());
    }
}
