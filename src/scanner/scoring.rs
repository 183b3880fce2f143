use crate::config::{ScannerConfig, Tier};
use crate::scanner::{ConfidenceLabel, HorizonRange, PressureDriver, Side, SwingRegime, SwingRow};
use crate::scoring::to_confidence;

/// Points from the first tier whose threshold `value` reaches (value >= threshold)
fn tier_at_least(value: f64, tiers: &[Tier]) -> f64 {
    tiers
        .iter()
        .find(|tier| value >= tier.threshold)
        .map_or(0.0, |tier| tier.points)
}

/// Points from the first tier whose threshold bounds `value` (value <= threshold)
fn tier_at_most(value: f64, tiers: &[Tier]) -> f64 {
    tiers
        .iter()
        .find(|tier| value <= tier.threshold)
        .map_or(0.0, |tier| tier.points)
}

/// Side-specific swing scoring model
///
/// Components, each capped independently:
/// - Short-interest change magnitude (0-30)
/// - Short-volume ratio confirmation (0-20)
/// - Borrow tier (0-15)
/// - Max-pain proximity (0-10)
/// - ITM call/put skew (0-10)
/// - Regime bonus for the side's favourable regimes (0-15)
#[derive(Debug, Clone, Default)]
pub struct SwingScorer {
    config: ScannerConfig,
}

impl SwingScorer {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, row: &SwingRow, side: Side) -> u8 {
        match side {
            Side::Bullish => self.bullish_score(row),
            Side::Bearish => self.bearish_score(row),
        }
    }

    fn change_points(&self, row: &SwingRow) -> f64 {
        (row.short_interest_change.abs() * self.config.change_multiplier)
            .clamp(0.0, self.config.change_cap)
    }

    fn max_pain_points(&self, row: &SwingRow) -> f64 {
        row.options
            .as_ref()
            .and_then(|o| o.max_pain_distance_pct)
            .map_or(0.0, |pct| tier_at_most(pct, &self.config.max_pain_tiers))
    }

    fn itm_ratio(row: &SwingRow) -> Option<f64> {
        row.options.as_ref().and_then(|o| o.itm_call_put_ratio)
    }

    pub fn bullish_score(&self, row: &SwingRow) -> u8 {
        let c = &self.config;
        let mut s = self.change_points(row);

        if row.short_volume_ratio < c.bullish_short_ratio {
            s += c.ratio_points;
        }
        s += tier_at_least(row.borrow_rate, &c.bullish_borrow_tiers);
        s += self.max_pain_points(row);
        if let Some(ratio) = Self::itm_ratio(row) {
            s += tier_at_least(ratio, &c.bullish_itm_tiers);
        }
        s += match row.regime {
            SwingRegime::Accumulation => c.primary_regime_bonus,
            SwingRegime::Expansion => c.secondary_regime_bonus,
            _ => 0.0,
        };

        to_confidence(s)
    }

    pub fn bearish_score(&self, row: &SwingRow) -> u8 {
        let c = &self.config;
        let mut s = self.change_points(row);

        if row.short_volume_ratio > c.bearish_short_ratio {
            s += c.ratio_points;
        }
        s += tier_at_most(row.borrow_rate, &c.bearish_borrow_tiers);
        s += self.max_pain_points(row);
        if let Some(ratio) = Self::itm_ratio(row) {
            s += tier_at_most(ratio, &c.bearish_itm_tiers);
        }
        s += match row.regime {
            SwingRegime::Distribution => c.primary_regime_bonus,
            SwingRegime::Exhaustion => c.secondary_regime_bonus,
            _ => 0.0,
        };

        to_confidence(s)
    }

    pub fn label(&self, score: u8) -> ConfidenceLabel {
        if score >= self.config.high_score {
            ConfidenceLabel::High
        } else if score >= self.config.medium_score {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }

    pub fn horizon(&self, score: u8) -> HorizonRange {
        match self.label(score) {
            ConfidenceLabel::High => HorizonRange::new(7, 15),
            ConfidenceLabel::Medium => HorizonRange::new(5, 10),
            ConfidenceLabel::Low => HorizonRange::new(3, 7),
        }
    }

    /// Single dominant driver, first matching rule wins
    pub fn driver(&self, row: &SwingRow, side: Side) -> PressureDriver {
        let c = &self.config;
        match side {
            Side::Bullish => {
                if row.borrow_rate >= c.borrow_constraint_rate {
                    PressureDriver::BorrowConstraint
                } else if row.short_interest_change < 0.0 {
                    PressureDriver::ShortCovering
                } else {
                    PressureDriver::PositioningImbalance
                }
            }
            Side::Bearish => {
                let near_max_pain = row
                    .options
                    .as_ref()
                    .and_then(|o| o.max_pain_distance_pct)
                    .is_some_and(|pct| pct <= c.options_gravity_pct);

                if row.short_interest_change > 0.0 && row.borrow_rate <= c.short_reload_max_borrow {
                    PressureDriver::ShortReload
                } else if near_max_pain {
                    PressureDriver::OptionsGravity
                } else {
                    PressureDriver::LongUnwind
                }
            }
        }
    }
}
