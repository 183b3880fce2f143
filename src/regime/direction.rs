use crate::config::DirectionThresholds;
use crate::models::Direction;

/// Short-sale pressure inputs for the direction resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortPressure {
    pub short_volume_ratio: f64,
    pub short_interest_change: f64,
    pub borrow_rate: f64,
}

/// Maps short-sale pressure to a directional label
///
/// - DOWN: heavy short volume while short interest builds (shorts reloading)
/// - UP: light short volume while short interest falls (short covering)
/// - NEUTRAL: anything inside the no-edge band, or mismatched signals
#[derive(Debug, Clone, Default)]
pub struct DirectionResolver {
    thresholds: DirectionThresholds,
}

impl DirectionResolver {
    pub fn new(thresholds: DirectionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn resolve(&self, pressure: &ShortPressure) -> Direction {
        let t = &self.thresholds;

        let reloading = pressure.short_volume_ratio > t.bearish_short_ratio
            && pressure.short_interest_change > 0.0;
        let borrow_confirms =
            !t.require_borrow_confirmation || pressure.borrow_rate > t.borrow_confirmation_rate;

        if reloading && borrow_confirms {
            return Direction::Down;
        }

        if pressure.short_volume_ratio < t.bullish_short_ratio
            && pressure.short_interest_change < 0.0
        {
            return Direction::Up;
        }

        Direction::Neutral
    }
}
