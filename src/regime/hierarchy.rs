/// Weekly / daily timeframe hierarchy
///
/// A strongly confirmed weekly read vetoes the daily one, but the reported
/// confidence is always the more conservative of the two.

use crate::config::HierarchyThresholds;
use crate::models::{Direction, Regime};
use serde::{Deserialize, Serialize};

/// Which timeframe the final read came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HierarchySource {
    DailyOnly,
    WeeklyOverride,
    DailyPrimary,
}

/// A scored read on one timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeRead {
    pub regime: Regime,
    pub direction: Direction,
    pub confidence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyResolution {
    pub regime: Regime,
    pub direction: Direction,
    pub confidence: u8,
    pub source: HierarchySource,
}

impl HierarchyResolution {
    fn from_daily(daily: &TimeframeRead, source: HierarchySource) -> Self {
        Self {
            regime: daily.regime,
            direction: daily.direction,
            confidence: daily.confidence,
            source,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyResolver {
    thresholds: HierarchyThresholds,
}

impl HierarchyResolver {
    pub fn new(thresholds: HierarchyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn resolve(
        &self,
        weekly: Option<&TimeframeRead>,
        daily: &TimeframeRead,
    ) -> HierarchyResolution {
        let Some(weekly) = weekly else {
            return HierarchyResolution::from_daily(daily, HierarchySource::DailyOnly);
        };

        if weekly.confidence >= self.thresholds.override_confidence {
            tracing::debug!(
                "Weekly override: {} {} ({}) over daily {} {} ({})",
                weekly.regime,
                weekly.direction,
                weekly.confidence,
                daily.regime,
                daily.direction,
                daily.confidence
            );
            return HierarchyResolution {
                regime: weekly.regime,
                direction: weekly.direction,
                confidence: weekly.confidence.min(daily.confidence),
                source: HierarchySource::WeeklyOverride,
            };
        }

        HierarchyResolution::from_daily(daily, HierarchySource::DailyPrimary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(regime: Regime, direction: Direction, confidence: u8) -> TimeframeRead {
        TimeframeRead {
            regime,
            direction,
            confidence,
        }
    }

    #[test]
    fn test_no_weekly_passes_daily_through() {
        let resolver = HierarchyResolver::default();
        let daily = read(Regime::BullControlled, Direction::Up, 64);

        let resolved = resolver.resolve(None, &daily);
        assert_eq!(resolved.source, HierarchySource::DailyOnly);
        assert_eq!(resolved.direction, Direction::Up);
        assert_eq!(resolved.confidence, 64);
    }

    #[test]
    fn test_confident_weekly_overrides_with_conservative_confidence() {
        let resolver = HierarchyResolver::default();
        let weekly = read(Regime::BearControlled, Direction::Down, 85);
        let daily = read(Regime::BullControlled, Direction::Up, 52);

        let resolved = resolver.resolve(Some(&weekly), &daily);
        assert_eq!(resolved.source, HierarchySource::WeeklyOverride);
        assert_eq!(resolved.regime, Regime::BearControlled);
        assert_eq!(resolved.direction, Direction::Down);
        assert_eq!(resolved.confidence, 52);
    }

    #[test]
    fn test_override_never_raises_confidence_above_weekly() {
        let resolver = HierarchyResolver::default();
        let weekly = read(Regime::BearControlled, Direction::Down, 70);
        let daily = read(Regime::BearControlled, Direction::Down, 80);

        let resolved = resolver.resolve(Some(&weekly), &daily);
        assert_eq!(resolved.confidence, 70);
    }

    #[test]
    fn test_weak_weekly_leaves_daily_primary() {
        let resolver = HierarchyResolver::default();
        let weekly = read(Regime::BearControlled, Direction::Down, 69);
        let daily = read(Regime::Mixed, Direction::Neutral, 20);

        let resolved = resolver.resolve(Some(&weekly), &daily);
        assert_eq!(resolved.source, HierarchySource::DailyPrimary);
        assert_eq!(resolved.regime, Regime::Mixed);
        assert_eq!(resolved.confidence, 20);
    }
}
