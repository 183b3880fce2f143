use crate::config::ScannerConfig;
use crate::scanner::{Side, SwingRegime, SwingRow};

/// Outcome of the eligibility gate for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(Side),
    Ineligible(&'static str),
}

impl Eligibility {
    pub fn side(&self) -> Option<Side> {
        match self {
            Eligibility::Eligible(side) => Some(*side),
            Eligibility::Ineligible(_) => None,
        }
    }
}

/// Swing eligibility gate
///
/// Checks, in order:
/// 1. Regime: rows already in TRANSITION never qualify
/// 2. Bullish: short volume below the band while short interest falls
/// 3. Bearish: short volume above the band while short interest builds
///
/// The two ratio bands are disjoint, so a row qualifies for at most one side.
pub fn check(row: &SwingRow, config: &ScannerConfig) -> Eligibility {
    if row.regime == SwingRegime::Transition {
        return Eligibility::Ineligible("TransitionRegime");
    }

    if row.short_volume_ratio < config.bullish_short_ratio {
        if row.short_interest_change < 0.0 {
            return Eligibility::Eligible(Side::Bullish);
        }
        return Eligibility::Ineligible("NoShortCovering");
    }

    if row.short_volume_ratio > config.bearish_short_ratio {
        if row.short_interest_change > 0.0 {
            return Eligibility::Eligible(Side::Bearish);
        }
        return Eligibility::Ineligible("NoShortReload");
    }

    Eligibility::Ineligible("NeutralBand")
}
