use crate::config::ExecutionTiers;
use crate::models::{Direction, Regime};
use serde::{Deserialize, Serialize};

/// How much trading authority an evaluation grants, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    NoTrade,
    MeanReversionOnly,
    Selective,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldHorizon {
    NoHold,
    IntradayOnly,
    IntradayPrimary,
    SwingAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeCap {
    None,
    Minimal,
    Reduced,
    Full,
}

impl SizeCap {
    /// Fraction of a normal position size
    pub fn fraction(&self) -> f64 {
        match self {
            SizeCap::None => 0.0,
            SizeCap::Minimal => 0.25,
            SizeCap::Reduced => 0.5,
            SizeCap::Full => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockedBehavior {
    Long,
    Short,
    Reversal,
    Fade,
    Hold,
}

/// Every behavior, blocked when permission is withdrawn entirely
pub const ALL_BLOCKED: [BlockedBehavior; 5] = [
    BlockedBehavior::Long,
    BlockedBehavior::Short,
    BlockedBehavior::Reversal,
    BlockedBehavior::Fade,
    BlockedBehavior::Hold,
];

const SHORT_THE_RIP: &[&str] = &[
    "Short failed pops into VWAP / prior day high",
    "Sell call-side rips; avoid chasing breakdowns",
    "Favor downside momentum after weak bounces",
    "Cover partials into intraday support",
];

const BUY_THE_DIP: &[&str] = &[
    "Buy pullbacks into VWAP / prior day low",
    "Sell put-side flushes; avoid chasing breakouts",
    "Favor upside momentum after consolidation",
    "Trim into intraday resistance",
];

const MEAN_REVERSION: &[&str] = &[
    "Mean reversion only",
    "Fade extremes into VWAP",
    "Avoid trend continuation trades",
];

/// Trade playbook, one variant per direction
///
/// Each variant owns its own static trade list so branches can never share
/// or mutate each other's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradePlaybook {
    ShortTheRip,
    BuyTheDip,
    MeanReversion,
    StandAside,
}

impl TradePlaybook {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Down => TradePlaybook::ShortTheRip,
            Direction::Up => TradePlaybook::BuyTheDip,
            Direction::Neutral => TradePlaybook::MeanReversion,
            Direction::NoTrade => TradePlaybook::StandAside,
        }
    }

    pub fn trades(&self) -> &'static [&'static str] {
        match self {
            TradePlaybook::ShortTheRip => SHORT_THE_RIP,
            TradePlaybook::BuyTheDip => BUY_THE_DIP,
            TradePlaybook::MeanReversion => MEAN_REVERSION,
            TradePlaybook::StandAside => &[],
        }
    }

    pub fn primary_risk(&self) -> &'static str {
        match self {
            TradePlaybook::ShortTheRip => "Sharp bear-market rallies squeezing shorts",
            TradePlaybook::BuyTheDip => "Fast downside reversals after long positioning",
            TradePlaybook::MeanReversion => "False breakouts in low-certainty regime",
            TradePlaybook::StandAside => "Forcing trades without structural support",
        }
    }

    pub fn invalidation(&self) -> &'static str {
        match self {
            TradePlaybook::ShortTheRip => {
                "Short-volume ratio drops back into the neutral band or short interest starts falling"
            }
            TradePlaybook::BuyTheDip => {
                "Short-volume ratio climbs back into the neutral band or short interest starts rising"
            }
            TradePlaybook::MeanReversion => {
                "Short pressure leaves the neutral band with confirming short-interest change"
            }
            TradePlaybook::StandAside => "Structural conviction recovers above the confidence floor",
        }
    }
}

/// Execution permission derived from (confidence, regime, direction)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPermission {
    pub execution_mode: ExecutionMode,
    pub playbook: TradePlaybook,
    pub allowed_trades: Vec<String>,
    pub size_cap: SizeCap,
    pub hold_horizon: HoldHorizon,
    pub blocked_behaviors: Vec<BlockedBehavior>,
    pub primary_risk: String,
    pub invalidation_condition: String,
}

/// Execution/Risk Mapper
///
/// Total lookup: every reachable (confidence, regime, direction) yields a
/// defined permission. There is no error state.
#[derive(Debug, Clone, Default)]
pub struct PermissionMapper {
    tiers: ExecutionTiers,
}

impl PermissionMapper {
    pub fn new(tiers: ExecutionTiers) -> Self {
        Self { tiers }
    }

    pub fn mode_for(&self, confidence: u8) -> ExecutionMode {
        if confidence >= self.tiers.aggressive {
            ExecutionMode::Aggressive
        } else if confidence >= self.tiers.selective {
            ExecutionMode::Selective
        } else if confidence >= self.tiers.mean_reversion {
            ExecutionMode::MeanReversionOnly
        } else {
            ExecutionMode::NoTrade
        }
    }

    /// Map a scored read to its permission
    ///
    /// `ceiling` demotes the confidence tier (e.g. under volatility expansion);
    /// it never promotes a weaker tier.
    pub fn map(
        &self,
        confidence: u8,
        regime: Regime,
        direction: Direction,
        ceiling: Option<ExecutionMode>,
    ) -> ExecutionPermission {
        let mut mode = self.mode_for(confidence);
        if let Some(ceiling) = ceiling {
            mode = mode.min(ceiling);
        }
        if direction == Direction::NoTrade || regime == Regime::Unknown {
            mode = ExecutionMode::NoTrade;
        }

        let playbook = TradePlaybook::for_direction(direction);

        let (size_cap, hold_horizon) = match mode {
            ExecutionMode::Aggressive => (SizeCap::Full, HoldHorizon::SwingAllowed),
            ExecutionMode::Selective => (SizeCap::Reduced, HoldHorizon::IntradayPrimary),
            ExecutionMode::MeanReversionOnly => (SizeCap::Minimal, HoldHorizon::IntradayOnly),
            ExecutionMode::NoTrade => (SizeCap::None, HoldHorizon::NoHold),
        };

        ExecutionPermission {
            execution_mode: mode,
            playbook,
            allowed_trades: playbook.trades().iter().map(|t| t.to_string()).collect(),
            size_cap,
            hold_horizon,
            blocked_behaviors: blocked_behaviors(mode, direction),
            primary_risk: playbook.primary_risk().to_string(),
            invalidation_condition: playbook.invalidation().to_string(),
        }
    }
}

fn blocked_behaviors(mode: ExecutionMode, direction: Direction) -> Vec<BlockedBehavior> {
    if mode == ExecutionMode::NoTrade {
        return ALL_BLOCKED.to_vec();
    }

    let mut blocked = Vec::new();
    match direction {
        Direction::Down => blocked.push(BlockedBehavior::Long),
        Direction::Up => blocked.push(BlockedBehavior::Short),
        Direction::Neutral | Direction::NoTrade => {}
    }

    match mode {
        ExecutionMode::Aggressive => blocked.push(BlockedBehavior::Reversal),
        ExecutionMode::Selective => {
            blocked.push(BlockedBehavior::Reversal);
            blocked.push(BlockedBehavior::Hold);
        }
        ExecutionMode::MeanReversionOnly => blocked.push(BlockedBehavior::Hold),
        ExecutionMode::NoTrade => {}
    }

    blocked
}
