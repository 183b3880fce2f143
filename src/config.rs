//! Canonical threshold table for every rule in the engine and scanner
//!
//! Defaults are the pinned production values. Any of them can be overridden
//! from a config file or from `SC__<SECTION>__<KEY>` environment variables.

use crate::error::EngineError;
use crate::models::NEUTRAL_PUT_CALL_RATIO;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides (`SC__REGIME__BEAR_THRESHOLD=1.6`)
pub const ENV_PREFIX: &str = "SC";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub regime: RegimeThresholds,
    pub direction: DirectionThresholds,
    pub transition: TransitionThresholds,
    pub confidence: ConfidenceWeights,
    pub hierarchy: HierarchyThresholds,
    pub volatility: VolatilityThresholds,
    pub execution: ExecutionTiers,
    pub scanner: ScannerConfig,
    pub bias: BiasWeights,
}

/// Put/call open-interest cutoffs for the regime classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegimeThresholds {
    /// Ratio at or above this = bear controlled
    pub bear_threshold: f64,
    /// Ratio at or below this = bull controlled
    pub bull_threshold: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            bear_threshold: 1.5,
            bull_threshold: 0.7,
        }
    }
}

/// Short-pressure band for the direction resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectionThresholds {
    /// Short-volume ratio above this (with rising short interest) = DOWN
    pub bearish_short_ratio: f64,
    /// Short-volume ratio below this (with falling short interest) = UP
    pub bullish_short_ratio: f64,
    /// Strict variant: DOWN also needs borrow cost above `borrow_confirmation_rate`
    pub require_borrow_confirmation: bool,
    pub borrow_confirmation_rate: f64,
}

impl Default for DirectionThresholds {
    fn default() -> Self {
        Self {
            bearish_short_ratio: 0.55,
            bullish_short_ratio: 0.45,
            require_borrow_confirmation: false,
            borrow_confirmation_rate: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionThresholds {
    /// Borrow rate below this = borrow weakening
    pub borrow_weakening_rate: f64,
    /// Short-volume ratio that splits "pressure present" from "pressure absent"
    pub divergence_midpoint: f64,
}

impl Default for TransitionThresholds {
    fn default() -> Self {
        Self {
            borrow_weakening_rate: 2.0,
            divergence_midpoint: 0.5,
        }
    }
}

/// How borrow-friction tiers combine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BorrowTierMode {
    /// Only the highest applicable tier is awarded
    Exclusive,
    /// Every tier the rate clears is awarded (still capped)
    Additive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegimeMultipliers {
    pub trending: f64,
    pub transitional: f64,
    pub mixed: f64,
    pub unknown: f64,
}

impl Default for RegimeMultipliers {
    fn default() -> Self {
        Self {
            trending: 1.0,
            transitional: 0.6,
            mixed: 0.4,
            unknown: 0.0,
        }
    }
}

/// Weights for the 0-100 confidence score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub structural_ratio_points: f64,
    pub structural_change_points: f64,
    pub bearish_ratio_cutoff: f64,
    pub bullish_ratio_cutoff: f64,

    pub borrow_high_rate: f64,
    pub borrow_high_points: f64,
    pub borrow_low_rate: f64,
    pub borrow_low_points: f64,
    pub borrow_tier_mode: BorrowTierMode,
    pub borrow_cap: f64,

    pub alignment_points: f64,
    pub regime_multipliers: RegimeMultipliers,

    /// Below this score any directional call is discarded
    pub floor: u8,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            structural_ratio_points: 20.0,
            structural_change_points: 20.0,
            bearish_ratio_cutoff: 0.55,
            bullish_ratio_cutoff: 0.45,
            borrow_high_rate: 10.0,
            borrow_high_points: 20.0,
            borrow_low_rate: 5.0,
            borrow_low_points: 10.0,
            borrow_tier_mode: BorrowTierMode::Exclusive,
            borrow_cap: 20.0,
            alignment_points: 20.0,
            regime_multipliers: RegimeMultipliers::default(),
            floor: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HierarchyThresholds {
    /// Weekly confidence at or above this overrides the daily read
    pub override_confidence: u8,
}

impl Default for HierarchyThresholds {
    fn default() -> Self {
        Self {
            override_confidence: 70,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolatilityThresholds {
    pub expansion_level: f64,
    pub compression_level: f64,
    pub expansion_confidence_cap: u8,
}

impl Default for VolatilityThresholds {
    fn default() -> Self {
        Self {
            expansion_level: 22.0,
            compression_level: 15.0,
            expansion_confidence_cap: 55,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionTiers {
    pub aggressive: u8,
    pub selective: u8,
    pub mean_reversion: u8,
}

impl Default for ExecutionTiers {
    fn default() -> Self {
        Self {
            aggressive: 80,
            selective: 60,
            mean_reversion: 40,
        }
    }
}

/// A single scoring step: clear `threshold` to earn `points`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tier {
    pub threshold: f64,
    pub points: f64,
}

impl Tier {
    pub const fn new(threshold: f64, points: f64) -> Self {
        Self { threshold, points }
    }
}

/// Daily-bias variant (normalized 0.0-1.0 confidence)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiasWeights {
    /// One side's OI must exceed the other's by this multiple to dominate
    pub dominance_multiple: f64,
    pub oi_weight: f64,
    pub volume_weight: f64,
    pub dealer_weight: f64,
}

impl Default for BiasWeights {
    fn default() -> Self {
        Self {
            dominance_multiple: 1.1,
            oi_weight: 0.4,
            volume_weight: 0.3,
            dealer_weight: 0.3,
        }
    }
}

/// Swing scanner weights. Tier lists are ordered strongest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    pub bullish_short_ratio: f64,
    pub bearish_short_ratio: f64,

    /// Short-interest change is scaled by this, then capped at `change_cap`
    pub change_multiplier: f64,
    pub change_cap: f64,
    pub ratio_points: f64,

    /// Bullish: high borrow means constrained supply (rate >= threshold)
    pub bullish_borrow_tiers: Vec<Tier>,
    /// Bearish: cheap borrow makes shorting easy (rate <= threshold)
    pub bearish_borrow_tiers: Vec<Tier>,
    /// Distance to max pain in percent (<= threshold)
    pub max_pain_tiers: Vec<Tier>,
    /// ITM call/put ratio (>= threshold)
    pub bullish_itm_tiers: Vec<Tier>,
    /// ITM call/put ratio (<= threshold)
    pub bearish_itm_tiers: Vec<Tier>,

    pub primary_regime_bonus: f64,
    pub secondary_regime_bonus: f64,

    pub high_score: u8,
    pub medium_score: u8,

    pub borrow_constraint_rate: f64,
    pub short_reload_max_borrow: f64,
    pub options_gravity_pct: f64,

    pub default_max_per_side: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            bullish_short_ratio: 0.45,
            bearish_short_ratio: 0.55,
            change_multiplier: 300.0,
            change_cap: 30.0,
            ratio_points: 20.0,
            bullish_borrow_tiers: vec![Tier::new(8.0, 15.0), Tier::new(4.0, 8.0)],
            bearish_borrow_tiers: vec![Tier::new(5.0, 15.0), Tier::new(8.0, 8.0)],
            max_pain_tiers: vec![Tier::new(2.0, 10.0), Tier::new(4.0, 5.0)],
            bullish_itm_tiers: vec![Tier::new(1.2, 10.0), Tier::new(1.05, 5.0)],
            bearish_itm_tiers: vec![Tier::new(0.85, 10.0), Tier::new(0.95, 5.0)],
            primary_regime_bonus: 15.0,
            secondary_regime_bonus: 8.0,
            high_score: 80,
            medium_score: 60,
            borrow_constraint_rate: 8.0,
            short_reload_max_borrow: 5.0,
            options_gravity_pct: 2.0,
            default_max_per_side: 5,
        }
    }
}

impl EngineConfig {
    /// Load defaults, then an optional file, then `SC__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            tracing::info!("Loading threshold overrides from {}", path.display());
            builder = builder.add_source(::config::File::from(path));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject threshold tables that would make the rule tables incoherent
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.regime.bull_threshold >= self.regime.bear_threshold {
            return invalid(format!(
                "regime.bull_threshold ({}) must be below regime.bear_threshold ({})",
                self.regime.bull_threshold, self.regime.bear_threshold
            ));
        }

        // The neutral default ratio must stay MIXED
        if self.regime.bull_threshold >= NEUTRAL_PUT_CALL_RATIO
            || self.regime.bear_threshold <= NEUTRAL_PUT_CALL_RATIO
        {
            return invalid(format!(
                "regime thresholds must bracket the neutral ratio {}: bull_threshold {}, bear_threshold {}",
                NEUTRAL_PUT_CALL_RATIO, self.regime.bull_threshold, self.regime.bear_threshold
            ));
        }

        if self.direction.bullish_short_ratio >= self.direction.bearish_short_ratio {
            return invalid(format!(
                "direction band is inverted: bullish {} >= bearish {}",
                self.direction.bullish_short_ratio, self.direction.bearish_short_ratio
            ));
        }

        if self.scanner.bullish_short_ratio >= self.scanner.bearish_short_ratio {
            return invalid(format!(
                "scanner band is inverted: bullish {} >= bearish {}",
                self.scanner.bullish_short_ratio, self.scanner.bearish_short_ratio
            ));
        }

        if self.confidence.floor > 100 {
            return invalid(format!("confidence.floor ({}) exceeds 100", self.confidence.floor));
        }

        if self.confidence.borrow_low_rate > self.confidence.borrow_high_rate {
            return invalid(format!(
                "confidence borrow tiers out of order: low {} > high {}",
                self.confidence.borrow_low_rate, self.confidence.borrow_high_rate
            ));
        }

        let tiers = &self.execution;
        if !(tiers.mean_reversion < tiers.selective
            && tiers.selective < tiers.aggressive
            && tiers.aggressive <= 100)
        {
            return invalid(format!(
                "execution tiers must be ordered mean_reversion < selective < aggressive <= 100, got {}/{}/{}",
                tiers.mean_reversion, tiers.selective, tiers.aggressive
            ));
        }

        if self.volatility.compression_level >= self.volatility.expansion_level {
            return invalid(format!(
                "volatility.compression_level ({}) must be below expansion_level ({})",
                self.volatility.compression_level, self.volatility.expansion_level
            ));
        }

        if self.scanner.medium_score >= self.scanner.high_score || self.scanner.high_score > 100 {
            return invalid(format!(
                "scanner labels must satisfy medium < high <= 100, got {}/{}",
                self.scanner.medium_score, self.scanner.high_score
            ));
        }

        let bias = &self.bias;
        let weight_sum = bias.oi_weight + bias.volume_weight + bias.dealer_weight;
        if bias.dominance_multiple < 1.0 || (weight_sum - 1.0).abs() > 1e-9 {
            return invalid(format!(
                "bias weights must sum to 1.0 with dominance_multiple >= 1.0, got sum {} multiple {}",
                weight_sum, bias.dominance_multiple
            ));
        }

        Ok(())
    }
}
