//! Swing eligibility and ranking scanner
//!
//! Runs independently of the envelope pipeline: each row in a universe is
//! gated, scored for its side, labelled and ranked into bounded top-N
//! bullish and bearish lists.

pub mod eligibility;
pub mod ranking;
pub mod scoring;

pub use eligibility::Eligibility;
pub use scoring::SwingScorer;

use crate::config::ScannerConfig;
use crate::error::EngineError;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Fixed notes attached to every scan report
pub const SCAN_NOTES: [&str; 2] = [
    "Structural imbalance required for inclusion",
    "Rank reflects forced resolution, not trend strength",
];

/// Swing-cadence regime label supplied with each row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwingRegime {
    Accumulation,
    Expansion,
    Distribution,
    Exhaustion,
    Transition,
    #[default]
    #[serde(other)]
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsContext {
    #[serde(default)]
    pub max_pain_distance_pct: Option<f64>,
    #[serde(default)]
    pub itm_call_put_ratio: Option<f64>,
}

/// One symbol's swing-cadence indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingRow {
    pub symbol: String,
    #[serde(default = "neutral_short_ratio")]
    pub short_volume_ratio: f64,
    #[serde(default)]
    pub short_interest_change: f64,
    #[serde(default)]
    pub borrow_rate: f64,
    #[serde(default)]
    pub regime: SwingRegime,
    #[serde(default)]
    pub options: Option<OptionsContext>,
}

fn neutral_short_ratio() -> f64 {
    crate::models::NEUTRAL_SHORT_VOLUME_RATIO
}

impl SwingRow {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            short_volume_ratio: neutral_short_ratio(),
            short_interest_change: 0.0,
            borrow_rate: 0.0,
            regime: SwingRegime::default(),
            options: None,
        }
    }

    /// Replace non-finite or out-of-range values with neutral defaults
    pub fn sanitized(mut self) -> Self {
        if !self.short_volume_ratio.is_finite() || self.short_volume_ratio < 0.0 {
            tracing::warn!(
                "{}: invalid short_volume_ratio {}, using neutral",
                self.symbol,
                self.short_volume_ratio
            );
            self.short_volume_ratio = neutral_short_ratio();
        }
        if !self.short_interest_change.is_finite() {
            tracing::warn!("{}: invalid short_interest_change, using 0", self.symbol);
            self.short_interest_change = 0.0;
        }
        if !self.borrow_rate.is_finite() || self.borrow_rate < 0.0 {
            tracing::warn!("{}: invalid borrow_rate {}, using 0", self.symbol, self.borrow_rate);
            self.borrow_rate = 0.0;
        }
        if let Some(options) = self.options.as_mut() {
            options.max_pain_distance_pct = options.max_pain_distance_pct.filter(|v| v.is_finite());
            options.itm_call_put_ratio = options
                .itm_call_put_ratio
                .filter(|v| v.is_finite() && *v >= 0.0);
        }
        self
    }
}

/// Score bucket, ordered LOW < MEDIUM < HIGH
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLabel {
    Low,
    #[default]
    Medium,
    High,
}

/// Expected holding period in days, serialized with an en dash as "7–15"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonRange {
    pub min_days: u8,
    pub max_days: u8,
}

impl HorizonRange {
    pub const fn new(min_days: u8, max_days: u8) -> Self {
        Self { min_days, max_days }
    }
}

impl fmt::Display for HorizonRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{2013}{}", self.min_days, self.max_days)
    }
}

impl Serialize for HorizonRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressureDriver {
    BorrowConstraint,
    ShortCovering,
    PositioningImbalance,
    ShortReload,
    OptionsGravity,
    LongUnwind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwingCandidate {
    pub rank: usize,
    pub symbol: String,
    pub score: u8,
    pub regime: SwingRegime,
    pub pressure_driver: PressureDriver,
    pub time_horizon_days: HorizonRange,
    pub confidence: ConfidenceLabel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConstraints {
    #[serde(default)]
    pub max_bullish: Option<usize>,
    #[serde(default)]
    pub max_bearish: Option<usize>,
    #[serde(default)]
    pub min_confidence: Option<ConfidenceLabel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub scan_date: Option<NaiveDate>,
    #[serde(default)]
    pub universe: Option<Universe>,
    #[serde(default)]
    pub data: Vec<SwingRow>,
    #[serde(default)]
    pub constraints: ScanConstraints,
}

impl ScanRequest {
    pub fn validate(&self) -> Result<()> {
        match &self.universe {
            Some(universe) if !universe.symbols.is_empty() => {}
            _ => {
                return Err(EngineError::InvalidScanRequest(
                    "Missing universe.symbols".to_string(),
                ))
            }
        }

        if self.data.is_empty() {
            return Err(EngineError::InvalidScanRequest(
                "No data rows provided".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub scan_date: NaiveDate,
    pub universe: Universe,
    pub bullish_swings: Vec<SwingCandidate>,
    pub bearish_swings: Vec<SwingCandidate>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SwingScanner {
    config: ScannerConfig,
    scorer: SwingScorer,
}

impl SwingScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            scorer: SwingScorer::new(config.clone()),
            config,
        }
    }

    /// Gate, score and label one row; None when it qualifies for neither side
    pub fn candidate(&self, row: &SwingRow) -> Option<(Side, SwingCandidate)> {
        let side = match eligibility::check(row, &self.config) {
            Eligibility::Eligible(side) => side,
            Eligibility::Ineligible(reason) => {
                tracing::debug!("{}: not eligible ({})", row.symbol, reason);
                return None;
            }
        };

        let score = self.scorer.score(row, side);
        let candidate = SwingCandidate {
            rank: 0,
            symbol: row.symbol.clone(),
            score,
            regime: row.regime,
            pressure_driver: self.scorer.driver(row, side),
            time_horizon_days: self.scorer.horizon(score),
            confidence: self.scorer.label(score),
        };
        Some((side, candidate))
    }

    /// Rank a universe of rows
    ///
    /// `today` is used only when the request carries no `scan_date`.
    pub fn scan(&self, request: &ScanRequest, today: NaiveDate) -> Result<ScanReport> {
        request.validate()?;

        let constraints = &request.constraints;
        let min_confidence = constraints.min_confidence.unwrap_or_default();
        let max_bullish = constraints
            .max_bullish
            .unwrap_or(self.config.default_max_per_side);
        let max_bearish = constraints
            .max_bearish
            .unwrap_or(self.config.default_max_per_side);

        let mut bullish = Vec::new();
        let mut bearish = Vec::new();

        for row in &request.data {
            match self.candidate(&row.clone().sanitized()) {
                Some((Side::Bullish, candidate)) => bullish.push(candidate),
                Some((Side::Bearish, candidate)) => bearish.push(candidate),
                None => {}
            }
        }

        let bullish_swings = ranking::rank(bullish, min_confidence, max_bullish);
        let bearish_swings = ranking::rank(bearish, min_confidence, max_bearish);

        tracing::info!(
            "Swing scan: {} rows -> {} bullish, {} bearish (min {:?})",
            request.data.len(),
            bullish_swings.len(),
            bearish_swings.len(),
            min_confidence
        );

        Ok(ScanReport {
            scan_date: request.scan_date.unwrap_or(today),
            universe: request.universe.clone().unwrap_or_default(),
            bullish_swings,
            bearish_swings,
            notes: SCAN_NOTES.iter().map(|n| n.to_string()).collect(),
        })
    }
}
