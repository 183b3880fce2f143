use serde::{Deserialize, Serialize};
use std::fmt;

/// Neutral put/call ratio. Exactly this value carries no regime signal.
pub const NEUTRAL_PUT_CALL_RATIO: f64 = 1.0;

/// Neutral short-volume ratio (center of the no-edge band)
pub const NEUTRAL_SHORT_VOLUME_RATIO: f64 = 0.5;

fn neutral_put_call_ratio() -> f64 {
    NEUTRAL_PUT_CALL_RATIO
}

fn neutral_short_volume_ratio() -> f64 {
    NEUTRAL_SHORT_VOLUME_RATIO
}

/// Normalized market-structure indicators for one symbol at one evaluation instant
///
/// Every numeric field has a declared neutral default, so an unavailable
/// indicator is collapsed by the caller (or by serde) before evaluation.
/// Call [`IndicatorSnapshot::sanitized`] once at the boundary; the rule
/// tables never re-check individual fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    #[serde(default)]
    pub symbol: String,

    /// Put/call open-interest ratio
    #[serde(default = "neutral_put_call_ratio", alias = "pc_ratio")]
    pub put_call_ratio: f64,

    /// Total call open interest
    #[serde(default)]
    pub calls_total: f64,

    /// Total put open interest
    #[serde(default)]
    pub puts_total: f64,

    #[serde(default)]
    pub itm_calls: f64,

    #[serde(default)]
    pub itm_puts: f64,

    /// Max-pain strike (0 = unknown)
    #[serde(default)]
    pub max_pain: f64,

    #[serde(default)]
    pub today_volume: f64,

    #[serde(default)]
    pub avg20_volume: f64,

    /// Short volume / total volume
    #[serde(default = "neutral_short_volume_ratio")]
    pub short_volume_ratio: f64,

    /// Period-over-period change in shares sold short (0.02 = +2%)
    #[serde(default)]
    pub short_interest_change: f64,

    /// Annualized stock-borrow fee, in percent
    #[serde(default)]
    pub borrow_rate: f64,

    #[serde(default)]
    pub dealer_gamma: Option<f64>,

    /// Broad-market volatility index level (VIX-like)
    #[serde(default)]
    pub volatility_index: Option<f64>,

    #[serde(default)]
    pub call_oi_change: Option<f64>,

    #[serde(default)]
    pub put_oi_change: Option<f64>,
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            put_call_ratio: NEUTRAL_PUT_CALL_RATIO,
            calls_total: 0.0,
            puts_total: 0.0,
            itm_calls: 0.0,
            itm_puts: 0.0,
            max_pain: 0.0,
            today_volume: 0.0,
            avg20_volume: 0.0,
            short_volume_ratio: NEUTRAL_SHORT_VOLUME_RATIO,
            short_interest_change: 0.0,
            borrow_rate: 0.0,
            dealer_gamma: None,
            volatility_index: None,
            call_oi_change: None,
            put_oi_change: None,
        }
    }
}

impl IndicatorSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Collapse invalid values to their neutral defaults
    ///
    /// NaN and infinite values are replaced everywhere. Ratios, counts and
    /// rates must also be non-negative. Signed fields (short-interest change,
    /// dealer gamma, OI deltas) keep their sign.
    pub fn sanitized(mut self) -> Self {
        let symbol = self.symbol.clone();
        let fix = |name: &str, value: &mut f64, default: f64, signed: bool| {
            let invalid = !value.is_finite() || (!signed && *value < 0.0);
            if invalid {
                tracing::warn!(
                    "{}: {} = {} is not usable, falling back to {}",
                    symbol,
                    name,
                    value,
                    default
                );
                *value = default;
            }
        };

        fix("put_call_ratio", &mut self.put_call_ratio, NEUTRAL_PUT_CALL_RATIO, false);
        fix("calls_total", &mut self.calls_total, 0.0, false);
        fix("puts_total", &mut self.puts_total, 0.0, false);
        fix("itm_calls", &mut self.itm_calls, 0.0, false);
        fix("itm_puts", &mut self.itm_puts, 0.0, false);
        fix("max_pain", &mut self.max_pain, 0.0, false);
        fix("today_volume", &mut self.today_volume, 0.0, false);
        fix("avg20_volume", &mut self.avg20_volume, 0.0, false);
        fix(
            "short_volume_ratio",
            &mut self.short_volume_ratio,
            NEUTRAL_SHORT_VOLUME_RATIO,
            false,
        );
        fix("short_interest_change", &mut self.short_interest_change, 0.0, true);
        fix("borrow_rate", &mut self.borrow_rate, 0.0, false);

        self.dealer_gamma = self.dealer_gamma.filter(|g| g.is_finite());
        self.call_oi_change = self.call_oi_change.filter(|c| c.is_finite());
        self.put_oi_change = self.put_oi_change.filter(|c| c.is_finite());
        self.volatility_index = self
            .volatility_index
            .filter(|v| v.is_finite() && *v >= 0.0);

        self
    }
}

/// Dominant structural control of price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    BearControlled,
    BullControlled,
    Transitional,
    #[serde(alias = "NEUTRAL")]
    Mixed,
    /// Inputs were structurally absent
    Unknown,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::BearControlled => "BEAR_CONTROLLED",
            Regime::BullControlled => "BULL_CONTROLLED",
            Regime::Transitional => "TRANSITIONAL",
            Regime::Mixed => "MIXED",
            Regime::Unknown => "UNKNOWN",
        }
    }

    /// Regimes where the structure itself points one way
    pub fn is_trending(&self) -> bool {
        matches!(self, Regime::BearControlled | Regime::BullControlled)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Neutral,
    /// Forced reset: conviction too low or inputs missing
    NoTrade,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Neutral => "NEUTRAL",
            Direction::NoTrade => "NO_TRADE",
        }
    }

    /// Whether this regime is the one that structurally agrees with the direction
    pub fn aligns_with(&self, regime: Regime) -> bool {
        matches!(
            (self, regime),
            (Direction::Down, Regime::BearControlled) | (Direction::Up, Regime::BullControlled)
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason tags attached to an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    ShortReload,
    ShortCovering,
    ElevatedBorrow,
    RegimeAlignment,
    PressureDivergence,
    BorrowWeakening,
    WeeklyOverride,
    VolatilityExpansion,
    LowStructuralConviction,
    MissingChainData,
    ChainFetchFailed,
}

impl Driver {
    /// Tags that only describe the scored daily direction
    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            Driver::ShortReload | Driver::ShortCovering | Driver::RegimeAlignment
        )
    }
}

/// Why an evaluation had to degrade to the fixed no-trade envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradedCause {
    /// No snapshot was supplied at all
    MissingChainData,
    /// The caller's chain fetch failed before evaluation
    ChainFetchFailed,
}

impl DegradedCause {
    pub fn driver(&self) -> Driver {
        match self {
            DegradedCause::MissingChainData => Driver::MissingChainData,
            DegradedCause::ChainFetchFailed => Driver::ChainFetchFailed,
        }
    }
}
