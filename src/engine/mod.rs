//! Structural certainty engine
//!
//! Pipeline for one symbol:
//! snapshot -> {regime classifier, direction resolver} -> transition detector
//! -> confidence scorer (+ floor) -> weekly/daily hierarchy -> volatility gate
//! -> execution/risk mapper -> envelope
//!
//! The engine holds only configuration. Every call is a pure function of its
//! arguments, so one engine can be shared across threads.

pub mod batch;

pub use batch::{BatchReport, BatchRequest};

use crate::bias::{DailyBias, DailyBiasEngine};
use crate::config::EngineConfig;
use crate::models::{DegradedCause, Direction, Driver, IndicatorSnapshot, Regime};
use crate::narrative::{DailyNarrative, NarrativeBuilder};
use crate::regime::{
    DirectionResolver, HierarchyResolution, HierarchyResolver, HierarchySource,
    RegimeClassifier, RegimeTransition, ShortPressure, TimeframeRead, TransitionDetector,
};
use crate::risk::{ExecutionPermission, PermissionMapper};
use crate::scoring::{ConfidenceBreakdown, ConfidenceScorer, VolatilityGate, VolatilityReport, VolatilityState};
use serde::{Deserialize, Serialize};

/// One symbol to evaluate, as handed over by the data-fetching caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub symbol: String,
    #[serde(default)]
    pub snapshot: Option<IndicatorSnapshot>,
    /// Higher-timeframe (weekly) read, if one was computed
    #[serde(default)]
    pub weekly: Option<TimeframeRead>,
    /// Set by the caller when the chain fetch failed
    #[serde(default)]
    pub fetch_error: Option<String>,
}

impl EvaluationRequest {
    pub fn new(symbol: impl Into<String>, snapshot: IndicatorSnapshot) -> Self {
        Self {
            symbol: symbol.into(),
            snapshot: Some(snapshot),
            weekly: None,
            fetch_error: None,
        }
    }

    pub fn with_weekly(mut self, weekly: TimeframeRead) -> Self {
        self.weekly = Some(weekly);
        self
    }
}

/// Final classification and execution permission for one symbol
///
/// Built fresh for each evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEnvelope {
    pub symbol: String,
    pub regime: Regime,
    pub direction: Direction,
    pub confidence: u8,
    #[serde(flatten)]
    pub permission: ExecutionPermission,
    pub drivers: Vec<Driver>,
    pub breakdown: Option<ConfidenceBreakdown>,
    pub transition: Option<RegimeTransition>,
    pub hierarchy: Option<HierarchyResolution>,
    pub volatility: VolatilityReport,
    pub degraded: Option<DegradedCause>,
}

impl ExecutionEnvelope {
    /// This envelope as a higher-timeframe input for another evaluation
    pub fn as_timeframe_read(&self) -> TimeframeRead {
        TimeframeRead {
            regime: self.regime,
            direction: self.direction,
            confidence: self.confidence,
        }
    }

    pub fn is_tradeable(&self) -> bool {
        self.permission.execution_mode != crate::risk::ExecutionMode::NoTrade
    }
}

#[derive(Debug, Clone, Default)]
pub struct StructuralCertaintyEngine {
    config: EngineConfig,
    classifier: RegimeClassifier,
    direction: DirectionResolver,
    transition: TransitionDetector,
    scorer: ConfidenceScorer,
    hierarchy: HierarchyResolver,
    gate: VolatilityGate,
    mapper: PermissionMapper,
    bias: DailyBiasEngine,
    narrative: NarrativeBuilder,
}

impl StructuralCertaintyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            classifier: RegimeClassifier::new(config.regime.clone()),
            direction: DirectionResolver::new(config.direction.clone()),
            transition: TransitionDetector::new(config.transition.clone()),
            scorer: ConfidenceScorer::new(config.confidence.clone()),
            hierarchy: HierarchyResolver::new(config.hierarchy.clone()),
            gate: VolatilityGate::new(config.volatility.clone()),
            mapper: PermissionMapper::new(config.execution.clone()),
            bias: DailyBiasEngine::new(config.bias.clone()),
            narrative: NarrativeBuilder::new(config.regime.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a single snapshot with no higher timeframe
    pub fn evaluate_snapshot(&self, snapshot: &IndicatorSnapshot) -> ExecutionEnvelope {
        let request = EvaluationRequest::new(snapshot.symbol.clone(), snapshot.clone());
        self.evaluate(&request, None)
    }

    /// Evaluate one symbol
    ///
    /// `volatility_index` is the shared market reading. When absent the
    /// snapshot's own `volatility_index` is used.
    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        volatility_index: Option<f64>,
    ) -> ExecutionEnvelope {
        if let Some(error) = &request.fetch_error {
            tracing::warn!("{}: chain fetch failed ({}), degrading", request.symbol, error);
            return self.degraded(&request.symbol, DegradedCause::ChainFetchFailed, volatility_index);
        }

        let Some(snapshot) = &request.snapshot else {
            tracing::warn!("{}: no indicator snapshot, degrading", request.symbol);
            return self.degraded(&request.symbol, DegradedCause::MissingChainData, volatility_index);
        };

        let snapshot = snapshot.clone().sanitized();
        let pressure = ShortPressure {
            short_volume_ratio: snapshot.short_volume_ratio,
            short_interest_change: snapshot.short_interest_change,
            borrow_rate: snapshot.borrow_rate,
        };

        // 1. Classify both axes
        let classified = self.classifier.classify(snapshot.put_call_ratio);
        let direction = self.direction.resolve(&pressure);

        // 2. Conflicting weak signals override the regime
        let transition = self.transition.detect(classified, direction, &pressure);
        let regime = transition.to;

        // 3. Score the daily read and enforce the floor
        let breakdown = self.scorer.score(&pressure, regime, direction);
        let mut drivers = breakdown.drivers.clone();
        drivers.extend(transition.causes.iter().copied());

        let mut daily = TimeframeRead {
            regime,
            direction,
            confidence: breakdown.confidence,
        };
        self.scorer.apply_floor(&mut daily, &mut drivers);

        // 4. Reconcile with the weekly read, then re-check the floor
        let hierarchy = self.hierarchy.resolve(request.weekly.as_ref(), &daily);
        if hierarchy.source == HierarchySource::WeeklyOverride {
            if hierarchy.regime != daily.regime || hierarchy.direction != daily.direction {
                drivers.retain(|d| !d.is_directional());
            }
            drivers.push(Driver::WeeklyOverride);
        }
        let mut resolved = TimeframeRead {
            regime: hierarchy.regime,
            direction: hierarchy.direction,
            confidence: hierarchy.confidence,
        };
        self.scorer.apply_floor(&mut resolved, &mut drivers);

        // 5. Volatility gate
        let level = volatility_index.or(snapshot.volatility_index);
        let state = self.gate.classify(level);
        let gated = self.gate.apply(state, resolved.confidence);
        if state == VolatilityState::Expansion {
            drivers.push(Driver::VolatilityExpansion);
        }

        // 6. Execution permission
        let permission = self.mapper.map(
            gated.confidence,
            resolved.regime,
            resolved.direction,
            gated.mode_ceiling,
        );

        tracing::info!(
            "{}: {} / {} confidence {} -> {:?} ({:?})",
            request.symbol,
            resolved.regime,
            resolved.direction,
            gated.confidence,
            permission.execution_mode,
            hierarchy.source
        );

        ExecutionEnvelope {
            symbol: request.symbol.clone(),
            regime: resolved.regime,
            direction: resolved.direction,
            confidence: gated.confidence,
            permission,
            drivers,
            breakdown: Some(breakdown),
            transition: Some(transition),
            hierarchy: Some(hierarchy),
            volatility: self.gate.report(level, &gated),
            degraded: None,
        }
    }

    /// Fixed no-trade envelope for structurally absent inputs
    pub fn degraded(
        &self,
        symbol: &str,
        cause: DegradedCause,
        volatility_index: Option<f64>,
    ) -> ExecutionEnvelope {
        let gated = self.gate.apply(self.gate.classify(volatility_index), 0);

        ExecutionEnvelope {
            symbol: symbol.to_string(),
            regime: Regime::Unknown,
            direction: Direction::NoTrade,
            confidence: 0,
            permission: self.mapper.map(0, Regime::Unknown, Direction::NoTrade, None),
            drivers: vec![cause.driver()],
            breakdown: None,
            transition: None,
            hierarchy: None,
            volatility: self.gate.report(volatility_index, &gated),
            degraded: Some(cause),
        }
    }

    /// Normalized 0.0-1.0 daily bias from OI dominance and volume expansion
    pub fn daily_bias(&self, snapshot: &IndicatorSnapshot) -> DailyBias {
        self.bias.evaluate(&snapshot.clone().sanitized())
    }

    /// Options-chain tape narrative
    pub fn narrate(&self, snapshot: &IndicatorSnapshot) -> DailyNarrative {
        self.narrative.build(&snapshot.clone().sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{BlockedBehavior, ExecutionMode, HoldHorizon, TradePlaybook};

    fn bear_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            put_call_ratio: 1.8,
            calls_total: 1000.0,
            puts_total: 2200.0,
            short_volume_ratio: 0.62,
            short_interest_change: 0.03,
            borrow_rate: 12.0,
            ..IndicatorSnapshot::new("XYZ")
        }
    }

    #[test]
    fn test_full_bear_setup_is_aggressive_short() {
        let engine = StructuralCertaintyEngine::default();
        let envelope = engine.evaluate_snapshot(&bear_snapshot());

        assert_eq!(envelope.regime, Regime::BearControlled);
        assert_eq!(envelope.direction, Direction::Down);
        assert_eq!(envelope.confidence, 80);
        assert_eq!(envelope.permission.execution_mode, ExecutionMode::Aggressive);
        assert_eq!(envelope.permission.playbook, TradePlaybook::ShortTheRip);
        assert_eq!(
            envelope.hierarchy.map(|h| h.source),
            Some(HierarchySource::DailyOnly)
        );
        assert!(envelope.is_tradeable());
    }

    #[test]
    fn test_missing_snapshot_degrades() {
        let engine = StructuralCertaintyEngine::default();
        let request = EvaluationRequest {
            symbol: "SPY".to_string(),
            ..EvaluationRequest::default()
        };

        let envelope = engine.evaluate(&request, None);
        assert_eq!(envelope.regime, Regime::Unknown);
        assert_eq!(envelope.direction, Direction::NoTrade);
        assert_eq!(envelope.confidence, 0);
        assert_eq!(envelope.drivers, vec![Driver::MissingChainData]);
        assert_eq!(envelope.degraded, Some(DegradedCause::MissingChainData));
        assert!(envelope
            .permission
            .blocked_behaviors
            .contains(&BlockedBehavior::Long));
        assert!(envelope
            .permission
            .blocked_behaviors
            .contains(&BlockedBehavior::Short));
    }

    #[test]
    fn test_fetch_error_degrades_even_with_snapshot() {
        let engine = StructuralCertaintyEngine::default();
        let mut request = EvaluationRequest::new("SPY", bear_snapshot());
        request.fetch_error = Some("HTTP 503".to_string());

        let envelope = engine.evaluate(&request, None);
        assert_eq!(envelope.degraded, Some(DegradedCause::ChainFetchFailed));
        assert_eq!(envelope.drivers, vec![Driver::ChainFetchFailed]);
    }

    #[test]
    fn test_all_zero_snapshot_is_classified_not_rejected() {
        let engine = StructuralCertaintyEngine::default();
        let snapshot = IndicatorSnapshot {
            put_call_ratio: 0.0,
            short_volume_ratio: 0.0,
            ..IndicatorSnapshot::new("ZERO")
        };

        let envelope = engine.evaluate_snapshot(&snapshot);
        assert_eq!(envelope.degraded, None);
        assert_eq!(envelope.direction, Direction::NoTrade);
        assert!(envelope.drivers.contains(&Driver::LowStructuralConviction));
    }

    #[test]
    fn test_volatility_expansion_demotes_and_caps() {
        let engine = StructuralCertaintyEngine::default();
        let envelope = engine.evaluate(&EvaluationRequest::new("XYZ", bear_snapshot()), Some(28.0));

        assert_eq!(envelope.confidence, 55);
        assert_eq!(
            envelope.permission.execution_mode,
            ExecutionMode::MeanReversionOnly
        );
        assert_eq!(envelope.permission.hold_horizon, HoldHorizon::IntradayOnly);
        assert_eq!(envelope.volatility.state, VolatilityState::Expansion);
        assert!(envelope.drivers.contains(&Driver::VolatilityExpansion));
    }

    #[test]
    fn test_snapshot_volatility_used_when_no_shared_reading() {
        let engine = StructuralCertaintyEngine::default();
        let snapshot = IndicatorSnapshot {
            volatility_index: Some(24.0),
            ..bear_snapshot()
        };

        let envelope = engine.evaluate_snapshot(&snapshot);
        assert_eq!(envelope.volatility.level, Some(24.0));
        assert_eq!(envelope.confidence, 55);
    }

    #[test]
    fn test_weekly_override_uses_conservative_confidence() {
        let engine = StructuralCertaintyEngine::default();
        // Daily: bull regime, short covering, modest borrow
        let daily = IndicatorSnapshot {
            put_call_ratio: 0.6,
            short_volume_ratio: 0.35,
            short_interest_change: -0.02,
            borrow_rate: 3.0,
            ..IndicatorSnapshot::new("ABC")
        };
        let weekly = TimeframeRead {
            regime: Regime::BearControlled,
            direction: Direction::Down,
            confidence: 90,
        };

        let envelope = engine.evaluate(&EvaluationRequest::new("ABC", daily).with_weekly(weekly), None);

        // Daily scores 40 + 0 + 20 = 60
        assert_eq!(envelope.regime, Regime::BearControlled);
        assert_eq!(envelope.direction, Direction::Down);
        assert_eq!(envelope.confidence, 60);
        assert_eq!(envelope.drivers, vec![Driver::WeeklyOverride]);
        assert_eq!(envelope.permission.execution_mode, ExecutionMode::Selective);
    }

    #[test]
    fn test_agreeing_weekly_override_keeps_daily_drivers() {
        let engine = StructuralCertaintyEngine::default();
        let weekly = TimeframeRead {
            regime: Regime::BearControlled,
            direction: Direction::Down,
            confidence: 75,
        };

        let envelope = engine.evaluate(
            &EvaluationRequest::new("XYZ", bear_snapshot()).with_weekly(weekly),
            None,
        );

        assert_eq!(envelope.confidence, 75);
        assert_eq!(
            envelope.drivers,
            vec![
                Driver::ShortReload,
                Driver::ElevatedBorrow,
                Driver::RegimeAlignment,
                Driver::WeeklyOverride
            ]
        );
    }

    #[test]
    fn test_divergence_with_weak_borrow_reaches_transitional() {
        let mut config = EngineConfig::default();
        config.transition.divergence_midpoint = 0.7;
        let engine = StructuralCertaintyEngine::new(config);
        let snapshot = IndicatorSnapshot {
            borrow_rate: 1.0,
            ..bear_snapshot()
        };

        let envelope = engine.evaluate_snapshot(&snapshot);

        // (20 + 20) x 0.6, no borrow, no alignment with TRANSITIONAL
        assert_eq!(envelope.regime, Regime::Transitional);
        assert_eq!(envelope.direction, Direction::Down);
        assert_eq!(envelope.confidence, 24);
        assert_eq!(envelope.breakdown.as_ref().map(|b| b.multiplier), Some(0.6));
        assert!(envelope.transition.as_ref().is_some_and(|t| t.detected));
        assert!(envelope.drivers.contains(&Driver::PressureDivergence));
        assert!(envelope.drivers.contains(&Driver::BorrowWeakening));
    }

    #[test]
    fn test_weekly_override_cannot_lift_a_floored_daily() {
        let engine = StructuralCertaintyEngine::default();
        let weekly = TimeframeRead {
            regime: Regime::BullControlled,
            direction: Direction::Up,
            confidence: 95,
        };

        let envelope = engine.evaluate(
            &EvaluationRequest::new("FLAT", IndicatorSnapshot::new("FLAT")).with_weekly(weekly),
            None,
        );

        assert_eq!(envelope.direction, Direction::NoTrade);
        assert!(envelope.confidence < engine.config().confidence.floor);
        assert_eq!(envelope.permission.execution_mode, ExecutionMode::NoTrade);
    }

    #[test]
    fn test_envelope_round_trips_as_weekly_input() {
        let engine = StructuralCertaintyEngine::default();
        let weekly_envelope = engine.evaluate_snapshot(&bear_snapshot());
        let read = weekly_envelope.as_timeframe_read();

        assert_eq!(read.regime, Regime::BearControlled);
        assert_eq!(read.direction, Direction::Down);
        assert_eq!(read.confidence, 80);
    }

    #[test]
    fn test_envelope_serializes_flat_permission() {
        let engine = StructuralCertaintyEngine::default();
        let json = serde_json::to_value(engine.evaluate_snapshot(&bear_snapshot())).unwrap();

        assert_eq!(json["regime"], "BEAR_CONTROLLED");
        assert_eq!(json["direction"], "DOWN");
        assert_eq!(json["execution_mode"], "AGGRESSIVE");
        assert_eq!(json["size_cap"], "FULL");
        assert_eq!(json["hold_horizon"], "SWING_ALLOWED");
        assert!(json["allowed_trades"].is_array());
    }
}
