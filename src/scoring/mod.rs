// Confidence scoring and volatility gating
pub mod confidence;
pub mod volatility;

pub use confidence::{to_confidence, ConfidenceBreakdown, ConfidenceScorer};
pub use volatility::{GateOutcome, VolatilityGate, VolatilityReport, VolatilityState};
