use crate::engine::{EvaluationRequest, ExecutionEnvelope, StructuralCertaintyEngine};
use crate::scoring::VolatilityReport;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Many symbols evaluated against one shared volatility reading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "vix")]
    pub volatility_index: Option<f64>,
    pub symbols: Vec<EvaluationRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub date: NaiveDate,
    pub volatility: VolatilityReport,
    pub results: Vec<ExecutionEnvelope>,
}

impl BatchReport {
    pub fn tradeable(&self) -> impl Iterator<Item = &ExecutionEnvelope> {
        self.results.iter().filter(|e| e.is_tradeable())
    }
}

impl StructuralCertaintyEngine {
    /// Evaluate every symbol in input order
    ///
    /// `today` is used only when the request carries no date. Symbols are
    /// independent of each other; one degraded symbol never affects the rest.
    pub fn evaluate_batch(&self, request: &BatchRequest, today: NaiveDate) -> BatchReport {
        let level = request
            .volatility_index
            .filter(|v| v.is_finite() && *v >= 0.0);
        let gate = &self.gate;
        let shared = gate.apply(gate.classify(level), 100);

        let results: Vec<ExecutionEnvelope> = request
            .symbols
            .iter()
            .map(|symbol| self.evaluate(symbol, level))
            .collect();

        let degraded = results.iter().filter(|e| e.degraded.is_some()).count();
        tracing::info!(
            "Batch: {} symbols, {} degraded, volatility {:?}",
            results.len(),
            degraded,
            gate.classify(level)
        );

        BatchReport {
            date: request.date.unwrap_or(today),
            volatility: gate.report(level, &shared),
            results,
        }
    }
}
