// Core modules
pub mod bias;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod narrative;
pub mod regime;
pub mod risk;
pub mod scanner;
pub mod scoring;

// Re-export commonly used types
pub use crate::config::EngineConfig;
pub use engine::{
    BatchReport, BatchRequest, EvaluationRequest, ExecutionEnvelope, StructuralCertaintyEngine,
};
pub use error::EngineError;
pub use models::*;
pub use scanner::{ScanReport, ScanRequest, SwingScanner};

// Error handling
pub type Result<T> = std::result::Result<T, EngineError>;
