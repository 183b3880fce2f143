/// Errors surfaced at the crate boundary (config loading, request parsing)
///
/// The rule tables themselves never fail. A structurally absent snapshot is
/// answered with a degraded envelope, not an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scan request: {0}")]
    InvalidScanRequest(String),
}
