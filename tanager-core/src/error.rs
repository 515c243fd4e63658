//! Structured error types for the Tanager ecosystem.

use thiserror::Error;

/// Unified error type for all Tanager operations.
#[derive(Debug, Error)]
pub enum TanagerError {
    /// Invalid input (bad arguments, dimension mismatches, malformed corpora)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A symbol missing from a model's dictionaries
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(String),

    /// A distribution with zero total probability mass
    #[error("degenerate distribution: {0}")]
    Degenerate(String),
}

/// Convenience alias used throughout the Tanager ecosystem.
pub type Result<T> = std::result::Result<T, TanagerError>;
