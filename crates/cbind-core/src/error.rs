//! Core error types.

use crate::graph::GraphError;

/// Errors raised while preparing a module for binding generation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The pruning fixpoint stopped making progress while names were still
    /// unresolved: the interface references something with no declaration.
    #[error("module cleanup stalled; unresolved type names: {}", unresolved.join(", "))]
    CleanupStalled { unresolved: Vec<String> },

    /// Dependency sorting failed an internal consistency check.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
