//! FFI generation error types.

use cbind_core::graph::GraphError;
use cbind_core::CoreError;

/// Errors that can occur while turning a module into ordered binding elements.
#[derive(Debug, thiserror::Error)]
pub enum FfiError {
    /// A type shape with no mapping rule.
    #[error("unsupported type: {detail}")]
    UnsupportedType { detail: String },

    /// A dependency cycle with no splittable participant.
    #[error("unresolvable dependency cycle among: {}", remaining.join(", "))]
    UnresolvableCycle { remaining: Vec<String> },

    /// An element depends on a name nothing provides.
    #[error("element '{element}' depends on unknown type '{name}'")]
    MissingDependency { element: String, name: String },

    /// Internal consistency check failed.
    #[error("internal consistency error: {detail}")]
    Inconsistent { detail: String },

    /// Module preparation error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Sorter error.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type alias for FFI operations.
pub type Result<T> = std::result::Result<T, FfiError>;
