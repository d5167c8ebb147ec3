//! Error types for the tool server.

use qmcp_compile::CompileError;
use qmcp_ir::IrError;
use qmcp_sim::SimError;
use thiserror::Error;

/// Errors raised by a [`crate::backend::QuantumBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Circuit construction or rewriting failed.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// The optimizer rejected the circuit.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Simulation failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// A blocking worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// A tool call that ran and failed. Rendered to the caller as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// No circuit with this name.
    #[error("Circuit '{0}' not found")]
    NotFound(String),

    /// Unknown gate kind or operation.
    #[error("{0}")]
    Unsupported(String),

    /// The backend failed while computing a result.
    #[error("{0}")]
    Computation(String),

    /// Arguments were well-formed but not acceptable.
    #[error("{0}")]
    Validation(String),
}

/// A tool call that could not be dispatched at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    /// No tool with this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's input schema.
    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Deserialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ToolError::NotFound("bell".into()).to_string(),
            "Circuit 'bell' not found"
        );
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = BackendError::from(SimError::NoMeasurements("bell".into()));
        assert_eq!(err.to_string(), "No counts for experiment: \"bell\"");
    }
}
