//! Error types for the optimizer.

use qmcp_ir::IrError;
use thiserror::Error;

/// Errors raised while optimizing a circuit.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Error from the IR layer.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Optimization level outside 0..=3.
    #[error("optimization level {0} is out of range (0-3)")]
    InvalidOptimizationLevel(i64),

    /// A pass left the circuit in an inconsistent state.
    #[error("pass '{name}' failed: {reason}")]
    PassFailed {
        /// Name of the pass.
        name: String,
        /// What went wrong.
        reason: String,
    },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
