//! Simulator errors.

use qmcp_ir::IrError;
use thiserror::Error;

/// Errors raised while simulating a circuit.
#[derive(Debug, Error)]
pub enum SimError {
    /// Error from the IR layer, e.g. an unbound parameter.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// The circuit is wider than the simulator allows.
    #[error("circuit has {num_qubits} qubits but the simulator supports at most {max_qubits}")]
    TooManyQubits {
        /// Qubits in the circuit.
        num_qubits: usize,
        /// Configured limit.
        max_qubits: usize,
    },

    /// Sampling a circuit that never measures.
    #[error("No counts for experiment: \"{0}\"")]
    NoMeasurements(String),

    /// A measurement is followed by further operations on its qubit.
    #[error("measurement on qubit {0} is followed by further operations; the state is not pure")]
    MidCircuitMeasurement(u32),

    /// Zero shots requested.
    #[error("shots must be positive")]
    InvalidShots,

    /// An instruction the engine cannot interpret.
    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    /// The eigensolver did not converge.
    #[error("eigendecomposition failed: {0}")]
    Eigen(String),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
