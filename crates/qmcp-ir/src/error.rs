//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building or rewriting circuits.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index outside the circuit.
    #[error(
        "qubit {qubit} out of range for a {num_qubits}-qubit circuit{}",
        format_gate_context(.gate_name)
    )]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Number of qubits in the circuit.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit index outside the circuit.
    #[error(
        "classical bit {clbit} out of range for a circuit with {num_clbits} classical bits{}",
        format_gate_context(.gate_name)
    )]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Number of classical bits in the circuit.
        num_clbits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of qubits.
    #[error("gate '{gate_name}' requires {expected} qubit(s), got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// The same qubit appears twice in one operation.
    #[error("duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Parameter is unbound.
    #[error("parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Invalid DAG structure or node reference.
    #[error("invalid DAG: {0}")]
    InvalidDag(String),

    /// A library constructor received arguments it cannot build from.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_not_found_message() {
        let err = IrError::QubitNotFound {
            qubit: QubitId(5),
            num_qubits: 2,
            gate_name: Some("h".into()),
        };
        assert_eq!(
            err.to_string(),
            "qubit q5 out of range for a 2-qubit circuit (gate: h)"
        );
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = IrError::QubitCountMismatch {
            gate_name: "cx".into(),
            expected: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "gate 'cx' requires 2 qubit(s), got 1");
    }
}
