//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::gate::{CompositeGate, GateKind, StandardGate};
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(GateKind),
    /// Measurement of one qubit into one classical bit.
    Measure,
    /// Barrier (synchronization point, no effect on the state).
    Barrier,
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction operates on (for measure).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<GateKind>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// The operation name (`h`, `cx`, `measure`, `barrier`, `qft`, …).
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// The standard gate, if this instruction applies one.
    pub fn standard_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(GateKind::Standard(g)) => Some(g),
            _ => None,
        }
    }

    /// The composite gate, if this instruction applies one.
    pub fn composite_gate(&self) -> Option<&CompositeGate> {
        match &self.kind {
            InstructionKind::Gate(GateKind::Composite(g)) => Some(g),
            _ => None,
        }
    }

    /// The inverse instruction. Measurements and barriers are returned as-is.
    #[must_use]
    pub fn inverse(&self) -> Instruction {
        let kind = match &self.kind {
            InstructionKind::Gate(GateKind::Standard(g)) => {
                InstructionKind::Gate(GateKind::Standard(g.inverse()))
            }
            InstructionKind::Gate(GateKind::Composite(g)) => {
                InstructionKind::Gate(GateKind::Composite(g.inverse()))
            }
            other => other.clone(),
        };
        Instruction {
            kind,
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
        }
    }

    /// Rewrite qubit operands through `map` (local index -> circuit qubit).
    #[must_use]
    pub fn remapped(&self, map: &[QubitId]) -> Option<Instruction> {
        let qubits = self
            .qubits
            .iter()
            .map(|q| map.get(q.index()).copied())
            .collect::<Option<Vec<_>>>()?;
        Some(Instruction {
            kind: self.kind.clone(),
            qubits,
            clbits: self.clbits.clone(),
        })
    }
}
