//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate; operands are (control, target).
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Controlled phase gate.
    CP(ParameterExpression),
    /// XX rotation gate.
    RXX(ParameterExpression),
    /// YY rotation gate.
    RYY(ParameterExpression),
    /// ZZ rotation gate.
    RZZ(ParameterExpression),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CZ
            | StandardGate::Swap
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,
        }
    }

    /// Check if any parameter of this gate is a symbol.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }

    /// The inverse gate.
    #[must_use]
    pub fn inverse(&self) -> StandardGate {
        match self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(p) => StandardGate::Rx(p.negated()),
            StandardGate::Ry(p) => StandardGate::Ry(p.negated()),
            StandardGate::Rz(p) => StandardGate::Rz(p.negated()),
            StandardGate::P(p) => StandardGate::P(p.negated()),
            StandardGate::CP(p) => StandardGate::CP(p.negated()),
            StandardGate::RXX(p) => StandardGate::RXX(p.negated()),
            StandardGate::RYY(p) => StandardGate::RYY(p.negated()),
            StandardGate::RZZ(p) => StandardGate::RZZ(p.negated()),
            // U(θ, φ, λ)† = U(-θ, -λ, -φ)
            StandardGate::U(theta, phi, lambda) => {
                StandardGate::U(theta.negated(), lambda.negated(), phi.negated())
            }
            self_inverse => self_inverse.clone(),
        }
    }

    /// Check if the gate is its own inverse.
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            StandardGate::X
                | StandardGate::Y
                | StandardGate::Z
                | StandardGate::H
                | StandardGate::CX
                | StandardGate::CZ
                | StandardGate::Swap
        )
    }

    /// Check if the gate acts identically under exchange of its two qubits.
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            StandardGate::CZ
                | StandardGate::Swap
                | StandardGate::CP(_)
                | StandardGate::RXX(_)
                | StandardGate::RYY(_)
                | StandardGate::RZZ(_)
        )
    }
}

/// A named sub-circuit applied as one instruction.
///
/// The definition addresses the composite's own qubits `0..num_qubits`;
/// they are mapped onto the instruction's operands when inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Instructions in application order over local qubits.
    pub definition: Vec<Instruction>,
}

impl CompositeGate {
    /// Create a new composite gate.
    pub fn new(name: impl Into<String>, num_qubits: u32, definition: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            definition,
        }
    }

    /// The inverse: reversed definition of inverted gates, suffixed `_dg`.
    #[must_use]
    pub fn inverse(&self) -> CompositeGate {
        let name = match self.name.strip_suffix("_dg") {
            Some(base) => base.to_string(),
            None => format!("{}_dg", self.name),
        };
        let definition = self
            .definition
            .iter()
            .rev()
            .map(Instruction::inverse)
            .collect();
        CompositeGate::new(name, self.num_qubits, definition)
    }
}

/// A quantum gate, either standard or composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A named sub-circuit.
    Composite(CompositeGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Composite(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Composite(g) => g.num_qubits,
        }
    }

    /// Parameters of a standard gate; composites expose none.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            GateKind::Standard(g) => g.parameters(),
            GateKind::Composite(_) => vec![],
        }
    }
}

impl From<StandardGate> for GateKind {
    fn from(gate: StandardGate) -> Self {
        GateKind::Standard(gate)
    }
}

impl From<CompositeGate> for GateKind {
    fn from(gate: CompositeGate) -> Self {
        GateKind::Composite(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::QubitId;

    #[test]
    fn test_gate_names() {
        assert_eq!(StandardGate::H.name(), "h");
        assert_eq!(StandardGate::Sdg.name(), "sdg");
        assert_eq!(StandardGate::RZZ(0.1.into()).name(), "rzz");
        assert_eq!(StandardGate::CP(0.1.into()).name(), "cp");
    }

    #[test]
    fn test_gate_qubits() {
        assert_eq!(StandardGate::U(0.0.into(), 0.0.into(), 0.0.into()).num_qubits(), 1);
        assert_eq!(StandardGate::Swap.num_qubits(), 2);
        assert_eq!(StandardGate::RXX(1.0.into()).num_qubits(), 2);
    }

    #[test]
    fn test_parameterized() {
        assert!(!StandardGate::Rx(0.5.into()).is_parameterized());
        assert!(StandardGate::Ry(ParameterExpression::symbol("θ[0]")).is_parameterized());
        assert_eq!(
            StandardGate::U(1.0.into(), 2.0.into(), 3.0.into())
                .parameters()
                .len(),
            3
        );
    }

    #[test]
    fn test_inverse() {
        assert_eq!(StandardGate::S.inverse(), StandardGate::Sdg);
        assert_eq!(StandardGate::H.inverse(), StandardGate::H);
        assert_eq!(
            StandardGate::CP(0.5.into()).inverse(),
            StandardGate::CP((-0.5).into())
        );
        assert_eq!(
            StandardGate::U(1.0.into(), 2.0.into(), 3.0.into()).inverse(),
            StandardGate::U((-1.0).into(), (-3.0).into(), (-2.0).into())
        );
    }

    #[test]
    fn test_composite_inverse_reverses_definition() {
        let def = vec![
            Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::T, QubitId(0)),
        ];
        let gate = CompositeGate::new("demo", 1, def);
        let inv = gate.inverse();
        assert_eq!(inv.name, "demo_dg");
        assert_eq!(
            inv.definition,
            vec![
                Instruction::single_qubit_gate(StandardGate::Tdg, QubitId(0)),
                Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            ]
        );
        assert_eq!(inv.inverse().name, "demo");
    }
}
