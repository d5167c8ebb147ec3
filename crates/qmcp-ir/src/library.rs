//! Circuit library: the EfficientSU2 ansatz and the quantum Fourier transform.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{CompositeGate, StandardGate};
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// Entanglement topology of the ansatz CX layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entanglement {
    /// Every pair `(i, j)` with `i < j`.
    #[default]
    Full,
    /// Nearest neighbours `(i, i + 1)`.
    Linear,
    /// Linear plus a closing `(n - 1, 0)` pair placed first.
    Circular,
}

impl Entanglement {
    /// The CX pairs for `n` qubits.
    pub fn pairs(self, n: u32) -> Vec<(u32, u32)> {
        let linear = || (0..n.saturating_sub(1)).map(|i| (i, i + 1));
        match self {
            Entanglement::Full => (0..n)
                .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
                .collect(),
            Entanglement::Linear => linear().collect(),
            Entanglement::Circular if n > 2 => {
                std::iter::once((n - 1, 0)).chain(linear()).collect()
            }
            Entanglement::Circular => linear().collect(),
        }
    }
}

impl fmt::Display for Entanglement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Entanglement::Full => "full",
            Entanglement::Linear => "linear",
            Entanglement::Circular => "circular",
        };
        f.write_str(s)
    }
}

impl FromStr for Entanglement {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Entanglement::Full),
            "linear" => Ok(Entanglement::Linear),
            "circular" => Ok(Entanglement::Circular),
            other => Err(IrError::InvalidArgument(format!(
                "unknown entanglement '{other}', expected full, linear or circular"
            ))),
        }
    }
}

/// EfficientSU2 ansatz with symbolic parameters `θ[0]`, `θ[1]`, ….
///
/// Each repetition is an RY layer, an RZ layer and a CX entanglement
/// layer; a final RY/RZ layer closes the circuit, giving
/// `2 * num_qubits * (reps + 1)` parameters. No classical bits.
pub fn efficient_su2(
    name: impl Into<String>,
    num_qubits: u32,
    reps: u32,
    entanglement: Entanglement,
) -> IrResult<Circuit> {
    if num_qubits == 0 {
        return Err(IrError::InvalidArgument(
            "ansatz needs at least one qubit".into(),
        ));
    }

    let mut circuit = Circuit::with_size(name, num_qubits, 0);
    let mut next = 0usize;
    let mut theta = || {
        let p = ParameterExpression::symbol(format!("θ[{next}]"));
        next += 1;
        p
    };

    let pairs = entanglement.pairs(num_qubits);
    for rep in 0..=reps {
        for q in 0..num_qubits {
            circuit.ry(theta(), QubitId(q))?;
        }
        for q in 0..num_qubits {
            circuit.rz(theta(), QubitId(q))?;
        }
        if rep < reps {
            for &(control, target) in &pairs {
                circuit.cx(QubitId(control), QubitId(target))?;
            }
        }
    }

    Ok(circuit)
}

/// The QFT as a composite gate over `num_qubits` local qubits.
///
/// With `inverse` the definition is reversed with negated angles and the
/// gate is named `qft_dg`.
pub fn qft_gate(num_qubits: u32, inverse: bool) -> CompositeGate {
    let mut definition = Vec::new();
    for j in (0..num_qubits).rev() {
        definition.push(Instruction::single_qubit_gate(StandardGate::H, QubitId(j)));
        for k in (0..j).rev() {
            let angle = PI / f64::from(2u32).powi((j - k) as i32);
            definition.push(Instruction::two_qubit_gate(
                StandardGate::CP(angle.into()),
                QubitId(j),
                QubitId(k),
            ));
        }
    }
    for i in 0..num_qubits / 2 {
        definition.push(Instruction::two_qubit_gate(
            StandardGate::Swap,
            QubitId(i),
            QubitId(num_qubits - 1 - i),
        ));
    }

    let gate = CompositeGate::new("qft", num_qubits, definition);
    if inverse { gate.inverse() } else { gate }
}

/// A circuit holding one QFT (or inverse QFT) instruction over all qubits.
pub fn qft(name: impl Into<String>, num_qubits: u32, inverse: bool) -> IrResult<Circuit> {
    if num_qubits == 0 {
        return Err(IrError::InvalidArgument("QFT needs at least one qubit".into()));
    }
    let mut circuit = Circuit::with_size(name, num_qubits, 0);
    circuit.append(Instruction::gate(
        qft_gate(num_qubits, inverse),
        (0..num_qubits).map(QubitId),
    ))?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count() {
        for (n, reps) in [(1, 1), (2, 1), (3, 2), (4, 3)] {
            let c = efficient_su2("ansatz", n, reps, Entanglement::Full).unwrap();
            assert_eq!(c.num_parameters(), (2 * n * (reps + 1)) as usize);
            assert_eq!(c.num_clbits(), 0);
        }
    }

    #[test]
    fn test_entanglement_pairs() {
        assert_eq!(Entanglement::Full.pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(Entanglement::Linear.pairs(3), vec![(0, 1), (1, 2)]);
        assert_eq!(
            Entanglement::Circular.pairs(4),
            vec![(3, 0), (0, 1), (1, 2), (2, 3)]
        );
        assert_eq!(Entanglement::Circular.pairs(2), vec![(0, 1)]);
        assert!(Entanglement::Linear.pairs(1).is_empty());
    }

    #[test]
    fn test_entanglement_parse() {
        assert_eq!("Linear".parse::<Entanglement>().unwrap(), Entanglement::Linear);
        assert!(matches!(
            "ring".parse::<Entanglement>(),
            Err(IrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ansatz_layout() {
        let c = efficient_su2("ansatz", 2, 1, Entanglement::Linear).unwrap();
        let names: Vec<_> = c.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["ry", "ry", "rz", "rz", "cx", "ry", "ry", "rz", "rz"]);
    }

    #[test]
    fn test_qft_structure() {
        let gate = qft_gate(3, false);
        // 3 H, 3 CP, 1 swap
        assert_eq!(gate.definition.len(), 7);
        assert_eq!(gate.definition[0].qubits, vec![QubitId(2)]);
        assert_eq!(
            gate.definition[1].standard_gate(),
            Some(&StandardGate::CP((PI / 2.0).into()))
        );

        let inv = qft_gate(3, true);
        assert_eq!(inv.name, "qft_dg");
        assert_eq!(inv.definition[0].name(), "swap");
    }

    #[test]
    fn test_qft_circuit_is_one_instruction() {
        let c = qft("qft", 4, false).unwrap();
        assert_eq!(c.size(), 1);
        assert_eq!(c.depth(), 1);
        assert_eq!(c.count_ops(), vec![("qft".to_string(), 1)]);
        assert!(qft("empty", 0, false).is_err());
    }
}
