//! Single-qubit gate optimization pass.

use qmcp_ir::matrix::{EPSILON, GateMatrix, normalize_angle};
use qmcp_ir::{
    CircuitDag, Instruction, NodeIndex, ParameterExpression, QubitId, StandardGate, Unitary2x2,
    WireId,
};

use crate::error::CompileResult;
use crate::pass::Pass;

/// Single-qubit gate optimization pass.
///
/// Merges maximal runs of bound single-qubit gates on a wire and
/// resynthesizes them as at most `Rz·Ry·Rz`. Identity runs disappear; a run
/// is rewritten only when the result is strictly shorter.
pub struct Optimize1qGates;

impl Default for Optimize1qGates {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimize1qGates {
    /// Create a new 1q gate optimizer.
    pub fn new() -> Self {
        Self
    }

    /// The matrix of a bound single-qubit standard gate.
    fn unitary_of(inst: &Instruction) -> Option<Unitary2x2> {
        if inst.qubits.len() != 1 || !inst.clbits.is_empty() {
            return None;
        }
        match inst.standard_gate()?.matrix() {
            Ok(GateMatrix::One(u)) => Some(u),
            _ => None,
        }
    }

    /// Resynthesize a unitary in time order: `Rz(γ)`, `Ry(β)`, `Rz(α)`.
    pub fn synthesize(unitary: &Unitary2x2) -> Vec<StandardGate> {
        if unitary.is_identity() {
            return vec![];
        }

        let (alpha, beta, gamma, _phase) = unitary.zyz_decomposition();
        let beta = normalize_angle(beta);
        let rz = |angle: f64| StandardGate::Rz(ParameterExpression::constant(angle));

        if beta.abs() < EPSILON {
            let total = normalize_angle(alpha + gamma);
            return if total.abs() < EPSILON {
                vec![]
            } else {
                vec![rz(total)]
            };
        }

        let alpha = normalize_angle(alpha);
        let gamma = normalize_angle(gamma);
        let mut gates = Vec::with_capacity(3);
        if gamma.abs() > EPSILON {
            gates.push(rz(gamma));
        }
        gates.push(StandardGate::Ry(ParameterExpression::constant(beta)));
        if alpha.abs() > EPSILON {
            gates.push(rz(alpha));
        }
        gates
    }

    /// Maximal runs of bound single-qubit gates on one qubit's wire.
    fn find_runs(dag: &CircuitDag, qubit: QubitId) -> Vec<Vec<(NodeIndex, Unitary2x2)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for node in dag.wire_ops(WireId::Qubit(qubit)) {
            match dag.instruction(node).and_then(Self::unitary_of) {
                Some(u) => current.push((node, u)),
                None => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

impl Pass for Optimize1qGates {
    fn name(&self) -> &'static str {
        "Optimize1qGates"
    }

    fn run(&self, dag: &mut CircuitDag) -> CompileResult<()> {
        let num_qubits = u32::try_from(dag.num_qubits()).unwrap_or(u32::MAX);
        for q in 0..num_qubits {
            let qubit = QubitId(q);
            // Nodes of a run touch only this wire, so rewriting one run
            // leaves the others intact.
            for run in Self::find_runs(dag, qubit) {
                let combined = run
                    .iter()
                    .fold(Unitary2x2::identity(), |acc, (_, u)| *u * acc);
                let gates = Self::synthesize(&combined);
                if gates.len() >= run.len() {
                    continue;
                }

                let (keep, remove) = run.split_at(gates.len());
                for ((node, _), gate) in keep.iter().zip(gates) {
                    dag.replace_op(*node, Instruction::single_qubit_gate(gate, qubit))?;
                }
                for (node, _) in remove {
                    dag.remove_op(*node)?;
                }
            }
        }
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag) -> bool {
        dag.num_ops() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmcp_ir::Circuit;
    use std::f64::consts::PI;

    fn run(circuit: &Circuit) -> Circuit {
        let mut dag = CircuitDag::from_circuit(circuit).unwrap();
        Optimize1qGates::new().run(&mut dag).unwrap();
        dag.into_circuit()
    }

    #[test]
    fn test_hh_cancels() {
        let mut circuit = Circuit::with_size("hh", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        assert_eq!(run(&circuit).size(), 0);
    }

    #[test]
    fn test_htth_shrinks() {
        let mut circuit = Circuit::with_size("htth", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.t(QubitId(0)).unwrap();
        circuit.t(QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        assert!(run(&circuit).size() <= 3);
    }

    #[test]
    fn test_z_rotations_fold_to_one() {
        let mut circuit = Circuit::with_size("zz", 1, 0);
        circuit.s(QubitId(0)).unwrap();
        circuit.t(QubitId(0)).unwrap();
        circuit.rz(0.1, QubitId(0)).unwrap();
        let out = run(&circuit);
        assert_eq!(out.size(), 1);
        let angle = out.instructions()[0]
            .standard_gate()
            .and_then(|g| g.parameters()[0].as_f64())
            .unwrap();
        assert!((angle - (PI / 2.0 + PI / 4.0 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_single_gate_is_kept() {
        let mut circuit = Circuit::with_size("h", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        assert_eq!(run(&circuit), circuit);
    }

    #[test]
    fn test_identity_rotation_vanishes() {
        let mut circuit = Circuit::with_size("rz0", 1, 0);
        circuit.rz(0.0, QubitId(0)).unwrap();
        assert_eq!(run(&circuit).size(), 0);
    }

    #[test]
    fn test_runs_stop_at_two_qubit_gates_and_measurements() {
        let mut circuit = Circuit::with_size("blocked", 2, 1);
        circuit.x(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), qmcp_ir::ClbitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        assert_eq!(run(&circuit), circuit);
    }

    #[test]
    fn test_symbolic_gates_are_left_alone() {
        let mut circuit = Circuit::with_size("sym", 1, 0);
        circuit.ry(ParameterExpression::symbol("θ[0]"), QubitId(0)).unwrap();
        circuit.ry(ParameterExpression::symbol("θ[1]"), QubitId(0)).unwrap();
        assert_eq!(run(&circuit), circuit);
    }
}
