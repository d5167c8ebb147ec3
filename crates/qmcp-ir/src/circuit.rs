//! High-level circuit builder API.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit: a fixed set of wires and an ordered list of operations.
///
/// Instructions are kept in application order. Every appender validates
/// operands before the instruction is stored, so a circuit never holds an
/// instruction that addresses a missing wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit with no wires.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0, 0)
    }

    /// Create a circuit with the given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: Vec::new(),
        }
    }

    /// Rebuild a circuit from already validated parts.
    pub(crate) fn from_parts(
        name: String,
        num_qubits: u32,
        num_clbits: u32,
        instructions: Vec<Instruction>,
    ) -> Self {
        Self {
            name,
            num_qubits,
            num_clbits,
            instructions,
        }
    }

    // =========================================================================
    // Appending
    // =========================================================================

    /// Validate and append an instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = Some(instruction.name().to_string());

        let expected = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.num_qubits()),
            InstructionKind::Measure => Some(1),
            InstructionKind::Barrier => None,
        };
        if let Some(expected) = expected {
            let got = u32::try_from(instruction.qubits.len()).unwrap_or(u32::MAX);
            if got != expected {
                return Err(IrError::QubitCountMismatch {
                    gate_name: instruction.name().to_string(),
                    expected,
                    got,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit,
                    num_qubits: self.num_qubits,
                    gate_name,
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, gate_name });
            }
        }

        if instruction.is_measure() && instruction.clbits.len() != 1 {
            return Err(IrError::InvalidArgument(format!(
                "measure needs exactly one classical bit, got {}",
                instruction.clbits.len()
            )));
        }
        for &clbit in &instruction.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    num_clbits: self.num_clbits,
                    gate_name,
                });
            }
        }

        Ok(())
    }

    fn push_standard(&mut self, gate: StandardGate, qubits: &[QubitId]) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits.iter().copied()))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::H, &[qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::X, &[qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Y, &[qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Z, &[qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::S, &[qubit])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Sdg, &[qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::T, &[qubit])
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Tdg, &[qubit])
    }

    /// Apply RX rotation.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Rx(theta.into()), &[qubit])
    }

    /// Apply RY rotation.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Ry(theta.into()), &[qubit])
    }

    /// Apply RZ rotation.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Rz(theta.into()), &[qubit])
    }

    /// Apply phase gate.
    pub fn p(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::P(lambda.into()), &[qubit])
    }

    /// Apply U gate.
    pub fn u(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(
            StandardGate::U(theta.into(), phi.into(), lambda.into()),
            &[qubit],
        )
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::CX, &[control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::CZ, &[q1, q2])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::Swap, &[q1, q2])
    }

    /// Apply controlled phase gate.
    pub fn cp(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::CP(theta.into()), &[control, target])
    }

    /// Apply RXX gate.
    pub fn rxx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::RXX(theta.into()), &[q1, q2])
    }

    /// Apply RYY gate.
    pub fn ryy(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::RYY(theta.into()), &[q1, q2])
    }

    /// Apply RZZ gate.
    pub fn rzz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_standard(StandardGate::RZZ(theta.into()), &[q1, q2])
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Barrier across all qubits, then measure qubit `i` into classical bit `i`.
    ///
    /// Classical bits are added only when the circuit has fewer than qubits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        if self.num_clbits < self.num_qubits {
            self.num_clbits = self.num_qubits;
        }
        self.barrier_all()?;
        for i in 0..self.num_qubits {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        self.barrier((0..self.num_qubits).map(QubitId))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Total number of wires (qubits plus classical bits).
    pub fn width(&self) -> usize {
        self.num_qubits() + self.num_clbits()
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of operations, barriers excluded.
    pub fn size(&self) -> usize {
        self.instructions.iter().filter(|i| !i.is_barrier()).count()
    }

    /// Length of the longest wire-ordered chain of operations.
    ///
    /// Classical wires count, so a measurement after a gate adds a level.
    /// Barriers are not counted.
    pub fn depth(&self) -> usize {
        let mut qubit_level = vec![0usize; self.num_qubits()];
        let mut clbit_level = vec![0usize; self.num_clbits()];
        let mut depth = 0;

        for inst in &self.instructions {
            if inst.is_barrier() {
                continue;
            }
            let level = inst
                .qubits
                .iter()
                .map(|q| qubit_level[q.index()])
                .chain(inst.clbits.iter().map(|c| clbit_level[c.index()]))
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                qubit_level[q.index()] = level;
            }
            for c in &inst.clbits {
                clbit_level[c.index()] = level;
            }
            depth = depth.max(level);
        }

        depth
    }

    /// Operation counts by name, most frequent first (ties by first use).
    pub fn count_ops(&self) -> Vec<(String, usize)> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for inst in &self.instructions {
            let name = inst.name();
            let entry = counts.entry(name).or_insert_with(|| {
                order.push(name);
                0
            });
            *entry += 1;
        }
        let mut result: Vec<(String, usize)> = order
            .into_iter()
            .map(|name| (name.to_string(), counts[name]))
            .collect();
        result.sort_by(|a, b| b.1.cmp(&a.1));
        result
    }

    /// Distinct unbound symbols in order of first use.
    pub fn parameters(&self) -> Vec<String> {
        fn collect<'a>(
            instructions: &'a [Instruction],
            seen: &mut FxHashSet<&'a str>,
            ordered: &mut Vec<String>,
        ) {
            for inst in instructions {
                match &inst.kind {
                    InstructionKind::Gate(GateKind::Standard(g)) => {
                        for p in g.parameters() {
                            if let ParameterExpression::Symbol(name) = p {
                                let name = name.trim_start_matches('-');
                                if seen.insert(name) {
                                    ordered.push(name.to_string());
                                }
                            }
                        }
                    }
                    InstructionKind::Gate(GateKind::Composite(g)) => {
                        collect(&g.definition, seen, ordered);
                    }
                    _ => {}
                }
            }
        }

        let mut seen = FxHashSet::default();
        let mut ordered = Vec::new();
        collect(&self.instructions, &mut seen, &mut ordered);
        ordered
    }

    /// Number of distinct unbound symbols.
    pub fn num_parameters(&self) -> usize {
        self.parameters().len()
    }

    /// Check if the circuit contains any measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions.iter().any(Instruction::is_measure)
    }

    // =========================================================================
    // Rewrites
    // =========================================================================

    /// Drop measurements and barriers that are followed by nothing else.
    ///
    /// Walking backwards, a measurement or barrier is final while none of its
    /// qubits has seen a later operation; anything else blocks its qubits.
    /// Returns the number of removed instructions.
    pub fn remove_final_measurements(&mut self) -> usize {
        let mut blocked = vec![false; self.num_qubits()];
        let mut keep = vec![true; self.instructions.len()];

        for (idx, inst) in self.instructions.iter().enumerate().rev() {
            let removable = (inst.is_measure() || inst.is_barrier())
                && inst.qubits.iter().all(|q| !blocked[q.index()]);
            if removable {
                keep[idx] = false;
            } else {
                for q in &inst.qubits {
                    blocked[q.index()] = true;
                }
            }
        }

        let before = self.instructions.len();
        let mut flags = keep.into_iter();
        self.instructions.retain(|_| flags.next().unwrap_or(true));
        before - self.instructions.len()
    }

    /// Inline every composite gate, recursively.
    pub fn decompose_composites(&self) -> IrResult<Circuit> {
        fn inline(inst: &Instruction, out: &mut Vec<Instruction>) -> IrResult<()> {
            match inst.composite_gate() {
                Some(composite) => {
                    for inner in &composite.definition {
                        let mapped = inner.remapped(&inst.qubits).ok_or_else(|| {
                            IrError::InvalidDag(format!(
                                "composite '{}' addresses a qubit outside its {} operands",
                                composite.name,
                                inst.qubits.len()
                            ))
                        })?;
                        inline(&mapped, out)?;
                    }
                    Ok(())
                }
                None => {
                    out.push(inst.clone());
                    Ok(())
                }
            }
        }

        let mut instructions = Vec::with_capacity(self.instructions.len());
        for inst in &self.instructions {
            inline(inst, &mut instructions)?;
        }
        Ok(Circuit::from_parts(
            self.name.clone(),
            self.num_qubits,
            self.num_clbits,
            instructions,
        ))
    }

    /// Check if any instruction is a composite gate.
    pub fn has_composites(&self) -> bool {
        self.instructions.iter().any(|i| i.composite_gate().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::CompositeGate;

    fn bell() -> Circuit {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit
    }

    #[test]
    fn test_circuit_creation() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.width(), 5);
        assert_eq!(circuit.size(), 0);
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_bell_metrics() {
        let mut circuit = bell();
        assert_eq!(circuit.size(), 2);
        assert_eq!(circuit.depth(), 2);

        circuit.measure_all().unwrap();
        // barrier excluded from size and depth
        assert_eq!(circuit.size(), 4);
        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(
            circuit.count_ops(),
            vec![
                ("measure".to_string(), 2),
                ("h".to_string(), 1),
                ("cx".to_string(), 1),
                ("barrier".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_measure_all_grows_clbits() {
        let mut circuit = Circuit::with_size("grow", 3, 1);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(
            circuit.instructions().last().unwrap().clbits,
            vec![ClbitId(2)]
        );
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut circuit = Circuit::with_size("oob", 2, 0);
        let err = circuit.h(QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(2), .. }));
        assert_eq!(circuit.size(), 0);
    }

    #[test]
    fn test_out_of_range_clbit() {
        let mut circuit = Circuit::with_size("oob", 2, 1);
        let err = circuit.measure(QubitId(1), ClbitId(1)).unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));
    }

    #[test]
    fn test_duplicate_qubit() {
        let mut circuit = Circuit::with_size("dup", 2, 0);
        let err = circuit.cx(QubitId(1), QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut circuit = Circuit::with_size("arity", 2, 0);
        let err = circuit
            .append(Instruction::gate(StandardGate::CX, [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn test_remove_final_measurements() {
        let mut circuit = bell();
        circuit.measure_all().unwrap();
        let removed = circuit.remove_final_measurements();
        assert_eq!(removed, 3);
        assert_eq!(circuit, bell());
    }

    #[test]
    fn test_mid_circuit_measurement_is_kept() {
        let mut circuit = Circuit::with_size("mid", 1, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        assert_eq!(circuit.remove_final_measurements(), 0);
        assert!(circuit.has_measurements());
    }

    #[test]
    fn test_measurement_on_untouched_wire_is_final() {
        let mut circuit = Circuit::with_size("partial", 2, 2);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.h(QubitId(1)).unwrap();
        assert_eq!(circuit.remove_final_measurements(), 1);
        assert_eq!(circuit.size(), 1);
    }

    #[test]
    fn test_decompose_composites() {
        let def = vec![
            Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)),
        ];
        let composite = CompositeGate::new("prep", 2, def);
        let mut circuit = Circuit::with_size("outer", 3, 0);
        circuit
            .append(Instruction::gate(composite, [QubitId(2), QubitId(0)]))
            .unwrap();
        assert!(circuit.has_composites());
        assert_eq!(circuit.size(), 1);
        assert_eq!(circuit.depth(), 1);

        let flat = circuit.decompose_composites().unwrap();
        assert!(!flat.has_composites());
        assert_eq!(
            flat.instructions(),
            &[
                Instruction::single_qubit_gate(StandardGate::H, QubitId(2)),
                Instruction::two_qubit_gate(StandardGate::CX, QubitId(2), QubitId(0)),
            ]
        );
    }

    #[test]
    fn test_parameters_are_distinct() {
        let mut circuit = Circuit::with_size("params", 2, 0);
        circuit.ry(ParameterExpression::symbol("θ[0]"), QubitId(0)).unwrap();
        circuit.rz(ParameterExpression::symbol("θ[1]"), QubitId(1)).unwrap();
        circuit.rz(ParameterExpression::symbol("θ[0]"), QubitId(1)).unwrap();
        circuit.rx(0.3, QubitId(0)).unwrap();
        assert_eq!(circuit.parameters(), vec!["θ[0]", "θ[1]"]);
        assert_eq!(circuit.num_parameters(), 2);
    }

    #[test]
    fn test_parameters_keep_first_use_order_at_scale() {
        let width = 8u32;
        let mut circuit = Circuit::with_size("wide", width, 0);
        // Symbols appear in reverse index order, each negated copy and
        // repeat coming after its first use.
        for i in (0..2000).rev() {
            let q = QubitId(i % width);
            circuit.ry(ParameterExpression::symbol(format!("p[{i}]")), q).unwrap();
            circuit.rz(ParameterExpression::symbol(format!("-p[{i}]")), q).unwrap();
        }
        for i in 0..2000 {
            circuit
                .rx(ParameterExpression::symbol(format!("p[{i}]")), QubitId(i % width))
                .unwrap();
        }

        let params = circuit.parameters();
        assert_eq!(params.len(), 2000);
        assert_eq!(params[0], "p[1999]");
        assert_eq!(params[1999], "p[0]");
        let expected: Vec<String> = (0..2000).rev().map(|i| format!("p[{i}]")).collect();
        assert_eq!(params, expected);
    }
}
