//! Cancellation passes.

use qmcp_ir::matrix::{EPSILON, normalize_angle};
use qmcp_ir::{CircuitDag, Instruction, NodeIndex, ParameterExpression, StandardGate, WireId};
use rustc_hash::FxHashSet;

use crate::error::CompileResult;
use crate::pass::Pass;

/// The operation that directly follows `node` on every one of its qubits,
/// provided it acts on exactly the same qubits.
fn wire_adjacent_partner(
    dag: &CircuitDag,
    node: NodeIndex,
    inst: &Instruction,
) -> Option<NodeIndex> {
    let first = *inst.qubits.first()?;
    let next = dag.successor_on_wire(node, WireId::Qubit(first))?;
    for &q in &inst.qubits[1..] {
        if dag.successor_on_wire(node, WireId::Qubit(q)) != Some(next) {
            return None;
        }
    }
    let other = dag.instruction(next)?;
    let same_set = other.qubits.len() == inst.qubits.len()
        && other.qubits.iter().all(|q| inst.qubits.contains(q))
        && other.clbits.is_empty();
    same_set.then_some(next)
}

/// Check that two gates on the same qubit set line up operand for operand.
fn operands_match(gate: &StandardGate, a: &Instruction, b: &Instruction) -> bool {
    a.qubits == b.qubits || gate.is_symmetric()
}

/// What to do with a wire-adjacent pair.
enum Rewrite {
    /// Both gates vanish.
    Cancel,
    /// The first gate becomes the merged gate, the second vanishes.
    Merge(StandardGate),
}

fn merged_angle(p1: &ParameterExpression, p2: &ParameterExpression) -> Option<Option<f64>> {
    let sum = normalize_angle(p1.as_f64()? + p2.as_f64()?);
    Some((sum.abs() >= EPSILON).then_some(sum))
}

/// Sum two same-axis rotations; `Cancel` when the merged angle is ≈ 0 mod 2π.
fn merge_rotations(g1: &StandardGate, g2: &StandardGate) -> Option<Rewrite> {
    use StandardGate as G;
    let (p1, p2, rebuild): (_, _, fn(ParameterExpression) -> StandardGate) = match (g1, g2) {
        (G::Rx(a), G::Rx(b)) => (a, b, G::Rx),
        (G::Ry(a), G::Ry(b)) => (a, b, G::Ry),
        (G::Rz(a), G::Rz(b)) => (a, b, G::Rz),
        (G::P(a), G::P(b)) => (a, b, G::P),
        (G::CP(a), G::CP(b)) => (a, b, G::CP),
        (G::RXX(a), G::RXX(b)) => (a, b, G::RXX),
        (G::RYY(a), G::RYY(b)) => (a, b, G::RYY),
        (G::RZZ(a), G::RZZ(b)) => (a, b, G::RZZ),
        _ => return None,
    };
    Some(match merged_angle(p1, p2)? {
        Some(sum) => Rewrite::Merge(rebuild(ParameterExpression::constant(sum))),
        None => Rewrite::Cancel,
    })
}

fn is_adjoint_pair(g1: &StandardGate, g2: &StandardGate) -> bool {
    use StandardGate as G;
    matches!(
        (g1, g2),
        (G::S, G::Sdg) | (G::Sdg, G::S) | (G::T, G::Tdg) | (G::Tdg, G::T)
    )
}

/// Apply `decide` to every wire-adjacent pair in one topological sweep.
///
/// Returns whether anything changed.
fn sweep(
    dag: &mut CircuitDag,
    decide: impl Fn(&StandardGate, &StandardGate) -> Option<Rewrite>,
) -> CompileResult<bool> {
    let order: Vec<NodeIndex> = dag.topological_ops().into_iter().map(|(n, _)| n).collect();
    let mut touched: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut changed = false;

    for node in order {
        if touched.contains(&node) {
            continue;
        }
        let Some(inst) = dag.instruction(node) else {
            continue;
        };
        let Some(gate) = inst.standard_gate() else {
            continue;
        };
        let Some(next) = wire_adjacent_partner(dag, node, inst) else {
            continue;
        };
        if touched.contains(&next) {
            continue;
        }
        let Some(next_inst) = dag.instruction(next) else {
            continue;
        };
        let Some(next_gate) = next_inst.standard_gate() else {
            continue;
        };
        if !operands_match(gate, inst, next_inst) {
            continue;
        }

        let Some(rewrite) = decide(gate, next_gate) else {
            continue;
        };
        let qubits = inst.qubits.clone();
        match rewrite {
            Rewrite::Cancel => {
                dag.remove_op(next)?;
                dag.remove_op(node)?;
            }
            Rewrite::Merge(merged) => {
                dag.remove_op(next)?;
                dag.replace_op(node, Instruction::gate(merged, qubits))?;
            }
        }
        touched.insert(node);
        touched.insert(next);
        changed = true;
    }

    Ok(changed)
}

/// Commutative cancellation pass.
///
/// Cancels wire-adjacent self-inverse pairs (`X, Y, Z, H, CX, CZ, Swap`) and
/// adjoint pairs (`S/Sdg`, `T/Tdg`), and merges same-axis rotations
/// (`Rx, Ry, Rz, P, RXX, RYY, RZZ, CP`) on identical operands.
pub struct CommutativeCancellation;

impl CommutativeCancellation {
    /// Create a new commutative cancellation pass.
    pub fn new() -> Self {
        Self
    }

    fn decide(g1: &StandardGate, g2: &StandardGate) -> Option<Rewrite> {
        if g1 == g2 && g1.is_self_inverse() {
            return Some(Rewrite::Cancel);
        }
        if is_adjoint_pair(g1, g2) {
            return Some(Rewrite::Cancel);
        }
        merge_rotations(g1, g2)
    }
}

impl Default for CommutativeCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for CommutativeCancellation {
    fn name(&self) -> &'static str {
        "CommutativeCancellation"
    }

    fn run(&self, dag: &mut CircuitDag) -> CompileResult<()> {
        // Each productive sweep removes at least one node.
        while sweep(dag, Self::decide)? {}
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag) -> bool {
        dag.num_ops() > 1
    }
}

/// Cancels wire-adjacent identical self-inverse two-qubit gates.
pub struct CancelTwoQubitInverses;

impl Pass for CancelTwoQubitInverses {
    fn name(&self) -> &'static str {
        "CancelTwoQubitInverses"
    }

    fn run(&self, dag: &mut CircuitDag) -> CompileResult<()> {
        let decide = |g1: &StandardGate, g2: &StandardGate| {
            (g1 == g2 && g1.num_qubits() == 2 && g1.is_self_inverse()).then_some(Rewrite::Cancel)
        };
        while sweep(dag, decide)? {}
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag) -> bool {
        dag.num_ops() > 1
    }
}
