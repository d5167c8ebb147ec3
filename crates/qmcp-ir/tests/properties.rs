//! Property-based tests for circuit metrics and the DAG view.

use proptest::prelude::*;
use qmcp_ir::{Circuit, CircuitDag, ClbitId, QubitId};

/// Operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    Rz(f64, u32),
    Cx(u32, u32),
    Measure(u32),
    Barrier,
}

impl Op {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            Op::H(q) => circuit.h(QubitId(q)),
            Op::X(q) => circuit.x(QubitId(q)),
            Op::Rz(theta, q) => circuit.rz(theta, QubitId(q)),
            Op::Cx(a, b) => circuit.cx(QubitId(a), QubitId(b)),
            Op::Measure(q) => circuit.measure(QubitId(q), ClbitId(q)),
            Op::Barrier => circuit.barrier_all(),
        };
    }
}

fn arb_op(num_qubits: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..num_qubits).prop_map(Op::H),
        (0..num_qubits).prop_map(Op::X),
        (-3.0f64..3.0, 0..num_qubits).prop_map(|(t, q)| Op::Rz(t, q)),
        (0..num_qubits, 0..num_qubits).prop_map(|(a, b)| Op::Cx(a, b)),
        (0..num_qubits).prop_map(Op::Measure),
        Just(Op::Barrier),
    ]
}

/// Random circuits with 1-5 qubits and up to 20 operations.
///
/// Invalid picks (e.g. `cx` on one qubit) are rejected by the builder and
/// simply leave the circuit unchanged.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|n| {
        prop::collection::vec(arb_op(n), 0..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", n, n);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn dag_round_trip_preserves_circuit(circuit in arb_circuit()) {
        let dag = CircuitDag::from_circuit(&circuit).unwrap();
        prop_assert_eq!(dag.num_ops(), circuit.instructions().len());
        prop_assert_eq!(dag.into_circuit(), circuit);
    }

    #[test]
    fn depth_is_bounded_by_size(circuit in arb_circuit()) {
        prop_assert!(circuit.depth() <= circuit.size());
        let total: usize = circuit.count_ops().iter().map(|(_, n)| n).sum();
        prop_assert_eq!(total, circuit.instructions().len());
    }

    #[test]
    fn removing_final_measurements_is_idempotent(circuit in arb_circuit()) {
        let mut once = circuit.clone();
        once.remove_final_measurements();
        let mut twice = once.clone();
        prop_assert_eq!(twice.remove_final_measurements(), 0);
        prop_assert_eq!(twice, once);
    }
}
