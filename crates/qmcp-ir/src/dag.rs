//! DAG view of a circuit for rewriting passes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex as PetNodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
///
/// Indices stay valid across removals.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node with its position in the source circuit.
    Op {
        /// The operation.
        instruction: Instruction,
        /// Ordering key used to break topological ties.
        position: usize,
    },
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op { instruction, .. } => Some(instruction),
            _ => None,
        }
    }

    fn rank(&self) -> usize {
        match self {
            DagNode::In(_) => 0,
            DagNode::Op { position, .. } => position.saturating_add(1),
            DagNode::Out(_) => usize::MAX,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

fn wires_of(instruction: &Instruction) -> Vec<WireId> {
    instruction
        .qubits
        .iter()
        .copied()
        .map(WireId::Qubit)
        .chain(instruction.clbits.iter().copied().map(WireId::Clbit))
        .collect()
}

/// DAG-based circuit representation.
///
/// Every wire runs from an `In` node through the operations that touch it
/// to an `Out` node. The graph is a [`StableDiGraph`], so node indices held
/// by a pass survive removal of other nodes.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    graph: StableDiGraph<DagNode, DagEdge, u32>,
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    inputs: FxHashMap<WireId, NodeIndex>,
    outputs: FxHashMap<WireId, NodeIndex>,
    next_position: usize,
}

impl CircuitDag {
    /// Build a DAG from a circuit.
    pub fn from_circuit(circuit: &Circuit) -> IrResult<Self> {
        let num_qubits = u32::try_from(circuit.num_qubits())
            .map_err(|_| IrError::InvalidDag("too many qubits".into()))?;
        let num_clbits = u32::try_from(circuit.num_clbits())
            .map_err(|_| IrError::InvalidDag("too many classical bits".into()))?;

        let mut dag = Self {
            graph: StableDiGraph::default(),
            name: circuit.name().to_string(),
            num_qubits,
            num_clbits,
            inputs: FxHashMap::default(),
            outputs: FxHashMap::default(),
            next_position: 0,
        };
        for q in 0..num_qubits {
            dag.add_wire(WireId::Qubit(QubitId(q)));
        }
        for c in 0..num_clbits {
            dag.add_wire(WireId::Clbit(ClbitId(c)));
        }
        for instruction in circuit.instructions() {
            dag.apply(instruction.clone())?;
        }
        Ok(dag)
    }

    fn add_wire(&mut self, wire: WireId) {
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.inputs.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
    }

    /// Append an instruction at the end of its wires.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let wires = wires_of(&instruction);
        let mut fronts = Vec::with_capacity(wires.len());
        for wire in &wires {
            let out_node = *self
                .outputs
                .get(wire)
                .ok_or_else(|| IrError::InvalidDag(format!("unknown wire {wire:?}")))?;
            let edge = self
                .graph
                .edges_directed(out_node, Direction::Incoming)
                .find(|e| e.weight().wire == *wire)
                .map(|e| (e.id(), e.source()))
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} is broken")))?;
            fronts.push((edge, out_node));
        }

        let position = self.next_position;
        self.next_position += 1;
        let op_node = self.graph.add_node(DagNode::Op {
            instruction,
            position,
        });

        for (wire, ((edge_id, prev), out_node)) in wires.into_iter().zip(fronts) {
            self.graph.remove_edge(edge_id);
            self.graph.add_edge(prev, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
        }
        Ok(op_node)
    }

    /// Operations in topological order, ties broken by original position.
    pub fn topological_ops(&self) -> Vec<(NodeIndex, &Instruction)> {
        let mut in_degree: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut ready = BinaryHeap::new();
        for node in self.graph.node_indices() {
            let degree = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .count();
            if degree == 0 {
                ready.push(Reverse((self.graph[node].rank(), node)));
            }
            in_degree.insert(node, degree);
        }

        let mut ops = Vec::with_capacity(self.num_ops());
        while let Some(Reverse((_, node))) = ready.pop() {
            if let Some(instruction) = self.graph[node].instruction() {
                ops.push((node, instruction));
            }
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                if let Some(degree) = in_degree.get_mut(&target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse((self.graph[target].rank(), target)));
                    }
                }
            }
        }
        ops
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// The operation following `node` on `wire`, if any.
    pub fn successor_on_wire(&self, node: NodeIndex, wire: WireId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.target())
            .filter(|&target| self.instruction(target).is_some())
    }

    /// Operations touching `wire`, in wire order.
    pub fn wire_ops(&self, wire: WireId) -> Vec<NodeIndex> {
        let mut ops = Vec::new();
        let Some(&start) = self.inputs.get(&wire) else {
            return ops;
        };
        let mut current = start;
        while let Some(next) = self.successor_on_wire(current, wire) {
            ops.push(next);
            current = next;
        }
        ops
    }

    /// Remove an operation, reconnecting each of its wires around it.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        if self.instruction(node).is_none() {
            return Err(IrError::InvalidDag(format!(
                "node {} is not an operation",
                node.index()
            )));
        }

        let incoming: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), e.weight().wire))
            .collect();
        let outgoing: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight().wire))
            .collect();

        let removed = self
            .graph
            .remove_node(node)
            .ok_or_else(|| IrError::InvalidDag(format!("node {} vanished", node.index())))?;

        for (pred, wire) in &incoming {
            for (succ, succ_wire) in &outgoing {
                if wire == succ_wire {
                    self.graph.add_edge(*pred, *succ, DagEdge { wire: *wire });
                }
            }
        }

        match removed {
            DagNode::Op { instruction, .. } => Ok(instruction),
            _ => Err(IrError::InvalidDag("removed a wire terminal".into())),
        }
    }

    /// Replace the operation at `node` with one acting on the same wires.
    pub fn replace_op(&mut self, node: NodeIndex, instruction: Instruction) -> IrResult<()> {
        let current = self.instruction(node).ok_or_else(|| {
            IrError::InvalidDag(format!("node {} is not an operation", node.index()))
        })?;

        let mut old_wires = wires_of(current);
        let mut new_wires = wires_of(&instruction);
        old_wires.sort_unstable();
        new_wires.sort_unstable();
        if old_wires != new_wires {
            return Err(IrError::InvalidDag(format!(
                "replacement '{}' does not act on the wires of '{}'",
                instruction.name(),
                current.name()
            )));
        }

        if let Some(DagNode::Op {
            instruction: slot, ..
        }) = self.graph.node_weight_mut(node)
        {
            *slot = instruction;
        }
        Ok(())
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|n| n.instruction().is_some())
            .count()
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &StableDiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Flatten back into a circuit, in topological order.
    pub fn to_circuit(&self) -> Circuit {
        let instructions = self
            .topological_ops()
            .into_iter()
            .map(|(_, inst)| inst.clone())
            .collect();
        Circuit::from_parts(
            self.name.clone(),
            self.num_qubits,
            self.num_clbits,
            instructions,
        )
    }

    /// Consume the DAG and flatten it into a circuit.
    pub fn into_circuit(self) -> Circuit {
        self.to_circuit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn sample() -> Circuit {
        let mut circuit = Circuit::with_size("sample", 2, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(1), ClbitId(0)).unwrap();
        circuit
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let circuit = sample();
        let dag = CircuitDag::from_circuit(&circuit).unwrap();
        assert_eq!(dag.num_ops(), 4);
        assert_eq!(dag.to_circuit(), circuit);
    }

    #[test]
    fn test_wire_ops() {
        let dag = CircuitDag::from_circuit(&sample()).unwrap();
        let names: Vec<_> = dag
            .wire_ops(WireId::Qubit(QubitId(1)))
            .into_iter()
            .map(|n| dag.instruction(n).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["x", "cx", "measure"]);
        assert_eq!(dag.wire_ops(WireId::Clbit(ClbitId(0))).len(), 1);
    }

    #[test]
    fn test_remove_op_rewires() {
        let mut dag = CircuitDag::from_circuit(&sample()).unwrap();
        let cx = dag.wire_ops(WireId::Qubit(QubitId(0)))[1];
        let removed = dag.remove_op(cx).unwrap();
        assert_eq!(removed.name(), "cx");

        let x = dag.wire_ops(WireId::Qubit(QubitId(1)))[0];
        let next = dag.successor_on_wire(x, WireId::Qubit(QubitId(1))).unwrap();
        assert_eq!(dag.instruction(next).unwrap().name(), "measure");

        let circuit = dag.into_circuit();
        assert_eq!(circuit.size(), 3);
    }

    #[test]
    fn test_indices_stable_after_removal() {
        let mut dag = CircuitDag::from_circuit(&sample()).unwrap();
        let ops: Vec<_> = dag.topological_ops().into_iter().map(|(n, _)| n).collect();
        dag.remove_op(ops[0]).unwrap();
        assert_eq!(dag.instruction(ops[3]).unwrap().name(), "measure");
        assert!(dag.remove_op(ops[0]).is_err());
    }

    #[test]
    fn test_replace_op_checks_wires() {
        let mut dag = CircuitDag::from_circuit(&sample()).unwrap();
        let h = dag.wire_ops(WireId::Qubit(QubitId(0)))[0];
        dag.replace_op(h, Instruction::single_qubit_gate(StandardGate::Z, QubitId(0)))
            .unwrap();
        assert_eq!(dag.instruction(h).unwrap().name(), "z");

        let err = dag
            .replace_op(h, Instruction::single_qubit_gate(StandardGate::Z, QubitId(1)))
            .unwrap_err();
        assert!(matches!(err, IrError::InvalidDag(_)));
    }

    #[test]
    fn test_topological_ties_follow_position() {
        let mut circuit = Circuit::with_size("ties", 3, 0);
        circuit.x(QubitId(2)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        circuit.z(QubitId(1)).unwrap();
        let dag = CircuitDag::from_circuit(&circuit).unwrap();
        let names: Vec<_> = dag
            .topological_ops()
            .into_iter()
            .map(|(_, i)| i.name())
            .collect();
        assert_eq!(names, vec!["x", "h", "z"]);
    }
}
