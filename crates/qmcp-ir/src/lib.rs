//! qmcp Circuit Intermediate Representation
//!
//! This crate holds the circuit object model shared by the optimizer, the
//! simulator and the tool server.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] for built-in gates and [`CompositeGate`] for
//!   named sub-circuits such as the QFT
//! - **Parameters**: [`ParameterExpression`], constants or unbound symbols
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] validated builder with size/depth metrics
//! - **DAG**: [`CircuitDag`], a stable-index graph view for rewriting passes
//! - **Matrices**: [`Unitary2x2`], [`Unitary4x4`]
//! - **Library**: [`library::efficient_su2`], [`library::qft`]
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qmcp_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.size(), 4);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: Variational Ansatz
//!
//! ```rust
//! use qmcp_ir::library::{efficient_su2, Entanglement};
//!
//! let ansatz = efficient_su2("vqe", 3, 2, Entanglement::Linear).unwrap();
//! assert_eq!(ansatz.num_parameters(), 18);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates and adjoints |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CZ` | 2 | Controlled-NOT and Controlled-Z |
//! | `Swap` | 2 | SWAP gate |
//! | `CP` | 2 | Controlled phase |
//! | `RXX`, `RYY`, `RZZ` | 2 | Two-qubit Pauli rotations |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod library;
pub mod matrix;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CompositeGate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use matrix::{GateMatrix, Unitary2x2, Unitary4x4};
pub use parameter::ParameterExpression;
pub use qubit::{ClbitId, QubitId};
