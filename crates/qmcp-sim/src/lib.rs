//! qmcp local simulator
//!
//! A dense statevector engine for circuits up to about twenty qubits, with
//! shot sampling and density-matrix analysis on top.
//!
//! # Example
//!
//! ```rust
//! use qmcp_ir::{Circuit, QubitId};
//! use qmcp_sim::Simulator;
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let sim = Simulator::new().with_seed(Some(1234));
//! let counts = sim.run(&circuit, 1024).unwrap();
//! assert!(counts.keys().all(|k| k == "00" || k == "11"));
//!
//! let rho = sim.density_matrix(&circuit).unwrap();
//! let reduced = rho.partial_trace(1).unwrap();
//! assert!((reduced.von_neumann_entropy().unwrap() - 1.0).abs() < 1e-9);
//! ```

pub mod density;
pub mod error;
pub mod simulator;
pub mod statevector;

pub use density::DensityMatrix;
pub use error::{SimError, SimResult};
pub use simulator::{Counts, DEFAULT_MAX_QUBITS, Simulator};
pub use statevector::{BasisSampler, Statevector};
