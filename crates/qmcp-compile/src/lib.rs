//! qmcp Circuit Optimizer
//!
//! A small pass-based rewriter over [`qmcp_ir::CircuitDag`]. Passes are
//! composed by a [`PassManager`]; [`PassManager::for_level`] builds the
//! preset pipelines behind the optimize tool.
//!
//! # Optimization Levels
//!
//! | Level | Passes |
//! |-------|--------|
//! | 0 | none (copy) |
//! | 1, 2 | `Optimize1qGates`, `CommutativeCancellation` |
//! | 3 | `UnrollComposites`, then `Optimize1qGates`, `CommutativeCancellation`, `CancelTwoQubitInverses` until the size settles |
//!
//! # Example
//!
//! ```rust
//! use qmcp_compile::{OptimizationLevel, optimize};
//! use qmcp_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("xx", 1, 0);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.x(QubitId(0)).unwrap();
//!
//! let optimized = optimize(&circuit, OptimizationLevel::Level1).unwrap();
//! assert_eq!(optimized.size(), 0);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use qmcp_compile::{CompileResult, Pass};
//! use qmcp_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!
//!     fn run(&self, _dag: &mut CircuitDag) -> CompileResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use manager::{OptimizationLevel, PassManager, RepeatUntilStable, optimize};
pub use pass::Pass;
