//! Pass manager and optimization levels.

use std::fmt;

use tracing::{debug, info, instrument};

use qmcp_ir::{Circuit, CircuitDag};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{
    CancelTwoQubitInverses, CommutativeCancellation, Optimize1qGates, UnrollComposites,
};

/// Optimization level accepted by the optimize tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OptimizationLevel {
    /// Identity copy.
    Level0,
    /// Single-qubit resynthesis and commutative cancellation.
    #[default]
    Level1,
    /// Same pipeline as level 1.
    Level2,
    /// Unroll composites, then iterate all passes until the size settles.
    Level3,
}

impl OptimizationLevel {
    /// The level as a number.
    pub fn as_u8(self) -> u8 {
        match self {
            OptimizationLevel::Level0 => 0,
            OptimizationLevel::Level1 => 1,
            OptimizationLevel::Level2 => 2,
            OptimizationLevel::Level3 => 3,
        }
    }
}

impl TryFrom<i64> for OptimizationLevel {
    type Error = CompileError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(OptimizationLevel::Level0),
            1 => Ok(OptimizationLevel::Level1),
            2 => Ok(OptimizationLevel::Level2),
            3 => Ok(OptimizationLevel::Level3),
            other => Err(CompileError::InvalidOptimizationLevel(other)),
        }
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// The preset pipeline for an optimization level.
    pub fn for_level(level: OptimizationLevel) -> Self {
        let mut pm = PassManager::new();
        match level {
            OptimizationLevel::Level0 => {}
            OptimizationLevel::Level1 | OptimizationLevel::Level2 => {
                pm.add_pass(Optimize1qGates::new());
                pm.add_pass(CommutativeCancellation::new());
            }
            OptimizationLevel::Level3 => {
                pm.add_pass(UnrollComposites);
                let mut fixed_point = RepeatUntilStable::new();
                fixed_point.add_pass(Optimize1qGates::new());
                fixed_point.add_pass(CommutativeCancellation::new());
                fixed_point.add_pass(CancelTwoQubitInverses);
                pm.add_pass(fixed_point);
            }
        }
        pm
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag), fields(circuit = %dag.name()))]
    pub fn run(&self, dag: &mut CircuitDag) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        run_passes(&self.passes, dag)?;

        info!("Pass manager completed, ops: {}", dag.num_ops());
        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

fn run_passes(passes: &[Box<dyn Pass>], dag: &mut CircuitDag) -> CompileResult<()> {
    for pass in passes {
        if pass.should_run(dag) {
            debug!("Running pass: {}", pass.name());
            pass.run(dag)?;
            debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
        } else {
            debug!("Skipping pass: {}", pass.name());
        }
    }
    Ok(())
}

/// Runs a group of passes until an iteration no longer shrinks the circuit.
pub struct RepeatUntilStable {
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
}

impl RepeatUntilStable {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            passes: vec![],
            max_iterations: 32,
        }
    }

    /// Add a pass to the group.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }
}

impl Default for RepeatUntilStable {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for RepeatUntilStable {
    fn name(&self) -> &'static str {
        "RepeatUntilStable"
    }

    fn run(&self, dag: &mut CircuitDag) -> CompileResult<()> {
        for iteration in 0..self.max_iterations {
            let before = dag.num_ops();
            run_passes(&self.passes, dag)?;
            let after = dag.num_ops();
            debug!(iteration, before, after, "fixed-point iteration");
            if after >= before {
                break;
            }
        }
        Ok(())
    }
}

/// Optimize a circuit at the given level, returning a new circuit.
///
/// The input is never modified; level 0 returns a plain copy.
pub fn optimize(circuit: &Circuit, level: OptimizationLevel) -> CompileResult<Circuit> {
    if level == OptimizationLevel::Level0 {
        return Ok(circuit.clone());
    }
    let mut dag = CircuitDag::from_circuit(circuit)?;
    PassManager::for_level(level).run(&mut dag)?;
    Ok(dag.into_circuit())
}
