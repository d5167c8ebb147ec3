//! The pass trait.

use qmcp_ir::CircuitDag;

use crate::error::CompileResult;

/// A rewriting pass over a circuit DAG.
///
/// Passes must preserve the circuit's unitary up to global phase and must
/// never move operations across measurements.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Run the pass on the given DAG.
    fn run(&self, dag: &mut CircuitDag) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _dag: &CircuitDag) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopPass;

    impl Pass for NoopPass {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn run(&self, _dag: &mut CircuitDag) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_should_run() {
        let dag = CircuitDag::from_circuit(&qmcp_ir::Circuit::with_size("t", 1, 0)).unwrap();
        assert!(NoopPass.should_run(&dag));
        assert_eq!(NoopPass.name(), "noop");
    }
}
