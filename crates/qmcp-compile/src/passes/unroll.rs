//! Composite gate unrolling.

use qmcp_ir::CircuitDag;

use crate::error::CompileResult;
use crate::pass::Pass;

/// Inlines every composite gate (e.g. `qft`) into its standard-gate definition.
pub struct UnrollComposites;

impl Pass for UnrollComposites {
    fn name(&self) -> &'static str {
        "UnrollComposites"
    }

    fn run(&self, dag: &mut CircuitDag) -> CompileResult<()> {
        let flat = dag.to_circuit().decompose_composites()?;
        *dag = CircuitDag::from_circuit(&flat)?;
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag) -> bool {
        dag.topological_ops()
            .iter()
            .any(|(_, inst)| inst.composite_gate().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmcp_ir::library::qft;

    #[test]
    fn test_unroll_qft() {
        let circuit = qft("qft", 3, false).unwrap();
        let mut dag = CircuitDag::from_circuit(&circuit).unwrap();
        assert!(UnrollComposites.should_run(&dag));
        UnrollComposites.run(&mut dag).unwrap();
        assert!(!UnrollComposites.should_run(&dag));
        // 3 H, 3 CP, 1 swap
        assert_eq!(dag.num_ops(), 7);
        assert_eq!(dag.name(), "qft");
    }
}
