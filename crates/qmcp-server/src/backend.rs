//! The quantum-computation capability behind the tools.

use async_trait::async_trait;
use tracing::{debug, instrument};

use qmcp_compile::{OptimizationLevel, optimize};
use qmcp_ir::Circuit;
use qmcp_sim::{Counts, DensityMatrix, Simulator, Statevector};

use crate::error::{BackendError, BackendResult};
use crate::gates::GateOp;

/// Everything the tool layer needs from a quantum SDK.
///
/// Compute-heavy methods take the circuit by value: callers hand over a
/// snapshot so no registry lock is held while they run.
#[async_trait]
pub trait QuantumBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Append one gate operation to `circuit`.
    fn apply_gate(&self, circuit: &mut Circuit, op: &GateOp) -> BackendResult<()>;

    /// Rewrite `circuit` into something [`QuantumBackend::run`] accepts.
    async fn transpile(&self, circuit: Circuit) -> BackendResult<Circuit>;

    /// Sample `shots` executions.
    async fn run(&self, circuit: Circuit, shots: u32) -> BackendResult<Counts>;

    /// The pure state prepared by `circuit`, final measurements removed.
    async fn statevector(&self, circuit: Circuit) -> BackendResult<Statevector>;

    /// The density matrix of [`QuantumBackend::statevector`].
    async fn density_matrix(&self, circuit: Circuit) -> BackendResult<DensityMatrix>;

    /// Optimize at `level`, returning a new circuit.
    async fn optimize(&self, circuit: Circuit, level: OptimizationLevel)
    -> BackendResult<Circuit>;
}

/// In-process backend over the workspace optimizer and simulator.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    simulator: Simulator,
}

impl LocalBackend {
    /// Backend over a configured simulator.
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }
}

async fn blocking<T, F>(f: F) -> BackendResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> BackendResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackendError::Worker(e.to_string()))?
}

#[async_trait]
impl QuantumBackend for LocalBackend {
    fn name(&self) -> &str {
        "local_statevector"
    }

    fn apply_gate(&self, circuit: &mut Circuit, op: &GateOp) -> BackendResult<()> {
        op.apply(circuit)?;
        Ok(())
    }

    async fn transpile(&self, circuit: Circuit) -> BackendResult<Circuit> {
        if !circuit.has_composites() {
            return Ok(circuit);
        }
        blocking(move || Ok(circuit.decompose_composites()?)).await
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name(), qubits = circuit.num_qubits()))]
    async fn run(&self, circuit: Circuit, shots: u32) -> BackendResult<Counts> {
        let simulator = self.simulator.clone();
        let counts = blocking(move || Ok(simulator.run(&circuit, shots)?)).await?;
        debug!(outcomes = counts.len(), "run finished");
        Ok(counts)
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn statevector(&self, circuit: Circuit) -> BackendResult<Statevector> {
        let simulator = self.simulator.clone();
        blocking(move || Ok(simulator.statevector(&circuit)?)).await
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn density_matrix(&self, circuit: Circuit) -> BackendResult<DensityMatrix> {
        let simulator = self.simulator.clone();
        blocking(move || Ok(simulator.density_matrix(&circuit)?)).await
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name(), level = %level))]
    async fn optimize(
        &self,
        circuit: Circuit,
        level: OptimizationLevel,
    ) -> BackendResult<Circuit> {
        blocking(move || Ok(optimize(&circuit, level)?)).await
    }
}
