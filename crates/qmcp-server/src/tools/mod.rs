//! The thirteen circuit tools.
//!
//! [`ToolCall::parse`] turns an MCP `tools/call` into a typed call, failing
//! only when the tool is unknown or the arguments do not fit its schema.
//! [`QuantumTools::execute`] then runs it; every failure from that point on
//! is a [`ToolError`] whose message is shown to the caller.

mod report;
mod schema;

pub use report::{
    CircuitInfo, DensityReport, ListEntry, OptimizationReport, OrderedMap, RunReport,
    StatevectorReport, improvement_percentage,
};
pub use schema::tool_descriptors;

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument, warn};

use qmcp_compile::OptimizationLevel;
use qmcp_ir::library::{self, Entanglement};

use crate::backend::QuantumBackend;
use crate::config::SimulatorConfig;
use crate::diagram;
use crate::error::{ToolCallError, ToolError};
use crate::gates::{GateOp, GateParseError, GateSet, GateSpec};
use crate::protocol::ToolDescriptor;
use crate::registry::{CircuitRegistry, short_id};

/// Bounds on caller-supplied sizes: shots for `run_circuit`, ansatz shape
/// for `create_variational_circuit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolLimits {
    pub max_shots: u32,
    pub default_shots: u32,
    pub max_ansatz_qubits: u32,
    pub max_ansatz_layers: u32,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self::from(&SimulatorConfig::default())
    }
}

impl From<&SimulatorConfig> for ToolLimits {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            max_shots: config.max_shots,
            default_shots: config.default_shots,
            max_ansatz_qubits: config.max_ansatz_qubits,
            max_ansatz_layers: config.max_ansatz_layers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateCircuitArgs {
    #[serde(alias = "numQubits")]
    pub num_qubits: u32,
    #[serde(default, alias = "numClassicalBits")]
    pub num_classical_bits: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatesArgs {
    #[serde(alias = "circuitName")]
    pub circuit_name: String,
    pub gates: Vec<GateSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunArgs {
    #[serde(alias = "circuitName")]
    pub circuit_name: String,
    #[serde(default)]
    pub shots: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircuitArgs {
    #[serde(alias = "circuitName")]
    pub circuit_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizeArgs {
    #[serde(alias = "circuitName")]
    pub circuit_name: String,
    #[serde(default, alias = "optimizationLevel")]
    pub optimization_level: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariationalArgs {
    #[serde(alias = "numQubits")]
    pub num_qubits: u32,
    #[serde(default, alias = "numLayers")]
    pub num_layers: Option<u32>,
    #[serde(default)]
    pub entanglement: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QftArgs {
    #[serde(alias = "numQubits")]
    pub num_qubits: u32,
    #[serde(default)]
    pub inverse: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A dispatched tool call with typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    CreateCircuit(CreateCircuitArgs),
    AddGates(GatesArgs),
    AddAdvancedGates(GatesArgs),
    RunCircuit(RunArgs),
    GetCircuitInfo(CircuitArgs),
    VisualizeCircuit(CircuitArgs),
    VisualizeCircuitDiagram(CircuitArgs),
    ListCircuits,
    AnalyzeStatevector(CircuitArgs),
    ComputeDensityMatrix(CircuitArgs),
    OptimizeCircuit(OptimizeArgs),
    CreateVariationalCircuit(VariationalArgs),
    ImplementQft(QftArgs),
}

fn args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolCallError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

impl ToolCall {
    /// Resolve a tool name (aliases included) and its arguments.
    pub fn parse(name: &str, arguments: Value) -> Result<Self, ToolCallError> {
        let call = match name {
            "create_circuit" | "create_quantum_circuit" => {
                ToolCall::CreateCircuit(args(name, arguments)?)
            }
            "add_gates" => ToolCall::AddGates(args(name, arguments)?),
            "add_advanced_gates" => ToolCall::AddAdvancedGates(args(name, arguments)?),
            "run_circuit" => ToolCall::RunCircuit(args(name, arguments)?),
            "get_circuit_info" => ToolCall::GetCircuitInfo(args(name, arguments)?),
            "visualize_circuit" => ToolCall::VisualizeCircuit(args(name, arguments)?),
            "visualize_circuit_diagram" | "visualize_circuit_mermaid" => {
                ToolCall::VisualizeCircuitDiagram(args(name, arguments)?)
            }
            "list_circuits" => ToolCall::ListCircuits,
            "analyze_statevector" => ToolCall::AnalyzeStatevector(args(name, arguments)?),
            "compute_density_matrix" => ToolCall::ComputeDensityMatrix(args(name, arguments)?),
            "optimize_circuit" => ToolCall::OptimizeCircuit(args(name, arguments)?),
            "create_variational_circuit" => {
                ToolCall::CreateVariationalCircuit(args(name, arguments)?)
            }
            "implement_qft" => ToolCall::ImplementQft(args(name, arguments)?),
            other => return Err(ToolCallError::UnknownTool(other.to_string())),
        };
        Ok(call)
    }

    /// Canonical tool name.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::CreateCircuit(_) => "create_circuit",
            ToolCall::AddGates(_) => "add_gates",
            ToolCall::AddAdvancedGates(_) => "add_advanced_gates",
            ToolCall::RunCircuit(_) => "run_circuit",
            ToolCall::GetCircuitInfo(_) => "get_circuit_info",
            ToolCall::VisualizeCircuit(_) => "visualize_circuit",
            ToolCall::VisualizeCircuitDiagram(_) => "visualize_circuit_diagram",
            ToolCall::ListCircuits => "list_circuits",
            ToolCall::AnalyzeStatevector(_) => "analyze_statevector",
            ToolCall::ComputeDensityMatrix(_) => "compute_density_matrix",
            ToolCall::OptimizeCircuit(_) => "optimize_circuit",
            ToolCall::CreateVariationalCircuit(_) => "create_variational_circuit",
            ToolCall::ImplementQft(_) => "implement_qft",
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::Computation(e.to_string()))
}

/// The tool surface over a registry and a backend.
#[derive(Clone)]
pub struct QuantumTools {
    registry: Arc<CircuitRegistry>,
    backend: Arc<dyn QuantumBackend>,
    limits: ToolLimits,
}

impl QuantumTools {
    pub fn new(
        registry: Arc<CircuitRegistry>,
        backend: Arc<dyn QuantumBackend>,
        limits: ToolLimits,
    ) -> Self {
        Self {
            registry,
            backend,
            limits,
        }
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<CircuitRegistry> {
        &self.registry
    }

    /// Descriptors for `tools/list`.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        tool_descriptors(self.limits.max_shots, self.limits.default_shots)
    }

    /// Run one call.
    pub async fn execute(&self, call: ToolCall) -> Result<String, ToolError> {
        let tool = call.name();
        let outcome = match call {
            ToolCall::CreateCircuit(a) => self.create_circuit(a).await,
            ToolCall::AddGates(a) => self.add_gates(a, GateSet::Basic).await,
            ToolCall::AddAdvancedGates(a) => self.add_gates(a, GateSet::Advanced).await,
            ToolCall::RunCircuit(a) => self.run_circuit(a).await,
            ToolCall::GetCircuitInfo(a) => self.get_circuit_info(a).await,
            ToolCall::VisualizeCircuit(a) => self.visualize_circuit(a).await,
            ToolCall::VisualizeCircuitDiagram(a) => self.visualize_circuit_diagram(a).await,
            ToolCall::ListCircuits => self.list_circuits().await,
            ToolCall::AnalyzeStatevector(a) => self.analyze_statevector(a).await,
            ToolCall::ComputeDensityMatrix(a) => self.compute_density_matrix(a).await,
            ToolCall::OptimizeCircuit(a) => self.optimize_circuit(a).await,
            ToolCall::CreateVariationalCircuit(a) => self.create_variational_circuit(a).await,
            ToolCall::ImplementQft(a) => self.implement_qft(a).await,
        };
        if let Err(err) = &outcome {
            warn!(tool, backend = self.backend.name(), error = %err, "tool call failed");
        }
        outcome
    }

    #[instrument(skip(self, args), fields(qubits = args.num_qubits))]
    async fn create_circuit(&self, args: CreateCircuitArgs) -> Result<String, ToolError> {
        if args.num_qubits == 0 {
            return Err(ToolError::Validation(
                "num_qubits must be a positive integer".to_string(),
            ));
        }
        let clbits = args.num_classical_bits.unwrap_or(args.num_qubits);
        let name = self
            .registry
            .create(args.num_qubits, clbits, args.name.as_deref())
            .await;
        info!(circuit = %name, "created circuit");
        Ok(format!(
            "Created quantum circuit '{name}' with {} qubits and {clbits} classical bits",
            args.num_qubits
        ))
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name, gates = args.gates.len()))]
    async fn add_gates(&self, args: GatesArgs, set: GateSet) -> Result<String, ToolError> {
        let name = &args.circuit_name;
        let (applied_prefix, error_prefix, unsupported) = match set {
            GateSet::Basic => ("Applied gates", "Error adding gates", "Unsupported gate type"),
            GateSet::Advanced => (
                "Applied advanced gates",
                "Error adding advanced gates",
                "Unsupported advanced gate type",
            ),
        };

        let handle = self.registry.get(name).await?;
        let mut circuit = handle.lock().await;
        let mut applied = Vec::with_capacity(args.gates.len());

        for spec in &args.gates {
            let op = GateOp::parse(spec, set).map_err(|e| match e {
                GateParseError::Unsupported(kind) => {
                    ToolError::Unsupported(format!("{unsupported} in '{name}': {kind}"))
                }
                GateParseError::Malformed(reason) => {
                    ToolError::Validation(format!("{error_prefix} to '{name}': {reason}"))
                }
            })?;
            self.backend
                .apply_gate(&mut circuit, &op)
                .map_err(|e| ToolError::Computation(format!("{error_prefix} to '{name}': {e}")))?;
            applied.push(op.to_string());
        }

        info!(applied = applied.len(), size = circuit.size(), "gates applied");
        Ok(format!("{applied_prefix} to '{name}': {}", applied.join(", ")))
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn run_circuit(&self, args: RunArgs) -> Result<String, ToolError> {
        let name = &args.circuit_name;
        let circuit = self.registry.snapshot(name).await?;

        let max = self.limits.max_shots;
        let shots = match args.shots {
            None => self.limits.default_shots,
            Some(s) if (1..=i64::from(max)).contains(&s) => s as u32,
            Some(s) => {
                return Err(ToolError::Validation(format!(
                    "Shots must be between 1 and {max}, got {s}"
                )));
            }
        };

        let failed = |e: crate::error::BackendError| {
            ToolError::Computation(format!("Error running circuit '{name}': {e}"))
        };
        let transpiled = self.backend.transpile(circuit).await.map_err(failed)?;
        let counts = self.backend.run(transpiled, shots).await.map_err(failed)?;

        info!(
            backend = self.backend.name(),
            shots,
            outcomes = counts.len(),
            "circuit executed"
        );
        to_json(&RunReport::new(name, shots, counts))
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn get_circuit_info(&self, args: CircuitArgs) -> Result<String, ToolError> {
        let circuit = self.registry.snapshot(&args.circuit_name).await?;
        to_json(&CircuitInfo::new(&args.circuit_name, &circuit))
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn visualize_circuit(&self, args: CircuitArgs) -> Result<String, ToolError> {
        let circuit = self.registry.snapshot(&args.circuit_name).await?;
        Ok(diagram::to_text(&circuit))
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn visualize_circuit_diagram(&self, args: CircuitArgs) -> Result<String, ToolError> {
        let circuit = self.registry.snapshot(&args.circuit_name).await?;
        Ok(diagram::to_mermaid(&circuit))
    }

    #[instrument(skip(self))]
    async fn list_circuits(&self) -> Result<String, ToolError> {
        let rows = self.registry.list().await;
        if rows.is_empty() {
            return Ok("No circuits created yet".to_string());
        }
        let listing: OrderedMap<ListEntry> = rows
            .into_iter()
            .map(|(name, summary)| (name, ListEntry::from(summary)))
            .collect();
        to_json(&listing)
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn analyze_statevector(&self, args: CircuitArgs) -> Result<String, ToolError> {
        let name = &args.circuit_name;
        let circuit = self.registry.snapshot(name).await?;
        let num_qubits = circuit.num_qubits();

        let state = self.backend.statevector(circuit).await.map_err(|e| {
            ToolError::Computation(format!("Error analyzing statevector for '{name}': {e}"))
        })?;
        to_json(&StatevectorReport::new(name, num_qubits, &state))
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn compute_density_matrix(&self, args: CircuitArgs) -> Result<String, ToolError> {
        let name = &args.circuit_name;
        let circuit = self.registry.snapshot(name).await?;
        let num_qubits = circuit.num_qubits();

        let rho = self.backend.density_matrix(circuit).await.map_err(|e| {
            ToolError::Computation(format!("Error computing density matrix for '{name}': {e}"))
        })?;
        let report = DensityReport::new(name, num_qubits, &rho).map_err(|e| {
            ToolError::Computation(format!("Error computing density matrix for '{name}': {e}"))
        })?;
        to_json(&report)
    }

    #[instrument(skip(self, args), fields(circuit = %args.circuit_name))]
    async fn optimize_circuit(&self, args: OptimizeArgs) -> Result<String, ToolError> {
        let name = &args.circuit_name;
        let original = self.registry.snapshot(name).await?;
        let level = OptimizationLevel::try_from(args.optimization_level.unwrap_or(1))
            .map_err(|_| {
                ToolError::Validation("Optimization level must be 0, 1, 2, or 3".to_string())
            })?;

        let optimized = self
            .backend
            .optimize(original.clone(), level)
            .await
            .map_err(|e| {
                ToolError::Computation(format!("Error optimizing circuit '{name}': {e}"))
            })?;

        let requested = format!("{name}_opt{level}_{}", short_id());
        let stored = optimized.clone();
        let optimized_name = self.registry.insert(Some(&requested), stored).await;

        let report =
            OptimizationReport::new(name, &original, &optimized_name, &optimized, level.as_u8());
        info!(
            optimized = %optimized_name,
            before = report.original_size,
            after = report.optimized_size,
            "circuit optimized"
        );
        to_json(&report)
    }

    #[instrument(skip(self, args), fields(qubits = args.num_qubits, layers = ?args.num_layers))]
    async fn create_variational_circuit(&self, args: VariationalArgs) -> Result<String, ToolError> {
        let failed = |e: qmcp_ir::IrError| {
            ToolError::Computation(format!("Error creating variational circuit: {e}"))
        };
        let num_qubits = args.num_qubits;
        let layers = args.num_layers.unwrap_or(1);
        let max_qubits = self.limits.max_ansatz_qubits;
        let max_layers = self.limits.max_ansatz_layers;
        if num_qubits > max_qubits {
            return Err(ToolError::Validation(format!(
                "num_qubits must be at most {max_qubits}, got {num_qubits}"
            )));
        }
        if layers > max_layers {
            return Err(ToolError::Validation(format!(
                "num_layers must be at most {max_layers}, got {layers}"
            )));
        }
        let entanglement: Entanglement = match args.entanglement.as_deref() {
            Some(s) => s.parse().map_err(failed)?,
            None => Entanglement::default(),
        };

        let (ansatz, parameters) = tokio::task::spawn_blocking(move || {
            library::efficient_su2("", num_qubits, layers, entanglement).map(|ansatz| {
                let parameters = ansatz.num_parameters();
                (ansatz, parameters)
            })
        })
        .await
        .map_err(|e| ToolError::Computation(format!("Error creating variational circuit: {e}")))?
        .map_err(failed)?;
        let name = self.registry.insert(args.name.as_deref(), ansatz).await;

        info!(circuit = %name, parameters, "created variational circuit");
        Ok(format!(
            "Created variational quantum circuit '{name}' with {num_qubits} qubits, {layers} layers, \
             {entanglement} entanglement. Parameters: {parameters}"
        ))
    }

    #[instrument(skip(self, args), fields(qubits = args.num_qubits))]
    async fn implement_qft(&self, args: QftArgs) -> Result<String, ToolError> {
        let inverse = args.inverse.unwrap_or(false);
        let circuit = library::qft("", args.num_qubits, inverse)
            .map_err(|e| ToolError::Computation(format!("Error creating QFT circuit: {e}")))?;
        let (depth, size) = (circuit.depth(), circuit.size());

        let requested = match args.name {
            Some(name) => name,
            None => {
                let kind = if inverse { "iqft" } else { "qft" };
                format!("{kind}_{}q_{}", args.num_qubits, short_id())
            }
        };
        let name = self.registry.insert(Some(&requested), circuit).await;

        let title = if inverse {
            "Inverse Quantum Fourier Transform"
        } else {
            "Quantum Fourier Transform"
        };
        info!(circuit = %name, inverse, "created QFT circuit");
        Ok(format!(
            "Created {title} circuit '{name}' with {} qubits. Depth: {depth}, Size: {size}",
            args.num_qubits
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_aliases() {
        let call = ToolCall::parse("create_quantum_circuit", json!({"numQubits": 2})).unwrap();
        assert_eq!(call.name(), "create_circuit");
        let call =
            ToolCall::parse("visualize_circuit_mermaid", json!({"circuitName": "bell"})).unwrap();
        assert_eq!(
            call,
            ToolCall::VisualizeCircuitDiagram(CircuitArgs {
                circuit_name: "bell".into()
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_tool() {
        assert_eq!(
            ToolCall::parse("teleport", json!({})),
            Err(ToolCallError::UnknownTool("teleport".into()))
        );
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        let err = ToolCall::parse("create_circuit", json!({"num_qubits": -1})).unwrap_err();
        assert!(matches!(
            err,
            ToolCallError::InvalidArguments { ref tool, .. } if tool == "create_circuit"
        ));
        assert!(ToolCall::parse("run_circuit", json!({})).is_err());
    }

    #[test]
    fn test_list_circuits_takes_no_arguments() {
        assert_eq!(
            ToolCall::parse("list_circuits", Value::Null),
            Ok(ToolCall::ListCircuits)
        );
    }
}
