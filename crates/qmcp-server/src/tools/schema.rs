//! Tool descriptors published through `tools/list`.

use serde_json::{Value, json};

use crate::protocol::ToolDescriptor;

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn circuit_name_only() -> Value {
    json!({
        "type": "object",
        "properties": {
            "circuit_name": { "type": "string", "description": "Name of the circuit" }
        },
        "required": ["circuit_name"]
    })
}

fn gates_schema(kinds: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": {
            "circuit_name": { "type": "string", "description": "Name of the circuit to modify" },
            "gates": {
                "type": "array",
                "description": "Gate operations, applied in order",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": { "type": "string", "enum": kinds },
                        "qubits": { "type": "array", "items": { "type": "integer", "minimum": 0 } },
                        "params": { "type": "array", "items": { "type": "number" } },
                        "classical_bit": { "type": "integer", "minimum": 0 }
                    },
                    "required": ["type"]
                }
            }
        },
        "required": ["circuit_name", "gates"]
    })
}

/// Every tool, in the order they are listed.
pub fn tool_descriptors(max_shots: u32, default_shots: u32) -> Vec<ToolDescriptor> {
    vec![
        tool(
            "create_circuit",
            "Create a new quantum circuit. The name is auto-generated when omitted and suffixed when already taken.",
            json!({
                "type": "object",
                "properties": {
                    "num_qubits": { "type": "integer", "minimum": 1 },
                    "num_classical_bits": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Defaults to num_qubits"
                    },
                    "name": { "type": "string" }
                },
                "required": ["num_qubits"]
            }),
        ),
        tool(
            "add_gates",
            "Add basic gates to a circuit: h, x, y, z, cx, measure, measure_all.",
            gates_schema(&["h", "x", "y", "z", "cx", "measure", "measure_all"]),
        ),
        tool(
            "add_advanced_gates",
            "Add rotation and phase gates to a circuit: rx, ry, rz, rxx, ryy, rzz, u, swap, s, sdg, t, tdg.",
            gates_schema(&[
                "rx", "ry", "rz", "rxx", "ryy", "rzz", "u", "swap", "s", "sdg", "t", "tdg",
            ]),
        ),
        tool(
            "run_circuit",
            "Run a circuit on the local simulator and return measurement counts.",
            json!({
                "type": "object",
                "properties": {
                    "circuit_name": { "type": "string" },
                    "shots": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": max_shots,
                        "default": default_shots
                    }
                },
                "required": ["circuit_name"]
            }),
        ),
        tool(
            "get_circuit_info",
            "Get size, depth, width and gate counts of a circuit.",
            circuit_name_only(),
        ),
        tool(
            "visualize_circuit",
            "Draw a circuit as text.",
            circuit_name_only(),
        ),
        tool(
            "visualize_circuit_diagram",
            "Render a circuit as a Mermaid flowchart.",
            circuit_name_only(),
        ),
        tool(
            "list_circuits",
            "List all created circuits.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            "analyze_statevector",
            "Simulate a circuit without its final measurements and report basis-state probabilities.",
            circuit_name_only(),
        ),
        tool(
            "compute_density_matrix",
            "Report purity, entropy and entanglement of the state a circuit prepares.",
            circuit_name_only(),
        ),
        tool(
            "optimize_circuit",
            "Optimize a circuit into a new registry entry and compare sizes and depths.",
            json!({
                "type": "object",
                "properties": {
                    "circuit_name": { "type": "string" },
                    "optimization_level": {
                        "type": "integer",
                        "enum": [0, 1, 2, 3],
                        "default": 1
                    }
                },
                "required": ["circuit_name"]
            }),
        ),
        tool(
            "create_variational_circuit",
            "Create an EfficientSU2 variational ansatz with symbolic parameters.",
            json!({
                "type": "object",
                "properties": {
                    "num_qubits": { "type": "integer", "minimum": 1 },
                    "num_layers": { "type": "integer", "minimum": 0, "default": 1 },
                    "entanglement": {
                        "type": "string",
                        "enum": ["full", "linear", "circular"],
                        "default": "full"
                    },
                    "name": { "type": "string" }
                },
                "required": ["num_qubits"]
            }),
        ),
        tool(
            "implement_qft",
            "Create a circuit holding a quantum Fourier transform or its inverse.",
            json!({
                "type": "object",
                "properties": {
                    "num_qubits": { "type": "integer", "minimum": 1 },
                    "inverse": { "type": "boolean", "default": false },
                    "name": { "type": "string" }
                },
                "required": ["num_qubits"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_thirteen_unique_tools() {
        let tools = tool_descriptors(100, 10);
        assert_eq!(tools.len(), 13);
        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_schemas_are_objects() {
        for t in tool_descriptors(100, 10) {
            assert_eq!(t.input_schema["type"], "object", "{}", t.name);
        }
    }

    #[test]
    fn test_shot_limits_published() {
        let tools = tool_descriptors(5000, 100);
        let run = tools.iter().find(|t| t.name == "run_circuit").unwrap();
        assert_eq!(run.input_schema["properties"]["shots"]["maximum"], 5000);
        assert_eq!(run.input_schema["properties"]["shots"]["default"], 100);
    }
}
