//! Mermaid flowchart rendering.

use std::fmt::Write;

use qmcp_ir::{Circuit, Instruction, InstructionKind};

const STYLES: [&str; 4] = [
    "classDef qubitNode fill:#e1f5fe,stroke:#01579b,stroke-width:2px",
    "classDef gateNode fill:#f3e5f5,stroke:#4a148c,stroke-width:2px",
    "classDef measureNode fill:#fff3e0,stroke:#e65100,stroke-width:2px",
    "classDef classicalNode fill:#e8f5e8,stroke:#1b5e20,stroke-width:2px",
];

#[derive(Default)]
struct Flowchart {
    lines: Vec<String>,
    qubit_nodes: Vec<String>,
    gate_nodes: Vec<String>,
    measure_nodes: Vec<String>,
    classical_nodes: Vec<String>,
}

impl Flowchart {
    fn node(&mut self, id: &str, label: &str) {
        self.lines.push(format!("    {id}[\"{label}\"]"));
    }

    fn edge(&mut self, from: &str, to: &str) {
        self.lines.push(format!("    {from} --> {to}"));
    }
}

/// `(node id prefix, label)` for one instruction.
fn describe(instruction: &Instruction) -> (String, String) {
    let upper = instruction.name().to_ascii_uppercase();
    match (&instruction.kind, upper.as_str()) {
        (InstructionKind::Measure, _) => ("M".into(), "Measure".into()),
        (_, "CX") => ("CNOT".into(), "CNOT Gate".into()),
        (InstructionKind::Gate(gate), name) if name.starts_with('R') => {
            let label = match gate.parameters().first() {
                Some(theta) => format!("{name}({})", theta.format_rounded(3)),
                None => name.to_string(),
            };
            (upper.clone(), label)
        }
        _ => (upper.clone(), format!("{upper} Gate")),
    }
}

/// Render `circuit` as a top-down flowchart.
///
/// Every qubit and classical bit gets a start node; each instruction
/// becomes a node with an edge from the previous node on each wire it
/// touches. Qubits always get a final node, classical bits only when
/// something was measured into them.
pub fn to_mermaid(circuit: &Circuit) -> String {
    let mut chart = Flowchart::default();
    chart.lines.push("flowchart TD".into());

    let mut qubit_last: Vec<String> = (0..circuit.num_qubits())
        .map(|i| format!("Q{i}_start"))
        .collect();
    let mut clbit_last: Vec<String> = (0..circuit.num_clbits())
        .map(|i| format!("C{i}_start"))
        .collect();
    let mut measured = vec![false; circuit.num_clbits()];

    for (i, id) in qubit_last.iter().enumerate() {
        chart.node(id, &format!("|0⟩ Q{i}"));
        chart.qubit_nodes.push(id.clone());
    }
    for (i, id) in clbit_last.iter().enumerate() {
        chart.node(id, &format!("0 C{i}"));
        chart.classical_nodes.push(id.clone());
    }

    for (k, instruction) in circuit.instructions().iter().enumerate() {
        let (prefix, label) = describe(instruction);
        let id = format!("{prefix}{}", k + 1);
        chart.node(&id, &label);

        for q in &instruction.qubits {
            if let Some(last) = qubit_last.get_mut(q.index()) {
                let from = std::mem::replace(last, id.clone());
                chart.edge(&from, &id);
            }
        }
        for c in &instruction.clbits {
            if let Some(last) = clbit_last.get_mut(c.index()) {
                let from = std::mem::replace(last, id.clone());
                chart.edge(&from, &id);
                measured[c.index()] = true;
            }
        }

        if instruction.is_measure() {
            chart.measure_nodes.push(id);
        } else {
            chart.gate_nodes.push(id);
        }
    }

    for (i, last) in qubit_last.iter().enumerate() {
        let id = format!("Q{i}_final");
        chart.node(&id, &format!("Q{i} Final"));
        chart.edge(last, &id);
        chart.qubit_nodes.push(id);
    }
    for (i, last) in clbit_last.iter().enumerate() {
        if !measured[i] {
            continue;
        }
        let id = format!("C{i}_final");
        chart.node(&id, &format!("C{i} Final"));
        chart.edge(last, &id);
        chart.classical_nodes.push(id);
    }

    let mut out = chart.lines.join("\n");
    out.push_str("\n\n    %% Styling");
    for style in STYLES {
        let _ = write!(out, "\n    {style}");
    }
    for (nodes, class) in [
        (&chart.qubit_nodes, "qubitNode"),
        (&chart.gate_nodes, "gateNode"),
        (&chart.measure_nodes, "measureNode"),
        (&chart.classical_nodes, "classicalNode"),
    ] {
        if !nodes.is_empty() {
            let _ = write!(out, "\n    class {} {class}", nodes.join(","));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmcp_ir::{ClbitId, QubitId};

    fn edges(chart: &str) -> Vec<(&str, &str)> {
        chart
            .lines()
            .filter_map(|l| l.trim().split_once(" --> "))
            .collect()
    }

    #[test]
    fn test_bell_chart() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(1), ClbitId(1)).unwrap();
        let chart = to_mermaid(&circuit);

        assert!(chart.starts_with("flowchart TD\n"));
        assert!(chart.contains("    Q0_start[\"|0⟩ Q0\"]"));
        assert!(chart.contains("    H1[\"H Gate\"]"));
        assert!(chart.contains("    CNOT2[\"CNOT Gate\"]"));
        assert!(chart.contains("    M3[\"Measure\"]"));

        let e = edges(&chart);
        assert!(e.contains(&("Q0_start", "H1")));
        assert!(e.contains(&("H1", "CNOT2")));
        assert!(e.contains(&("Q1_start", "CNOT2")));
        assert!(e.contains(&("CNOT2", "M3")));
        assert!(e.contains(&("C1_start", "M3")));
        assert!(e.contains(&("M3", "Q1_final")));
        assert!(e.contains(&("M3", "C1_final")));
        assert!(!chart.contains("C0_final"));
    }

    #[test]
    fn test_rotation_labels() {
        let mut circuit = Circuit::with_size("rot", 2, 0);
        circuit.rx(0.5, QubitId(0)).unwrap();
        circuit.rzz(1.0, QubitId(0), QubitId(1)).unwrap();
        circuit.sdg(QubitId(1)).unwrap();
        let chart = to_mermaid(&circuit);
        assert!(chart.contains("RX1[\"RX(0.500)\"]"));
        assert!(chart.contains("RZZ2[\"RZZ(1.000)\"]"));
        assert!(chart.contains("SDG3[\"SDG Gate\"]"));
    }

    #[test]
    fn test_styling_block() {
        let chart = to_mermaid(&Circuit::with_size("empty", 1, 0));
        assert!(chart.contains("\n\n    %% Styling\n"));
        assert!(chart.contains("class Q0_start,Q0_final qubitNode"));
        assert!(!chart.contains("gateNode\n"));
        assert!(chart.ends_with("class Q0_start,Q0_final qubitNode"));
    }
}
