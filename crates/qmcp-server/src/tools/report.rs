//! JSON payloads returned by the analysis tools.
//!
//! Field order is part of the output contract, so payloads are plain
//! `Serialize` structs and keyed collections go through [`OrderedMap`].

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use qmcp_ir::Circuit;
use qmcp_sim::{Counts, DensityMatrix, SimResult, Statevector};

use crate::registry::CircuitSummary;

/// Probabilities below this are left out of statevector reports.
pub const PROBABILITY_CUTOFF: f64 = 1e-12;

/// Reports list at most this many basis states.
pub const TOP_STATES: usize = 10;

/// Reports list at most this many amplitude magnitudes.
pub const AMPLITUDE_PREVIEW: usize = 16;

/// Reduced-state entropy above which a state counts as entangled.
pub const ENTANGLEMENT_THRESHOLD: f64 = 0.01;

/// Purity above which a state counts as pure.
pub const PURITY_THRESHOLD: f64 = 0.99;

/// A JSON object that keeps insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// `run_circuit` output.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub circuit: String,
    pub shots: u32,
    pub results: Counts,
    pub total_counts: u64,
}

impl RunReport {
    pub fn new(circuit: &str, shots: u32, results: Counts) -> Self {
        let total_counts = results.values().sum();
        Self {
            circuit: circuit.to_string(),
            shots,
            results,
            total_counts,
        }
    }
}

/// `get_circuit_info` output.
#[derive(Debug, Serialize)]
pub struct CircuitInfo {
    pub name: String,
    pub num_qubits: usize,
    pub num_classical_bits: usize,
    pub depth: usize,
    pub size: usize,
    pub width: usize,
    pub gate_counts: OrderedMap<usize>,
}

impl CircuitInfo {
    pub fn new(name: &str, circuit: &Circuit) -> Self {
        Self {
            name: name.to_string(),
            num_qubits: circuit.num_qubits(),
            num_classical_bits: circuit.num_clbits(),
            depth: circuit.depth(),
            size: circuit.size(),
            width: circuit.width(),
            gate_counts: circuit.count_ops().into_iter().collect(),
        }
    }
}

/// One row of `list_circuits`.
#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub qubits: usize,
    pub classical_bits: usize,
    pub gates: usize,
}

impl From<CircuitSummary> for ListEntry {
    fn from(summary: CircuitSummary) -> Self {
        Self {
            qubits: summary.num_qubits,
            classical_bits: summary.num_clbits,
            gates: summary.size,
        }
    }
}

/// `analyze_statevector` output.
#[derive(Debug, Serialize)]
pub struct StatevectorReport {
    pub circuit: String,
    pub num_qubits: usize,
    pub state_dimension: usize,
    pub probabilities: OrderedMap<f64>,
    pub total_probability: f64,
    pub most_probable_state: Option<String>,
    pub max_probability: f64,
    pub amplitudes_magnitude: Vec<f64>,
}

impl StatevectorReport {
    /// Summarize `state`. Basis labels put qubit 0 rightmost.
    pub fn new(circuit: &str, num_qubits: usize, state: &Statevector) -> Self {
        let probabilities = state.probabilities();
        let total_probability = probabilities.iter().sum();

        let mut ranked: Vec<(usize, f64)> = probabilities
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, p)| p >= PROBABILITY_CUTOFF)
            .collect();
        // stable: ties keep ascending basis index
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(TOP_STATES);

        let width = state.num_qubits();
        let label = |index: usize| format!("{index:0width$b}");
        let top: OrderedMap<f64> = ranked.iter().map(|&(i, p)| (label(i), p)).collect();

        Self {
            circuit: circuit.to_string(),
            num_qubits,
            state_dimension: state.dimension(),
            most_probable_state: ranked.first().map(|&(i, _)| label(i)),
            max_probability: ranked.first().map_or(0.0, |&(_, p)| p),
            probabilities: top,
            total_probability,
            amplitudes_magnitude: state
                .amplitudes()
                .iter()
                .take(AMPLITUDE_PREVIEW)
                .map(|a| a.norm())
                .collect(),
        }
    }
}

/// `compute_density_matrix` output.
#[derive(Debug, Serialize)]
pub struct DensityReport {
    pub circuit: String,
    pub num_qubits: usize,
    pub purity: f64,
    pub entropy: f64,
    pub is_pure_state: bool,
    pub trace: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_trace_entropy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entangled: Option<bool>,
}

impl DensityReport {
    /// Summarize `rho`; the reduced-state fields need at least two qubits.
    pub fn new(circuit: &str, num_qubits: usize, rho: &DensityMatrix) -> SimResult<Self> {
        let purity = rho.purity();
        let partial_trace_entropy = match rho.partial_trace(0) {
            Some(reduced) if rho.num_qubits() >= 2 => Some(reduced.von_neumann_entropy()?),
            _ => None,
        };

        Ok(Self {
            circuit: circuit.to_string(),
            num_qubits,
            purity,
            entropy: rho.von_neumann_entropy()?,
            is_pure_state: purity > PURITY_THRESHOLD,
            trace: rho.trace(),
            partial_trace_entropy,
            entangled: partial_trace_entropy.map(|s| s > ENTANGLEMENT_THRESHOLD),
        })
    }
}

/// `optimize_circuit` output.
#[derive(Debug, Serialize)]
pub struct OptimizationReport {
    pub original_circuit: String,
    pub optimized_circuit: String,
    pub optimization_level: u8,
    pub original_size: usize,
    pub optimized_size: usize,
    pub size_reduction: i64,
    pub original_depth: usize,
    pub optimized_depth: usize,
    pub depth_reduction: i64,
    pub improvement_percentage: f64,
}

impl OptimizationReport {
    pub fn new(
        original_name: &str,
        original: &Circuit,
        optimized_name: &str,
        optimized: &Circuit,
        level: u8,
    ) -> Self {
        let (original_size, optimized_size) = (original.size(), optimized.size());
        let (original_depth, optimized_depth) = (original.depth(), optimized.depth());
        let size_reduction = original_size as i64 - optimized_size as i64;

        Self {
            original_circuit: original_name.to_string(),
            optimized_circuit: optimized_name.to_string(),
            optimization_level: level,
            original_size,
            optimized_size,
            size_reduction,
            original_depth,
            optimized_depth,
            depth_reduction: original_depth as i64 - optimized_depth as i64,
            improvement_percentage: improvement_percentage(original_size, size_reduction),
        }
    }
}

/// Size reduction as a percentage, two decimals, 0 for an empty original.
pub fn improvement_percentage(original_size: usize, size_reduction: i64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let pct = size_reduction as f64 / original_size as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmcp_ir::QubitId;

    #[test]
    fn test_ordered_map_keeps_order() {
        let map: OrderedMap<u32> = [("z".to_string(), 1), ("a".to_string(), 2)]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_improvement_percentage() {
        assert_eq!(improvement_percentage(0, 0), 0.0);
        assert_eq!(improvement_percentage(2, 2), 100.0);
        assert_eq!(improvement_percentage(3, 1), 33.33);
    }

    #[test]
    fn test_gate_counts_most_frequent_first() {
        let mut circuit = Circuit::with_size("c", 2, 2);
        circuit.x(QubitId(1)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(1)).unwrap();
        circuit.measure_all().unwrap();

        let json = serde_json::to_string(&CircuitInfo::new("c", &circuit)).unwrap();
        let counts = &json[json.find("\"gate_counts\"").unwrap()..];
        let position = |key: &str| counts.find(&format!("\"{key}\"")).unwrap();
        // h and measure tie at 2, x and barrier at 1; ties keep first use.
        assert!(position("h") < position("measure"));
        assert!(position("measure") < position("x"));
        assert!(position("x") < position("barrier"));
    }

    #[test]
    fn test_statevector_report_bell() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let state = Statevector::from_circuit(&circuit).unwrap();

        let report = StatevectorReport::new("bell", 2, &state);
        let keys: Vec<_> = report.probabilities.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["00", "11"]);
        assert_eq!(report.most_probable_state.as_deref(), Some("00"));
        assert!((report.total_probability - 1.0).abs() < 1e-12);
        assert_eq!(report.amplitudes_magnitude.len(), 4);
    }

    #[test]
    fn test_statevector_labels_put_qubit_zero_right() {
        let mut circuit = Circuit::with_size("x0", 3, 0);
        circuit.x(QubitId(0)).unwrap();
        let state = Statevector::from_circuit(&circuit).unwrap();
        let report = StatevectorReport::new("x0", 3, &state);
        assert_eq!(report.most_probable_state.as_deref(), Some("001"));
        assert_eq!(report.max_probability, 1.0);
    }

    #[test]
    fn test_density_report_single_qubit_omits_reduced_fields() {
        let state = Statevector::new(1);
        let report = DensityReport::new("one", 1, &DensityMatrix::from_statevector(&state)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("partial_trace_entropy").is_none());
        assert!(json.get("entangled").is_none());
        assert_eq!(json["is_pure_state"], true);
    }
}
