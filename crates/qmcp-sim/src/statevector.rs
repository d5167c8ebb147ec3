//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use qmcp_ir::{
    Circuit, GateKind, GateMatrix, Instruction, InstructionKind, Unitary2x2, Unitary4x4,
};

use crate::error::{SimError, SimResult};

/// A pure state over `n` qubits, stored as `2^n` amplitudes.
///
/// Basis index bit `i` is the value of qubit `i` (little-endian).
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Evolve |0...0⟩ through every unitary instruction of `circuit`.
    ///
    /// Barriers are skipped; any measurement is an error, so callers strip
    /// final measurements first.
    pub fn from_circuit(circuit: &Circuit) -> SimResult<Self> {
        let mut state = Self::new(circuit.num_qubits());
        for instruction in circuit.instructions() {
            state.apply(instruction)?;
        }
        Ok(state)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes.
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm, 1 for a normalized state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Measurement probabilities for each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Apply an instruction. Barriers are no-ops.
    pub fn apply(&mut self, instruction: &Instruction) -> SimResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => self.apply_gate(gate, instruction),
            InstructionKind::Barrier => Ok(()),
            InstructionKind::Measure => Err(SimError::MidCircuitMeasurement(
                instruction.qubits.first().map_or(0, |q| q.0),
            )),
        }
    }

    /// Apply a gate; composite gates are expanded through their definition.
    fn apply_gate(&mut self, gate: &GateKind, instruction: &Instruction) -> SimResult<()> {
        match gate {
            GateKind::Standard(std_gate) => {
                let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
                match (std_gate.matrix()?, qubits.as_slice()) {
                    (GateMatrix::One(u), &[q]) => self.apply_1q(q, &u),
                    (GateMatrix::Two(m), &[q0, q1]) => self.apply_2q(q0, q1, &m),
                    _ => {
                        return Err(SimError::InvalidInstruction(format!(
                            "gate '{}' applied to {} qubit(s)",
                            std_gate.name(),
                            qubits.len()
                        )));
                    }
                }
                Ok(())
            }
            GateKind::Composite(composite) => {
                for inner in &composite.definition {
                    let mapped = inner.remapped(&instruction.qubits).ok_or_else(|| {
                        SimError::InvalidInstruction(format!(
                            "definition of '{}' references a qubit outside the gate",
                            composite.name
                        ))
                    })?;
                    self.apply(&mapped)?;
                }
                Ok(())
            }
        }
    }

    /// Apply a single-qubit unitary.
    pub fn apply_1q(&mut self, qubit: usize, u: &Unitary2x2) {
        let mask = 1 << qubit;
        let [a, b, c, d] = u.data;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[j];
                self.amplitudes[i] = a * a0 + b * a1;
                self.amplitudes[j] = c * a0 + d * a1;
            }
        }
    }

    /// Apply a two-qubit unitary; `q0` is the high bit of the local index.
    pub fn apply_2q(&mut self, q0: usize, q1: usize, m: &Unitary4x4) {
        let mask0 = 1 << q0;
        let mask1 = 1 << q1;
        for i in 0..self.amplitudes.len() {
            if i & mask0 == 0 && i & mask1 == 0 {
                let idx = [i, i | mask1, i | mask0, i | mask0 | mask1];
                let old = idx.map(|k| self.amplitudes[k]);
                for (row, &k) in idx.iter().enumerate() {
                    self.amplitudes[k] = m.data[row]
                        .iter()
                        .zip(&old)
                        .map(|(x, y)| x * y)
                        .sum();
                }
            }
        }
    }

    /// Projectively measure `qubit`, collapsing the state. Returns the outcome.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> bool {
        let mask = 1 << qubit;
        let p1: f64 = self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();

        let outcome = rng.r#gen::<f64>() < p1;
        let kept = if outcome { p1 } else { 1.0 - p1 };
        let scale = if kept > 0.0 { 1.0 / kept.sqrt() } else { 0.0 };

        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        outcome
    }
}

/// Cumulative distribution over basis states, for repeated sampling.
#[derive(Debug, Clone)]
pub struct BasisSampler {
    cumulative: Vec<f64>,
}

impl BasisSampler {
    /// Build from a state's probabilities.
    pub fn new(state: &Statevector) -> Self {
        let mut total = 0.0;
        let cumulative = state
            .amplitudes
            .iter()
            .map(|a| {
                total += a.norm_sqr();
                total
            })
            .collect();
        Self { cumulative }
    }

    /// Draw one basis index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        let r = rng.r#gen::<f64>() * total;
        self.cumulative
            .partition_point(|&c| c <= r)
            .min(self.cumulative.len().saturating_sub(1))
    }
}
