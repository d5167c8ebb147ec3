//! Shot-based execution and exact-state analysis.

use std::collections::BTreeMap;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use qmcp_ir::{Circuit, InstructionKind};

use crate::density::DensityMatrix;
use crate::error::{SimError, SimResult};
use crate::statevector::{BasisSampler, Statevector};

/// Measurement histogram keyed by bitstring, sorted ascending.
///
/// Classical bit 0 is the rightmost character.
pub type Counts = BTreeMap<String, u64>;

/// Default width limit.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Local statevector simulator.
///
/// Sampling is seeded per call when a seed is configured, so repeated runs
/// of the same circuit return identical counts.
#[derive(Debug, Clone)]
pub struct Simulator {
    max_qubits: usize,
    seed: Option<u64>,
}

impl Simulator {
    /// A simulator with the default width limit and no seed.
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
        }
    }

    /// Create a simulator with custom max qubits.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Fix the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Maximum supported width.
    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn check_width(&self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() > self.max_qubits {
            return Err(SimError::TooManyQubits {
                num_qubits: circuit.num_qubits(),
                max_qubits: self.max_qubits,
            });
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Sample `shots` executions of `circuit`.
    ///
    /// When every measurement is terminal the state is evolved once and the
    /// final distribution sampled; otherwise each shot is simulated with
    /// collapse at every measurement.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &Circuit, shots: u32) -> SimResult<Counts> {
        if shots == 0 {
            return Err(SimError::InvalidShots);
        }
        self.check_width(circuit)?;
        if !circuit.has_measurements() {
            return Err(SimError::NoMeasurements(circuit.name().to_string()));
        }

        let start = Instant::now();
        let flat = if circuit.has_composites() {
            circuit.decompose_composites()?
        } else {
            circuit.clone()
        };
        debug!(
            "Starting simulation: {} qubits, {} shots",
            flat.num_qubits(),
            shots
        );

        let mut rng = self.rng();
        let counts = if measurements_are_terminal(&flat) {
            sample_terminal(&flat, shots, &mut rng)?
        } else {
            debug!("Mid-circuit measurement present, simulating per shot");
            sample_per_shot(&flat, shots, &mut rng)?
        };

        debug!("Simulation completed in {:?}", start.elapsed());
        Ok(counts)
    }

    /// The pure state prepared by `circuit`, ignoring final measurements.
    pub fn statevector(&self, circuit: &Circuit) -> SimResult<Statevector> {
        self.check_width(circuit)?;
        let mut unitary = circuit.clone();
        unitary.remove_final_measurements();
        Statevector::from_circuit(&unitary)
    }

    /// The density matrix of [`Simulator::statevector`].
    pub fn density_matrix(&self, circuit: &Circuit) -> SimResult<DensityMatrix> {
        self.statevector(circuit)
            .map(|state| DensityMatrix::from_statevector(&state))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// True if no gate touches a qubit after it has been measured.
fn measurements_are_terminal(circuit: &Circuit) -> bool {
    let mut measured = vec![false; circuit.num_qubits()];
    for instruction in circuit.instructions() {
        match instruction.kind {
            InstructionKind::Measure => {
                for q in &instruction.qubits {
                    measured[q.index()] = true;
                }
            }
            InstructionKind::Barrier => {}
            InstructionKind::Gate(_) => {
                if instruction.qubits.iter().any(|q| measured[q.index()]) {
                    return false;
                }
            }
        }
    }
    true
}

fn bitstring(clbits: &[bool]) -> String {
    clbits
        .iter()
        .rev()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
}

fn sample_terminal(circuit: &Circuit, shots: u32, rng: &mut StdRng) -> SimResult<Counts> {
    let mut state = Statevector::new(circuit.num_qubits());
    let mut measurements = Vec::new();
    for instruction in circuit.instructions() {
        match instruction.kind {
            InstructionKind::Measure => {
                measurements.push((instruction.qubits[0].index(), instruction.clbits[0].index()));
            }
            _ => state.apply(instruction)?,
        }
    }

    let sampler = BasisSampler::new(&state);
    let mut outcomes: FxHashMap<usize, u64> = FxHashMap::default();
    for _ in 0..shots {
        *outcomes.entry(sampler.sample(rng)).or_insert(0) += 1;
    }

    let mut counts = Counts::new();
    for (index, n) in outcomes {
        let mut clbits = vec![false; circuit.num_clbits()];
        for &(qubit, clbit) in &measurements {
            clbits[clbit] = (index >> qubit) & 1 == 1;
        }
        *counts.entry(bitstring(&clbits)).or_insert(0) += n;
    }
    Ok(counts)
}

fn sample_per_shot(circuit: &Circuit, shots: u32, rng: &mut StdRng) -> SimResult<Counts> {
    let mut counts = Counts::new();
    for _ in 0..shots {
        let mut state = Statevector::new(circuit.num_qubits());
        let mut clbits = vec![false; circuit.num_clbits()];
        for instruction in circuit.instructions() {
            match instruction.kind {
                InstructionKind::Measure => {
                    let outcome = state.measure(instruction.qubits[0].index(), rng);
                    clbits[instruction.clbits[0].index()] = outcome;
                }
                _ => state.apply(instruction)?,
            }
        }
        *counts.entry(bitstring(&clbits)).or_insert(0) += 1;
    }
    Ok(counts)
}
