//! Density matrices in factored form.
//!
//! A state is kept as `ρ = Σ_k |v_k⟩⟨v_k|` with unnormalized components
//! `v_k`. Purity and spectrum come from the small Gram matrix
//! `G_jk = ⟨v_j|v_k⟩`, whose nonzero eigenvalues equal those of `ρ`, so a
//! pure state over twenty qubits never materializes its `4^n` matrix.

use faer::{Mat, Side, c64};
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Eigenvalues at or below this are treated as zero in the entropy.
pub const EIGENVALUE_CUTOFF: f64 = 1e-12;

/// A density matrix over `num_qubits` qubits.
#[derive(Debug, Clone)]
pub struct DensityMatrix {
    num_qubits: usize,
    components: Vec<Vec<Complex64>>,
}

impl DensityMatrix {
    /// `|ψ⟩⟨ψ|`.
    pub fn from_statevector(state: &Statevector) -> Self {
        Self {
            num_qubits: state.num_qubits(),
            components: vec![state.amplitudes().to_vec()],
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn inner(&self, j: usize, k: usize) -> Complex64 {
        self.components[j]
            .iter()
            .zip(&self.components[k])
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// `tr ρ`.
    pub fn trace(&self) -> f64 {
        self.components
            .iter()
            .flat_map(|v| v.iter().map(Complex64::norm_sqr))
            .sum()
    }

    /// `tr ρ²`, the squared Frobenius norm of the Gram matrix.
    pub fn purity(&self) -> f64 {
        let m = self.components.len();
        (0..m)
            .flat_map(|j| (0..m).map(move |k| (j, k)))
            .map(|(j, k)| self.inner(j, k).norm_sqr())
            .sum()
    }

    /// Nonzero-spectrum eigenvalues, sorted descending.
    pub fn eigenvalues(&self) -> SimResult<Vec<f64>> {
        let m = self.components.len();
        if m == 0 {
            return Ok(Vec::new());
        }
        let gram = Mat::<c64>::from_fn(m, m, |j, k| {
            let g = self.inner(j, k);
            c64::new(g.re, g.im)
        });
        let mut values = gram
            .self_adjoint_eigenvalues(Side::Lower)
            .map_err(|e| SimError::Eigen(format!("{e:?}")))?;
        values.sort_by(|a, b| b.total_cmp(a));
        Ok(values)
    }

    /// Von Neumann entropy in bits.
    pub fn von_neumann_entropy(&self) -> SimResult<f64> {
        let entropy: f64 = self
            .eigenvalues()?
            .into_iter()
            .filter(|&l| l > EIGENVALUE_CUTOFF)
            .map(|l| -l * l.log2())
            .sum();
        Ok(entropy.max(0.0))
    }

    /// Trace out `qubit`; the remaining qubits keep their relative order.
    ///
    /// Returns `None` if `qubit` is out of range.
    pub fn partial_trace(&self, qubit: usize) -> Option<DensityMatrix> {
        if qubit >= self.num_qubits {
            return None;
        }
        let low = (1usize << qubit) - 1;
        let half = 1usize << (self.num_qubits - 1);

        let mut components = Vec::with_capacity(self.components.len() * 2);
        for v in &self.components {
            for bit in 0..2usize {
                let part: Vec<Complex64> = (0..half)
                    .map(|r| {
                        let full = ((r & !low) << 1) | (bit << qubit) | (r & low);
                        v[full]
                    })
                    .collect();
                if part.iter().any(|a| a.norm_sqr() > 0.0) {
                    components.push(part);
                }
            }
        }

        Some(DensityMatrix {
            num_qubits: self.num_qubits - 1,
            components,
        })
    }

    /// The full `2^n × 2^n` matrix.
    pub fn to_matrix(&self) -> Array2<Complex64> {
        let dim = 1usize << self.num_qubits;
        let mut rho = Array2::<Complex64>::zeros((dim, dim));
        for v in &self.components {
            for i in 0..dim {
                for j in 0..dim {
                    rho[[i, j]] += v[i] * v[j].conj();
                }
            }
        }
        rho
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmcp_ir::{Circuit, QubitId};

    fn bell() -> Statevector {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        Statevector::from_circuit(&circuit).unwrap()
    }

    #[test]
    fn test_pure_state() {
        let rho = DensityMatrix::from_statevector(&bell());
        assert!((rho.trace() - 1.0).abs() < 1e-10);
        assert!((rho.purity() - 1.0).abs() < 1e-10);
        assert!(rho.von_neumann_entropy().unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_bell_reduced_state_is_maximally_mixed() {
        let rho = DensityMatrix::from_statevector(&bell());
        for q in 0..2 {
            let reduced = rho.partial_trace(q).unwrap();
            assert_eq!(reduced.num_qubits(), 1);
            assert!((reduced.trace() - 1.0).abs() < 1e-10);
            assert!((reduced.purity() - 0.5).abs() < 1e-10);
            assert!((reduced.von_neumann_entropy().unwrap() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_product_state_reduces_to_pure() {
        let mut circuit = Circuit::with_size("product", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        let rho = DensityMatrix::from_statevector(&Statevector::from_circuit(&circuit).unwrap());

        let reduced = rho.partial_trace(0).unwrap();
        assert!(rho.partial_trace(2).is_none());
        assert!((reduced.purity() - 1.0).abs() < 1e-10);
        let m = reduced.to_matrix();
        // Remaining qubit is |1⟩.
        assert!((m[[1, 1]].re - 1.0).abs() < 1e-10);
        assert!(m[[0, 0]].norm() < 1e-10);
    }

    #[test]
    fn test_unequal_schmidt_spectrum() {
        // RY(2π/3) then CX: cos(π/3)|00⟩ + sin(π/3)|11⟩.
        let mut circuit = Circuit::with_size("skewed", 2, 0);
        circuit.ry(2.0 * std::f64::consts::FRAC_PI_3, QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let rho = DensityMatrix::from_statevector(&Statevector::from_circuit(&circuit).unwrap());
        let reduced = rho.partial_trace(1).unwrap();

        let values = reduced.eigenvalues().unwrap();
        assert_eq!(values.len(), 2);
        assert!((values[0] - 0.75).abs() < 1e-10);
        assert!((values[1] - 0.25).abs() < 1e-10);
        assert!((reduced.purity() - 0.625).abs() < 1e-10);

        let expected = -(0.75f64 * 0.75f64.log2() + 0.25 * 0.25f64.log2());
        assert!((reduced.von_neumann_entropy().unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_empty_state_has_no_spectrum() {
        let rho = DensityMatrix {
            num_qubits: 1,
            components: Vec::new(),
        };
        assert!(rho.eigenvalues().unwrap().is_empty());
        assert_eq!(rho.von_neumann_entropy().unwrap(), 0.0);
    }

    #[test]
    fn test_to_matrix_bell() {
        let m = DensityMatrix::from_statevector(&bell()).to_matrix();
        assert_eq!(m.dim(), (4, 4));
        assert!((m[[0, 0]].re - 0.5).abs() < 1e-10);
        assert!((m[[0, 3]].re - 0.5).abs() < 1e-10);
        assert!((m[[3, 3]].re - 0.5).abs() < 1e-10);
        assert!(m[[1, 1]].norm() < 1e-10);
    }
}
