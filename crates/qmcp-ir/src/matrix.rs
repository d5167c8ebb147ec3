//! Gate matrices.
//!
//! Single-qubit gates are [`Unitary2x2`] values in row-major order. Two-qubit
//! gates are [`Unitary4x4`] values over the local basis
//! `index = 2 * bit(qubits[0]) + bit(qubits[1])`, so for `cx` the control is
//! the high bit.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::IrResult;
use crate::gate::StandardGate;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::new(ONE, ZERO, ZERO, ONE)
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        Self::new(s, s, s, -s)
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::new(ZERO, ONE, ONE, ZERO)
    }

    /// Pauli-Y.
    pub fn y() -> Self {
        Self::new(ZERO, Complex64::new(0.0, -1.0), Complex64::new(0.0, 1.0), ZERO)
    }

    /// Pauli-Z.
    pub fn z() -> Self {
        Self::new(ONE, ZERO, ZERO, -ONE)
    }

    /// Phase gate `diag(1, e^{iλ})`; S, T and their adjoints are special cases.
    pub fn p(lambda: f64) -> Self {
        Self::new(ONE, ZERO, ZERO, Complex64::from_polar(1.0, lambda))
    }

    /// RX rotation.
    pub fn rx(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(0.0, -s),
            Complex64::new(0.0, -s),
            Complex64::new(c, 0.0),
        )
    }

    /// RY rotation.
    pub fn ry(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(-s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(c, 0.0),
        )
    }

    /// RZ rotation.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// U(θ, φ, λ).
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        )
    }

    /// Matrix product `self * other` (apply `other` first).
    #[allow(clippy::many_single_char_names)]
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Conjugate transpose.
    #[must_use]
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Check if this is the identity up to global phase.
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        b.norm() < EPSILON && c.norm() < EPSILON && (a - d).norm() < EPSILON
    }

    /// Check equality up to global phase.
    pub fn approx_eq_up_to_phase(&self, other: &Self) -> bool {
        self.dagger().mul(other).is_identity()
    }

    /// ZYZ Euler angles `(alpha, beta, gamma, global_phase)` with
    /// `U = e^{i·phase} · Rz(alpha) · Ry(beta) · Rz(gamma)`.
    ///
    /// In time order the gates are `Rz(gamma)`, `Ry(beta)`, `Rz(alpha)`.
    pub fn zyz_decomposition(&self) -> (f64, f64, f64, f64) {
        let [a, b, c, d] = self.data;

        let det = a * d - b * c;
        let global_phase = det.arg() / 2.0;

        let phase_factor = Complex64::from_polar(1.0, -global_phase);
        let a = a * phase_factor;
        let b = b * phase_factor;
        let c = c * phase_factor;

        // SU(2): [[cos(β/2)e^{-i(α+γ)/2}, -sin(β/2)e^{-i(α-γ)/2}],
        //         [sin(β/2)e^{i(α-γ)/2},   cos(β/2)e^{i(α+γ)/2}]]
        let beta = 2.0 * c.norm().atan2(a.norm());

        if beta.abs() < EPSILON {
            let alpha_plus_gamma = -2.0 * a.arg();
            return (alpha_plus_gamma / 2.0, 0.0, alpha_plus_gamma / 2.0, global_phase);
        }

        if (beta - PI).abs() < EPSILON {
            let alpha_minus_gamma = -2.0 * (-b).arg();
            return (alpha_minus_gamma / 2.0, PI, -alpha_minus_gamma / 2.0, global_phase);
        }

        let alpha_plus_gamma = -2.0 * a.arg();
        let alpha_minus_gamma = 2.0 * c.arg();
        let alpha = f64::midpoint(alpha_plus_gamma, alpha_minus_gamma);
        let gamma = (alpha_plus_gamma - alpha_minus_gamma) / 2.0;

        (alpha, beta, gamma, global_phase)
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// Normalize an angle to `(-π, π]`. Non-finite input maps to 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// A 4x4 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary4x4 {
    /// Rows of the matrix.
    pub data: [[Complex64; 4]; 4],
}

impl Unitary4x4 {
    fn diagonal(d: [Complex64; 4]) -> Self {
        let mut data = [[ZERO; 4]; 4];
        for (i, value) in d.into_iter().enumerate() {
            data[i][i] = value;
        }
        Self { data }
    }

    /// Controlled-X, control on the high bit.
    pub fn cx() -> Self {
        Self {
            data: [
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE],
                [ZERO, ZERO, ONE, ZERO],
            ],
        }
    }

    /// Controlled-Z.
    pub fn cz() -> Self {
        Self::diagonal([ONE, ONE, ONE, -ONE])
    }

    /// SWAP.
    pub fn swap() -> Self {
        Self {
            data: [
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ZERO, ONE, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE],
            ],
        }
    }

    /// Controlled phase `diag(1, 1, 1, e^{iθ})`.
    pub fn cp(theta: f64) -> Self {
        Self::diagonal([ONE, ONE, ONE, Complex64::from_polar(1.0, theta)])
    }

    /// `exp(-iθ/2 · X⊗X)`.
    pub fn rxx(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        let c = Complex64::new(c, 0.0);
        let m = Complex64::new(0.0, -s);
        Self {
            data: [
                [c, ZERO, ZERO, m],
                [ZERO, c, m, ZERO],
                [ZERO, m, c, ZERO],
                [m, ZERO, ZERO, c],
            ],
        }
    }

    /// `exp(-iθ/2 · Y⊗Y)`.
    pub fn ryy(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        let c = Complex64::new(c, 0.0);
        let m = Complex64::new(0.0, -s);
        // Y⊗Y has -1 on the outer anti-diagonal and +1 on the inner one.
        Self {
            data: [
                [c, ZERO, ZERO, -m],
                [ZERO, c, m, ZERO],
                [ZERO, m, c, ZERO],
                [-m, ZERO, ZERO, c],
            ],
        }
    }

    /// `exp(-iθ/2 · Z⊗Z)`.
    pub fn rzz(theta: f64) -> Self {
        let minus = Complex64::from_polar(1.0, -theta / 2.0);
        let plus = Complex64::from_polar(1.0, theta / 2.0);
        Self::diagonal([minus, plus, plus, minus])
    }
}

/// The matrix of a standard gate, sized by its arity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateMatrix {
    /// Single-qubit gate.
    One(Unitary2x2),
    /// Two-qubit gate.
    Two(Unitary4x4),
}

impl StandardGate {
    /// The gate's matrix; fails if a parameter is unbound.
    pub fn matrix(&self) -> IrResult<GateMatrix> {
        let m = match self {
            StandardGate::X => GateMatrix::One(Unitary2x2::x()),
            StandardGate::Y => GateMatrix::One(Unitary2x2::y()),
            StandardGate::Z => GateMatrix::One(Unitary2x2::z()),
            StandardGate::H => GateMatrix::One(Unitary2x2::h()),
            StandardGate::S => GateMatrix::One(Unitary2x2::p(PI / 2.0)),
            StandardGate::Sdg => GateMatrix::One(Unitary2x2::p(-PI / 2.0)),
            StandardGate::T => GateMatrix::One(Unitary2x2::p(PI / 4.0)),
            StandardGate::Tdg => GateMatrix::One(Unitary2x2::p(-PI / 4.0)),
            StandardGate::Rx(t) => GateMatrix::One(Unitary2x2::rx(t.value()?)),
            StandardGate::Ry(t) => GateMatrix::One(Unitary2x2::ry(t.value()?)),
            StandardGate::Rz(t) => GateMatrix::One(Unitary2x2::rz(t.value()?)),
            StandardGate::P(l) => GateMatrix::One(Unitary2x2::p(l.value()?)),
            StandardGate::U(t, p, l) => {
                GateMatrix::One(Unitary2x2::u(t.value()?, p.value()?, l.value()?))
            }
            StandardGate::CX => GateMatrix::Two(Unitary4x4::cx()),
            StandardGate::CZ => GateMatrix::Two(Unitary4x4::cz()),
            StandardGate::Swap => GateMatrix::Two(Unitary4x4::swap()),
            StandardGate::CP(t) => GateMatrix::Two(Unitary4x4::cp(t.value()?)),
            StandardGate::RXX(t) => GateMatrix::Two(Unitary4x4::rxx(t.value()?)),
            StandardGate::RYY(t) => GateMatrix::Two(Unitary4x4::ryy(t.value()?)),
            StandardGate::RZZ(t) => GateMatrix::Two(Unitary4x4::rzz(t.value()?)),
        };
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterExpression;

    fn assert_reconstructs(u: Unitary2x2) {
        let (alpha, beta, gamma, phase) = u.zyz_decomposition();
        let rebuilt = Unitary2x2::rz(alpha) * Unitary2x2::ry(beta) * Unitary2x2::rz(gamma);
        let global = Complex64::from_polar(1.0, phase);
        for i in 0..4 {
            let got = rebuilt.data[i] * global;
            assert!(
                (u.data[i] - got).norm() < 1e-6,
                "mismatch at {i}: expected {:?}, got {got:?}",
                u.data[i]
            );
        }
    }

    #[test]
    fn test_self_inverse_squares() {
        for m in [Unitary2x2::h(), Unitary2x2::x(), Unitary2x2::y(), Unitary2x2::z()] {
            assert!((m * m).is_identity());
        }
    }

    #[test]
    fn test_s_squared_is_z() {
        let s = Unitary2x2::p(PI / 2.0);
        assert!((s * s).approx_eq_up_to_phase(&Unitary2x2::z()));
    }

    #[test]
    fn test_zyz_reconstruction() {
        assert_reconstructs(Unitary2x2::h());
        assert_reconstructs(Unitary2x2::x());
        assert_reconstructs(Unitary2x2::y());
        assert_reconstructs(Unitary2x2::identity());
        assert_reconstructs(Unitary2x2::u(0.3, 1.1, -0.7));
        assert_reconstructs(Unitary2x2::h() * Unitary2x2::p(PI / 4.0) * Unitary2x2::rx(0.2));
    }

    #[test]
    fn test_zyz_diagonal_has_zero_beta() {
        let mut m = Unitary2x2::identity();
        m.data[0] = Complex64::new(1.0 + 1e-15, 0.0);
        let (_, beta, _, _) = m.zyz_decomposition();
        assert_eq!(beta, 0.0);

        let phases = Unitary2x2::p(0.75) * Unitary2x2::rz(0.1);
        let (_, beta, _, _) = phases.zyz_decomposition();
        assert_eq!(beta, 0.0);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!(normalize_angle(2.0 * PI).abs() < 1e-12);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }

    #[test]
    fn test_two_qubit_rotations_at_pi() {
        // RZZ(π) = -i Z⊗Z
        let m = Unitary4x4::rzz(PI);
        assert!((m.data[0][0] - Complex64::new(0.0, -1.0)).norm() < 1e-12);
        assert!((m.data[1][1] - Complex64::new(0.0, 1.0)).norm() < 1e-12);

        // RYY(π) = -i Y⊗Y
        let m = Unitary4x4::ryy(PI);
        assert!((m.data[0][3] - Complex64::new(0.0, 1.0)).norm() < 1e-12);
        assert!((m.data[1][2] - Complex64::new(0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_unbound_matrix_fails() {
        let gate = StandardGate::Ry(ParameterExpression::symbol("θ[0]"));
        assert!(gate.matrix().is_err());
        assert!(matches!(StandardGate::CX.matrix(), Ok(GateMatrix::Two(_))));
    }
}
