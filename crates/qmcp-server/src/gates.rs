//! Gate specifications accepted by the gate-application tools.

use serde::Deserialize;
use std::fmt;

use qmcp_ir::{Circuit, ClbitId, IrResult, QubitId};

/// One entry of a `gates` argument, as sent by the caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GateSpec {
    /// Gate kind, case-insensitive.
    #[serde(rename = "type", alias = "gate", default)]
    pub kind: String,
    /// Target qubit indices.
    #[serde(default)]
    pub qubits: Vec<i64>,
    /// Angles for parameterized gates.
    #[serde(default)]
    pub params: Vec<f64>,
    /// Destination bit for `measure`; defaults to the qubit index.
    #[serde(default, alias = "classicalBit")]
    pub classical_bit: Option<i64>,
}

/// Which gate vocabulary a tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateSet {
    /// `h x y z cx measure measure_all`.
    Basic,
    /// Rotations, `u`, `swap` and the phase gates.
    Advanced,
}

/// A parsed, validated-for-shape gate operation.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOp {
    H(u32),
    X(u32),
    Y(u32),
    Z(u32),
    Cx(u32, u32),
    Measure { qubit: u32, clbit: u32 },
    MeasureAll,
    Rx(f64, u32),
    Ry(f64, u32),
    Rz(f64, u32),
    Rxx(f64, u32, u32),
    Ryy(f64, u32, u32),
    Rzz(f64, u32, u32),
    U(f64, f64, f64, u32),
    Swap(u32, u32),
    S(u32),
    Sdg(u32),
    T(u32),
    Tdg(u32),
}

/// Why a [`GateSpec`] could not be turned into a [`GateOp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateParseError {
    /// The kind is not in the tool's vocabulary.
    Unsupported(String),
    /// Wrong number of qubits, or an index that is not a valid `u32`.
    Malformed(String),
}

fn index(kind: &str, what: &str, value: i64) -> Result<u32, GateParseError> {
    u32::try_from(value).map_err(|_| {
        GateParseError::Malformed(format!("{kind}: invalid {what} index {value}"))
    })
}

fn qubits<const N: usize>(kind: &str, spec: &GateSpec) -> Result<[u32; N], GateParseError> {
    if spec.qubits.len() < N {
        return Err(GateParseError::Malformed(format!(
            "{kind} needs {N} qubit index(es), got {}",
            spec.qubits.len()
        )));
    }
    let mut out = [0u32; N];
    for (slot, &q) in out.iter_mut().zip(&spec.qubits) {
        *slot = index(kind, "qubit", q)?;
    }
    Ok(out)
}

impl GateOp {
    /// Parse one spec against a vocabulary. Missing angles default to 0.
    pub fn parse(spec: &GateSpec, set: GateSet) -> Result<Self, GateParseError> {
        let kind = spec.kind.to_ascii_lowercase();
        let angle = |i: usize| spec.params.get(i).copied().unwrap_or(0.0);

        let op = match (set, kind.as_str()) {
            (GateSet::Basic, "h") => GateOp::H(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Basic, "x") => GateOp::X(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Basic, "y") => GateOp::Y(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Basic, "z") => GateOp::Z(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Basic, "cx") => {
                let [c, t] = qubits::<2>(&kind, spec)?;
                GateOp::Cx(c, t)
            }
            (GateSet::Basic, "measure") => {
                let [qubit] = qubits::<1>(&kind, spec)?;
                let clbit = match spec.classical_bit {
                    Some(c) => index(&kind, "classical bit", c)?,
                    None => qubit,
                };
                GateOp::Measure { qubit, clbit }
            }
            (GateSet::Basic, "measure_all") => GateOp::MeasureAll,

            (GateSet::Advanced, "rx") => GateOp::Rx(angle(0), qubits::<1>(&kind, spec)?[0]),
            (GateSet::Advanced, "ry") => GateOp::Ry(angle(0), qubits::<1>(&kind, spec)?[0]),
            (GateSet::Advanced, "rz") => GateOp::Rz(angle(0), qubits::<1>(&kind, spec)?[0]),
            (GateSet::Advanced, "rxx") => {
                let [a, b] = qubits::<2>(&kind, spec)?;
                GateOp::Rxx(angle(0), a, b)
            }
            (GateSet::Advanced, "ryy") => {
                let [a, b] = qubits::<2>(&kind, spec)?;
                GateOp::Ryy(angle(0), a, b)
            }
            (GateSet::Advanced, "rzz") => {
                let [a, b] = qubits::<2>(&kind, spec)?;
                GateOp::Rzz(angle(0), a, b)
            }
            (GateSet::Advanced, "u") => {
                GateOp::U(angle(0), angle(1), angle(2), qubits::<1>(&kind, spec)?[0])
            }
            (GateSet::Advanced, "swap") => {
                let [a, b] = qubits::<2>(&kind, spec)?;
                GateOp::Swap(a, b)
            }
            (GateSet::Advanced, "s") => GateOp::S(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Advanced, "sdg") => GateOp::Sdg(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Advanced, "t") => GateOp::T(qubits::<1>(&kind, spec)?[0]),
            (GateSet::Advanced, "tdg") => GateOp::Tdg(qubits::<1>(&kind, spec)?[0]),

            _ => return Err(GateParseError::Unsupported(kind)),
        };
        Ok(op)
    }

    /// Append this operation to `circuit`.
    pub fn apply(&self, circuit: &mut Circuit) -> IrResult<()> {
        let q = QubitId;
        match *self {
            GateOp::H(a) => circuit.h(q(a))?,
            GateOp::X(a) => circuit.x(q(a))?,
            GateOp::Y(a) => circuit.y(q(a))?,
            GateOp::Z(a) => circuit.z(q(a))?,
            GateOp::Cx(c, t) => circuit.cx(q(c), q(t))?,
            GateOp::Measure { qubit, clbit } => circuit.measure(q(qubit), ClbitId(clbit))?,
            GateOp::MeasureAll => circuit.measure_all()?,
            GateOp::Rx(theta, a) => circuit.rx(theta, q(a))?,
            GateOp::Ry(theta, a) => circuit.ry(theta, q(a))?,
            GateOp::Rz(theta, a) => circuit.rz(theta, q(a))?,
            GateOp::Rxx(theta, a, b) => circuit.rxx(theta, q(a), q(b))?,
            GateOp::Ryy(theta, a, b) => circuit.ryy(theta, q(a), q(b))?,
            GateOp::Rzz(theta, a, b) => circuit.rzz(theta, q(a), q(b))?,
            GateOp::U(theta, phi, lambda, a) => circuit.u(theta, phi, lambda, q(a))?,
            GateOp::Swap(a, b) => circuit.swap(q(a), q(b))?,
            GateOp::S(a) => circuit.s(q(a))?,
            GateOp::Sdg(a) => circuit.sdg(q(a))?,
            GateOp::T(a) => circuit.t(q(a))?,
            GateOp::Tdg(a) => circuit.tdg(q(a))?,
        };
        Ok(())
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateOp::H(q) => write!(f, "H gate on qubit {q}"),
            GateOp::X(q) => write!(f, "X gate on qubit {q}"),
            GateOp::Y(q) => write!(f, "Y gate on qubit {q}"),
            GateOp::Z(q) => write!(f, "Z gate on qubit {q}"),
            GateOp::Cx(c, t) => write!(f, "CNOT gate from qubit {c} to {t}"),
            GateOp::Measure { qubit, .. } => write!(f, "Measure qubit {qubit}"),
            GateOp::MeasureAll => f.write_str("Measure all qubits"),
            GateOp::Rx(a, q) => write!(f, "RX({a}) gate on qubit {q}"),
            GateOp::Ry(a, q) => write!(f, "RY({a}) gate on qubit {q}"),
            GateOp::Rz(a, q) => write!(f, "RZ({a}) gate on qubit {q}"),
            GateOp::Rxx(a, q0, q1) => write!(f, "RXX({a}) gate on qubits {q0}, {q1}"),
            GateOp::Ryy(a, q0, q1) => write!(f, "RYY({a}) gate on qubits {q0}, {q1}"),
            GateOp::Rzz(a, q0, q1) => write!(f, "RZZ({a}) gate on qubits {q0}, {q1}"),
            GateOp::U(t, p, l, q) => write!(f, "U({t}, {p}, {l}) gate on qubit {q}"),
            GateOp::Swap(q0, q1) => write!(f, "SWAP gate on qubits {q0}, {q1}"),
            GateOp::S(q) => write!(f, "S gate on qubit {q}"),
            GateOp::Sdg(q) => write!(f, "S† gate on qubit {q}"),
            GateOp::T(q) => write!(f, "T gate on qubit {q}"),
            GateOp::Tdg(q) => write!(f, "T† gate on qubit {q}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: &str, qubits: &[i64]) -> GateSpec {
        GateSpec {
            kind: kind.into(),
            qubits: qubits.to_vec(),
            ..GateSpec::default()
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(GateOp::parse(&spec("H", &[0]), GateSet::Basic), Ok(GateOp::H(0)));
        assert_eq!(
            GateOp::parse(&spec("CX", &[0, 1]), GateSet::Basic),
            Ok(GateOp::Cx(0, 1))
        );
    }

    #[test]
    fn test_vocabularies_are_disjoint() {
        assert_eq!(
            GateOp::parse(&spec("rx", &[0]), GateSet::Basic),
            Err(GateParseError::Unsupported("rx".into()))
        );
        assert_eq!(
            GateOp::parse(&spec("h", &[0]), GateSet::Advanced),
            Err(GateParseError::Unsupported("h".into()))
        );
    }

    #[test]
    fn test_measure_defaults_to_qubit_index() {
        assert_eq!(
            GateOp::parse(&spec("measure", &[1]), GateSet::Basic),
            Ok(GateOp::Measure { qubit: 1, clbit: 1 })
        );
        let mut s = spec("measure", &[1]);
        s.classical_bit = Some(0);
        assert_eq!(
            GateOp::parse(&s, GateSet::Basic),
            Ok(GateOp::Measure { qubit: 1, clbit: 0 })
        );
    }

    #[test]
    fn test_missing_angles_are_zero() {
        assert_eq!(
            GateOp::parse(&spec("u", &[2]), GateSet::Advanced),
            Ok(GateOp::U(0.0, 0.0, 0.0, 2))
        );
        let mut s = spec("rzz", &[0, 1]);
        s.params = vec![0.25];
        assert_eq!(GateOp::parse(&s, GateSet::Advanced), Ok(GateOp::Rzz(0.25, 0, 1)));
    }

    #[test]
    fn test_malformed_qubits() {
        assert!(matches!(
            GateOp::parse(&spec("cx", &[0]), GateSet::Basic),
            Err(GateParseError::Malformed(_))
        ));
        assert!(matches!(
            GateOp::parse(&spec("x", &[-1]), GateSet::Basic),
            Err(GateParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(GateOp::Cx(0, 1).to_string(), "CNOT gate from qubit 0 to 1");
        assert_eq!(GateOp::Rx(0.5, 0).to_string(), "RX(0.5) gate on qubit 0");
        assert_eq!(GateOp::Sdg(0).to_string(), "S† gate on qubit 0");
        assert_eq!(GateOp::Swap(0, 1).to_string(), "SWAP gate on qubits 0, 1");
    }

    #[test]
    fn test_apply_reports_out_of_range() {
        let mut circuit = Circuit::with_size("c", 1, 1);
        assert!(GateOp::Cx(0, 3).apply(&mut circuit).is_err());
        assert!(GateOp::H(0).apply(&mut circuit).is_ok());
        assert_eq!(circuit.size(), 1);
    }

    #[test]
    fn test_spec_deserializes_aliases() {
        let s: GateSpec = serde_json::from_value(serde_json::json!({
            "type": "measure", "qubits": [0], "classicalBit": 1
        }))
        .unwrap();
        assert_eq!(s.classical_bit, Some(1));
    }
}
