//! Standard gate structs and `GateOp` constructors

use crate::matrices;
use distq_core::{Gate, GateOp, MatrixGate};
use num_complex::Complex64;
use std::sync::Arc;

macro_rules! fixed_gate {
    ($(#[$doc:meta])* $name:ident, $label:literal, $targets:literal, $matrix:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Gate for $name {
            fn name(&self) -> &str {
                $label
            }

            fn num_targets(&self) -> usize {
                $targets
            }

            fn matrix(&self) -> Vec<Complex64> {
                $matrix.to_vec()
            }
        }
    };
}

fixed_gate!(
    /// Hadamard gate: H|0⟩ = (|0⟩ + |1⟩)/√2
    Hadamard, "H", 1, matrices::HADAMARD
);
fixed_gate!(
    /// Pauli-X gate (bit flip)
    PauliX, "X", 1, matrices::PAULI_X
);
fixed_gate!(
    /// Pauli-Y gate
    PauliY, "Y", 1, matrices::PAULI_Y
);
fixed_gate!(
    /// Pauli-Z gate (phase flip)
    PauliZ, "Z", 1, matrices::PAULI_Z
);
fixed_gate!(
    /// SWAP gate over two qubits
    Swap, "SWAP", 2, matrices::SWAP
);

macro_rules! rotation_gate {
    ($(#[$doc:meta])* $name:ident, $label:literal, $matrix_fn:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            theta: f64,
        }

        impl $name {
            /// Create the rotation for angle `theta` (radians)
            pub fn new(theta: f64) -> Self {
                Self { theta }
            }

            /// The rotation angle
            pub fn theta(&self) -> f64 {
                self.theta
            }
        }

        impl Gate for $name {
            fn name(&self) -> &str {
                $label
            }

            fn num_targets(&self) -> usize {
                1
            }

            fn matrix(&self) -> Vec<Complex64> {
                $matrix_fn(self.theta).to_vec()
            }
        }
    };
}

rotation_gate!(
    /// Rotation around the X axis by `theta`
    RotationX, "RX", matrices::rotation_x
);
rotation_gate!(
    /// Rotation around the Y axis by `theta`
    RotationY, "RY", matrices::rotation_y
);
rotation_gate!(
    /// Rotation around the Z axis by `theta`
    RotationZ, "RZ", matrices::rotation_z
);

// Constructor functions. Binding standard gates never fails (target counts
// are correct by construction), so these return GateOp directly.

/// Hadamard on qubit `q`
pub fn h(q: usize) -> GateOp {
    GateOp::new(Arc::new(Hadamard), &[q]).unwrap()
}

/// Pauli-X on qubit `q`
pub fn x(q: usize) -> GateOp {
    GateOp::new(Arc::new(PauliX), &[q]).unwrap()
}

/// Pauli-Y on qubit `q`
pub fn y(q: usize) -> GateOp {
    GateOp::new(Arc::new(PauliY), &[q]).unwrap()
}

/// Pauli-Z on qubit `q`
pub fn z(q: usize) -> GateOp {
    GateOp::new(Arc::new(PauliZ), &[q]).unwrap()
}

/// X rotation by `theta` on qubit `q`
pub fn rx(q: usize, theta: f64) -> GateOp {
    GateOp::new(Arc::new(RotationX::new(theta)), &[q]).unwrap()
}

/// Y rotation by `theta` on qubit `q`
pub fn ry(q: usize, theta: f64) -> GateOp {
    GateOp::new(Arc::new(RotationY::new(theta)), &[q]).unwrap()
}

/// Z rotation by `theta` on qubit `q`
pub fn rz(q: usize, theta: f64) -> GateOp {
    GateOp::new(Arc::new(RotationZ::new(theta)), &[q]).unwrap()
}

/// CNOT with control `q0` and target `q1`
pub fn cnot(q0: usize, q1: usize) -> GateOp {
    GateOp::new(Arc::new(PauliX), &[q1])
        .unwrap()
        .controlled_by(&[q0])
        .unwrap()
}

/// Controlled-Z with control `q0` and target `q1`
pub fn cz(q0: usize, q1: usize) -> GateOp {
    GateOp::new(Arc::new(PauliZ), &[q1])
        .unwrap()
        .controlled_by(&[q0])
        .unwrap()
}

/// Controlled Z rotation by `theta`, control `q0` and target `q1`
pub fn crz(q0: usize, q1: usize, theta: f64) -> GateOp {
    GateOp::new(Arc::new(RotationZ::new(theta)), &[q1])
        .unwrap()
        .controlled_by(&[q0])
        .unwrap()
}

/// SWAP of qubits `q0` and `q1`
pub fn swap(q0: usize, q1: usize) -> GateOp {
    GateOp::new(Arc::new(Swap), &[q0, q1]).unwrap()
}

/// Arbitrary unitary over explicit targets
///
/// # Errors
/// Returns an error if the matrix dimension does not match the target
/// count or a qubit repeats.
pub fn unitary(
    name: &str,
    matrix: Vec<Complex64>,
    targets: &[usize],
) -> distq_core::Result<GateOp> {
    let gate = MatrixGate::new(name, targets.len(), matrix)?;
    GateOp::new(Arc::new(gate), targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cnot_binds_control_and_target() {
        let op = cnot(2, 0);
        assert_eq!(op.controls(), &[2]);
        assert_eq!(op.targets(), &[0]);
        assert_eq!(op.qubits().as_slice(), &[2, 0]);
    }

    #[test]
    fn cz_full_matrix_is_diagonal() {
        let m = cz(0, 1).full_matrix();
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    assert_eq!(m[i * 4 + j], Complex64::new(0.0, 0.0));
                }
            }
        }
        assert_eq!(m[15], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn rotation_carries_angle() {
        let op = ry(1, 0.75);
        assert_eq!(op.name(), "RY");
        let m = op.matrix();
        assert!((m[0].re - (0.375f64).cos()).abs() < 1e-12);
    }

    #[test]
    fn unitary_dimension_check() {
        let bad = unitary("U", vec![Complex64::new(1.0, 0.0); 3], &[0]);
        assert!(bad.is_err());
    }
}
