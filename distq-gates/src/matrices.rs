//! Constant and parametric gate matrices
//!
//! Fixed gates are compile-time constants; rotations are built on demand
//! from their angle.

use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Hadamard matrix
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: [Complex64; 4] = [
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(-INV_SQRT2, 0.0),
];

/// Pauli-X matrix (NOT)
pub const PAULI_X: [Complex64; 4] = [ZERO, ONE, ONE, ZERO];

/// Pauli-Y matrix
pub const PAULI_Y: [Complex64; 4] = [ZERO, NEG_I, I, ZERO];

/// Pauli-Z matrix
pub const PAULI_Z: [Complex64; 4] = [ONE, ZERO, ZERO, NEG_ONE];

/// 2×2 identity
pub const IDENTITY: [Complex64; 4] = [ONE, ZERO, ZERO, ONE];

/// SWAP matrix over two qubits
#[rustfmt::skip]
pub const SWAP: [Complex64; 16] = [
    ONE,  ZERO, ZERO, ZERO,
    ZERO, ZERO, ONE,  ZERO,
    ZERO, ONE,  ZERO, ZERO,
    ZERO, ZERO, ZERO, ONE,
];

/// X-rotation matrix for angle `theta`
pub fn rotation_x(theta: f64) -> [Complex64; 4] {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        Complex64::new(cos, 0.0),
        Complex64::new(0.0, -sin),
        Complex64::new(0.0, -sin),
        Complex64::new(cos, 0.0),
    ]
}

/// Y-rotation matrix for angle `theta`
pub fn rotation_y(theta: f64) -> [Complex64; 4] {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        Complex64::new(cos, 0.0),
        Complex64::new(-sin, 0.0),
        Complex64::new(sin, 0.0),
        Complex64::new(cos, 0.0),
    ]
}

/// Z-rotation matrix for angle `theta`
pub fn rotation_z(theta: f64) -> [Complex64; 4] {
    let phase = Complex64::from_polar(1.0, theta / 2.0);
    [phase.conj(), ZERO, ZERO, phase]
}
