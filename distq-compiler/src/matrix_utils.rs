//! Small fixed-size matrix helpers for the fusion engine
//!
//! Fusion only ever composes 2×2 and 4×4 unitaries, so everything here
//! works on flat row-major arrays.

use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// 2×2 identity
pub const IDENTITY_2: [Complex64; 4] = [ONE, ZERO, ZERO, ONE];

/// Product of two 2×2 matrices (`a · b`)
pub fn multiply_2x2(a: &[Complex64; 4], b: &[Complex64; 4]) -> [Complex64; 4] {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
    ]
}

/// Product of two 4×4 matrices (`a · b`)
pub fn multiply_4x4(a: &[Complex64; 16], b: &[Complex64; 16]) -> [Complex64; 16] {
    let mut out = [ZERO; 16];
    for i in 0..4 {
        for k in 0..4 {
            let aik = a[i * 4 + k];
            if aik == ZERO {
                continue;
            }
            for j in 0..4 {
                out[i * 4 + j] += aik * b[k * 4 + j];
            }
        }
    }
    out
}

/// Kronecker product `a ⊗ b`; `a` indexes the most significant qubit
pub fn kron_2x2(a: &[Complex64; 4], b: &[Complex64; 4]) -> [Complex64; 16] {
    let mut out = [ZERO; 16];
    for ia in 0..2 {
        for ja in 0..2 {
            for ib in 0..2 {
                for jb in 0..2 {
                    out[(2 * ia + ib) * 4 + (2 * ja + jb)] = a[ia * 2 + ja] * b[ib * 2 + jb];
                }
            }
        }
    }
    out
}

/// Reverse the qubit order of a 4×4 matrix
///
/// Swaps both index bits on rows and columns, turning a matrix over
/// (q0, q1) into the same operator expressed over (q1, q0).
pub fn swap_qubit_order(m: &[Complex64; 16]) -> [Complex64; 16] {
    let flip = |i: usize| ((i & 1) << 1) | (i >> 1);
    let mut out = [ZERO; 16];
    for i in 0..4 {
        for j in 0..4 {
            out[i * 4 + j] = m[flip(i) * 4 + flip(j)];
        }
    }
    out
}
