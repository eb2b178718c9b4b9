//! Gate application kernels
//!
//! All kernels share one index convention: qubit 0 is the most significant
//! bit of the amplitude index, so qubit `q` in an `n`-qubit buffer occupies
//! bit `n - 1 - q`. The same kernels run on full state vectors and on
//! device-local pieces (where `n` is the piece's local qubit count).
//!
//! Control qubits are bit conditions: the gate matrix touches only the
//! amplitudes whose control bits are all 1.

use crate::error::{Result, StateError};
use distq_core::GateOp;
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

#[inline]
fn qubit_mask(nqubits: usize, q: usize) -> usize {
    1 << (nqubits - 1 - q)
}

fn control_mask(nqubits: usize, controls: &[usize]) -> usize {
    controls
        .iter()
        .fold(0, |mask, &c| mask | qubit_mask(nqubits, c))
}

/// Apply a bound gate operation to an amplitude buffer in place
///
/// # Errors
/// Returns an error if any qubit index does not fit the buffer.
pub fn apply_gate_op(amps: &mut [Complex64], op: &GateOp, nqubits: usize) -> Result<()> {
    debug_assert_eq!(amps.len(), 1 << nqubits);
    for &q in op.qubits().iter() {
        if q >= nqubits {
            return Err(StateError::InvalidQubitIndex {
                index: q,
                num_qubits: nqubits,
            });
        }
    }

    let matrix = op.matrix();
    let cmask = control_mask(nqubits, op.controls());
    match op.targets() {
        [t] => apply_single_target(amps, &matrix, *t, cmask, nqubits),
        [t0, t1] => apply_two_target(amps, &matrix, *t0, *t1, cmask, nqubits),
        targets => apply_multi_target(amps, &matrix, targets, cmask, nqubits),
    }
    Ok(())
}

/// 2×2 matrix on one target qubit, under an optional control mask
fn apply_single_target(
    amps: &mut [Complex64],
    m: &[Complex64],
    target: usize,
    cmask: usize,
    nqubits: usize,
) {
    let tmask = qubit_mask(nqubits, target);
    for i in 0..amps.len() {
        if i & tmask != 0 || i & cmask != cmask {
            continue;
        }
        let j = i | tmask;
        let a0 = amps[i];
        let a1 = amps[j];
        amps[i] = m[0] * a0 + m[1] * a1;
        amps[j] = m[2] * a0 + m[3] * a1;
    }
}

/// 4×4 matrix on two target qubits; the first target indexes the most
/// significant matrix bit
fn apply_two_target(
    amps: &mut [Complex64],
    m: &[Complex64],
    t0: usize,
    t1: usize,
    cmask: usize,
    nqubits: usize,
) {
    let m0 = qubit_mask(nqubits, t0);
    let m1 = qubit_mask(nqubits, t1);
    let both = m0 | m1;
    for i in 0..amps.len() {
        if i & both != 0 || i & cmask != cmask {
            continue;
        }
        let idx = [i, i | m1, i | m0, i | both];
        let a = [amps[idx[0]], amps[idx[1]], amps[idx[2]], amps[idx[3]]];
        for (r, &out) in idx.iter().enumerate() {
            amps[out] = m[r * 4] * a[0] + m[r * 4 + 1] * a[1] + m[r * 4 + 2] * a[2]
                + m[r * 4 + 3] * a[3];
        }
    }
}

/// General kernel for three or more target qubits
fn apply_multi_target(
    amps: &mut [Complex64],
    m: &[Complex64],
    targets: &[usize],
    cmask: usize,
    nqubits: usize,
) {
    let t = targets.len();
    let sub = 1 << t;
    debug_assert_eq!(m.len(), sub * sub);

    // offsets[s]: bit pattern of matrix index s spread over the target bits
    let mut offsets = vec![0usize; sub];
    for (s, offset) in offsets.iter_mut().enumerate() {
        for (j, &q) in targets.iter().enumerate() {
            if (s >> (t - 1 - j)) & 1 == 1 {
                *offset |= qubit_mask(nqubits, q);
            }
        }
    }
    let tmask_all = offsets[sub - 1];

    let mut buf = vec![ZERO; sub];
    for i in 0..amps.len() {
        if i & tmask_all != 0 || i & cmask != cmask {
            continue;
        }
        for (s, slot) in buf.iter_mut().enumerate() {
            *slot = amps[i | offsets[s]];
        }
        for r in 0..sub {
            let mut acc = ZERO;
            for (s, &b) in buf.iter().enumerate() {
                acc += m[r * sub + s] * b;
            }
            amps[i | offsets[r]] = acc;
        }
    }
}
