//! Circuit-building helpers
//!
//! Plain functions that return ready gate queues. Circuit sizes are bounded
//! and fully enumerated before execution, so these build eagerly.

use crate::standard::{cz, h, ry, x};
use distq_core::GateOp;
use std::sync::Arc;

/// One layer of a hardware-efficient variational circuit
///
/// RY rotations on every qubit, CZ on even neighbor pairs, a second RY
/// layer, CZ on odd neighbor pairs, and a closing CZ between the first and
/// last qubit. `theta` supplies the `2 * nqubits` rotation angles in order.
///
/// # Panics
/// Panics if `theta.len() != 2 * nqubits` or `nqubits < 3`.
pub fn variational_layer(nqubits: usize, theta: &[f64]) -> Vec<GateOp> {
    assert!(nqubits >= 3, "variational layer needs at least 3 qubits");
    assert_eq!(theta.len(), 2 * nqubits, "need 2 angles per qubit");

    let mut queue = Vec::with_capacity(3 * nqubits);
    queue.extend((0..nqubits).map(|i| ry(i, theta[i])));
    queue.extend((0..nqubits - 1).step_by(2).map(|i| cz(i, i + 1)));
    queue.extend((0..nqubits).map(|i| ry(i, theta[nqubits + i])));
    queue.extend((1..nqubits.saturating_sub(2)).step_by(2).map(|i| cz(i, i + 1)));
    queue.push(cz(0, nqubits - 1));
    queue
}

/// Phase oracle flipping the sign of one computational basis state
///
/// Conjugates a fully-controlled Z with X gates on the qubits whose bit in
/// `marked` is 0 (qubit 0 is the most significant bit of the basis index).
///
/// # Panics
/// Panics if `marked >= 2^nqubits` or `nqubits < 2`.
pub fn grover_oracle(nqubits: usize, marked: usize) -> Vec<GateOp> {
    assert!(nqubits >= 2, "oracle needs at least 2 qubits");
    assert!(marked < (1 << nqubits), "marked state out of range");

    let zero_bits: Vec<usize> = (0..nqubits)
        .filter(|q| (marked >> (nqubits - 1 - q)) & 1 == 0)
        .collect();

    let mut queue: Vec<GateOp> = zero_bits.iter().map(|&q| x(q)).collect();
    queue.push(controlled_z_all(nqubits));
    queue.extend(zero_bits.iter().map(|&q| x(q)));
    queue
}

/// The Grover diffusion operator (inversion about the mean)
pub fn grover_diffusion(nqubits: usize) -> Vec<GateOp> {
    assert!(nqubits >= 2, "diffusion needs at least 2 qubits");

    let mut queue: Vec<GateOp> = (0..nqubits).map(h).collect();
    queue.extend((0..nqubits).map(x));
    queue.push(controlled_z_all(nqubits));
    queue.extend((0..nqubits).map(x));
    queue.extend((0..nqubits).map(h));
    queue
}

/// Z on the last qubit controlled by every other qubit
fn controlled_z_all(nqubits: usize) -> GateOp {
    let controls: Vec<usize> = (0..nqubits - 1).collect();
    GateOp::new(Arc::new(crate::PauliZ), &[nqubits - 1])
        .unwrap()
        .controlled_by(&controls)
        .unwrap()
}

/// Marked-state amplification: `iterations` rounds of oracle + diffusion
/// over a uniform superposition
pub fn grover_search(nqubits: usize, marked: usize, iterations: usize) -> Vec<GateOp> {
    let mut queue: Vec<GateOp> = (0..nqubits).map(h).collect();
    for _ in 0..iterations {
        queue.extend(grover_oracle(nqubits, marked));
        queue.extend(grover_diffusion(nqubits));
    }
    queue
}
