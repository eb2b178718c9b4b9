//! Piece permutation engine
//!
//! A distributed state is stored as `ndevices` pieces whose concatenation
//! is the full state *transposed* so that the current global qubits occupy
//! the most significant index bits. Changing the global-qubit assignment
//! is a full index permutation across every piece; this module implements
//! that permutation plus the order bookkeeping around it.

use num_complex::Complex64;

/// Stored-axis order placing `global` (sorted) first, then the remaining
/// qubits ascending
pub fn transpose_order(nqubits: usize, global: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = global.to_vec();
    order.extend((0..nqubits).filter(|q| !global.contains(q)));
    order
}

/// Inverse permutation: `inverse[order[k]] == k`
pub fn inverse_order(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (k, &v) in order.iter().enumerate() {
        inverse[v] = k;
    }
    inverse
}

/// Rebuild all pieces under a new stored-axis order
///
/// `order[k]` names the *source* axis that destination axis `k` reads
/// from, with axis `k` occupying bit `nqubits - 1 - k` of the combined
/// `(piece, offset)` index. Axes `0..nglobal` of the combined index select
/// the piece. Every amplitude moves in one pass; nothing is computed, only
/// permuted.
pub fn transpose_pieces(
    pieces: &[Vec<Complex64>],
    nqubits: usize,
    nglobal: usize,
    order: &[usize],
) -> Vec<Vec<Complex64>> {
    debug_assert_eq!(order.len(), nqubits);
    let nlocal = nqubits - nglobal;
    let local_dim = 1usize << nlocal;
    let local_mask = local_dim - 1;

    // destination bit k reads source bit order[k]; precompute the source
    // masks per destination axis
    let source_masks: Vec<usize> = order.iter().map(|&a| 1 << (nqubits - 1 - a)).collect();

    let mut out = vec![vec![Complex64::new(0.0, 0.0); local_dim]; pieces.len()];
    for (d, piece) in out.iter_mut().enumerate() {
        let high = d << nlocal;
        for (j, amp) in piece.iter_mut().enumerate() {
            let dest = high | j;
            let mut src = 0usize;
            for (k, &mask) in source_masks.iter().enumerate() {
                if dest >> (nqubits - 1 - k) & 1 == 1 {
                    src |= mask;
                }
            }
            *amp = pieces[src >> nlocal][src & local_mask];
        }
    }
    out
}

/// Cut a flat state into `ndevices` contiguous chunks
pub fn chunk_state(state: &[Complex64], ndevices: usize) -> Vec<Vec<Complex64>> {
    let piece_len = state.len() / ndevices;
    state.chunks(piece_len).map(|c| c.to_vec()).collect()
}
