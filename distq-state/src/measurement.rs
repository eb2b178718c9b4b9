//! Measurement sampling over reconstructed state vectors
//!
//! Sampling happens once on a fully reassembled state; nothing here touches
//! device pieces.

use crate::error::{Result, StateError};
use ahash::AHashMap;
use num_complex::Complex64;
use rand::Rng;

/// Draw `shots` basis-state indices from the amplitude distribution
///
/// Uses cumulative-probability inversion: one prefix-sum pass over the
/// probabilities, then a binary search per shot.
///
/// # Errors
/// Returns an error if the state has no probability mass.
pub fn sample_indices<R: Rng>(
    amplitudes: &[Complex64],
    shots: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let mut cumulative = Vec::with_capacity(amplitudes.len());
    let mut total = 0.0;
    for amp in amplitudes {
        total += amp.norm_sqr();
        cumulative.push(total);
    }
    if total <= 0.0 {
        return Err(StateError::ZeroNorm);
    }

    let samples = (0..shots)
        .map(|_| {
            let r = rng.gen_range(0.0..total);
            cumulative.partition_point(|&c| c <= r).min(amplitudes.len() - 1)
        })
        .collect();
    Ok(samples)
}

/// Tally samples into a basis-state histogram
pub fn sample_counts<R: Rng>(
    amplitudes: &[Complex64],
    shots: usize,
    rng: &mut R,
) -> Result<AHashMap<usize, usize>> {
    let mut counts = AHashMap::new();
    for index in sample_indices(amplitudes, shots, rng)? {
        *counts.entry(index).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Per-qubit expectation of measuring |1⟩, qubit 0 as the most significant
/// index bit
pub fn qubit_probabilities(amplitudes: &[Complex64], num_qubits: usize) -> Vec<f64> {
    let mut probs = vec![0.0; num_qubits];
    for (index, amp) in amplitudes.iter().enumerate() {
        let p = amp.norm_sqr();
        if p == 0.0 {
            continue;
        }
        for (q, slot) in probs.iter_mut().enumerate() {
            if (index >> (num_qubits - 1 - q)) & 1 == 1 {
                *slot += p;
            }
        }
    }
    probs
}
