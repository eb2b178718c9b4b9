//! Fusion must be mathematically exact: applying the fused queue has to
//! reproduce the original queue's state evolution.

use approx::assert_abs_diff_eq;
use distq_compiler::fuse_queue;
use distq_core::GateOp;
use distq_gates::circuits::variational_layer;
use distq_gates::{cnot, crz, cz, h, rx, ry, x, z};
use distq_state::StateVector;

fn run(nqubits: usize, queue: &[GateOp]) -> Vec<num_complex::Complex64> {
    let mut state = StateVector::new(nqubits).unwrap();
    for op in queue {
        state.apply(op).unwrap();
    }
    state.into_amplitudes()
}

fn assert_states_close(a: &[num_complex::Complex64], b: &[num_complex::Complex64]) {
    assert_eq!(a.len(), b.len());
    for (lhs, rhs) in a.iter().zip(b) {
        assert_abs_diff_eq!((lhs - rhs).norm(), 0.0, epsilon = 1e-10);
    }
}

#[test]
fn fused_variational_layer_matches_original() {
    for nqubits in [4, 5, 6] {
        let theta: Vec<f64> = (0..2 * nqubits)
            .map(|i| 0.37 * (i as f64 + 1.0))
            .collect();
        let queue = variational_layer(nqubits, &theta);
        let fused = fuse_queue(&queue).unwrap();
        assert!(fused.len() < queue.len());
        assert_states_close(&run(nqubits, &queue), &run(nqubits, &fused));
    }
}

#[test]
fn fused_mixed_queue_matches_original() {
    let queue = vec![
        h(0),
        x(1),
        cz(0, 1),
        ry(2, 0.3),
        cnot(2, 3),
        rx(3, 1.1),
        z(0),
        cnot(1, 0),
        h(3),
        cz(2, 3),
        crz(3, 2, 0.45),
        ry(0, 0.9),
    ];
    let fused = fuse_queue(&queue).unwrap();
    assert_states_close(&run(4, &queue), &run(4, &fused));
}

#[test]
fn fusion_reduces_gate_count() {
    let theta = vec![0.25; 12];
    let queue = variational_layer(6, &theta);
    let fused = fuse_queue(&queue).unwrap();
    // every fused gate covers a full group
    assert_eq!(fused.len(), 6);
}