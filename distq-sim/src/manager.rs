//! Distributed state manager
//!
//! Owns the state vector split into `ndevices` pieces and runs the
//! execution groups the partition planner produced. Pieces live behind
//! mutexes: workers lock exactly their own pieces during gate dispatch,
//! and the orchestrating thread is the only code that touches the
//! global-qubit assignment or moves amplitudes between pieces — and it
//! does so only at the barrier between groups.
//!
//! Piece `i` holds the amplitudes whose bits at the current global-qubit
//! positions spell `i`. Only a swap changes that mapping; gate
//! application inside a group never moves data across pieces.

use crate::config::DeviceConfig;
use crate::device_queues::DeviceQueues;
use crate::error::{Result, SimError};
use crate::statistics::ExecutionStatistics;
use crate::transpose::{chunk_state, inverse_order, transpose_order, transpose_pieces};
use distq_state::kernels::apply_gate_op;
use num_complex::Complex64;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::time::Instant;

/// Piece storage and swap engine for one distributed execution
pub struct DistributedStateManager {
    nqubits: usize,
    ndevices: usize,
    nglobal: usize,
    nlocal: usize,
    pieces: Option<Vec<Mutex<Vec<Complex64>>>>,
    global_qubits: Vec<usize>,
    transpose_order: Vec<usize>,
    reverse_order: Vec<usize>,
}

impl DistributedStateManager {
    /// Create an uninitialized manager
    ///
    /// # Errors
    /// Returns a configuration error for a bad device count or a circuit
    /// too small for the implied global width.
    pub fn new(nqubits: usize, config: &DeviceConfig) -> Result<Self> {
        config.validate()?;
        let ndevices = config.ndevices();
        let nglobal = config.nglobal();
        if nglobal >= nqubits {
            return Err(SimError::TooFewQubits { nqubits, nglobal });
        }
        Ok(Self {
            nqubits,
            ndevices,
            nglobal,
            nlocal: nqubits - nglobal,
            pieces: None,
            global_qubits: Vec::new(),
            transpose_order: Vec::new(),
            reverse_order: Vec::new(),
        })
    }

    /// The current sorted global-qubit assignment
    pub fn global_qubits(&self) -> &[usize] {
        &self.global_qubits
    }

    /// Whether the pieces have been created
    pub fn is_initialized(&self) -> bool {
        self.pieces.is_some()
    }

    /// Snapshot of piece `i`'s amplitudes
    ///
    /// # Errors
    /// Returns a sequencing error before initialization.
    pub fn piece(&self, i: usize) -> Result<Vec<Complex64>> {
        let pieces = self.pieces.as_ref().ok_or(SimError::StateNotInitialized)?;
        Ok(pieces[i].lock().clone())
    }

    /// Create the pieces, optionally from a full initial state
    ///
    /// With no initial state the pieces hold |0...0⟩; with no global
    /// assignment the lowest-index qubits start global.
    ///
    /// # Errors
    /// Returns a sequencing error if pieces already exist, or a
    /// configuration error for a bad global assignment or a state of the
    /// wrong dimension.
    pub fn initialize(
        &mut self,
        initial_state: Option<&[Complex64]>,
        global_qubits: Option<&[usize]>,
    ) -> Result<()> {
        if self.pieces.is_some() {
            return Err(SimError::AlreadyInitialized);
        }
        let default: Vec<usize> = (0..self.nglobal).collect();
        self.set_global_qubits(global_qubits.unwrap_or(&default))?;

        let local_dim = 1usize << self.nlocal;
        let pieces = match initial_state {
            None => {
                let mut pieces =
                    vec![vec![Complex64::new(0.0, 0.0); local_dim]; self.ndevices];
                pieces[0][0] = Complex64::new(1.0, 0.0);
                pieces
            }
            Some(state) => {
                let dim = 1usize << self.nqubits;
                if state.len() != dim {
                    return Err(SimError::InitialStateDimension {
                        expected: dim,
                        actual: state.len(),
                    });
                }
                self.split(state)
            }
        };
        self.pieces = Some(pieces.into_iter().map(Mutex::new).collect());
        Ok(())
    }

    /// Change the global-qubit assignment, permuting every piece
    ///
    /// Returns `true` when amplitudes moved; an assignment equal to the
    /// current one is detected and skipped without touching the pieces.
    ///
    /// # Errors
    /// Returns a sequencing error before initialization or a
    /// configuration error for a bad assignment.
    pub fn swap(&mut self, new_global_qubits: &[usize]) -> Result<bool> {
        if self.pieces.is_none() {
            return Err(SimError::StateNotInitialized);
        }
        let mut sorted = new_global_qubits.to_vec();
        sorted.sort_unstable();
        if sorted == self.global_qubits {
            return Ok(false);
        }

        let old_reverse = self.reverse_order.clone();
        self.set_global_qubits(&sorted)?;
        // compose: destination axis k reads the old stored axis holding
        // the qubit that is now at position k
        let order: Vec<usize> = self
            .transpose_order
            .iter()
            .map(|&q| old_reverse[q])
            .collect();

        let pieces = self.pieces.as_mut().unwrap();
        let old: Vec<Vec<Complex64>> = pieces
            .iter_mut()
            .map(|m| std::mem::take(&mut *m.lock()))
            .collect();
        let new = transpose_pieces(&old, self.nqubits, self.nglobal, &order);
        for (slot, buffer) in pieces.iter_mut().zip(new) {
            *slot.lock() = buffer;
        }
        Ok(true)
    }

    /// Run every execution group of a partitioned queue
    ///
    /// Swaps into each group's global assignment when it differs from the
    /// current one, then dispatches the group's sub-queues with one worker
    /// per physical device; logical devices sharing a physical device run
    /// sequentially inside that worker. The dispatch of a group completes
    /// before the next swap starts.
    ///
    /// # Errors
    /// Returns a sequencing error before initialization; a failing worker
    /// aborts the whole run.
    pub fn run(&mut self, device_queues: &DeviceQueues) -> Result<ExecutionStatistics> {
        if self.pieces.is_none() {
            return Err(SimError::StateNotInitialized);
        }
        let start = Instant::now();
        let mut stats = ExecutionStatistics::new();
        stats.num_groups = device_queues.num_groups();

        for (group, global) in device_queues.global_qubits_lists().iter().enumerate() {
            if self.swap(global)? {
                stats.num_swaps += 1;
            }
            self.execute_group(device_queues, group)?;
            stats.gates_applied += device_queues.group_gate_count(group);
        }
        stats.execution_time = start.elapsed();
        Ok(stats)
    }

    /// Dispatch one group's sub-queues across the physical devices
    fn execute_group(&self, device_queues: &DeviceQueues, group: usize) -> Result<()> {
        let pieces = self.pieces.as_ref().ok_or(SimError::StateNotInitialized)?;
        let nlocal = self.nlocal;
        device_queues
            .device_to_ids()
            .par_iter()
            .try_for_each(|(_, ids)| -> Result<()> {
                for &i in ids {
                    let mut piece = pieces[i].lock();
                    for gate in device_queues.queue(i, group) {
                        apply_gate_op(&mut piece, gate, nlocal)?;
                    }
                }
                Ok(())
            })
    }

    /// Reassemble the full state vector
    ///
    /// Swaps back to the canonical assignment (lowest-index qubits global)
    /// if needed, then concatenates the pieces in device order.
    ///
    /// # Errors
    /// Returns a sequencing error before initialization.
    pub fn full_state(&mut self) -> Result<Vec<Complex64>> {
        if self.pieces.is_none() {
            return Err(SimError::StateNotInitialized);
        }
        let canonical: Vec<usize> = (0..self.nglobal).collect();
        self.swap(&canonical)?;

        let pieces = self.pieces.as_ref().unwrap();
        let mut state = Vec::with_capacity(1 << self.nqubits);
        for piece in pieces.iter() {
            state.extend_from_slice(&piece.lock());
        }
        Ok(state)
    }

    /// Split a full state into pieces under the current assignment
    fn split(&self, state: &[Complex64]) -> Vec<Vec<Complex64>> {
        let chunks = chunk_state(state, self.ndevices);
        transpose_pieces(&chunks, self.nqubits, self.nglobal, &self.transpose_order)
    }

    /// Set the assignment and rebuild the permutation tables
    fn set_global_qubits(&mut self, qubits: &[usize]) -> Result<()> {
        let mut sorted = qubits.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.nglobal || sorted.iter().any(|&q| q >= self.nqubits) {
            return Err(SimError::InvalidGlobalQubits {
                given: qubits.to_vec(),
                nglobal: self.nglobal,
            });
        }
        self.transpose_order = transpose_order(self.nqubits, &sorted);
        self.reverse_order = inverse_order(&self.transpose_order);
        self.global_qubits = sorted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distq_gates::h;

    fn two_devices() -> DeviceConfig {
        DeviceConfig::new(&[("dev:0", 1), ("dev:1", 1)], "mem")
    }

    fn ramp_state(nqubits: usize) -> Vec<Complex64> {
        (0..1 << nqubits)
            .map(|i| Complex64::new(i as f64, -(i as f64)))
            .collect()
    }

    #[test]
    fn default_initialization_is_ground_state() {
        let mut manager = DistributedStateManager::new(3, &two_devices()).unwrap();
        manager.initialize(None, None).unwrap();
        assert_eq!(manager.global_qubits(), &[0]);
        let state = manager.full_state().unwrap();
        assert_eq!(state[0], Complex64::new(1.0, 0.0));
        assert!(state[1..].iter().all(|a| *a == Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn reinitialization_rejected() {
        let mut manager = DistributedStateManager::new(3, &two_devices()).unwrap();
        manager.initialize(None, None).unwrap();
        assert!(matches!(
            manager.initialize(None, None),
            Err(SimError::AlreadyInitialized)
        ));
    }

    #[test]
    fn state_read_before_init_rejected() {
        let mut manager = DistributedStateManager::new(3, &two_devices()).unwrap();
        assert!(matches!(
            manager.full_state(),
            Err(SimError::StateNotInitialized)
        ));
    }

    #[test]
    fn split_then_merge_round_trips_exactly() {
        let state = ramp_state(4);
        let mut manager = DistributedStateManager::new(4, &two_devices()).unwrap();
        manager.initialize(Some(&state), None).unwrap();
        assert_eq!(manager.full_state().unwrap(), state);
    }

    #[test]
    fn split_then_merge_round_trips_with_nondefault_globals() {
        let state = ramp_state(4);
        let mut manager = DistributedStateManager::new(4, &two_devices()).unwrap();
        manager.initialize(Some(&state), Some(&[2])).unwrap();
        assert_eq!(manager.full_state().unwrap(), state);
    }

    #[test]
    fn swap_to_same_assignment_is_a_noop() {
        let state = ramp_state(4);
        let mut manager = DistributedStateManager::new(4, &two_devices()).unwrap();
        manager.initialize(Some(&state), None).unwrap();

        assert!(manager.swap(&[3]).unwrap());
        let before = [manager.piece(0).unwrap(), manager.piece(1).unwrap()];
        assert!(!manager.swap(&[3]).unwrap());
        let after = [manager.piece(0).unwrap(), manager.piece(1).unwrap()];
        assert_eq!(before, after);
    }

    #[test]
    fn swap_preserves_the_state() {
        let state = ramp_state(4);
        let mut manager = DistributedStateManager::new(4, &two_devices()).unwrap();
        manager.initialize(Some(&state), None).unwrap();
        manager.swap(&[2]).unwrap();
        manager.swap(&[1]).unwrap();
        assert_eq!(manager.full_state().unwrap(), state);
    }

    #[test]
    fn invalid_global_assignment_rejected() {
        let mut manager = DistributedStateManager::new(3, &two_devices()).unwrap();
        assert!(matches!(
            manager.initialize(None, Some(&[0, 1])),
            Err(SimError::InvalidGlobalQubits { .. })
        ));
    }

    #[test]
    fn run_applies_gates_per_piece() {
        // H(1), H(2) with qubit 0 global: both pieces evolve locally
        let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
        dq.set_gates(&[h(1), h(2)]).unwrap();
        let mut manager = DistributedStateManager::new(3, &two_devices()).unwrap();
        manager
            .initialize(None, Some(&dq.global_qubits_lists()[0]))
            .unwrap();
        let stats = manager.run(&dq).unwrap();
        assert_eq!(stats.num_groups, 1);
        assert_eq!(stats.num_swaps, 0);
        let state = manager.full_state().unwrap();
        // |0⟩ ⊗ |++⟩
        for i in 0..4 {
            assert!((state[i].re - 0.5).abs() < 1e-12);
        }
        for i in 4..8 {
            assert!(state[i].norm() < 1e-12);
        }
    }
}
