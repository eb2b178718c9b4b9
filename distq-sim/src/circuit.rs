//! Distributed circuit front end
//!
//! Glues the subsystems together: gates enter through an eagerly-checked
//! queue, `fuse` collapses the queue through the fusion engine, and
//! `execute` partitions it, drives the state manager over the execution
//! groups and reassembles the final state.

use crate::config::DeviceConfig;
use crate::device_queues::DeviceQueues;
use crate::error::{Result, SimError};
use crate::manager::DistributedStateManager;
use crate::result::DistributedResult;
use distq_compiler::fuse_queue;
use distq_core::{Circuit, GateOp, QuantumError};
use distq_state::measurement::sample_indices;
use num_complex::Complex64;
use std::time::Instant;

/// A circuit executed across multiple logical devices
///
/// # Example
/// ```no_run
/// use distq_sim::{DeviceConfig, DistributedCircuit};
/// use distq_gates::{h, cnot};
///
/// let config = DeviceConfig::new(&[("dev:0", 1), ("dev:1", 1)], "mem");
/// let mut circuit = DistributedCircuit::new(3, config).unwrap();
/// circuit.add_gate(h(0)).unwrap();
/// circuit.add_gate(cnot(0, 1)).unwrap();
/// let result = circuit.execute(None, None).unwrap();
/// assert_eq!(result.state().len(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct DistributedCircuit {
    nqubits: usize,
    nglobal: usize,
    config: DeviceConfig,
    queue: Vec<GateOp>,
}

impl DistributedCircuit {
    /// Create an empty distributed circuit
    ///
    /// # Errors
    /// Returns a configuration error for a bad device count or a circuit
    /// too small for the implied global width.
    pub fn new(nqubits: usize, config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        let nglobal = config.nglobal();
        if nglobal >= nqubits {
            return Err(SimError::TooFewQubits { nqubits, nglobal });
        }
        Ok(Self {
            nqubits,
            nglobal,
            config,
            queue: Vec::new(),
        })
    }

    /// Distribute an existing circuit
    ///
    /// Takes over the circuit's qubit count and queue; every gate goes
    /// through the same eager checks as [`DistributedCircuit::add_gate`].
    ///
    /// # Errors
    /// Returns a configuration error if the device count or a queued gate
    /// is incompatible with distributed execution.
    pub fn from_circuit(circuit: &Circuit, config: DeviceConfig) -> Result<Self> {
        let mut distributed = Self::new(circuit.num_qubits(), config)?;
        distributed.add_gates(circuit.queue().iter().cloned())?;
        Ok(distributed)
    }

    /// Number of qubits
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// The device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The gate queue in program order
    pub fn queue(&self) -> &[GateOp] {
        &self.queue
    }

    /// Append a gate to the circuit
    ///
    /// Checked eagerly: every gate must leave at least `nglobal` qubits
    /// untouched so the partition planner always has a valid global set.
    ///
    /// # Errors
    /// Returns a configuration error for out-of-range qubits or a gate
    /// with too large a target footprint.
    pub fn add_gate(&mut self, op: GateOp) -> Result<()> {
        for &q in op.qubits().iter() {
            if q >= self.nqubits {
                return Err(QuantumError::InvalidQubit(q, self.nqubits).into());
            }
        }
        if self.nqubits - op.targets().len() < self.nglobal {
            return Err(SimError::InsufficientQubits {
                gate: op.name().to_string(),
            });
        }
        self.queue.push(op);
        Ok(())
    }

    /// Append a sequence of gates
    ///
    /// # Errors
    /// Returns the first append error; earlier gates stay queued.
    pub fn add_gates(&mut self, ops: impl IntoIterator<Item = GateOp>) -> Result<()> {
        for op in ops {
            self.add_gate(op)?;
        }
        Ok(())
    }

    /// Return a copy of this circuit with the queue fused
    ///
    /// # Errors
    /// Returns an error if a queued gate cannot enter a fusion group.
    pub fn fuse(&self) -> Result<Self> {
        let fused = fuse_queue(&self.queue)?;
        let mut circuit = Self::new(self.nqubits, self.config.clone())?;
        circuit.add_gates(fused)?;
        Ok(circuit)
    }

    /// Compilation is not available for distributed circuits
    ///
    /// The device sub-queues run hand-written kernels; there is nothing a
    /// graph compiler could take over, and pretending otherwise would hide
    /// the capability gap.
    pub fn compile(&self) -> Result<()> {
        Err(SimError::CompilationUnsupported)
    }

    /// Density-matrix (noisy) execution is not available in distributed
    /// mode
    pub fn with_noise(&self) -> Result<Self> {
        Err(SimError::DensityMatrixUnsupported)
    }

    /// Execute the circuit and reassemble the final state
    ///
    /// Partitions the queue, initializes the pieces (from `initial_state`
    /// or |0...0⟩) aligned to the first group's global qubits, runs every
    /// group and merges. With `shots`, basis-state samples are drawn from
    /// the final state.
    ///
    /// # Errors
    /// Returns a sequencing error for an empty queue and propagates any
    /// partitioning or execution failure.
    pub fn execute(
        &self,
        initial_state: Option<&[Complex64]>,
        shots: Option<usize>,
    ) -> Result<DistributedResult> {
        let total = Instant::now();

        let partition_start = Instant::now();
        let mut device_queues = DeviceQueues::new(self.nqubits, &self.config)?;
        device_queues.set_gates(&self.queue)?;
        let partition_time = partition_start.elapsed();

        let mut manager = DistributedStateManager::new(self.nqubits, &self.config)?;
        manager.initialize(
            initial_state,
            Some(&device_queues.global_qubits_lists()[0]),
        )?;
        let mut statistics = manager.run(&device_queues)?;
        let state = manager.full_state()?;

        let samples = match shots {
            Some(n) => Some(sample_indices(&state, n, &mut rand::thread_rng())?),
            None => None,
        };

        statistics.partition_time = partition_time;
        statistics.total_time = total.elapsed();
        Ok(DistributedResult::new(state, samples, statistics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distq_gates::{h, swap};

    fn two_devices() -> DeviceConfig {
        DeviceConfig::new(&[("dev:0", 1), ("dev:1", 1)], "mem")
    }

    #[test]
    fn add_gate_eager_qubit_check() {
        // 8 devices need 3 globals; a 2-target gate on 4 qubits leaves 2
        let config = DeviceConfig::new(&[("dev:0", 4), ("dev:1", 4)], "mem");
        let mut circuit = DistributedCircuit::new(4, config).unwrap();
        assert!(circuit.add_gate(h(0)).is_ok());
        assert!(matches!(
            circuit.add_gate(swap(0, 1)),
            Err(SimError::InsufficientQubits { .. })
        ));
    }

    #[test]
    fn too_small_circuit_rejected_at_construction() {
        let config = DeviceConfig::new(&[("dev:0", 4), ("dev:1", 4)], "mem");
        assert!(matches!(
            DistributedCircuit::new(3, config),
            Err(SimError::TooFewQubits {
                nqubits: 3,
                nglobal: 3
            })
        ));
    }

    #[test]
    fn compile_unsupported() {
        let circuit = DistributedCircuit::new(3, two_devices()).unwrap();
        assert!(matches!(
            circuit.compile(),
            Err(SimError::CompilationUnsupported)
        ));
    }

    #[test]
    fn noise_unsupported() {
        let circuit = DistributedCircuit::new(3, two_devices()).unwrap();
        assert!(matches!(
            circuit.with_noise(),
            Err(SimError::DensityMatrixUnsupported)
        ));
    }

    #[test]
    fn empty_queue_execution_rejected() {
        let circuit = DistributedCircuit::new(3, two_devices()).unwrap();
        assert!(matches!(
            circuit.execute(None, None),
            Err(SimError::EmptyQueue)
        ));
    }

    #[test]
    fn out_of_range_qubit_rejected() {
        let mut circuit = DistributedCircuit::new(3, two_devices()).unwrap();
        assert!(circuit.add_gate(h(3)).is_err());
    }
}
