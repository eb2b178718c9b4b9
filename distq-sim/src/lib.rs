//! Distributed execution engine for distq
//!
//! Simulates quantum circuits whose state vector is too large or too slow
//! to evolve on one device by splitting it into `2^g` pieces across
//! logical calculation devices:
//!
//! 1. [`DeviceQueues`] walks the (optionally fused) gate queue, picks `g`
//!    "global" qubits per execution group — qubits no gate in the group
//!    targets — and emits one gate sub-queue per logical device.
//! 2. [`DistributedStateManager`] owns the pieces, dispatches each group's
//!    sub-queues in parallel across the physical devices, and performs the
//!    all-to-all index permutation ("swap") whenever the global-qubit
//!    assignment changes between groups.
//! 3. [`DistributedCircuit`] is the user-facing front end; the sequential
//!    [`Simulator`] is the single-device reference it is tested against.
//!
//! # Example
//! ```no_run
//! use distq_gates::{cnot, h};
//! use distq_sim::{DeviceConfig, DistributedCircuit};
//!
//! let config = DeviceConfig::new(&[("dev:0", 2), ("dev:1", 2)], "cpu");
//! let mut circuit = DistributedCircuit::new(10, config).unwrap();
//! circuit.add_gate(h(0)).unwrap();
//! circuit.add_gate(cnot(0, 9)).unwrap();
//! let result = circuit.fuse().unwrap().execute(None, Some(1024)).unwrap();
//! println!("{} swaps", result.statistics().num_swaps);
//! ```

pub mod circuit;
pub mod config;
pub mod device_queues;
pub mod error;
pub mod manager;
pub mod result;
pub mod simulator;
pub mod statistics;
pub mod transpose;

pub use circuit::DistributedCircuit;
pub use config::DeviceConfig;
pub use device_queues::DeviceQueues;
pub use error::SimError;
pub use manager::DistributedStateManager;
pub use result::DistributedResult;
pub use simulator::Simulator;
pub use statistics::ExecutionStatistics;
