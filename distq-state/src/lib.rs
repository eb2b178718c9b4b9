//! State storage and gate kernels for the distq distributed simulator
//!
//! - [`StateVector`]: dense amplitude storage for one device's view
//! - [`kernels`]: in-place gate application (single-, two-, n-target,
//!   with control conditions)
//! - [`measurement`]: sampling on a reassembled state
//!
//! The distributed engine stores its pieces as raw amplitude buffers and
//! drives [`kernels::apply_gate_op`] on each piece with the piece-local
//! qubit count.

pub mod error;
pub mod kernels;
pub mod measurement;
pub mod state_vector;

pub use error::StateError;
pub use state_vector::{StateVector, MAX_QUBITS};
