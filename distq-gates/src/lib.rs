//! Standard gate catalogue and circuit-building helpers for distq
//!
//! Gate structs implement [`distq_core::Gate`]; the constructor functions
//! (`h`, `cnot`, ...) bind them to qubits and return ready
//! [`distq_core::GateOp`] values:
//!
//! ```
//! use distq_gates::{h, cnot};
//!
//! let bell = vec![h(0), cnot(0, 1)];
//! assert_eq!(bell[1].controls(), &[0]);
//! ```

pub mod circuits;
pub mod matrices;
pub mod standard;

pub use standard::{
    cnot, crz, cz, h, rx, ry, rz, swap, unitary, x, y, z, Hadamard, PauliX, PauliY, PauliZ,
    RotationX, RotationY, RotationZ, Swap,
};
