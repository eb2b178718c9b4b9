//! Core types for the distq distributed quantum circuit simulator
//!
//! This crate provides the building blocks shared by the fusion and
//! distribution layers:
//! - [`Gate`]: trait for unitary operations with a dense matrix
//! - [`GateOp`]: a gate bound to target and control qubits
//! - [`Circuit`]: ordered gate queue over a fixed qubit count
//!
//! # Example
//! ```
//! use distq_core::{Circuit, GateOp, MatrixGate};
//! use num_complex::Complex64;
//! use std::sync::Arc;
//!
//! let x = MatrixGate::new("X", 1, vec![
//!     Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0),
//!     Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0),
//! ]).unwrap();
//! let mut circuit = Circuit::new(2);
//! circuit.add(GateOp::new(Arc::new(x), &[0]).unwrap()).unwrap();
//! assert_eq!(circuit.len(), 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;

pub use circuit::Circuit;
pub use error::QuantumError;
pub use gate::{Gate, GateOp, MatrixGate};
pub use num_complex::Complex64;

/// Result alias for circuit-level operations
pub type Result<T> = std::result::Result<T, QuantumError>;
