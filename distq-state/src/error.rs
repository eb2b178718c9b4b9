//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur while storing or mutating amplitude vectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Qubit index outside the state
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Requested state too large to materialize
    #[error("State over {num_qubits} qubits exceeds the supported maximum of {max}")]
    TooManyQubits { num_qubits: usize, max: usize },

    /// Amplitude buffer has the wrong length
    #[error("Dimension mismatch: expected {expected} amplitudes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Sampling from a state with no probability mass
    #[error("Cannot sample from a state with zero norm")]
    ZeroNorm,
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
