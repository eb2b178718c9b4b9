//! Error taxonomy for the distributed engine
//!
//! Three families, all detected eagerly at the boundary closest to the
//! violated invariant:
//! - configuration errors (bad device counts, insufficient qubits,
//!   mismatched dimensions) surface at construction or gate-append time,
//! - sequencing errors (double initialization, reading state too early,
//!   distributing an empty queue) surface at the offending call,
//! - unsupported operations (compilation, density matrices) fail with no
//!   fallback path.

use distq_core::QuantumError;
use distq_state::StateError;
use thiserror::Error;

/// Errors raised by the partition planner and the distributed state manager
#[derive(Debug, Error)]
pub enum SimError {
    // -- configuration --------------------------------------------------
    /// Total logical device count is not a power of two
    #[error("Number of calculation devices should be a power of 2 but is {0}")]
    DeviceCountNotPowerOfTwo(usize),

    /// Fewer than two logical devices requested
    #[error("Distributed execution needs at least 2 calculation devices, got {0}")]
    TooFewDevices(usize),

    /// Circuit too small for the requested device count
    #[error("{nqubits} qubits cannot host {nglobal} global qubits")]
    TooFewQubits { nqubits: usize, nglobal: usize },

    /// A gate leaves fewer untouched qubits than the global width needs
    #[error("Insufficient qubits to use for global in distributed circuit (gate '{gate}')")]
    InsufficientQubits { gate: String },

    /// Initial state buffer does not match the circuit dimension
    #[error("Initial state has {actual} amplitudes, expected {expected}")]
    InitialStateDimension { expected: usize, actual: usize },

    /// Circuit size does not match the simulator it was handed to
    #[error("Circuit has {actual} qubits, but the simulator expects {expected}")]
    CircuitSizeMismatch { expected: usize, actual: usize },

    /// Global qubit assignment of the wrong width or out of range
    #[error("Invalid global qubit assignment {given:?} for {nglobal} global qubits")]
    InvalidGlobalQubits { given: Vec<usize>, nglobal: usize },

    // -- sequencing -----------------------------------------------------
    /// State pieces already exist; re-initialization is not allowed
    #[error("Attempting to initialize a distributed state that is already initialized")]
    AlreadyInitialized,

    /// State pieces accessed before initialization
    #[error("Cannot access the state pieces before they are initialized")]
    StateNotInitialized,

    /// Partitioning requested for an empty gate queue
    #[error("No gates available to set for distributed run")]
    EmptyQueue,

    // -- unsupported operations -----------------------------------------
    /// Compilation of device-local kernels
    #[error("Cannot compile a circuit that uses device-local kernels")]
    CompilationUnsupported,

    /// Density-matrix execution in distributed mode
    #[error("Distributed circuits do not support density matrices")]
    DensityMatrixUnsupported,

    // -- wrapped lower layers -------------------------------------------
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Quantum(#[from] QuantumError),
}

/// Result type for the distributed engine
pub type Result<T> = std::result::Result<T, SimError>;
