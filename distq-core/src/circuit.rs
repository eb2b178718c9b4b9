//! Ordered gate queues over a fixed qubit count

use crate::{GateOp, QuantumError, Result};

/// A quantum circuit: a fixed qubit count plus an ordered gate queue
///
/// # Example
/// ```
/// use distq_core::Circuit;
///
/// let circuit = Circuit::new(3);
/// assert_eq!(circuit.num_qubits(), 3);
/// assert!(circuit.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Circuit {
    num_qubits: usize,
    queue: Vec<GateOp>,
}

impl Circuit {
    /// Create an empty circuit
    ///
    /// # Panics
    /// Panics if `num_qubits` is 0.
    pub fn new(num_qubits: usize) -> Self {
        assert!(num_qubits > 0, "Circuit must have at least one qubit");
        Self {
            num_qubits,
            queue: Vec::new(),
        }
    }

    /// Create an empty circuit with queue capacity pre-allocated
    pub fn with_capacity(num_qubits: usize, capacity: usize) -> Self {
        assert!(num_qubits > 0, "Circuit must have at least one qubit");
        Self {
            num_qubits,
            queue: Vec::with_capacity(capacity),
        }
    }

    /// Number of qubits
    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of queued operations
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Append an operation to the queue
    ///
    /// # Errors
    /// Returns an error if any qubit index is out of bounds.
    pub fn add(&mut self, op: GateOp) -> Result<()> {
        for &q in op.qubits().iter() {
            if q >= self.num_qubits {
                return Err(QuantumError::InvalidQubit(q, self.num_qubits));
            }
        }
        self.queue.push(op);
        Ok(())
    }

    /// Append a sequence of operations
    ///
    /// # Errors
    /// Returns the first out-of-bounds error; operations before it stay
    /// queued.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = GateOp>) -> Result<()> {
        for op in ops {
            self.add(op)?;
        }
        Ok(())
    }

    /// The gate queue in program order
    #[inline]
    pub fn queue(&self) -> &[GateOp] {
        &self.queue
    }

    /// Iterate over the queued operations
    pub fn operations(&self) -> impl Iterator<Item = &GateOp> {
        self.queue.iter()
    }
}
