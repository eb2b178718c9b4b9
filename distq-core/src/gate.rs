//! Gate trait and bound gate operations

use crate::{QuantumError, Result};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Trait for unitary gate definitions
///
/// A gate describes a dense unitary over its target qubits. Gates are
/// stateless and shared between circuits; binding to concrete qubits
/// happens in [`GateOp`].
pub trait Gate: Send + Sync + fmt::Debug {
    /// The name of the gate (e.g. "H", "CNOT", "RY")
    fn name(&self) -> &str;

    /// Number of target qubits this gate acts on
    fn num_targets(&self) -> usize;

    /// The gate matrix in row-major order
    ///
    /// For a gate with `t` targets the matrix has dimension `2^t × 2^t`
    /// and the returned vector has length `4^t`. The first target qubit
    /// indexes the most significant bit of the matrix index.
    fn matrix(&self) -> Vec<Complex64>;
}

/// A gate with an explicit dense matrix
///
/// Used for user-defined unitaries and for gates produced by composition
/// (products and fusion results).
#[derive(Clone)]
pub struct MatrixGate {
    name: String,
    num_targets: usize,
    matrix: Vec<Complex64>,
}

impl MatrixGate {
    /// Create a dense gate from a row-major matrix
    ///
    /// # Errors
    /// Returns an error if the matrix length is not `4^num_targets`.
    pub fn new(
        name: impl Into<String>,
        num_targets: usize,
        matrix: Vec<Complex64>,
    ) -> Result<Self> {
        let name = name.into();
        let dim = 1usize << num_targets;
        if matrix.len() != dim * dim {
            return Err(QuantumError::InvalidTargetCount {
                gate: name,
                expected: dim * dim,
                actual: matrix.len(),
            });
        }
        Ok(Self {
            name,
            num_targets,
            matrix,
        })
    }
}

impl Gate for MatrixGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_targets(&self) -> usize {
        self.num_targets
    }

    fn matrix(&self) -> Vec<Complex64> {
        self.matrix.clone()
    }
}

impl fmt::Debug for MatrixGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixGate")
            .field("name", &self.name)
            .field("num_targets", &self.num_targets)
            .finish()
    }
}

/// A gate bound to specific target and control qubits
///
/// The binding is immutable: once constructed, the qubit indices never
/// change. Operations that need a differently-indexed variant
/// ([`GateOp::to_local`]) produce a new value instead of mutating.
///
/// # Example
/// ```
/// # use distq_core::{GateOp, MatrixGate};
/// # use num_complex::Complex64;
/// # use std::sync::Arc;
/// # let x = Arc::new(MatrixGate::new("X", 1, vec![
/// #     Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0),
/// #     Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0),
/// # ]).unwrap());
/// // X on qubit 2, controlled by qubit 0 (a CNOT)
/// let op = GateOp::new(x, &[2]).unwrap().controlled_by(&[0]).unwrap();
/// assert_eq!(op.qubits().as_slice(), &[0, 2]);
/// ```
#[derive(Clone)]
pub struct GateOp {
    gate: Arc<dyn Gate>,
    targets: SmallVec<[usize; 2]>,
    controls: SmallVec<[usize; 2]>,
}

impl GateOp {
    /// Bind a gate to its target qubits
    ///
    /// # Errors
    /// Returns an error if the target count does not match the gate or a
    /// qubit appears twice.
    pub fn new(gate: Arc<dyn Gate>, targets: &[usize]) -> Result<Self> {
        if targets.len() != gate.num_targets() {
            return Err(QuantumError::InvalidTargetCount {
                gate: gate.name().to_string(),
                expected: gate.num_targets(),
                actual: targets.len(),
            });
        }
        for i in 0..targets.len() {
            for j in (i + 1)..targets.len() {
                if targets[i] == targets[j] {
                    return Err(QuantumError::DuplicateQubit(targets[i]));
                }
            }
        }
        Ok(Self {
            gate,
            targets: SmallVec::from_slice(targets),
            controls: SmallVec::new(),
        })
    }

    /// Return a controlled variant of this operation
    ///
    /// Controls are kept sorted. The gate applies only to amplitudes where
    /// every control qubit is |1⟩.
    ///
    /// # Errors
    /// Returns an error if a control duplicates another control or overlaps
    /// a target.
    pub fn controlled_by(mut self, controls: &[usize]) -> Result<Self> {
        for &c in controls {
            if self.targets.contains(&c) {
                return Err(QuantumError::ControlOverlap(c));
            }
            if self.controls.contains(&c) {
                return Err(QuantumError::DuplicateQubit(c));
            }
            self.controls.push(c);
        }
        self.controls.sort_unstable();
        Ok(self)
    }

    /// The gate definition
    #[inline]
    pub fn gate(&self) -> &Arc<dyn Gate> {
        &self.gate
    }

    /// The gate name
    #[inline]
    pub fn name(&self) -> &str {
        self.gate.name()
    }

    /// Target qubits in gate order
    #[inline]
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Control qubits in ascending order
    #[inline]
    pub fn controls(&self) -> &[usize] {
        &self.controls
    }

    /// All qubits the operation touches: controls first, then targets
    ///
    /// This is the qubit order of [`GateOp::full_matrix`].
    pub fn qubits(&self) -> SmallVec<[usize; 4]> {
        self.controls
            .iter()
            .chain(self.targets.iter())
            .copied()
            .collect()
    }

    /// Total number of qubits (controls + targets)
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.controls.len() + self.targets.len()
    }

    /// The base matrix over the target qubits
    #[inline]
    pub fn matrix(&self) -> Vec<Complex64> {
        self.gate.matrix()
    }

    /// The matrix over all qubits of [`GateOp::qubits`], controls included
    ///
    /// Controls occupy the most significant matrix-index bits, so the
    /// result is the identity except for the final `2^t` block, which
    /// holds the base matrix.
    pub fn full_matrix(&self) -> Vec<Complex64> {
        let base = self.gate.matrix();
        if self.controls.is_empty() {
            return base;
        }
        let tdim = 1usize << self.targets.len();
        let dim = 1usize << self.num_qubits();
        let offset = dim - tdim;
        let mut full = vec![Complex64::new(0.0, 0.0); dim * dim];
        for k in 0..offset {
            full[k * dim + k] = Complex64::new(1.0, 0.0);
        }
        for i in 0..tdim {
            for j in 0..tdim {
                full[(offset + i) * dim + (offset + j)] = base[i * tdim + j];
            }
        }
        full
    }

    /// Gate product: `self` applied after `rhs`
    ///
    /// Both operations must act on the same qubits in the same order. The
    /// result is a dense [`MatrixGate`] operation whose matrix is
    /// `self.full_matrix() · rhs.full_matrix()`.
    ///
    /// # Errors
    /// Returns an error if the qubit sequences differ.
    pub fn matmul(&self, rhs: &GateOp) -> Result<GateOp> {
        let qubits = self.qubits();
        if qubits != rhs.qubits() {
            return Err(QuantumError::IncompatibleProduct {
                left: self.name().to_string(),
                right: rhs.name().to_string(),
            });
        }
        let dim = 1usize << qubits.len();
        let a = self.full_matrix();
        let b = rhs.full_matrix();
        let mut product = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            for k in 0..dim {
                let aik = a[i * dim + k];
                if aik == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for j in 0..dim {
                    product[i * dim + j] += aik * b[k * dim + j];
                }
            }
        }
        let name = format!("{}·{}", self.name(), rhs.name());
        let gate = MatrixGate::new(name, qubits.len(), product)?;
        GateOp::new(Arc::new(gate), &qubits)
    }

    /// Remap this operation into the local qubit numbering of one piece
    ///
    /// `global` is the sorted list of currently global qubits. Controls
    /// that are global disappear (the partition planner enforces them by
    /// selecting which devices receive the gate); every remaining qubit
    /// index drops by the number of global qubits below it. Targets are
    /// never global while a gate is inside an execution group.
    pub fn to_local(&self, global: &[usize]) -> GateOp {
        let remap = |q: usize| q - global.iter().take_while(|&&g| g < q).count();
        let targets: SmallVec<[usize; 2]> = self.targets.iter().map(|&q| remap(q)).collect();
        debug_assert!(self.targets.iter().all(|t| !global.contains(t)));
        let controls: SmallVec<[usize; 2]> = self
            .controls
            .iter()
            .copied()
            .filter(|c| !global.contains(c))
            .map(remap)
            .collect();
        GateOp {
            gate: Arc::clone(&self.gate),
            targets,
            controls,
        }
    }
}

impl fmt::Debug for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.gate.name())?;
        for (i, q) in self.qubits().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "q{}", q)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
