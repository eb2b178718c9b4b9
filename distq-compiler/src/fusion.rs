//! Gate fusion engine
//!
//! Collapses a flat gate queue into maximal blocks acting on at most two
//! qubits, each finalized into a single dense unitary. Fewer, larger gates
//! mean fewer tensor contractions on the execution devices, which is where
//! per-gate overhead dominates.
//!
//! A [`FusionGroup`] tracks one open block: up to two qubits, the chain of
//! single-qubit gates on each, and the two-qubit gates between them. The
//! single-qubit chains are bucketed around the two-qubit gates so the final
//! matrix interleaves them in program order:
//!
//! ```text
//! fused = K_m · G_m · ... · K_1 · G_1 · K_0
//! ```
//!
//! where `G_k` is the k-th two-qubit gate and `K_k` the Kronecker product
//! of the single-qubit chains sitting after it. Fusion is a plain unitary
//! product — exact, never approximate.

use crate::matrix_utils::{
    kron_2x2, multiply_2x2, multiply_4x4, swap_qubit_order, IDENTITY_2,
};
use distq_core::{Gate, GateOp, QuantumError, Result};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A dense unitary produced by fusing a group of gates
///
/// Keeps the names of the original gates, in application order, for
/// debugging and display.
#[derive(Clone)]
pub struct FusedGate {
    matrix: Vec<Complex64>,
    num_targets: usize,
    component_gates: SmallVec<[String; 4]>,
}

impl FusedGate {
    fn new(matrix: Vec<Complex64>, num_targets: usize, component_gates: SmallVec<[String; 4]>) -> Self {
        Self {
            matrix,
            num_targets,
            component_gates,
        }
    }

    /// Names of the fused gates in application order
    pub fn component_gates(&self) -> &[String] {
        &self.component_gates
    }
}

impl Gate for FusedGate {
    fn name(&self) -> &str {
        "FUSED"
    }

    fn num_targets(&self) -> usize {
        self.num_targets
    }

    fn matrix(&self) -> Vec<Complex64> {
        self.matrix.clone()
    }
}

impl fmt::Debug for FusedGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FusedGate")
            .field("components", &self.component_gates)
            .field("num_targets", &self.num_targets)
            .finish()
    }
}

/// An open fusion block over at most two qubits
///
/// Created empty; gates enter through [`FusionGroup::add`] while they fit;
/// [`FusionGroup::fused_gate`] finalizes the group into one dense gate,
/// after which it rejects further gates.
#[derive(Clone, Debug)]
pub struct FusionGroup {
    qubit0: Option<usize>,
    qubit1: Option<usize>,
    gates0: Vec<Vec<GateOp>>,
    gates1: Vec<Vec<GateOp>>,
    two_qubit_gates: Vec<(GateOp, bool)>,
    completed: bool,
}

impl Default for FusionGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self {
            qubit0: None,
            qubit1: None,
            gates0: vec![Vec::new()],
            gates1: vec![Vec::new()],
            two_qubit_gates: Vec::new(),
            completed: false,
        }
    }

    /// First qubit of the group, in the order gates claimed them
    pub fn qubit0(&self) -> Option<usize> {
        self.qubit0
    }

    /// Second qubit of the group
    pub fn qubit1(&self) -> Option<usize> {
        self.qubit1
    }

    /// Single-qubit chains on `qubit0`, bucketed around the two-qubit gates
    pub fn gates0(&self) -> &[Vec<GateOp>] {
        &self.gates0
    }

    /// Single-qubit chains on `qubit1`
    pub fn gates1(&self) -> &[Vec<GateOp>] {
        &self.gates1
    }

    /// The two-qubit gates with their inverted-order flags
    pub fn two_qubit_gates(&self) -> &[(GateOp, bool)] {
        &self.two_qubit_gates
    }

    /// Qubits the group currently touches
    pub fn qubits(&self) -> SmallVec<[usize; 2]> {
        self.qubit0.iter().chain(self.qubit1.iter()).copied().collect()
    }

    /// Whether the group has been finalized
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether `op` fits this group without growing it past two qubits
    pub fn can_add(&self, op: &GateOp) -> bool {
        if self.completed {
            return false;
        }
        let op_qubits = op.qubits();
        if op_qubits.len() > 2 {
            return false;
        }
        let mut distinct = self.qubits();
        for &q in op_qubits.iter() {
            if !distinct.contains(&q) {
                distinct.push(q);
            }
        }
        distinct.len() <= 2
    }

    /// Append a gate to the group
    ///
    /// # Errors
    /// Returns an error if the group is finalized, the gate touches more
    /// than two qubits, or the gate's qubits do not fit the group's.
    pub fn add(&mut self, op: GateOp) -> Result<()> {
        if self.completed {
            return Err(QuantumError::GroupFinalized);
        }
        let qubits = op.qubits();
        match *qubits.as_slice() {
            [q] => self.add_single(q, op),
            [q0, q1] => self.add_pair(q0, q1, op),
            _ => Err(QuantumError::UnsupportedGateKind {
                name: op.name().to_string(),
                nqubits: qubits.len(),
            }),
        }
    }

    fn add_single(&mut self, q: usize, op: GateOp) -> Result<()> {
        if self.qubit0.is_none() || self.qubit0 == Some(q) {
            self.qubit0 = Some(q);
            self.gates0.last_mut().unwrap().push(op);
            Ok(())
        } else if self.qubit1.is_none() || self.qubit1 == Some(q) {
            self.qubit1 = Some(q);
            self.gates1.last_mut().unwrap().push(op);
            Ok(())
        } else {
            Err(QuantumError::GroupMismatch {
                name: op.name().to_string(),
            })
        }
    }

    fn add_pair(&mut self, q0: usize, q1: usize, op: GateOp) -> Result<()> {
        let inverted = match (self.qubit0, self.qubit1) {
            (None, _) => {
                self.qubit0 = Some(q0);
                self.qubit1 = Some(q1);
                false
            }
            (Some(a), None) if a == q0 => {
                self.qubit1 = Some(q1);
                false
            }
            (Some(a), None) if a == q1 => {
                // the group's first qubit is the gate's second
                self.qubit1 = Some(q0);
                true
            }
            (Some(a), Some(b)) if (a, b) == (q0, q1) => false,
            (Some(a), Some(b)) if (a, b) == (q1, q0) => true,
            _ => {
                return Err(QuantumError::GroupMismatch {
                    name: op.name().to_string(),
                })
            }
        };
        self.two_qubit_gates.push((op, inverted));
        self.gates0.push(Vec::new());
        self.gates1.push(Vec::new());
        Ok(())
    }

    /// Finalize the group into a single dense gate operation
    ///
    /// A group touching one qubit collapses to the 2×2 product of its
    /// chain; otherwise the result is the 4×4 interleaved product over
    /// `(qubit0, qubit1)`. Two-qubit gates recorded with the inverted flag
    /// have their matrix re-expressed in group qubit order first.
    ///
    /// # Errors
    /// Returns an error if the group is empty.
    pub fn fused_gate(&mut self) -> Result<GateOp> {
        let qubit0 = self.qubit0.ok_or(QuantumError::EmptyGroup)?;
        self.completed = true;
        let components = self.component_names();

        if self.qubit1.is_none() {
            let matrix = chain_2x2(&self.gates0[0]);
            let gate = FusedGate::new(matrix.to_vec(), 1, components);
            return GateOp::new(Arc::new(gate), &[qubit0]);
        }
        let qubit1 = self.qubit1.unwrap();

        let mut matrix = kron_2x2(&chain_2x2(&self.gates0[0]), &chain_2x2(&self.gates1[0]));
        for (k, (op, inverted)) in self.two_qubit_gates.iter().enumerate() {
            let full = op.full_matrix();
            let mut gate_matrix = [Complex64::new(0.0, 0.0); 16];
            gate_matrix.copy_from_slice(&full);
            if *inverted {
                gate_matrix = swap_qubit_order(&gate_matrix);
            }
            matrix = multiply_4x4(&gate_matrix, &matrix);
            let chains = kron_2x2(
                &chain_2x2(&self.gates0[k + 1]),
                &chain_2x2(&self.gates1[k + 1]),
            );
            matrix = multiply_4x4(&chains, &matrix);
        }

        let gate = FusedGate::new(matrix.to_vec(), 2, components);
        GateOp::new(Arc::new(gate), &[qubit0, qubit1])
    }

    fn component_names(&self) -> SmallVec<[String; 4]> {
        let mut names = SmallVec::new();
        let push_bucket = |names: &mut SmallVec<[String; 4]>, bucket: &[GateOp]| {
            names.extend(bucket.iter().map(|op| op.name().to_string()));
        };
        push_bucket(&mut names, &self.gates0[0]);
        push_bucket(&mut names, &self.gates1[0]);
        for (k, (op, _)) in self.two_qubit_gates.iter().enumerate() {
            names.push(op.name().to_string());
            push_bucket(&mut names, &self.gates0[k + 1]);
            push_bucket(&mut names, &self.gates1[k + 1]);
        }
        names
    }

    /// Partition a gate queue into maximal fusion groups
    ///
    /// Runs repeated scans: each scan seeds a group from the first
    /// unconsumed gate and absorbs every later gate that fits the group
    /// and commutes (by qubit disjointness) with everything the scan has
    /// already had to defer. Program order is preserved for all gates
    /// that do not commute.
    ///
    /// # Errors
    /// Returns an error if a gate touches more than two qubits.
    pub fn from_queue(queue: &[GateOp]) -> Result<Vec<FusionGroup>> {
        let mut groups = Vec::new();
        let mut remaining: Vec<GateOp> = queue.to_vec();
        while !remaining.is_empty() {
            let mut ops = remaining.into_iter();
            let mut group = FusionGroup::new();
            group.add(ops.next().unwrap())?;
            let mut deferred: Vec<GateOp> = Vec::new();
            for op in ops {
                let blocked = deferred
                    .iter()
                    .any(|d| d.qubits().iter().any(|q| op.qubits().contains(q)));
                if !blocked && group.can_add(&op) {
                    group.add(op)?;
                } else {
                    deferred.push(op);
                }
            }
            group.completed = true;
            groups.push(group);
            remaining = deferred;
        }
        Ok(groups)
    }
}

/// Fuse a queue and return the fused gate sequence
///
/// # Errors
/// Returns an error if a gate touches more than two qubits.
pub fn fuse_queue(queue: &[GateOp]) -> Result<Vec<GateOp>> {
    let mut groups = FusionGroup::from_queue(queue)?;
    groups.iter_mut().map(|g| g.fused_gate()).collect()
}

/// Multiply a single-qubit chain into one 2×2 matrix
///
/// Gates are listed in application order, so the product runs right to
/// left; an empty chain is the identity.
fn chain_2x2(bucket: &[GateOp]) -> [Complex64; 4] {
    let mut out = IDENTITY_2;
    for op in bucket {
        let mut m = [Complex64::new(0.0, 0.0); 4];
        m.copy_from_slice(&op.matrix());
        out = multiply_2x2(&m, &out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use distq_gates::{cnot, cz, h, ry, x, y};

    fn bucket_names(bucket: &[GateOp]) -> Vec<&str> {
        bucket.iter().map(|op| op.name()).collect()
    }

    #[test]
    fn empty_queue_yields_no_groups() {
        let groups = FusionGroup::from_queue(&[]).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn single_gate_fuses_to_itself() {
        let mut groups = FusionGroup::from_queue(&[h(0)]).unwrap();
        assert_eq!(groups.len(), 1);
        let fused = groups[0].fused_gate().unwrap();
        assert_eq!(fused.targets(), &[0]);
        let m = fused.matrix();
        let expected = h(0).matrix();
        for (a, b) in m.iter().zip(&expected) {
            assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_group_structure() {
        // H(0), X(1), CZ(0, 1) collapse into one group
        let queue = vec![h(0), x(1), cz(0, 1)];
        let groups = FusionGroup::from_queue(&queue).unwrap();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.qubit0(), Some(0));
        assert_eq!(group.qubit1(), Some(1));
        assert_eq!(group.gates0().len(), 2);
        assert_eq!(bucket_names(&group.gates0()[0]), vec!["H"]);
        assert!(group.gates0()[1].is_empty());
        assert_eq!(bucket_names(&group.gates1()[0]), vec!["X"]);
        assert!(group.gates1()[1].is_empty());
        assert_eq!(group.two_qubit_gates().len(), 1);
        assert!(!group.two_qubit_gates()[0].1);
    }

    #[test]
    fn two_group_structure_with_commuting_skip() {
        // The trailing H(0) re-enters the first group because everything
        // deferred in between acts on other qubits.
        let queue = vec![x(0), h(1), cnot(1, 2), h(2), y(1), h(0)];
        let groups = FusionGroup::from_queue(&queue).unwrap();
        assert_eq!(groups.len(), 2);

        let first = &groups[0];
        assert_eq!(bucket_names(&first.gates0()[0]), vec!["X", "H"]);
        assert_eq!(bucket_names(&first.gates1()[0]), vec!["H"]);
        assert!(first.two_qubit_gates().is_empty());

        let second = &groups[1];
        assert_eq!(second.qubit0(), Some(1));
        assert_eq!(second.qubit1(), Some(2));
        assert!(second.gates0()[0].is_empty());
        assert_eq!(bucket_names(&second.gates0()[1]), vec!["Y"]);
        assert!(second.gates1()[0].is_empty());
        assert_eq!(bucket_names(&second.gates1()[1]), vec!["H"]);
        assert_eq!(second.two_qubit_gates().len(), 1);
        assert!(!second.two_qubit_gates()[0].1);
    }

    #[test]
    fn variational_layer_groups_odd_qubits() {
        // 5 qubits: two neighbor-pair groups, one wrap-around group with
        // the inverted flag, one bare CZ group
        let nqubits = 5;
        let theta: Vec<f64> = (0..2 * nqubits).map(|i| 0.1 * (i + 1) as f64).collect();
        let queue = distq_gates::circuits::variational_layer(nqubits, &theta);
        let groups = FusionGroup::from_queue(&queue).unwrap();
        assert_eq!(groups.len(), 4);

        for (i, group) in groups[..2].iter().enumerate() {
            assert_eq!(group.qubit0(), Some(2 * i));
            assert_eq!(group.qubit1(), Some(2 * i + 1));
            assert_eq!(bucket_names(&group.gates0()[0]), vec!["RY"]);
            assert_eq!(bucket_names(&group.gates0()[1]), vec!["RY"]);
            assert_eq!(group.two_qubit_gates().len(), 1);
            assert!(!group.two_qubit_gates()[0].1);
        }

        // RY(4), RY(4) and the wrap-around CZ(0, 4): group order is
        // (4, 0), so the gate order counts as inverted
        let wrap = &groups[2];
        assert_eq!(wrap.qubit0(), Some(4));
        assert_eq!(wrap.qubit1(), Some(0));
        assert_eq!(bucket_names(&wrap.gates0()[0]), vec!["RY", "RY"]);
        assert!(wrap.gates0()[1].is_empty());
        assert!(wrap.gates1().iter().all(|b| b.is_empty()));
        assert!(wrap.two_qubit_gates()[0].1);

        let bare = &groups[3];
        assert_eq!(bare.qubits().as_slice(), &[1, 2]);
        assert!(bare.gates0().iter().all(|b| b.is_empty()));
        assert_eq!(bare.two_qubit_gates().len(), 1);
    }

    #[test]
    fn fused_matrix_value() {
        // H(0), H(1), CNOT(0, 1): fused = CNOT · (H ⊗ H)
        let mut group = FusionGroup::new();
        group.add(h(0)).unwrap();
        group.add(h(1)).unwrap();
        group.add(cnot(0, 1)).unwrap();
        let fused = group.fused_gate().unwrap();
        assert_eq!(fused.targets(), &[0, 1]);

        let half = 0.5;
        #[rustfmt::skip]
        let expected = [
            half,  half,  half,  half,
            half, -half,  half, -half,
            half, -half, -half,  half,
            half,  half, -half, -half,
        ];
        let m = fused.matrix();
        for (a, &b) in m.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.re, b, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn three_qubit_gate_rejected() {
        let ccz = GateOp::new(std::sync::Arc::new(distq_gates::PauliZ), &[2])
            .unwrap()
            .controlled_by(&[0, 1])
            .unwrap();
        let result = FusionGroup::from_queue(&[h(0), ccz]);
        assert!(matches!(
            result,
            Err(QuantumError::UnsupportedGateKind { nqubits: 3, .. })
        ));
    }

    #[test]
    fn add_after_finalize_rejected() {
        let mut group = FusionGroup::new();
        group.add(ry(0, 0.4)).unwrap();
        group.fused_gate().unwrap();
        assert!(matches!(
            group.add(ry(0, 0.1)),
            Err(QuantumError::GroupFinalized)
        ));
    }

    #[test]
    fn repeated_two_qubit_gates_extend_one_group() {
        let queue = vec![cz(0, 1), cz(0, 1), h(0)];
        let groups = FusionGroup::from_queue(&queue).unwrap();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.two_qubit_gates().len(), 2);
        assert_eq!(group.gates0().len(), 3);
        assert_eq!(bucket_names(&group.gates0()[2]), vec!["H"]);
    }
}
