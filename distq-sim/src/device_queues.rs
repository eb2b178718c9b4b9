//! Device and qubit partition planner
//!
//! Walks the (optionally fused) gate queue and cuts it into execution
//! groups. Each group is tied to a set of `nglobal` qubits that none of
//! its gates target; those qubits select which piece an amplitude lives
//! in, so every gate in the group can run device-locally. Between groups
//! the state manager swaps the global assignment.
//!
//! For every group the planner also builds one sub-queue per logical
//! device: a gate lands on a device only if the device's bit pattern over
//! the group's global qubits satisfies all of the gate's global controls,
//! and the copy it receives is remapped to the piece-local qubit
//! numbering.

use crate::config::DeviceConfig;
use crate::error::{Result, SimError};
use distq_core::GateOp;
use std::collections::BTreeSet;

/// Per-device gate sub-queues for a partitioned circuit
#[derive(Debug)]
pub struct DeviceQueues {
    nqubits: usize,
    ndevices: usize,
    nglobal: usize,
    device_to_ids: Vec<(String, Vec<usize>)>,
    global_qubits_lists: Vec<Vec<usize>>,
    queues: Vec<Vec<Vec<GateOp>>>,
}

impl DeviceQueues {
    /// Create an empty planner for `nqubits` and the given device map
    ///
    /// # Errors
    /// Returns a configuration error if the device count is not a power of
    /// two (or below two), or if the circuit cannot host the implied
    /// number of global qubits.
    pub fn new(nqubits: usize, config: &DeviceConfig) -> Result<Self> {
        config.validate()?;
        let ndevices = config.ndevices();
        let nglobal = config.nglobal();
        if nglobal >= nqubits {
            return Err(SimError::TooFewQubits { nqubits, nglobal });
        }
        Ok(Self {
            nqubits,
            ndevices,
            nglobal,
            device_to_ids: config.device_to_ids(),
            global_qubits_lists: Vec::new(),
            queues: vec![Vec::new(); ndevices],
        })
    }

    /// Total number of logical devices
    pub fn ndevices(&self) -> usize {
        self.ndevices
    }

    /// Number of global qubits per group
    pub fn nglobal(&self) -> usize {
        self.nglobal
    }

    /// Number of execution groups (valid after [`DeviceQueues::set_gates`])
    pub fn num_groups(&self) -> usize {
        self.global_qubits_lists.len()
    }

    /// Sorted global-qubit list per group
    pub fn global_qubits_lists(&self) -> &[Vec<usize>] {
        &self.global_qubits_lists
    }

    /// Logical-id assignment per physical device, in configuration order
    pub fn device_to_ids(&self) -> &[(String, Vec<usize>)] {
        &self.device_to_ids
    }

    /// Sub-queue of logical device `device` for execution group `group`
    pub fn queue(&self, device: usize, group: usize) -> &[GateOp] {
        &self.queues[device][group]
    }

    /// Gate applications group `group` will perform across all devices
    pub fn group_gate_count(&self, group: usize) -> usize {
        self.queues.iter().map(|q| q[group].len()).sum()
    }

    /// Partition a gate queue into groups and per-device sub-queues
    ///
    /// The walk keeps a candidate set of "free" qubits (touched by no gate
    /// of the open group). Gates are absorbed while more than `nglobal`
    /// qubits stay free; once exactly `nglobal` remain, further gates join
    /// as long as they leave those qubits alone, and the first gate that
    /// targets one of them starts the next group. A multi-target gate can
    /// push the free set below `nglobal`; the deficit is topped up with
    /// the lowest-index qubits that gate would have claimed, and the gate
    /// itself moves to the next group.
    ///
    /// # Errors
    /// Returns a sequencing error for an empty queue and a configuration
    /// error for a gate that leaves fewer than `nglobal` qubits untouched.
    pub fn set_gates(&mut self, queue: &[GateOp]) -> Result<()> {
        if queue.is_empty() {
            return Err(SimError::EmptyQueue);
        }
        for op in queue {
            if self.nqubits - op.targets().len() < self.nglobal {
                return Err(SimError::InsufficientQubits {
                    gate: op.name().to_string(),
                });
            }
        }

        let (groups, global_lists) = self.build_groups(queue);
        debug_assert_eq!(groups.len(), global_lists.len());

        self.global_qubits_lists = global_lists;
        self.create_device_queues(&groups);
        Ok(())
    }

    fn build_groups(&self, queue: &[GateOp]) -> (Vec<Vec<GateOp>>, Vec<Vec<usize>>) {
        let nglobal = self.nglobal;
        let all: BTreeSet<usize> = (0..self.nqubits).collect();

        let mut groups: Vec<Vec<GateOp>> = vec![Vec::new()];
        let mut global_lists: Vec<Vec<usize>> = Vec::new();
        let mut free = all.clone();

        // removes the gate's targets from `free`, returning the qubits
        // that were actually free beforehand
        let subtract = |free: &mut BTreeSet<usize>, op: &GateOp| -> Vec<usize> {
            op.targets()
                .iter()
                .copied()
                .filter(|t| free.remove(t))
                .collect()
        };

        let mut iter = queue.iter().cloned();
        let mut pending = iter.next();

        while let Some(first) = pending.take() {
            let mut current = first;
            let mut removed = subtract(&mut free, &current);

            // absorb while strictly more than nglobal qubits stay free
            let mut exhausted = false;
            while free.len() > nglobal {
                groups.last_mut().unwrap().push(current.clone());
                match iter.next() {
                    Some(next) => {
                        current = next;
                        removed = subtract(&mut free, &current);
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }
            if exhausted {
                break;
            }

            if free.len() == nglobal {
                groups.last_mut().unwrap().push(current);
                // keep absorbing gates that leave the candidate globals alone
                loop {
                    match iter.next() {
                        Some(next) => {
                            if next.targets().iter().any(|t| free.contains(t)) {
                                pending = Some(next);
                                break;
                            }
                            groups.last_mut().unwrap().push(next);
                        }
                        None => break,
                    }
                }
                global_lists.push(free.iter().copied().collect());
                if pending.is_none() {
                    return (groups, global_lists);
                }
                groups.push(Vec::new());
                free = all.clone();
            } else {
                // the current gate overshot; top the candidate set back up
                // with its lowest-index previously-free targets and push
                // the gate into the next group
                removed.sort_unstable();
                let deficit = nglobal - free.len();
                free.extend(removed.into_iter().take(deficit));
                global_lists.push(free.iter().copied().collect());
                groups.push(Vec::new());
                free = all.clone();
                pending = Some(current);
            }
        }

        if groups.len() > global_lists.len() {
            // queue ran out with the trailing group still open
            let truncated: Vec<usize> = free.iter().copied().take(nglobal).collect();
            global_lists.push(truncated);
        }
        (groups, global_lists)
    }

    fn create_device_queues(&mut self, groups: &[Vec<GateOp>]) {
        self.queues = vec![Vec::with_capacity(groups.len()); self.ndevices];
        for (iq, group) in groups.iter().enumerate() {
            let global = &self.global_qubits_lists[iq];
            for device_queue in &mut self.queues {
                device_queue.push(Vec::new());
            }
            for gate in group {
                let calc_gate = gate.to_local(global);
                for i in 0..self.ndevices {
                    if self.controls_satisfied(gate, global, i) {
                        self.queues[i][iq].push(calc_gate.clone());
                    }
                }
            }
        }
    }

    /// Whether device id `i` satisfies every control the gate places on a
    /// global qubit; rank 0 in the sorted global list is the id's most
    /// significant bit
    fn controls_satisfied(&self, gate: &GateOp, global: &[usize], i: usize) -> bool {
        for c in gate.controls() {
            if let Ok(rank) = global.binary_search(c) {
                let bit = self.nglobal - 1 - rank;
                if (i >> bit) & 1 == 0 {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distq_gates::{cnot, h, ry, swap};

    fn two_devices() -> DeviceConfig {
        DeviceConfig::new(&[("dev:0", 1), ("dev:1", 1)], "mem")
    }

    fn four_devices() -> DeviceConfig {
        DeviceConfig::new(&[("dev:0", 2), ("dev:1", 2)], "mem")
    }

    #[test]
    fn rejects_three_devices() {
        let config = DeviceConfig::new(&[("dev:0", 3)], "mem");
        assert!(matches!(
            DeviceQueues::new(5, &config),
            Err(SimError::DeviceCountNotPowerOfTwo(3))
        ));
    }

    #[test]
    fn four_devices_give_two_globals() {
        let dq = DeviceQueues::new(5, &four_devices()).unwrap();
        assert_eq!(dq.nglobal(), 2);
        assert_eq!(dq.ndevices(), 4);
    }

    #[test]
    fn rejects_empty_queue() {
        let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
        assert!(matches!(dq.set_gates(&[]), Err(SimError::EmptyQueue)));
    }

    #[test]
    fn single_layer_forms_groups_with_free_globals() {
        // 3 qubits, 1 global: H(0) leaves {1, 2} free; H(1) leaves {2},
        // hitting the global width; H(2) targets the candidate and opens
        // a second group
        let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
        dq.set_gates(&[h(0), h(1), h(2)]).unwrap();
        assert_eq!(dq.num_groups(), 2);
        assert_eq!(dq.global_qubits_lists()[0], vec![2]);
        assert_eq!(dq.global_qubits_lists()[1], vec![0]);
        // group 0 carries H(0), H(1) on every device
        assert_eq!(dq.queue(0, 0).len(), 2);
        assert_eq!(dq.queue(1, 0).len(), 2);
        assert_eq!(dq.queue(0, 1).len(), 1);
    }

    #[test]
    fn overshoot_tops_up_with_lowest_index_target() {
        // H(0) shrinks the free set to {1, 2}; SWAP(1, 2) overshoots to
        // {}, so the deficit refills from its targets, lowest index first
        let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
        dq.set_gates(&[h(0), swap(1, 2)]).unwrap();
        assert_eq!(dq.num_groups(), 2);
        assert_eq!(dq.global_qubits_lists()[0], vec![1]);
        assert_eq!(dq.global_qubits_lists()[1], vec![0]);
        // the swap runs in the second group, remapped to local qubits
        // (qubit 0 is global there, so targets 1 and 2 become 0 and 1)
        let local_swap = &dq.queue(0, 1)[0];
        assert_eq!(local_swap.targets(), &[0, 1]);
    }

    #[test]
    fn determinism_of_partition() {
        let queue = vec![h(0), swap(1, 2), ry(0, 0.3), h(1)];
        let mut first: Option<Vec<Vec<usize>>> = None;
        for _ in 0..3 {
            let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
            dq.set_gates(&queue).unwrap();
            let lists = dq.global_qubits_lists().to_vec();
            match &first {
                None => first = Some(lists),
                Some(expected) => assert_eq!(&lists, expected),
            }
        }
    }

    #[test]
    fn global_controls_filter_devices() {
        // 3 qubits, 1 global. CNOT(2, 1) runs while qubit 2 is global:
        // only the device with the global bit set receives the gate
        let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
        dq.set_gates(&[h(0), h(1), cnot(2, 1)]).unwrap();
        assert_eq!(dq.num_groups(), 1);
        assert_eq!(dq.global_qubits_lists()[0], vec![2]);
        // device 0: bit for qubit 2 is 0, control fails
        assert_eq!(dq.queue(0, 0).len(), 2);
        // device 1: control satisfied, receives the remapped X
        assert_eq!(dq.queue(1, 0).len(), 3);
        let local = &dq.queue(1, 0)[2];
        assert_eq!(local.targets(), &[1]);
        assert!(local.controls().is_empty());
    }

    #[test]
    fn local_gates_keep_local_controls() {
        // CNOT(1, 0) with qubit 2 global: control on qubit 1 stays in the
        // device-local copy
        let mut dq = DeviceQueues::new(3, &two_devices()).unwrap();
        dq.set_gates(&[h(0), h(1), cnot(1, 0)]).unwrap();
        let local = &dq.queue(0, 0)[2];
        assert_eq!(local.controls(), &[1]);
        assert_eq!(local.targets(), &[0]);
    }

    #[test]
    fn gate_with_too_many_targets_rejected_eagerly() {
        // SWAP on a 3-qubit circuit with 2 globals leaves only 1 qubit
        let mut dq = DeviceQueues::new(3, &four_devices()).unwrap();
        let result = dq.set_gates(&[swap(0, 1)]);
        assert!(matches!(result, Err(SimError::InsufficientQubits { .. })));
    }
}
