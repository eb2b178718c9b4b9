//! Sequential single-device simulator
//!
//! Applies a gate queue to one full state vector in program order. Serves
//! as the reference implementation the distributed engine is checked
//! against, and as the execution path when no accelerators are configured.

use crate::error::{Result, SimError};
use distq_core::{Circuit, GateOp};
use distq_state::StateVector;
use num_complex::Complex64;

/// Single-device circuit simulator
#[derive(Clone, Debug)]
pub struct Simulator {
    nqubits: usize,
}

impl Simulator {
    /// Create a simulator for `nqubits`
    pub fn new(nqubits: usize) -> Self {
        Self { nqubits }
    }

    /// Number of qubits
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// Apply `queue` to `initial_state` (default |0...0⟩) and return the
    /// final state
    ///
    /// # Errors
    /// Returns an error for out-of-range qubits or a state of the wrong
    /// dimension.
    pub fn run(
        &self,
        queue: &[GateOp],
        initial_state: Option<&[Complex64]>,
    ) -> Result<Vec<Complex64>> {
        let mut state = match initial_state {
            Some(amplitudes) => StateVector::from_amplitudes(self.nqubits, amplitudes)?,
            None => StateVector::new(self.nqubits)?,
        };
        for op in queue {
            state.apply(op)?;
        }
        Ok(state.into_amplitudes())
    }

    /// Run a [`Circuit`]'s queue
    ///
    /// # Errors
    /// Returns a configuration error if the circuit's qubit count differs
    /// from the simulator's.
    pub fn run_circuit(
        &self,
        circuit: &Circuit,
        initial_state: Option<&[Complex64]>,
    ) -> Result<Vec<Complex64>> {
        if circuit.num_qubits() != self.nqubits {
            return Err(SimError::CircuitSizeMismatch {
                expected: self.nqubits,
                actual: circuit.num_qubits(),
            });
        }
        self.run(circuit.queue(), initial_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distq_gates::{cnot, h};

    #[test]
    fn bell_state() {
        let simulator = Simulator::new(2);
        let state = simulator.run(&[h(0), cnot(0, 1)], None).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((state[0].re - s).abs() < 1e-12);
        assert!((state[3].re - s).abs() < 1e-12);
    }

    #[test]
    fn circuit_size_must_match() {
        let mut circuit = Circuit::new(3);
        circuit.add(h(0)).unwrap();
        let simulator = Simulator::new(2);
        assert!(matches!(
            simulator.run_circuit(&circuit, None),
            Err(SimError::CircuitSizeMismatch {
                expected: 2,
                actual: 3
            })
        ));

        let state = Simulator::new(3).run_circuit(&circuit, None).unwrap();
        assert_eq!(state.len(), 8);
    }

    #[test]
    fn custom_initial_state() {
        let simulator = Simulator::new(1);
        let minus = [
            Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0),
            Complex64::new(-std::f64::consts::FRAC_1_SQRT_2, 0.0),
        ];
        let state = simulator.run(&[h(0)], Some(&minus)).unwrap();
        // H|−⟩ = |1⟩
        assert!(state[0].norm() < 1e-12);
        assert!((state[1].re - 1.0).abs() < 1e-12);
    }
}
