//! Results of a distributed execution

use crate::statistics::ExecutionStatistics;
use num_complex::Complex64;

/// Final state of a distributed run, with optional samples and statistics
#[derive(Clone, Debug)]
pub struct DistributedResult {
    state: Vec<Complex64>,
    samples: Option<Vec<usize>>,
    statistics: ExecutionStatistics,
}

impl DistributedResult {
    pub(crate) fn new(
        state: Vec<Complex64>,
        samples: Option<Vec<usize>>,
        statistics: ExecutionStatistics,
    ) -> Self {
        Self {
            state,
            samples,
            statistics,
        }
    }

    /// The reassembled flat state vector (`2^nqubits` amplitudes)
    pub fn state(&self) -> &[Complex64] {
        &self.state
    }

    /// Consume the result and return the state vector
    pub fn into_state(self) -> Vec<Complex64> {
        self.state
    }

    /// Sampled basis-state indices, present when shots were requested
    pub fn samples(&self) -> Option<&[usize]> {
        self.samples.as_deref()
    }

    /// Execution statistics for this run
    pub fn statistics(&self) -> &ExecutionStatistics {
        &self.statistics
    }
}
