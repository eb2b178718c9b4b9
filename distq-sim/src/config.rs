//! Device configuration
//!
//! The explicit execution context of the distributed engine: which physical
//! devices participate, how many logical replicas each hosts, and which
//! device owns the piece storage. Validated once at construction; no
//! process-wide mutable state.

use crate::error::{Result, SimError};

/// Physical device map for a distributed run
///
/// Each entry names a calculation device and the number of logical devices
/// it hosts; entry order decides logical-id assignment. The memory device
/// owns the state pieces between execution groups and is not itself a
/// calculation participant.
///
/// # Example
/// ```
/// use distq_sim::DeviceConfig;
///
/// // two GPUs, each used twice: four logical devices
/// let config = DeviceConfig::new(&[("gpu:0", 2), ("gpu:1", 2)], "cpu:0");
/// assert_eq!(config.ndevices(), 4);
/// assert_eq!(config.nglobal(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct DeviceConfig {
    devices: Vec<(String, usize)>,
    memory_device: String,
}

impl DeviceConfig {
    /// Create a configuration from `(device name, replica count)` pairs
    pub fn new(devices: &[(&str, usize)], memory_device: &str) -> Self {
        Self {
            devices: devices
                .iter()
                .map(|(name, n)| (name.to_string(), *n))
                .collect(),
            memory_device: memory_device.to_string(),
        }
    }

    /// Total number of logical devices
    pub fn ndevices(&self) -> usize {
        self.devices.iter().map(|(_, n)| n).sum()
    }

    /// Number of global qubits implied by the device count
    ///
    /// Meaningful only for validated configurations.
    pub fn nglobal(&self) -> usize {
        self.ndevices().trailing_zeros() as usize
    }

    /// The configured physical devices in order
    pub fn devices(&self) -> &[(String, usize)] {
        &self.devices
    }

    /// Name of the device owning the piece storage
    pub fn memory_device(&self) -> &str {
        &self.memory_device
    }

    /// Check the device count: at least two logical devices, power of two
    ///
    /// # Errors
    /// Returns a configuration error otherwise.
    pub fn validate(&self) -> Result<()> {
        let ndevices = self.ndevices();
        if ndevices < 2 {
            return Err(SimError::TooFewDevices(ndevices));
        }
        if !ndevices.is_power_of_two() {
            return Err(SimError::DeviceCountNotPowerOfTwo(ndevices));
        }
        Ok(())
    }

    /// Logical-id ranges per physical device, dealt contiguously in
    /// configuration order
    pub fn device_to_ids(&self) -> Vec<(String, Vec<usize>)> {
        let mut start = 0;
        self.devices
            .iter()
            .map(|(name, n)| {
                let ids: Vec<usize> = (start..start + n).collect();
                start += n;
                (name.clone(), ids)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_accepted() {
        let config = DeviceConfig::new(&[("a", 2), ("b", 2)], "mem");
        assert!(config.validate().is_ok());
        assert_eq!(config.nglobal(), 2);
    }

    #[test]
    fn non_power_of_two_rejected() {
        let config = DeviceConfig::new(&[("a", 3)], "mem");
        assert!(matches!(
            config.validate(),
            Err(SimError::DeviceCountNotPowerOfTwo(3))
        ));
    }

    #[test]
    fn single_device_rejected() {
        let config = DeviceConfig::new(&[("a", 1)], "mem");
        assert!(matches!(config.validate(), Err(SimError::TooFewDevices(1))));
    }

    #[test]
    fn ids_dealt_in_order() {
        let config = DeviceConfig::new(&[("a", 1), ("b", 3)], "mem");
        let ids = config.device_to_ids();
        assert_eq!(ids[0], ("a".to_string(), vec![0]));
        assert_eq!(ids[1], ("b".to_string(), vec![1, 2, 3]));
    }
}
