//! Driver - main interface for managing one VirtualBox machine.

use crate::config::DriverConfig;
use crate::error::Result;
use crate::runner::{CommandRunner, VBoxManage};
use crate::types::{ForwardingRule, MachineEntry, NetworkAdapter, StartMode, VmState};
use crate::version::{read_version, Version};
use crate::{forwarding, guest, import, lifecycle, network, state};
use std::collections::BTreeSet;
use std::path::Path;

/// Drives VBoxManage on behalf of one machine.
///
/// Nothing is cached except the tool version: every query re-reads the
/// tool's current output.
#[derive(Debug)]
pub struct Driver<R = VBoxManage> {
    /// Machine uuid (or name) passed to VBoxManage
    uuid: String,
    /// Release of VBoxManage, read at construction
    version: Version,
    runner: R,
}

impl Driver<VBoxManage> {
    /// Create a driver for `uuid` using VBoxManage as configured by the environment.
    ///
    /// # Errors
    /// [`VmError::HypervisorNotDetected`](crate::VmError::HypervisorNotDetected)
    /// when VBoxManage cannot be launched.
    pub fn new(uuid: impl Into<String>) -> Result<Self> {
        Self::with_config(uuid, &DriverConfig::from_env())
    }

    /// Create a driver for `uuid` with an explicit configuration.
    pub fn with_config(uuid: impl Into<String>, config: &DriverConfig) -> Result<Self> {
        Self::with_runner(uuid, config.runner())
    }
}

impl<R: CommandRunner> Driver<R> {
    /// Create a driver over any runner. Probes the tool version once.
    pub fn with_runner(uuid: impl Into<String>, runner: R) -> Result<Self> {
        let uuid = uuid.into();
        let version = read_version(&runner)?;
        version.ensure_supported()?;
        tracing::info!(%uuid, %version, "VirtualBox driver ready");
        Ok(Self {
            uuid,
            version,
            runner,
        })
    }

    /// The machine this driver targets.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Release of VBoxManage found at construction.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Current lifecycle state; `None` when the tool reports none.
    pub fn read_state(&self) -> Result<Option<VmState>> {
        state::read_state(&self.runner, &self.uuid)
    }

    /// Forwarding rules on this machine.
    pub fn read_forwarded_ports(&self, active_only: bool) -> Result<Vec<ForwardingRule>> {
        forwarding::list_forwarding_rules(&self.runner, &self.uuid, active_only)
    }

    /// Remove every forwarding rule on this machine.
    pub fn clear_forwarded_ports(&self) -> Result<()> {
        forwarding::clear_forwarding_rules(&self.runner, &self.uuid)
    }

    /// Add forwarding rules without touching existing ones.
    pub fn forward_ports(&self, rules: &[ForwardingRule]) -> Result<()> {
        forwarding::forward_ports(&self.runner, &self.uuid, rules)
    }

    /// Host ports used by forwarding rules on every running machine.
    pub fn read_used_ports(&self) -> Result<BTreeSet<u16>> {
        forwarding::read_used_ports(&self.runner)
    }

    /// Import an appliance as a new machine named `name`, returning its uuid if listed.
    pub fn import(&self, appliance: &Path, name: &str) -> Result<Option<String>> {
        import::import(&self.runner, appliance, name)
    }

    /// Guest additions version reported by the guest.
    pub fn read_guest_additions_version(&self) -> Result<Option<String>> {
        guest::read_guest_additions_version(&self.runner, &self.uuid)
    }

    /// Set the MAC address of adapter 1.
    pub fn set_mac_address(&self, mac: &str) -> Result<()> {
        network::set_mac_address(&self.runner, &self.uuid, mac)
    }

    /// MAC address of adapter 1.
    pub fn read_mac_address(&self) -> Result<Option<String>> {
        network::read_mac_address(&self.runner, &self.uuid)
    }

    /// Adapter slots and their attachments.
    pub fn read_network_adapters(&self) -> Result<Vec<NetworkAdapter>> {
        network::read_network_adapters(&self.runner, &self.uuid)
    }

    /// Boot the machine.
    pub fn start(&self, mode: StartMode) -> Result<()> {
        lifecycle::start(&self.runner, &self.uuid, mode)
    }

    /// Power the machine off.
    pub fn halt(&self) -> Result<()> {
        lifecycle::halt(&self.runner, &self.uuid)
    }

    /// Save state and stop.
    pub fn suspend(&self) -> Result<()> {
        lifecycle::suspend(&self.runner, &self.uuid)
    }

    /// Drop a saved state.
    pub fn discard_saved_state(&self) -> Result<()> {
        lifecycle::discard_saved_state(&self.runner, &self.uuid)
    }

    /// Unregister the machine and delete its files.
    pub fn delete(&self) -> Result<()> {
        lifecycle::delete(&self.runner, &self.uuid)
    }

    /// Every machine registered on the host.
    pub fn read_machines(&self) -> Result<Vec<MachineEntry>> {
        lifecycle::list_machines(&self.runner)
    }

    /// Whether this driver's machine is still registered.
    pub fn exists(&self) -> Result<bool> {
        lifecycle::machine_exists(&self.runner, &self.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmError;
    use crate::mock::MockRunner;

    fn runner() -> MockRunner {
        MockRunner::new().on(&["--version"], "6.1.34r150636\n")
    }

    #[test]
    fn test_construction_reads_version_once() {
        let driver = Driver::with_runner("vm-1", runner()).unwrap();
        assert_eq!(driver.version().as_str(), "6.1.34");
        assert_eq!(driver.uuid(), "vm-1");
        driver.read_state().unwrap();
        driver.read_state().unwrap();
        assert_eq!(driver.runner().calls_to("--version").len(), 1);
    }

    #[test]
    fn test_missing_tool_fails_construction() {
        let err = Driver::with_runner("vm-1", MockRunner::new().tool_missing()).unwrap_err();
        assert!(matches!(err, VmError::HypervisorNotDetected { .. }));
    }

    #[test]
    fn test_old_release_rejected() {
        let runner = MockRunner::new().on(&["--version"], "3.2.28r73450\n");
        let err = Driver::with_runner("vm-1", runner).unwrap_err();
        assert!(matches!(err, VmError::UnsupportedVersion(v) if v == "3.2.28"));
    }

    #[test]
    fn test_missing_executable_is_not_detected() {
        let config = DriverConfig::new("/nonexistent/VBoxManage-for-tests");
        let err = Driver::with_config("vm-1", &config).unwrap_err();
        assert!(matches!(err, VmError::HypervisorNotDetected { .. }));
    }

    #[test]
    fn test_operations_target_own_uuid() {
        let driver = Driver::with_runner("vm-7", runner()).unwrap();
        driver.set_mac_address("080027000001").unwrap();
        driver.delete().unwrap();
        let modify = driver.runner().calls_to("modifyvm");
        assert_eq!(modify[0][1], "vm-7");
        let unregister = driver.runner().calls_to("unregistervm");
        assert_eq!(unregister, vec![vec!["unregistervm", "vm-7", "--delete"]]);
    }

    #[test]
    fn test_driver_over_borrowed_runner() {
        let shared = runner();
        let a = Driver::with_runner("a", &shared).unwrap();
        let b = Driver::with_runner("b", &shared).unwrap();
        a.halt().unwrap();
        b.halt().unwrap();
        assert_eq!(shared.calls_to("controlvm").len(), 2);
    }
}
