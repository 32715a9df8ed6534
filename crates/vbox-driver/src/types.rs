//! Domain types parsed out of VBoxManage output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a machine as reported by `showvminfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmState {
    /// Machine is running
    Running,
    /// Machine is powered off
    PowerOff,
    /// Machine state was saved to disk
    Saved,
    /// Machine crashed or was killed
    Aborted,
    /// Machine is paused
    Paused,
    /// Guest is stuck (guru meditation)
    Stuck,
    /// Machine is booting
    Starting,
    /// Machine is shutting down
    Stopping,
    /// State is being saved
    Saving,
    /// Saved state is being restored
    Restoring,
    /// VirtualBox cannot read the machine's settings
    Inaccessible,
    /// A state this driver does not know about
    Unknown(String),
}

impl VmState {
    /// Map a raw `VMState` value onto a state.
    pub fn from_vbox_state(s: &str) -> Self {
        match s {
            "running" => Self::Running,
            "poweroff" => Self::PowerOff,
            "saved" => Self::Saved,
            "aborted" => Self::Aborted,
            "paused" => Self::Paused,
            "gurumeditation" | "stuck" => Self::Stuck,
            "starting" => Self::Starting,
            "stopping" => Self::Stopping,
            "saving" => Self::Saving,
            "restoring" => Self::Restoring,
            "inaccessible" => Self::Inaccessible,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the machine is running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmState::Running => write!(f, "running"),
            VmState::PowerOff => write!(f, "poweroff"),
            VmState::Saved => write!(f, "saved"),
            VmState::Aborted => write!(f, "aborted"),
            VmState::Paused => write!(f, "paused"),
            VmState::Stuck => write!(f, "stuck"),
            VmState::Starting => write!(f, "starting"),
            VmState::Stopping => write!(f, "stopping"),
            VmState::Saving => write!(f, "saving"),
            VmState::Restoring => write!(f, "restoring"),
            VmState::Inaccessible => write!(f, "inaccessible"),
            VmState::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// Protocol used when a rule is created without one.
pub const DEFAULT_PROTOCOL: &str = "tcp";

/// Adapter used when a rule is created without one.
pub const DEFAULT_ADAPTER: u32 = 1;

/// A NAT port-forwarding rule on one network adapter.
///
/// Rules are unique per machine by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForwardingRule {
    /// Network adapter the rule belongs to (1-based)
    pub adapter: u32,
    /// Rule name
    pub name: String,
    /// Port on the host
    pub host_port: u16,
    /// Port in the guest
    pub guest_port: u16,
    /// `tcp` or `udp`
    pub protocol: String,
}

impl ForwardingRule {
    /// Create a TCP rule on adapter 1.
    pub fn new(name: impl Into<String>, host_port: u16, guest_port: u16) -> Self {
        Self {
            adapter: DEFAULT_ADAPTER,
            name: name.into(),
            host_port,
            guest_port,
            protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }

    /// Put the rule on a different adapter.
    pub fn adapter(mut self, adapter: u32) -> Self {
        self.adapter = adapter;
        self
    }

    /// Use a different protocol.
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// The `--natpf<N>` value VBoxManage expects. Host and guest IPs stay
    /// empty, which means "any".
    pub(crate) fn natpf_directive(&self) -> String {
        format!(
            "{},{},,{},,{}",
            self.name, self.protocol, self.host_port, self.guest_port
        )
    }
}

/// One line of `VBoxManage list vms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineEntry {
    /// Machine name
    pub name: String,
    /// Machine uuid
    pub uuid: String,
}

/// A network adapter slot and what it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAdapter {
    /// Adapter slot (1-based)
    pub index: u32,
    /// Attachment type, e.g. `nat`, `hostonly`, `bridged` or `none`
    pub attachment: String,
}

/// How a machine is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// No window
    #[default]
    Headless,
    /// With a GUI window
    Gui,
}

impl StartMode {
    pub(crate) fn as_arg(&self) -> &'static str {
        match self {
            StartMode::Headless => "headless",
            StartMode::Gui => "gui",
        }
    }
}
