//! # vbox-driver
//!
//! VirtualBox management layer.
//! Drives the `VBoxManage` command-line tool and parses its textual output
//! into typed values.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vbox_driver::{Driver, ForwardingRule};
//!
//! # fn example() -> vbox_driver::Result<()> {
//! let driver = Driver::new("0b3e3a2c-6a0f-4f2c-9d52-1a2b3c4d5e6f")?;
//! println!("VirtualBox {}", driver.version());
//!
//! // Replace the machine's forwarded ports, avoiding ports other VMs hold
//! let used = driver.read_used_ports()?;
//! let host_port = (2222..2300).find(|p| !used.contains(p)).unwrap_or(2222);
//! driver.clear_forwarded_ports()?;
//! driver.forward_ports(&[ForwardingRule::new("ssh", host_port, 22)])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **State**: Lifecycle state, including machines VirtualBox cannot read
//! - **Port Forwarding**: List, add and clear NAT rules; fleet-wide used ports
//! - **Import**: Appliance import with uuid lookup
//! - **Lifecycle**: Start, power off, save state, delete
//! - **Testable**: Every call goes through [`CommandRunner`]; [`MockRunner`]
//!   replays canned output

mod config;
mod driver;
mod error;
mod parse;
mod runner;
mod types;
mod version;

pub mod forwarding;
pub mod guest;
pub mod import;
pub mod lifecycle;
pub mod mock;
pub mod network;
pub mod state;

pub use config::{DriverConfig, VBOXMANAGE_EXE};
pub use driver::Driver;
pub use error::{Result, VmError};
pub use mock::MockRunner;
pub use runner::{CommandRunner, VBoxManage};
pub use types::{
    ForwardingRule, MachineEntry, NetworkAdapter, StartMode, VmState, DEFAULT_ADAPTER,
    DEFAULT_PROTOCOL,
};
pub use version::{read_version, Version, MIN_SUPPORTED_MAJOR};
