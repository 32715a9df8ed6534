//! Locating the VBoxManage executable.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use crate::error::{Result, VmError};
use crate::runner::VBoxManage;
use std::path::{Path, PathBuf};

/// Platform file name of the management tool.
pub const VBOXMANAGE_EXE: &str = if cfg!(windows) {
    "VBoxManage.exe"
} else {
    "VBoxManage"
};

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Path to VBoxManage; a bare name is resolved via `PATH`.
    pub vboxmanage_path: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            vboxmanage_path: PathBuf::from(VBOXMANAGE_EXE),
        }
    }
}

impl DriverConfig {
    /// Create a config for an explicit executable path.
    pub fn new(vboxmanage_path: impl Into<PathBuf>) -> Self {
        Self {
            vboxmanage_path: vboxmanage_path.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `VBOXMANAGE_PATH` | explicit executable, wins over everything else |
    /// | `VBOX_INSTALL_PATH` | `;`-separated install directories |
    /// | `VBOX_MSI_INSTALL_PATH` | same, as set by the Windows MSI installer |
    ///
    /// Falls back to `VBoxManage` on `PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("VBOXMANAGE_PATH").filter(|p| !p.is_empty()) {
            return Self::new(path);
        }

        for var in ["VBOX_INSTALL_PATH", "VBOX_MSI_INSTALL_PATH"] {
            let Some(dirs) = lookup(var) else {
                continue;
            };
            let found = dirs
                .split(';')
                .filter(|d| !d.is_empty())
                .map(|d| Path::new(d).join(VBOXMANAGE_EXE))
                .find(|candidate| candidate.exists());
            if let Some(path) = found {
                return Self::new(path);
            }
        }

        Self::default()
    }

    /// Whether the path names a file rather than a command looked up on `PATH`.
    fn is_explicit(&self) -> bool {
        self.vboxmanage_path.components().count() > 1
    }

    /// Validate that an explicitly configured executable exists.
    ///
    /// Bare names are left to `PATH` lookup and only fail when first used.
    pub fn validate(&self) -> Result<()> {
        if self.is_explicit() && !self.vboxmanage_path.exists() {
            return Err(VmError::Config(format!(
                "VBoxManage not found at {}",
                self.vboxmanage_path.display()
            )));
        }
        Ok(())
    }

    /// Validate configuration but only log warnings instead of failing.
    pub fn validate_warn(&self) {
        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "invalid driver configuration");
        }
    }

    /// Runner for the configured executable.
    pub fn runner(&self) -> VBoxManage {
        VBoxManage::new(self.vboxmanage_path.clone())
    }
}
