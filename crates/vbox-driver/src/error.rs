//! Error types for vbox-driver.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vbox-driver operations.
pub type Result<T> = std::result::Result<T, VmError>;

/// Errors that can occur while driving VBoxManage.
///
/// Output that simply lacks a field (no state line, no guest additions,
/// an import that is not yet listed) is never an error; those reads return
/// `None` instead.
#[derive(Debug, Error)]
pub enum VmError {
    /// The management tool is not installed or not on the search path.
    #[error("VirtualBox was not detected: {} could not be launched", path.display())]
    HypervisorNotDetected {
        /// Executable that was tried
        path: PathBuf,
    },

    /// The executable could not be spawned at all
    #[error("failed to launch {}: {source}", program.display())]
    ToolNotFound {
        /// Executable that was tried
        program: PathBuf,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The executable ran but exited non-zero
    #[error("`{command}` failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        /// Full command line, for diagnostics
        command: String,
        /// Exit status (-1 when terminated by a signal)
        exit_code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The installed release is too old for this driver
    #[error("unsupported VirtualBox version: {0}")]
    UnsupportedVersion(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl VmError {
    /// Exit code of a failed command, if this error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            VmError::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}
