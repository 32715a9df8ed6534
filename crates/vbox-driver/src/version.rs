//! Version query for the installed VBoxManage.

use crate::error::{Result, VmError};
use crate::runner::CommandRunner;
use std::fmt;
use tracing::debug;

/// Oldest major release whose machine-readable output this driver understands.
pub const MIN_SUPPORTED_MAJOR: u32 = 4;

/// Release of the installed management tool, e.g. `6.1.34`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    /// Take the release out of `--version` output such as `6.1.34r150636`.
    ///
    /// Only the last non-empty line counts; warnings printed before it
    /// (e.g. a missing kernel module) are ignored.
    pub fn parse(output: &str) -> Self {
        let token = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .unwrap_or("");
        let release = token.split('r').next().unwrap_or(token);
        Self(release.trim().to_string())
    }

    /// The release string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Major component, when numeric.
    pub fn major(&self) -> Option<u32> {
        self.component(0)
    }

    /// Minor component, when numeric.
    pub fn minor(&self) -> Option<u32> {
        self.component(1)
    }

    fn component(&self, idx: usize) -> Option<u32> {
        self.0.split('.').nth(idx)?.parse().ok()
    }

    /// Reject releases known to predate the supported output format.
    ///
    /// # Errors
    /// [`VmError::UnsupportedVersion`] for a numeric major below
    /// [`MIN_SUPPORTED_MAJOR`].
    pub fn ensure_supported(&self) -> Result<()> {
        match self.major() {
            Some(major) if major < MIN_SUPPORTED_MAJOR => {
                Err(VmError::UnsupportedVersion(self.0.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ask the tool for its release.
///
/// # Errors
/// A tool that cannot be launched is reported as
/// [`VmError::HypervisorNotDetected`]; other failures pass through.
pub fn read_version<R: CommandRunner + ?Sized>(runner: &R) -> Result<Version> {
    let output = runner.execute("--version", &[]).map_err(|e| match e {
        VmError::ToolNotFound { program, .. } => VmError::HypervisorNotDetected { path: program },
        other => other,
    })?;
    let version = Version::parse(&output);
    debug!(version = %version, "detected VBoxManage");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    #[test]
    fn test_parse_release() {
        assert_eq!(Version::parse("6.1.34r150636\n").as_str(), "6.1.34");
        assert_eq!(Version::parse("7.0.10").as_str(), "7.0.10");
    }

    #[test]
    fn test_parse_skips_warning_banner() {
        let output = "WARNING: The vboxdrv kernel module is not loaded.\n\n6.1.34r150636\n";
        assert_eq!(Version::parse(output).as_str(), "6.1.34");
        assert_eq!(Version::parse("WARNING: x\n6.1.34r150636").as_str(), "6.1.34");
    }

    #[test]
    fn test_components() {
        let v = Version::parse("6.1.34r150636");
        assert_eq!(v.major(), Some(6));
        assert_eq!(v.minor(), Some(1));
        assert_eq!(Version::parse("").major(), None);
    }

    #[test]
    fn test_ensure_supported() {
        assert!(Version::parse("3.2.28r73450").ensure_supported().is_err());
        assert!(Version::parse("4.0.0r12345").ensure_supported().is_ok());
        assert!(Version::parse("devel").ensure_supported().is_ok());
    }

    #[test]
    fn test_read_version() {
        let runner = MockRunner::new().on(&["--version"], "6.1.34r150636\n");
        assert_eq!(read_version(&runner).unwrap().as_str(), "6.1.34");
    }

    #[test]
    fn test_missing_tool_is_not_detected() {
        let runner = MockRunner::new().tool_missing();
        let err = read_version(&runner).unwrap_err();
        assert!(matches!(err, VmError::HypervisorNotDetected { .. }));
    }

    #[test]
    fn test_command_failure_passes_through() {
        let runner = MockRunner::new().on_failure(&["--version"], 1, "broken install");
        let err = read_version(&runner).unwrap_err();
        assert!(matches!(err, VmError::CommandFailed { .. }));
    }
}
