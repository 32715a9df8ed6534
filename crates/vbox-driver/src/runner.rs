//! Process execution for VBoxManage.
//!
//! Every call the driver makes goes through [`CommandRunner::execute`], so
//! output is only ever parsed after the tool has exited successfully.

use crate::error::{Result, VmError};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace, warn};

/// Something that can run a VBoxManage subcommand and hand back its stdout.
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `args` and return the captured standard output.
    ///
    /// # Errors
    /// [`VmError::ToolNotFound`] when the executable cannot be launched,
    /// [`VmError::CommandFailed`] when it exits non-zero.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;

    /// Executable this runner launches, for diagnostics.
    fn program(&self) -> &Path;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        (**self).execute(command, args)
    }

    fn program(&self) -> &Path {
        (**self).program()
    }
}

/// Runs the real `VBoxManage` executable as a child process.
#[derive(Debug, Clone)]
pub struct VBoxManage {
    program: PathBuf,
}

impl Default for VBoxManage {
    fn default() -> Self {
        Self::new("VBoxManage")
    }
}

impl VBoxManage {
    /// Create a runner for the given executable (a bare name is resolved via `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CommandRunner for VBoxManage {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        debug!(program = %self.program.display(), command, ?args, "executing VBoxManage");

        let output = Command::new(&self.program)
            .arg(command)
            .args(args)
            .output()
            .map_err(|e| {
                warn!(error = %e, program = %self.program.display(), "failed to launch VBoxManage");
                VmError::ToolNotFound {
                    program: self.program.clone(),
                    source: e,
                }
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(
            exit_code = exit_code,
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "command completed"
        );
        trace!(stdout = %stdout, stderr = %stderr, "command output");

        if !output.status.success() {
            return Err(VmError::CommandFailed {
                command: render_command(&self.program, command, args),
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }

    fn program(&self) -> &Path {
        &self.program
    }
}

/// Render a command line for error messages.
pub(crate) fn render_command(program: &Path, command: &str, args: &[&str]) -> String {
    let mut line = format!("{} {}", program.display(), command);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
