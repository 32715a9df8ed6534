//! Power state changes and machine registration.

use crate::error::Result;
use crate::parse;
use crate::runner::CommandRunner;
use crate::types::{MachineEntry, StartMode};
use tracing::info;

/// Boot `uuid`.
pub fn start<R: CommandRunner + ?Sized>(runner: &R, uuid: &str, mode: StartMode) -> Result<()> {
    info!(uuid, mode = mode.as_arg(), "starting VM");
    runner.execute("startvm", &[uuid, "--type", mode.as_arg()])?;
    Ok(())
}

/// Pull the virtual power plug.
pub fn halt<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<()> {
    info!(uuid, "powering off VM");
    runner.execute("controlvm", &[uuid, "poweroff"])?;
    Ok(())
}

/// Save the machine state to disk and stop it.
pub fn suspend<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<()> {
    info!(uuid, "saving VM state");
    runner.execute("controlvm", &[uuid, "savestate"])?;
    Ok(())
}

/// Throw away a saved state so the next start is a cold boot.
pub fn discard_saved_state<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<()> {
    info!(uuid, "discarding saved state");
    runner.execute("discardstate", &[uuid])?;
    Ok(())
}

/// Unregister `uuid` and delete its files.
pub fn delete<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<()> {
    info!(uuid, "deleting VM");
    runner.execute("unregistervm", &[uuid, "--delete"])?;
    Ok(())
}

/// Every machine registered on the host.
pub fn list_machines<R: CommandRunner + ?Sized>(runner: &R) -> Result<Vec<MachineEntry>> {
    let output = runner.execute("list", &["vms"])?;
    Ok(parse::parse_machine_list(&output))
}

/// Whether a registered machine has `handle` as its uuid or name.
pub fn machine_exists<R: CommandRunner + ?Sized>(runner: &R, handle: &str) -> Result<bool> {
    Ok(list_machines(runner)?
        .iter()
        .any(|m| m.uuid == handle || m.name == handle))
}
