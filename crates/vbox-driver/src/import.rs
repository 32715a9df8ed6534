//! Appliance import.

use crate::error::Result;
use crate::parse;
use crate::runner::CommandRunner;
use std::path::Path;
use tracing::{info, warn};

/// Import the appliance at `path` as a machine called `name`.
///
/// Returns the new machine's uuid, or `None` when the listing that follows
/// the import does not show it yet.
pub fn import<R: CommandRunner + ?Sized>(
    runner: &R,
    path: &Path,
    name: &str,
) -> Result<Option<String>> {
    let path = path.to_string_lossy();
    info!(appliance = %path, name, "importing appliance");
    runner.execute("import", &[&*path, "--vsys", "0", "--vmname", name])?;

    let listing = runner.execute("list", &["vms"])?;
    let uuid = find_uuid(&listing, name);
    if uuid.is_none() {
        warn!(name, "imported machine is not listed yet");
    }
    Ok(uuid)
}

/// Uuid of the machine named exactly `name` in a `list vms` listing.
pub(crate) fn find_uuid(listing: &str, name: &str) -> Option<String> {
    parse::parse_machine_list(listing)
        .into_iter()
        .find(|m| m.name == name)
        .map(|m| m.uuid)
}
