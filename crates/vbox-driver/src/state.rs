//! Machine state queries.

use crate::error::Result;
use crate::parse;
use crate::runner::CommandRunner;
use crate::types::VmState;

/// Name VirtualBox reports for machines whose settings it cannot read.
const INACCESSIBLE_NAME: &str = "<inaccessible>";

/// Read the lifecycle state of `uuid`.
///
/// Returns `None` when the output carries no state at all.
pub fn read_state<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<Option<VmState>> {
    let output = runner.execute("showvminfo", &[uuid, "--machinereadable"])?;
    Ok(parse_state(&output))
}

/// Pull the state out of `showvminfo --machinereadable` output.
///
/// An inaccessible name overrides any state line, wherever it appears.
pub(crate) fn parse_state(output: &str) -> Option<VmState> {
    let mut state = None;
    for (key, value) in parse::pairs(output) {
        match key {
            "name" if value == INACCESSIBLE_NAME => return Some(VmState::Inaccessible),
            "VMState" if state.is_none() => state = Some(VmState::from_vbox_state(value)),
            _ => {}
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    #[test]
    fn test_running() {
        let output = "name=\"dev\"\nVMState=\"running\"\nVMStateChangeTime=\"2024-01-01\"\n";
        assert_eq!(parse_state(output), Some(VmState::Running));
    }

    #[test]
    fn test_inaccessible_name_wins() {
        let output = "name=\"<inaccessible>\"\nVMState=\"running\"\n";
        assert_eq!(parse_state(output), Some(VmState::Inaccessible));

        let late = "VMState=\"running\"\nname=\"<inaccessible>\"\n";
        assert_eq!(parse_state(late), Some(VmState::Inaccessible));
    }

    #[test]
    fn test_missing_state() {
        assert_eq!(parse_state("name=\"dev\"\nmemory=1024\n"), None);
        assert_eq!(parse_state(""), None);
    }

    #[test]
    fn test_unrecognised_state() {
        assert_eq!(
            parse_state("VMState=\"teleported\"\n"),
            Some(VmState::Unknown("teleported".into()))
        );
    }

    #[test]
    fn test_read_state_queries_machinereadable() {
        let runner = MockRunner::new().on(
            &["showvminfo", "abc", "--machinereadable"],
            "VMState=\"poweroff\"\n",
        );
        assert_eq!(read_state(&runner, "abc").unwrap(), Some(VmState::PowerOff));
    }
}
