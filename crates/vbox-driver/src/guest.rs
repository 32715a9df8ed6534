//! Guest-reported properties.

use crate::error::Result;
use crate::runner::CommandRunner;

const GUEST_ADDITIONS_VERSION: &str = "/VirtualBox/GuestAdd/Version";

/// Version of the guest additions running inside `uuid`, if any.
pub fn read_guest_additions_version<R: CommandRunner + ?Sized>(
    runner: &R,
    uuid: &str,
) -> Result<Option<String>> {
    let output = runner.execute("guestproperty", &["get", uuid, GUEST_ADDITIONS_VERSION])?;
    Ok(parse_property_value(&output))
}

/// Value of a `Value: <v>` line. `No value set!` has no such line.
fn parse_property_value(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim_end().strip_prefix("Value: "))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    #[test]
    fn test_value_present() {
        assert_eq!(parse_property_value("Value: 6.1.34\n").as_deref(), Some("6.1.34"));
        assert_eq!(
            parse_property_value("Value: 7.0.10 r158379\r\n").as_deref(),
            Some("7.0.10 r158379")
        );
    }

    #[test]
    fn test_value_absent() {
        assert_eq!(parse_property_value("No value set!\n"), None);
        assert_eq!(parse_property_value(""), None);
    }

    #[test]
    fn test_read_guest_additions_version() {
        let runner = MockRunner::new().on(
            &["guestproperty", "get", "vm-1", "/VirtualBox/GuestAdd/Version"],
            "Value: 6.1.34\n",
        );
        assert_eq!(
            read_guest_additions_version(&runner, "vm-1").unwrap().as_deref(),
            Some("6.1.34")
        );
    }
}
