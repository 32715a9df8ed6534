//! Line scanners for VBoxManage's textual output.
//!
//! `showvminfo --machinereadable` prints one `key="value"` (or `key=value`)
//! pair per line. `list vms` prints `"<name>" {<uuid>}`. Neither format is
//! guaranteed stable, so everything here is tolerant: lines that do not
//! match are ignored rather than reported.

use crate::types::MachineEntry;

/// Split one machine-readable line into its key and value, unquoted.
pub(crate) fn parse_pair(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    let (key, value) = line.split_once('=')?;
    let key = unquote(key.trim());
    if key.is_empty() {
        return None;
    }
    Some((key, unquote(value)))
}

/// Iterate over every well-formed `key=value` pair, in output order.
pub(crate) fn pairs(output: &str) -> impl Iterator<Item = (&str, &str)> {
    output.lines().filter_map(parse_pair)
}

/// Adapter slot declared by a `nic<N>` key.
///
/// Only the bare `nic<N>` key counts; `nictype1`, `nicspeed1` and friends
/// describe an adapter but do not declare one.
pub(crate) fn adapter_index(key: &str) -> Option<u32> {
    let digits = key.strip_prefix("nic")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether a key carries a NAT forwarding rule (`Forwarding(0)`, `Forwarding0`, ...).
pub(crate) fn is_forwarding_key(key: &str) -> bool {
    key.len() > "Forwarding".len() && key.starts_with("Forwarding")
}

/// Parse one `"<name>" {<uuid>}` line of `list vms`.
pub(crate) fn parse_list_line(line: &str) -> Option<MachineEntry> {
    let line = line.trim();
    let rest = line.strip_prefix('"')?;
    let inner = rest.strip_suffix('}')?;
    // Names may themselves contain quotes, so split on the last separator.
    let sep = inner.rfind("\" {")?;
    let name = &inner[..sep];
    let uuid = &inner[sep + 3..];
    if name.is_empty() || uuid.is_empty() {
        return None;
    }
    Some(MachineEntry {
        name: name.to_string(),
        uuid: uuid.to_string(),
    })
}

/// Every machine in a `list vms` listing.
pub(crate) fn parse_machine_list(output: &str) -> Vec<MachineEntry> {
    output.lines().filter_map(parse_list_line).collect()
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
