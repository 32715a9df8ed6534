//! NAT port forwarding.
//!
//! VBoxManage does not say which adapter a `Forwarding(N)` line belongs to.
//! The adapter is implied by position: every forwarding line follows the
//! `nic<N>` declaration of the adapter it governs. The scanner below keeps
//! the most recent declaration as it walks the output once, top to bottom.

use crate::error::Result;
use crate::parse;
use crate::runner::CommandRunner;
use crate::types::{ForwardingRule, VmState, DEFAULT_ADAPTER};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// List the forwarding rules configured on `uuid`.
///
/// With `active_only`, a machine that is not running contributes no rules.
pub fn list_forwarding_rules<R: CommandRunner + ?Sized>(
    runner: &R,
    uuid: &str,
    active_only: bool,
) -> Result<Vec<ForwardingRule>> {
    let output = runner.execute("showvminfo", &[uuid, "--machinereadable"])?;
    Ok(parse_forwarding_rules(&output, active_only))
}

/// Single pass over `showvminfo --machinereadable` output.
pub(crate) fn parse_forwarding_rules(output: &str, active_only: bool) -> Vec<ForwardingRule> {
    let mut current_adapter = None;
    let mut rules = Vec::new();

    for (key, value) in parse::pairs(output) {
        if let Some(index) = parse::adapter_index(key) {
            current_adapter = Some(index);
            continue;
        }

        // Any non-running state voids the whole record, even if rules were
        // already collected above it.
        if active_only && key == "VMState" && !VmState::from_vbox_state(value).is_running() {
            return Vec::new();
        }

        if parse::is_forwarding_key(key) {
            let adapter = current_adapter.unwrap_or(DEFAULT_ADAPTER);
            match parse_rule(adapter, value) {
                Some(rule) => rules.push(rule),
                None => debug!(key, value, "skipping malformed forwarding line"),
            }
        }
    }

    rules
}

/// Parse `name,proto,hostip,hostport,guestip,guestport`.
fn parse_rule(adapter: u32, value: &str) -> Option<ForwardingRule> {
    let fields: Vec<&str> = value.split(',').collect();
    let [name, protocol, _host_ip, host_port, _guest_ip, guest_port] = fields.as_slice() else {
        return None;
    };
    if name.is_empty() || protocol.is_empty() {
        return None;
    }
    Some(ForwardingRule {
        adapter,
        name: name.to_string(),
        host_port: host_port.trim().parse().ok()?,
        guest_port: guest_port.trim().parse().ok()?,
        protocol: protocol.to_string(),
    })
}

/// Remove every forwarding rule on `uuid` with one `modifyvm` call.
///
/// Nothing is executed when the machine has no rules.
pub fn clear_forwarding_rules<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<()> {
    let rules = list_forwarding_rules(runner, uuid, false)?;
    if rules.is_empty() {
        debug!(uuid, "no forwarding rules to clear");
        return Ok(());
    }

    let mut args = vec![uuid.to_string()];
    for rule in &rules {
        args.push(format!("--natpf{}", rule.adapter));
        args.push("delete".to_string());
        args.push(rule.name.clone());
    }

    info!(uuid, count = rules.len(), "clearing forwarding rules");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner.execute("modifyvm", &args)?;
    Ok(())
}

/// Add `rules` to `uuid` with one `modifyvm` call.
///
/// Existing rules are left alone; clear first for replace semantics.
pub fn forward_ports<R: CommandRunner + ?Sized>(
    runner: &R,
    uuid: &str,
    rules: &[ForwardingRule],
) -> Result<()> {
    if rules.is_empty() {
        return Ok(());
    }

    let mut args = vec![uuid.to_string()];
    for rule in rules {
        args.push(format!("--natpf{}", rule.adapter));
        args.push(rule.natpf_directive());
    }

    info!(uuid, count = rules.len(), "adding forwarding rules");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner.execute("modifyvm", &args)?;
    Ok(())
}

/// Host ports claimed by rules on every running machine.
///
/// Machines are read one after another, so the result is a snapshot that
/// may already be stale when it is returned.
pub fn read_used_ports<R: CommandRunner + ?Sized>(runner: &R) -> Result<BTreeSet<u16>> {
    let listing = runner.execute("list", &["vms"])?;
    let mut ports = BTreeSet::new();
    for machine in parse::parse_machine_list(&listing) {
        for rule in list_forwarding_rules(runner, &machine.uuid, true)? {
            ports.insert(rule.host_port);
        }
    }
    debug!(count = ports.len(), "collected used host ports");
    Ok(ports)
}
