//! Command-line definitions and dispatch.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use vbox_driver::{Driver, DriverConfig, ForwardingRule, StartMode, Version};

/// Manage VirtualBox machines and their NAT port forwarding.
#[derive(Debug, Parser)]
#[command(name = "vboxctl", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Path to VBoxManage (overrides VBOXMANAGE_PATH / VBOX_INSTALL_PATH)
    #[arg(long, global = true)]
    pub vboxmanage: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the installed VirtualBox release
    Version,
    /// List registered machines
    List,
    /// Show a machine's state
    State { vm: String },
    /// List a machine's forwarded ports
    Ports {
        vm: String,
        /// Report nothing unless the machine is running
        #[arg(long)]
        active: bool,
    },
    /// Host ports held by running machines
    UsedPorts,
    /// Add forwarded ports: NAME:HOST:GUEST[:PROTO[:ADAPTER]]
    Forward {
        vm: String,
        #[arg(required = true, value_parser = parse_rule)]
        rules: Vec<ForwardingRule>,
    },
    /// Remove every forwarded port
    ClearPorts { vm: String },
    /// Import an appliance as a new machine
    Import { appliance: PathBuf, name: String },
    /// Show the guest additions version
    GuestAdditions { vm: String },
    /// Set the MAC address of adapter 1
    SetMac { vm: String, mac: String },
    /// Boot a machine
    Start {
        vm: String,
        /// Open a window instead of running headless
        #[arg(long)]
        gui: bool,
    },
    /// Power a machine off
    Halt { vm: String },
    /// Save a machine's state and stop it
    Suspend { vm: String },
    /// Discard a saved state
    DiscardState { vm: String },
    /// Unregister a machine and delete its files
    Delete { vm: String },
}

/// Parse `NAME:HOST:GUEST[:PROTO[:ADAPTER]]`.
fn parse_rule(s: &str) -> std::result::Result<ForwardingRule, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if !(3..=5).contains(&parts.len()) {
        return Err(format!("expected NAME:HOST:GUEST[:PROTO[:ADAPTER]], got `{s}`"));
    }
    if parts[0].is_empty() {
        return Err("rule name must not be empty".to_string());
    }
    let host: u16 = parts[1]
        .parse()
        .map_err(|e| format!("invalid host port `{}`: {e}", parts[1]))?;
    let guest: u16 = parts[2]
        .parse()
        .map_err(|e| format!("invalid guest port `{}`: {e}", parts[2]))?;

    let mut rule = ForwardingRule::new(parts[0], host, guest);
    if let Some(proto) = parts.get(3) {
        match *proto {
            "tcp" | "udp" => rule = rule.protocol(*proto),
            other => return Err(format!("protocol must be tcp or udp, got `{other}`")),
        }
    }
    if let Some(adapter) = parts.get(4) {
        let adapter: u32 = adapter
            .parse()
            .map_err(|e| format!("invalid adapter `{adapter}`: {e}"))?;
        rule = rule.adapter(adapter);
    }
    Ok(rule)
}

impl Cli {
    fn config(&self) -> DriverConfig {
        let config = match &self.global.vboxmanage {
            Some(path) => DriverConfig::new(path.clone()),
            None => DriverConfig::from_env(),
        };
        tracing::debug!(?config, "configuration loaded");
        config.validate_warn();
        config
    }

    fn driver(&self, vm: &str) -> Result<Driver> {
        Driver::with_config(vm, &self.config()).context("failed to initialise VirtualBox driver")
    }

    /// Execute the selected command.
    pub fn run(&self) -> Result<()> {
        let json = self.global.json;
        match &self.command {
            Command::Version => {
                // Machine-independent; the handle is never used.
                let driver = self.driver("")?;
                let version = driver.version();
                print(json, version_json(version), || version.to_string());
            }
            Command::List => {
                let machines = self.driver("")?.read_machines()?;
                print(json, json!(machines), || {
                    machines
                        .iter()
                        .map(|m| format!("{}\t{}", m.uuid, m.name))
                        .collect::<Vec<_>>()
                        .join("\n")
                });
            }
            Command::State { vm } => {
                let state = self.driver(vm)?.read_state()?;
                print(json, json!({ "state": state }), || match &state {
                    Some(state) => state.to_string(),
                    None => "unknown".to_string(),
                });
            }
            Command::Ports { vm, active } => {
                let rules = self.driver(vm)?.read_forwarded_ports(*active)?;
                print(json, json!(rules), || {
                    rules
                        .iter()
                        .map(|r| {
                            format!(
                                "{}\t{}\t{}\t{} -> {}",
                                r.adapter, r.name, r.protocol, r.host_port, r.guest_port
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                });
            }
            Command::UsedPorts => {
                let ports = self.driver("")?.read_used_ports()?;
                print(json, json!(ports), || {
                    ports
                        .iter()
                        .map(u16::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                });
            }
            Command::Forward { vm, rules } => {
                self.driver(vm)?
                    .forward_ports(rules)
                    .with_context(|| format!("failed to forward ports on {vm}"))?;
            }
            Command::ClearPorts { vm } => {
                self.driver(vm)?
                    .clear_forwarded_ports()
                    .with_context(|| format!("failed to clear ports on {vm}"))?;
            }
            Command::Import { appliance, name } => {
                let uuid = self
                    .driver("")?
                    .import(appliance, name)
                    .with_context(|| format!("failed to import {}", appliance.display()))?;
                match uuid {
                    Some(uuid) => print(json, json!({ "uuid": uuid }), || uuid.clone()),
                    None => anyhow::bail!("imported {name} but it is not listed yet"),
                }
            }
            Command::GuestAdditions { vm } => {
                let version = self.driver(vm)?.read_guest_additions_version()?;
                print(json, json!({ "version": version }), || {
                    version.clone().unwrap_or_else(|| "not installed".to_string())
                });
            }
            Command::SetMac { vm, mac } => self.driver(vm)?.set_mac_address(mac)?,
            Command::Start { vm, gui } => {
                let mode = if *gui { StartMode::Gui } else { StartMode::Headless };
                self.driver(vm)?.start(mode)?;
            }
            Command::Halt { vm } => self.driver(vm)?.halt()?,
            Command::Suspend { vm } => self.driver(vm)?.suspend()?,
            Command::DiscardState { vm } => self.driver(vm)?.discard_saved_state()?,
            Command::Delete { vm } => self.driver(vm)?.delete()?,
        }
        Ok(())
    }
}

fn version_json(version: &Version) -> serde_json::Value {
    json!({
        "version": version.as_str(),
        "major": version.major(),
        "minor": version.minor(),
    })
}

fn print(json: bool, value: serde_json::Value, text: impl FnOnce() -> String) {
    if json {
        println!("{value}");
    } else {
        let text = text();
        if !text.is_empty() {
            println!("{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_defaults() {
        let rule = parse_rule("ssh:2222:22").unwrap();
        assert_eq!(rule, ForwardingRule::new("ssh", 2222, 22));
    }

    #[test]
    fn test_parse_rule_full() {
        let rule = parse_rule("dns:5353:53:udp:2").unwrap();
        assert_eq!(rule, ForwardingRule::new("dns", 5353, 53).protocol("udp").adapter(2));
    }

    #[test]
    fn test_parse_rule_errors() {
        assert!(parse_rule("ssh:2222").is_err());
        assert!(parse_rule(":2222:22").is_err());
        assert!(parse_rule("ssh:99999:22").is_err());
        assert!(parse_rule("ssh:2222:22:sctp").is_err());
        assert!(parse_rule("ssh:2222:22:tcp:x").is_err());
        assert!(parse_rule("a:1:2:tcp:1:extra").is_err());
    }

    #[test]
    fn test_cli_parses_forward() {
        let cli = Cli::parse_from(["vboxctl", "forward", "vm-1", "ssh:2222:22", "web:8080:80"]);
        match cli.command {
            Command::Forward { vm, rules } => {
                assert_eq!(vm, "vm-1");
                assert_eq!(rules.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "vboxctl",
            "ports",
            "vm-1",
            "--active",
            "--json",
            "--vboxmanage",
            "/opt/vbox/VBoxManage",
        ]);
        assert!(cli.global.json);
        assert_eq!(
            cli.global.vboxmanage,
            Some(PathBuf::from("/opt/vbox/VBoxManage"))
        );
        assert!(matches!(cli.command, Command::Ports { active: true, .. }));
    }

    #[test]
    fn test_version_json() {
        let value = version_json(&Version::parse("7.0.10r158379"));
        assert_eq!(value["version"], "7.0.10");
        assert_eq!(value["major"], 7);
        assert_eq!(value["minor"], 0);

        let value = version_json(&Version::parse("devel"));
        assert!(value["minor"].is_null());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
