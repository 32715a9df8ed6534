//! Integration tests for vbox-driver.
//!
//! These tests require:
//! - VirtualBox installed, with VBoxManage on `PATH` (or `VBOXMANAGE_PATH` set)
//! - For the appliance test, an OVF/OVA image in `VBOX_TEST_APPLIANCE`
//!
//! Run with: `cargo test -p vbox-driver -- --ignored`

use std::path::Path;
use vbox_driver::{Driver, DriverConfig, ForwardingRule, VmState};

/// Probe the installed release and list the fleet.
#[test]
#[ignore = "requires VirtualBox"]
fn test_version_and_listing() {
    let driver = Driver::with_config("unused", &DriverConfig::from_env())
        .expect("VirtualBox should be detected");
    assert!(driver.version().major().is_some());

    let machines = driver.read_machines().expect("Failed to list machines");
    for machine in &machines {
        assert!(!machine.uuid.is_empty());
    }

    // Every listed machine must be readable, even inaccessible ones.
    driver.read_used_ports().expect("Failed to read used ports");
}

/// Import an appliance, manage its forwarded ports, then delete it.
#[test]
#[ignore = "requires VirtualBox + appliance image"]
fn test_import_forward_delete() {
    let Ok(appliance) = std::env::var("VBOX_TEST_APPLIANCE") else {
        eprintln!("Skipping test: set VBOX_TEST_APPLIANCE to an OVF/OVA file");
        return;
    };
    if !Path::new(&appliance).exists() {
        eprintln!("Skipping test: {appliance} not found");
        return;
    }

    let config = DriverConfig::from_env();
    let detected = Driver::with_config("unused", &config).expect("VirtualBox should be detected");
    let name = format!("vbox-driver-test-{}", std::process::id());
    let uuid = detected
        .import(Path::new(&appliance), &name)
        .expect("Failed to import appliance")
        .expect("Imported machine should be listed");

    let driver = Driver::with_config(uuid.clone(), &config).expect("Failed to create driver");
    assert_eq!(driver.read_state().unwrap(), Some(VmState::PowerOff));

    driver.clear_forwarded_ports().expect("Failed to clear ports");
    let rules = vec![ForwardingRule::new("ssh", 42222, 22)];
    driver.forward_ports(&rules).expect("Failed to forward ports");
    let listed = driver.read_forwarded_ports(false).unwrap();
    assert!(listed.contains(&rules[0]));

    // Powered off, so its ports do not count as used.
    assert!(!driver.read_used_ports().unwrap().contains(&42222));

    driver.clear_forwarded_ports().expect("Failed to clear ports");
    assert!(driver.read_forwarded_ports(false).unwrap().is_empty());

    driver.delete().expect("Failed to delete VM");
    assert!(!driver.exists().unwrap());
}
