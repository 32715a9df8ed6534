//! Network adapter configuration.

use crate::error::Result;
use crate::parse;
use crate::runner::CommandRunner;
use crate::types::NetworkAdapter;
use tracing::info;

/// Set the MAC address of adapter 1.
///
/// The address is passed through untouched; VBoxManage rejects bad input.
pub fn set_mac_address<R: CommandRunner + ?Sized>(runner: &R, uuid: &str, mac: &str) -> Result<()> {
    info!(uuid, mac, "setting MAC address");
    runner.execute("modifyvm", &[uuid, "--macaddress1", mac])?;
    Ok(())
}

/// MAC address of adapter 1, if the machine reports one.
pub fn read_mac_address<R: CommandRunner + ?Sized>(runner: &R, uuid: &str) -> Result<Option<String>> {
    let output = runner.execute("showvminfo", &[uuid, "--machinereadable"])?;
    let mac = parse::pairs(&output)
        .find(|(key, _)| *key == "macaddress1")
        .map(|(_, value)| value.to_string());
    Ok(mac)
}

/// Every adapter slot with its attachment, in slot order.
pub fn read_network_adapters<R: CommandRunner + ?Sized>(
    runner: &R,
    uuid: &str,
) -> Result<Vec<NetworkAdapter>> {
    let output = runner.execute("showvminfo", &[uuid, "--machinereadable"])?;
    Ok(parse_adapters(&output))
}

fn parse_adapters(output: &str) -> Vec<NetworkAdapter> {
    let mut adapters: Vec<NetworkAdapter> = parse::pairs(output)
        .filter_map(|(key, value)| {
            parse::adapter_index(key).map(|index| NetworkAdapter {
                index,
                attachment: value.to_string(),
            })
        })
        .collect();
    adapters.sort_by_key(|a| a.index);
    adapters
}
