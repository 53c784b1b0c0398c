use std::io::ErrorKind;
use std::process::Command;
use tokio::time::{sleep, timeout, Duration};

use crate::{TelloError, Result};

const POLL_INTERVAL:Duration = Duration::from_millis(100);

/// Waits until the host has joined a WiFi network whose name starts with
/// `ssid_prefix`, giving up with [`TelloError::WiFiNotConnected`] after
/// `limit` if one is given.
pub async fn wait_for_wifi(ssid_prefix: &str, limit: Option<Duration>) -> Result<()> {
    match limit {
        Some(limit) => timeout(limit, poll_for_wifi(ssid_prefix))
            .await
            .map_err(|_| TelloError::WiFiNotConnected)?,
        None => poll_for_wifi(ssid_prefix).await
    }
}

//////////////////////////////////////////////////////////////////////////////
// macOS

#[cfg(target_os = "macos")]
fn list_wifi_devices() -> Result<Vec<String>> {
    let output = run_command("networksetup", &["-listallhardwareports"])?;

    let mut found_wifi = false;
    let mut devices:Vec<String> = vec![];
    for l in output.lines() {
        if !found_wifi {
            // "Hardware Port: Wi-Fi"...
            found_wifi = l.contains("Wi-Fi");
        }
        else {
            // ...followed by "Device: en1"
            found_wifi = false;
            devices.push(l.trim_start_matches("Device: ").to_string());
        }
    }

    Ok(devices)
}

#[cfg(target_os = "macos")]
async fn poll_for_wifi(ssid_prefix: &str) -> Result<()> {
    let devices = list_wifi_devices()?;
    log::debug!("[WiFi] watching devices {devices:?}");

    let waiting_for = format!("Current Wi-Fi Network: {ssid_prefix}");
    loop {
        for device in devices.iter() {
            let s = run_command("networksetup", &["-getairportnetwork", device])?;
            if s.starts_with(&waiting_for) {
                return Ok(())
            }
        }
        sleep(POLL_INTERVAL).await;
    }
}

//////////////////////////////////////////////////////////////////////////////
// linux

#[cfg(target_os = "linux")]
async fn poll_for_wifi(ssid_prefix: &str) -> Result<()> {
    loop {
        // iwgetid exits non-zero with no output while not associated
        let Some(s) = run_command_if_installed("iwgetid", &["-r"])? else {
            log::warn!("[WiFi] iwgetid not found, cannot check the network, assuming joined already and continuing");
            return Ok(())
        };
        if s.trim().starts_with(ssid_prefix) {
            log::debug!("[WiFi] joined {}", s.trim());
            return Ok(())
        }
        sleep(POLL_INTERVAL).await;
    }
}

//////////////////////////////////////////////////////////////////////////////
// anything else

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
async fn poll_for_wifi(_ssid_prefix: &str) -> Result<()> {
    log::warn!("[WiFi] wait_for_wifi has not been implemented for this OS, assuming joined already and continuing");
    Ok(())
}

//////////////////////////////////////////////////////////////////////////////

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn run_command(cmd:&str, args: &[&str]) -> Result<String> {
    run_command_if_installed(cmd, args)?
        .ok_or_else(|| TelloError::Generic { msg: format!("{cmd} not found") })
}

/// Runs `cmd`, or returns `None` if it is not installed.
fn run_command_if_installed(cmd:&str, args: &[&str]) -> Result<Option<String>> {
    let raw_output = match Command::new(cmd).args(args).output() {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TelloError::Generic { msg: format!("failed to run {cmd} - {e}") })
    };

    String::from_utf8(raw_output.stdout).map_err(
        |e| TelloError::Generic { msg: format!("failed to decode {cmd} output - {e:?}") }
    ).map(Some)
}
