//! Output device listing.
//!
//! On Linux the default CPAL host is ALSA, so the printed names are PCM names
//! that can be passed straight to `--device`.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};

/// Print available output devices to stdout.
///
/// This is intended for CLI UX (`--list-devices`) rather than structured output.
pub fn list_devices(host: &cpal::Host) -> Result<()> {
    let devices = host.output_devices().context("No output devices")?;
    for (i, d) in devices.enumerate() {
        println!("#{i}: {}", d.description()?);
    }
    if let Some(name) = default_device_name(host) {
        println!("default: {name}");
    }
    Ok(())
}

fn default_device_name(host: &cpal::Host) -> Option<String> {
    host.default_output_device()
        .and_then(|d| d.description().ok().map(|desc| desc.to_string()))
}
