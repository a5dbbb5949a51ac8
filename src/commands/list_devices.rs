//! List available audio input devices.

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::capture::mic::suppress_alsa_warnings;

/// Lists all available audio input devices on the system.
///
/// # Errors
/// - If the audio host cannot be initialized
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    // Enumerate devices while suppressing ALSA library warnings
    let (host, devices) = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let device_iter = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?;

        // Skip devices that cannot even report a name
        let devices: Vec<cpal::Device> = device_iter.filter(|d| d.name().is_ok()).collect();

        Ok((host, devices))
    })?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!("holdrec · audio input devices");
    println!();

    let default_device = host.default_input_device().and_then(|d| d.name().ok());

    for (index, device) in devices.iter().enumerate() {
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let default_indicator = if default_device.as_ref() == Some(&device_name) {
            " [DEFAULT]"
        } else {
            ""
        };

        let config_info = match device.default_input_config() {
            Ok(config) => format!(
                "{}Hz, {} channels",
                config.sample_rate().0,
                config.channels()
            ),
            Err(_) => "configuration unavailable".to_string(),
        };

        println!("  {index}: {device_name}{default_indicator}");
        println!("     {config_info}");
        println!();
    }

    println!("Set the device in holdrec.toml by index or by name ('holdrec config').");

    Ok(())
}
