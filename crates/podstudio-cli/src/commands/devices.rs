//! Output device listing command.

use podstudio_config::StudioConfig;
use podstudio_engine::Studio;

pub fn run(config: &StudioConfig) -> anyhow::Result<()> {
    let studio = Studio::from_config(config);
    let backend = studio.engine().compiler().backend();
    let devices = backend.output_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output Devices ({})", backend.name());
    println!("==============\n");
    for (index, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        match device.default_sample_rate {
            Some(rate) => println!("  [{index}] {} ({rate} Hz){default}", device.name),
            None => println!("  [{index}] {}{default}", device.name),
        }
    }
    println!();
    println!("Any path ending in .wav may also be used as a device.");
    Ok(())
}
