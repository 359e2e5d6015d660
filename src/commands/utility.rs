//! Utility command handlers.

use super::{CommandResult, Context};

/// List displays matching the channel definition
pub fn list(ctx: &Context) -> CommandResult {
    let devices = ctx.session.source().discovery().list_devices()?;
    if devices.is_empty() {
        println!("No Nattiq displays found");
        return Ok(());
    }

    println!("Nattiq displays:");
    for device in &devices {
        let info = &device.info;
        let selected = if ctx.locator.accepts(device) { "*" } else { " " };
        println!(
            "{} {:<9} {:04X}:{:04X} if={} serial={} name={} path={}",
            selected,
            format!("{:?}", info.transport_type),
            info.vid,
            info.pid,
            device.interface,
            info.serial.as_deref().unwrap_or("-"),
            info.resource_name.as_deref().unwrap_or("-"),
            info.device_path,
        );
    }
    if let Some(device) = &ctx.config.device {
        println!("(configured device: {device})");
    }
    Ok(())
}
