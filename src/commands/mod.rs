//! Command handlers for the CLI application.
//!
//! - `query`: info, profiles
//! - `display`: write, clear
//! - `input`: keys
//! - `utility`: list

pub mod display;
pub mod input;
pub mod query;
pub mod utility;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use nattiq_driver::{DriverConfig, HidSource, Session};
use nattiq_transport::{DeviceLocator, OutputFormat, PrinterConfig};

use crate::cli::Cli;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Everything a command needs to reach the display
pub struct Context {
    pub config: DriverConfig,
    pub locator: DeviceLocator,
    pub session: Session<HidSource>,
}

impl Context {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = DriverConfig::load_or_default(cli.config.as_deref())?;

        let locator = match &cli.device {
            Some(device) => device
                .parse::<DeviceLocator>()
                .with_context(|| format!("invalid --device '{device}'"))?,
            None => config.locator()?,
        };

        let printer = create_printer_config(cli.monitor, &cli.monitor_format)?;
        let session = Session::new(HidSource::new(locator.clone()), config.protocol_set()?)
            .with_printer(printer);

        Ok(Self {
            config,
            locator,
            session,
        })
    }
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}

/// Create printer config from CLI flags
fn create_printer_config(monitor: bool, format: &str) -> anyhow::Result<Option<PrinterConfig>> {
    if !monitor {
        return Ok(None);
    }
    let format: OutputFormat = format.parse().map_err(anyhow::Error::msg)?;
    Ok(Some(PrinterConfig::default().with_format(format)))
}
