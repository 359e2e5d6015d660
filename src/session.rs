//! Connection sessions
//!
//! A [`Session`] knows how to (re)open a display. Input monitoring runs on
//! top of it and reconnects whenever the driver reports that the channel
//! has failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nattiq_braille::{BrailleDriver, BrailleError, InputEvent, PollResult, ProtocolSet};
use nattiq_transport::{
    BoxedChannel, DeviceLocator, HidDiscovery, PrinterChannel, PrinterConfig, TransportError,
};
use tracing::{info, warn};

/// Pause between input polls when nothing is pending
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Pause before trying to reconnect a failed display
pub const RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// Something that can open a fresh channel to a display
pub trait ChannelSource {
    fn open_channel(&self) -> Result<BoxedChannel, TransportError>;
}

/// Opens displays through HID discovery
pub struct HidSource {
    discovery: HidDiscovery,
    locator: DeviceLocator,
}

impl HidSource {
    pub fn new(locator: DeviceLocator) -> Self {
        Self {
            discovery: HidDiscovery::new(),
            locator,
        }
    }

    pub fn discovery(&self) -> &HidDiscovery {
        &self.discovery
    }
}

impl ChannelSource for HidSource {
    fn open_channel(&self) -> Result<BoxedChannel, TransportError> {
        self.discovery.open(&self.locator)
    }
}

/// Whether the input loop should keep going after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Connection parameters shared by every command
pub struct Session<S> {
    source: S,
    protocols: ProtocolSet,
    printer: Option<PrinterConfig>,
}

impl<S: ChannelSource> Session<S> {
    pub fn new(source: S, protocols: ProtocolSet) -> Self {
        Self {
            source,
            protocols,
            printer: None,
        }
    }

    /// Print all channel traffic
    pub fn with_printer(mut self, printer: Option<PrinterConfig>) -> Self {
        self.printer = printer;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn protocols(&self) -> &ProtocolSet {
        &self.protocols
    }

    /// Open and initialise a display
    pub fn connect(&self) -> Result<BrailleDriver, BrailleError> {
        let mut channel = self.source.open_channel()?;
        if let Some(config) = &self.printer {
            channel = PrinterChannel::wrap(channel, config.clone());
        }
        BrailleDriver::construct(channel, &self.protocols)
    }

    /// Deliver key events to `on_event` until it stops or `running` clears
    ///
    /// The display is reconnected after a channel failure. Returns the
    /// number of events delivered.
    pub fn monitor_input<F>(&self, running: &AtomicBool, mut on_event: F) -> Result<usize, BrailleError>
    where
        F: FnMut(&BrailleDriver, InputEvent) -> Flow,
    {
        let mut driver = self.connect()?;
        let mut delivered = 0;

        while running.load(Ordering::SeqCst) {
            match driver.read_command() {
                PollResult::Event(event) => {
                    delivered += 1;
                    if on_event(&driver, event) == Flow::Stop {
                        break;
                    }
                }
                PollResult::NoEvent => std::thread::sleep(POLL_INTERVAL),
                PollResult::RestartRequested => {
                    warn!("display channel failed, reconnecting");
                    if let Err(e) = driver.destruct() {
                        warn!("closing failed display: {}", e);
                    }
                    match self.reconnect(running) {
                        Some(next) => driver = next,
                        None => return Ok(delivered),
                    }
                }
            }
        }

        driver.destruct()?;
        Ok(delivered)
    }

    fn reconnect(&self, running: &AtomicBool) -> Option<BrailleDriver> {
        while running.load(Ordering::SeqCst) {
            std::thread::sleep(RECONNECT_DELAY);
            match self.connect() {
                Ok(driver) => {
                    info!("reconnected: {}", driver.model_name());
                    return Some(driver);
                }
                Err(e) => warn!("reconnect failed: {}", e),
            }
        }
        None
    }
}
