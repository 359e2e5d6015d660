//! Transport abstraction layer for Nattiq braille display communication
//!
//! This crate turns whatever physical link the display is attached through
//! into an opaque byte channel:
//!
//! - HID over USB (direct cable connection)
//! - HID over Bluetooth (kernel hid-over-gatt / hidp driver)
//!
//! Framing, checksums and device semantics live one layer up, in
//! `nattiq-braille`. Everything here only moves bytes.

pub mod error;
pub mod locator;
pub mod printer;
pub mod protocol;
pub mod types;

mod discovery;
mod hid;

#[cfg(feature = "mock")]
pub mod mock;

pub use discovery::HidDiscovery;
pub use error::TransportError;
pub use hid::HidChannel;
pub use locator::DeviceLocator;
pub use printer::{OutputFormat, PrinterChannel, PrinterConfig};
pub use protocol::{BluetoothParams, ChannelDefinition, ChannelDescriptor};
pub use types::{ChannelInfo, DiscoveredDevice, TransportType};

#[cfg(feature = "mock")]
pub use mock::{MockChannel, MockHandle};

use std::time::Duration;

/// The core channel trait - all backends implement this
///
/// A channel is acquired once when a device is connected and released once
/// when it is disconnected. It carries no protocol knowledge.
pub trait Channel: Send {
    /// Write all bytes to the device
    ///
    /// Returns an error if the device refused or dropped any part of the
    /// buffer. Callers do not retry; retry policy belongs to the host.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read whatever bytes are available, waiting up to `timeout`
    ///
    /// # Returns
    /// * `Ok(0)` - nothing arrived before the timeout (a zero timeout polls)
    /// * `Ok(n)` - `n` bytes were stored at the start of `buf`
    /// * `Err(_)` - a genuine transport failure; the connection is unusable
    fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;

    /// Get channel information
    fn info(&self) -> &ChannelInfo;

    /// Release the underlying resource
    ///
    /// Must be idempotent: closing twice is not an error.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Type alias for a boxed channel
pub type BoxedChannel = Box<dyn Channel>;
