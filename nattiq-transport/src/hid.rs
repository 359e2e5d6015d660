//! HID channel implementation for USB and Bluetooth connections

use std::time::Duration;

use hidapi::HidDevice;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::hid::{REPORT_ID, REPORT_SIZE};
use crate::types::ChannelInfo;
use crate::Channel;

/// Byte channel over a HID interface
///
/// Outgoing bytes are split into fixed-size output reports, each prefixed
/// with the report ID and zero-padded. Incoming input reports are handed up
/// verbatim; padding bytes are dropped by the frame verifier.
pub struct HidChannel {
    device: Option<HidDevice>,
    info: ChannelInfo,
}

impl HidChannel {
    /// Create a new channel from an opened HID device
    pub fn new(device: HidDevice, info: ChannelInfo) -> Self {
        Self {
            device: Some(device),
            info,
        }
    }

    fn device(&self) -> Result<&HidDevice, TransportError> {
        self.device.as_ref().ok_or(TransportError::Closed)
    }
}

/// Clamp a timeout to what hidapi accepts (milliseconds as i32)
fn timeout_ms(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX)
}

impl Channel for HidChannel {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let device = self.device()?;

        for chunk in bytes.chunks(REPORT_SIZE) {
            let mut report = [0u8; REPORT_SIZE + 1];
            report[0] = REPORT_ID;
            report[1..1 + chunk.len()].copy_from_slice(chunk);

            let sent = device.write(&report)?;
            if sent < chunk.len() + 1 {
                return Err(TransportError::ShortWrite {
                    sent: sent.saturating_sub(1),
                    expected: chunk.len(),
                });
            }
        }

        debug!("HID wrote {} bytes: {:02X?}", bytes.len(), bytes);
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        let device = self.device()?;
        let n = device.read_timeout(buf, timeout_ms(timeout))?;
        if n > 0 {
            debug!("HID read {} bytes: {:02X?}", n, &buf[..n]);
        }
        Ok(n)
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }

    fn close(&mut self) -> Result<(), TransportError> {
        // HidDevice closes its handle when dropped
        if self.device.take().is_some() {
            debug!("Closed HID channel {}", self.info.device_path);
        }
        Ok(())
    }
}
