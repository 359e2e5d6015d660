//! Frame-level view of a byte channel

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use nattiq_transport::{BoxedChannel, ChannelInfo, TransportError};
use tracing::{debug, trace, warn};

use crate::frame::{hex, Classification, Frame, FrameDecoder, FrameError};

/// Largest chunk requested from the channel in one read
const READ_CHUNK: usize = 64;

/// A channel with a frame verifier on its inbound side
///
/// Owns the channel for the lifetime of one connection. Partial frames
/// survive across reads, so a frame split over several transport reports is
/// still recognised.
pub struct FramedChannel {
    channel: BoxedChannel,
    decoder: FrameDecoder,
    pending: VecDeque<u8>,
    closed: bool,
}

impl FramedChannel {
    pub fn new(channel: BoxedChannel) -> Self {
        Self {
            channel,
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
            closed: false,
        }
    }

    pub fn info(&self) -> &ChannelInfo {
        self.channel.info()
    }

    /// Send a complete outbound frame
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        debug!("write: {}", hex(bytes));
        self.channel.write_bytes(bytes)
    }

    /// Read the next valid frame, waiting at most `timeout`
    ///
    /// Invalid candidates are logged and skipped. `Ok(None)` means no
    /// complete frame arrived in time; a zero timeout polls.
    pub fn read_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let deadline = Instant::now() + timeout;

        loop {
            while let Some(byte) = self.pending.pop_front() {
                match self.decoder.push(byte) {
                    Classification::IncludeMore => {}
                    Classification::Valid(frame) => {
                        debug!("read: {}", frame);
                        return Ok(Some(frame));
                    }
                    Classification::Invalid { reason, bytes } => log_rejected(&reason, &bytes),
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let mut buf = [0u8; READ_CHUNK];
            let n = self.channel.read_bytes(&mut buf, remaining)?;
            if n == 0 {
                return Ok(None);
            }
            self.pending.extend(&buf[..n]);
        }
    }

    /// Release the channel; later calls do nothing
    pub fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pending.clear();
        self.decoder.reset();
        self.channel.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for FramedChannel {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("closing channel failed: {}", e);
        }
    }
}

fn log_rejected(reason: &FrameError, bytes: &[u8]) {
    match reason {
        // HID reports are zero padded to their full size
        FrameError::UnexpectedLeadByte(0x00) => trace!("discarded padding byte"),
        _ => warn!("invalid frame ({}): {}", reason, hex(bytes)),
    }
}
