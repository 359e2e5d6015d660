//! Mock channel for deterministic testing of protocol engines
//!
//! [`MockChannel`] implements [`Channel`] over in-memory queues. A
//! [`MockHandle`] shares the same state, so a test can keep scripting and
//! inspecting the channel after it has been boxed and handed to a driver.
//!
//! # Example
//!
//! ```
//! use nattiq_transport::{Channel, MockChannel};
//! use std::time::Duration;
//!
//! let (mut channel, handle) = MockChannel::new();
//! // Echo every write back, like a device acknowledging a probe.
//! handle.respond_with(|written| written.to_vec());
//!
//! channel.write_bytes(&[0x1C, 0x01, 0x02, 0x1F]).unwrap();
//! let mut buf = [0u8; 8];
//! let n = channel.read_bytes(&mut buf, Duration::from_millis(200)).unwrap();
//! assert_eq!(&buf[..n], &[0x1C, 0x01, 0x02, 0x1F]);
//! assert_eq!(handle.written().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Channel, ChannelInfo, TransportError, TransportType};

type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

struct MockState {
    /// Bytes waiting to be read
    inbound: VecDeque<u8>,
    /// Largest number of bytes one read returns
    chunk_size: usize,
    /// Produces device replies for each write
    responder: Option<Responder>,
    /// Every buffer passed to `write_bytes`, in order
    written: Vec<Vec<u8>>,
    fail_writes: bool,
    fail_reads: bool,
    closed: bool,
    close_count: usize,
}

/// A scripted in-memory [`Channel`]
///
/// Reads never block: an empty inbound queue reports "nothing arrived"
/// immediately, which is what a real channel reports once its timeout
/// expires.
pub struct MockChannel {
    info: ChannelInfo,
    state: Arc<Mutex<MockState>>,
}

/// Shared view of a [`MockChannel`] for scripting and assertions
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    /// Create a new mock channel and its handle
    pub fn new() -> (Self, MockHandle) {
        Self::with_info(ChannelInfo {
            vid: crate::protocol::usb::VENDOR_ID,
            pid: crate::protocol::usb::PRODUCT_ID,
            transport_type: TransportType::Mock,
            device_path: "mock".into(),
            serial: None,
            resource_name: None,
            profile_hint: None,
        })
    }

    /// Create a mock channel reporting the given channel information
    pub fn with_info(info: ChannelInfo) -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState {
            inbound: VecDeque::new(),
            chunk_size: usize::MAX,
            responder: None,
            written: Vec::new(),
            fail_writes: false,
            fail_reads: false,
            closed: false,
            close_count: 0,
        }));
        let handle = MockHandle {
            state: Arc::clone(&state),
        };
        (Self { info, state }, handle)
    }

    /// Set the resource name matched against profile prefixes
    pub fn resource_name(mut self, name: &str) -> Self {
        self.info.resource_name = Some(name.to_string());
        self
    }

    /// Set the profile hint attached by discovery
    pub fn profile_hint(mut self, hint: &str) -> Self {
        self.info.profile_hint = Some(hint.to_string());
        self
    }
}

impl MockHandle {
    /// Queue bytes for the driver to read
    pub fn push_inbound(&self, bytes: &[u8]) {
        self.state.lock().inbound.extend(bytes.iter().copied());
    }

    /// Limit how many bytes a single read returns (simulates fragmentation)
    pub fn set_chunk_size(&self, size: usize) {
        self.state.lock().chunk_size = size.max(1);
    }

    /// Install a device model: called for every write, its return value is
    /// queued as inbound bytes
    pub fn respond_with<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    {
        self.state.lock().responder = Some(Box::new(responder));
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make subsequent reads fail with a transport error
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// All buffers written so far
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// Forget recorded writes
    pub fn clear_written(&self) {
        self.state.lock().written.clear();
    }

    /// Number of bytes still waiting to be read
    pub fn pending_inbound(&self) -> usize {
        self.state.lock().inbound.len()
    }

    /// How many times `close` has been called
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }

    /// Whether the channel has been closed
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Channel for MockChannel {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        if state.fail_writes {
            return Err(TransportError::Io("mock write failure".into()));
        }

        state.written.push(bytes.to_vec());
        let reply = state.responder.as_mut().map(|r| r(bytes));
        if let Some(reply) = reply {
            state.inbound.extend(reply);
        }
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        if state.fail_reads {
            return Err(TransportError::Io("mock read failure".into()));
        }

        let n = buf.len().min(state.chunk_size).min(state.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.closed = true;
        state.close_count += 1;
        Ok(())
    }
}
