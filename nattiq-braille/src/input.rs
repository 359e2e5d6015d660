//! Inbound key events

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::frame::Frame;
use crate::keys::KeyGroup;
use crate::protocol::packet_type;
use crate::reader::FramedChannel;

/// A key event reported by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Routing key above cell `index` was pressed
    RoutingKeyPress { index: u8 },
    /// Navigation keys currently held, one bit per key
    NavigationKeySet { bits: u32 },
}

impl InputEvent {
    pub fn group(&self) -> KeyGroup {
        match self {
            Self::RoutingKeyPress { .. } => KeyGroup::RoutingKeys,
            Self::NavigationKeySet { .. } => KeyGroup::NavigationKeys,
        }
    }
}

/// Result of one input poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    Event(InputEvent),
    /// Nothing pending
    NoEvent,
    /// The channel failed; the host should reconnect
    RestartRequested,
}

/// Map a verified frame to a key event, if it carries one
pub fn decode(frame: &Frame) -> Option<InputEvent> {
    match frame {
        Frame::Long(f) => match f.packet_type() {
            packet_type::CURSOR => Some(InputEvent::RoutingKeyPress { index: f.data() }),
            packet_type::KEYS => Some(InputEvent::NavigationKeySet { bits: f.key_bits() }),
            _ => None,
        },
        Frame::Short(_) => None,
    }
}

/// Return the next pending key event without blocking
pub fn poll(link: &mut FramedChannel) -> PollResult {
    loop {
        match link.read_frame(Duration::ZERO) {
            Ok(Some(frame)) => match decode(&frame) {
                Some(event) => return PollResult::Event(event),
                None => debug!("unexpected frame: {}", frame),
            },
            Ok(None) => return PollResult::NoEvent,
            Err(e) => {
                warn!("input read failed: {}", e);
                return PollResult::RestartRequested;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{build_short_frame, LongFrame};
    use nattiq_transport::MockChannel;

    fn long(kind: u8, data: u8, reserved: [u8; 4]) -> Vec<u8> {
        LongFrame::new(kind, 0, data, reserved).to_bytes().to_vec()
    }

    #[test]
    fn decodes_cursor_and_keys() {
        let (channel, handle) = MockChannel::new();
        handle.push_inbound(&long(packet_type::CURSOR, 5, [0; 4]));
        handle.push_inbound(&long(packet_type::KEYS, 0, [0x01, 0x00, 0x00, 0x00]));
        let mut link = FramedChannel::new(Box::new(channel));

        assert_eq!(
            poll(&mut link),
            PollResult::Event(InputEvent::RoutingKeyPress { index: 5 })
        );
        assert_eq!(
            poll(&mut link),
            PollResult::Event(InputEvent::NavigationKeySet { bits: 0x0000_0001 })
        );
        assert_eq!(poll(&mut link), PollResult::NoEvent);
    }

    #[test]
    fn key_bits_are_little_endian() {
        let (channel, handle) = MockChannel::new();
        handle.push_inbound(&long(packet_type::KEYS, 0, [0x00, 0x60, 0x00, 0x80]));
        let mut link = FramedChannel::new(Box::new(channel));
        assert_eq!(
            poll(&mut link),
            PollResult::Event(InputEvent::NavigationKeySet { bits: 0x8000_6000 })
        );
    }

    #[test]
    fn skips_unexpected_and_invalid_frames() {
        let (channel, handle) = MockChannel::new();
        handle.push_inbound(&long(packet_type::CELLS, 32, [0; 4]));
        handle.push_inbound(&build_short_frame(1, 2));
        let mut corrupt = long(packet_type::CURSOR, 9, [0; 4]);
        corrupt[8] ^= 0xFF;
        handle.push_inbound(&corrupt);
        handle.push_inbound(&long(packet_type::CURSOR, 3, [0; 4]));
        let mut link = FramedChannel::new(Box::new(channel));

        assert_eq!(
            poll(&mut link),
            PollResult::Event(InputEvent::RoutingKeyPress { index: 3 })
        );
    }

    #[test]
    fn read_error_requests_restart() {
        let (channel, handle) = MockChannel::new();
        handle.fail_reads(true);
        let mut link = FramedChannel::new(Box::new(channel));
        assert_eq!(poll(&mut link), PollResult::RestartRequested);
    }

    #[test]
    fn events_know_their_group() {
        assert_eq!(
            InputEvent::RoutingKeyPress { index: 0 }.group(),
            KeyGroup::RoutingKeys
        );
        assert_eq!(
            InputEvent::NavigationKeySet { bits: 0 }.group(),
            KeyGroup::NavigationKeys
        );
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&InputEvent::RoutingKeyPress { index: 2 }).unwrap();
        assert_eq!(json, r#"{"event":"routing_key_press","index":2}"#);
    }
}
