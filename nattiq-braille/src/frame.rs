//! Frame codec for the Nattiq wire protocol
//!
//! Inbound traffic is made of two frame shapes:
//!
//! ```text
//! short:  1C id1 id2 1F                                  (identity echo)
//! long:   FA type count data r0 r1 r2 r3 checksum FB     (input / replies)
//! ```
//!
//! Outbound traffic uses a single variable-length shape with two data
//! sections (see [`build_long_write`]).
//!
//! [`FrameDecoder`] classifies a byte stream one byte at a time. Bytes are
//! only reinterpreted as a typed frame once the whole candidate has been
//! verified.

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::protocol::{length, marker, packet_type};

/// Frame rejection and construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// First byte is not the start of any known frame
    #[error("unexpected lead byte 0x{0:02X}")]
    UnexpectedLeadByte(u8),

    /// Final byte is not the frame's end marker
    #[error("bad terminator: expected 0x{expected:02X}, got 0x{got:02X}")]
    BadTerminator { expected: u8, got: u8 },

    /// Checksum byte disagrees with the frame contents
    #[error("checksum mismatch: computed 0x{computed:02X}, frame carries 0x{carried:02X}")]
    ChecksumMismatch { computed: u8, carried: u8 },

    /// Buffer ended before the frame did
    #[error("truncated frame: need {needed} bytes, have {got}")]
    Truncated { needed: usize, got: usize },

    /// A fixed marker byte is wrong
    #[error("bad marker at offset {offset}: expected 0x{expected:02X}, got 0x{got:02X}")]
    BadMarker { offset: usize, expected: u8, got: u8 },

    /// The two command bytes of an output frame differ
    #[error("command bytes differ: 0x{0:02X} / 0x{1:02X}")]
    CommandMismatch(u8, u8),

    /// Buffer continues past the end of the frame
    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    /// Data section does not fit the 16-bit length field
    #[error("payload of {0} bytes exceeds the 16-bit length field")]
    PayloadTooLarge(usize),
}

/// Sum of all bytes, modulo 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Format bytes as space-separated hex for logs
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Inbound frames
// =============================================================================

/// Which inbound frame shape a lead byte announces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Short,
    Long,
}

impl FrameKind {
    /// Classify a lead byte
    pub fn from_lead_byte(byte: u8) -> Option<Self> {
        match byte {
            marker::SHORT_START => Some(Self::Short),
            marker::LONG_START => Some(Self::Long),
            _ => None,
        }
    }

    /// Total length of a frame of this kind
    pub fn length(self) -> usize {
        match self {
            Self::Short => length::SHORT_FRAME,
            Self::Long => length::LONG_FRAME,
        }
    }

    /// Required final byte
    pub fn end_marker(self) -> u8 {
        match self {
            Self::Short => marker::SHORT_END,
            Self::Long => marker::LONG_END,
        }
    }
}

/// Identity frame: `1C id1 id2 1F`
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ShortFrame {
    start: u8,
    id1: u8,
    id2: u8,
    end: u8,
}

impl ShortFrame {
    pub fn new(id1: u8, id2: u8) -> Self {
        Self {
            start: marker::SHORT_START,
            id1,
            id2,
            end: marker::SHORT_END,
        }
    }

    pub fn id1(&self) -> u8 {
        self.id1
    }

    pub fn id2(&self) -> u8 {
        self.id2
    }

    pub fn to_bytes(&self) -> [u8; length::SHORT_FRAME] {
        zerocopy::transmute!(*self)
    }
}

/// Input / reply frame: `FA type count data r0 r1 r2 r3 checksum FB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LongFrame {
    start: u8,
    packet_type: u8,
    count: u8,
    data: u8,
    reserved: [u8; 4],
    checksum: u8,
    end: u8,
}

impl LongFrame {
    /// Build a frame the way the device does, checksum included
    pub fn new(packet_type: u8, count: u8, data: u8, reserved: [u8; 4]) -> Self {
        let mut frame = Self {
            start: marker::LONG_START,
            packet_type,
            count,
            data,
            reserved,
            checksum: 0,
            end: marker::LONG_END,
        };
        frame.checksum = checksum(frame.as_bytes());
        frame
    }

    pub fn packet_type(&self) -> u8 {
        self.packet_type
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn data(&self) -> u8 {
        self.data
    }

    pub fn reserved(&self) -> [u8; 4] {
        self.reserved
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn to_bytes(&self) -> [u8; length::LONG_FRAME] {
        zerocopy::transmute!(*self)
    }

    /// Reserved bytes read as a little-endian key bitset
    pub fn key_bits(&self) -> u32 {
        u32::from_le_bytes(self.reserved)
    }
}

/// A verified inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Short(ShortFrame),
    Long(LongFrame),
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Short(frame) => frame.as_bytes(),
            Self::Long(frame) => frame.as_bytes(),
        }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short(frame) => write!(f, "SHORT id={:02X}/{:02X}", frame.id1, frame.id2),
            Self::Long(frame) => write!(
                f,
                "{} count={} data={} reserved=[{}]",
                packet_type::name(frame.packet_type),
                frame.count,
                frame.data,
                hex(&frame.reserved)
            ),
        }
    }
}

// =============================================================================
// Streaming verifier
// =============================================================================

/// Verifier state between bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Nothing buffered; the next byte must start a frame
    AwaitingFirstByte,
    /// A frame of `kind` has started and needs more bytes
    AwaitingRemainder { kind: FrameKind },
}

/// Result of feeding one byte to the verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Candidate is well-formed so far
    IncludeMore,
    /// Candidate is complete and verified
    Valid(Frame),
    /// Candidate was discarded; the next byte starts over
    Invalid { reason: FrameError, bytes: Vec<u8> },
}

/// Byte-at-a-time frame verifier
///
/// A rejected candidate is dropped whole. Resynchronisation starts at the
/// byte after it; bytes inside a rejected candidate are never re-examined.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
    buffer: [u8; length::LONG_FRAME],
    filled: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::AwaitingFirstByte,
            buffer: [0; length::LONG_FRAME],
            filled: 0,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bytes of the current candidate
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[..self.filled]
    }

    /// Drop any partial candidate
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitingFirstByte;
        self.filled = 0;
    }

    /// Feed one byte
    pub fn push(&mut self, byte: u8) -> Classification {
        let kind = match self.state {
            DecoderState::AwaitingFirstByte => match FrameKind::from_lead_byte(byte) {
                Some(kind) => {
                    self.buffer[0] = byte;
                    self.filled = 1;
                    self.state = DecoderState::AwaitingRemainder { kind };
                    return Classification::IncludeMore;
                }
                None => {
                    return Classification::Invalid {
                        reason: FrameError::UnexpectedLeadByte(byte),
                        bytes: vec![byte],
                    }
                }
            },
            DecoderState::AwaitingRemainder { kind } => kind,
        };

        self.buffer[self.filled] = byte;
        self.filled += 1;
        if self.filled < kind.length() {
            return Classification::IncludeMore;
        }

        let result = self.verify(kind);
        let bytes = self.buffered().to_vec();
        self.reset();
        match result {
            Ok(frame) => Classification::Valid(frame),
            Err(reason) => Classification::Invalid { reason, bytes },
        }
    }

    fn verify(&self, kind: FrameKind) -> Result<Frame, FrameError> {
        let last = self.buffer[kind.length() - 1];
        if last != kind.end_marker() {
            return Err(FrameError::BadTerminator {
                expected: kind.end_marker(),
                got: last,
            });
        }

        match kind {
            FrameKind::Short => {
                let mut bytes = [0u8; length::SHORT_FRAME];
                bytes.copy_from_slice(&self.buffer[..length::SHORT_FRAME]);
                let frame: ShortFrame = zerocopy::transmute!(bytes);
                Ok(Frame::Short(frame))
            }
            FrameKind::Long => {
                let frame: LongFrame = zerocopy::transmute!(self.buffer);
                let computed = checksum(&self.buffer).wrapping_sub(frame.checksum);
                if computed != frame.checksum {
                    return Err(FrameError::ChecksumMismatch {
                        computed,
                        carried: frame.checksum,
                    });
                }
                Ok(Frame::Long(frame))
            }
        }
    }
}

// =============================================================================
// Outbound frames
// =============================================================================

/// Identity probe: `1C id1 id2 1F`
pub fn build_short_frame(id1: u8, id2: u8) -> [u8; length::SHORT_FRAME] {
    ShortFrame::new(id1, id2).to_bytes()
}

/// Build a host-to-device frame
///
/// ```text
/// cmd cmd mode F0 len1(LE16) data1.. F1 F2 len2(LE16) data2.. F3 00 00 00 00 ck FD FD
/// ```
///
/// The checksum is the byte sum of the whole frame, trailing `FD FD`
/// included, with the checksum slot counted as zero.
pub fn build_long_write(
    command: u8,
    mode: u8,
    data1: &[u8],
    data2: Option<&[u8]>,
) -> Result<Vec<u8>, FrameError> {
    let data2 = data2.unwrap_or(&[]);
    let len1 = u16::try_from(data1.len()).map_err(|_| FrameError::PayloadTooLarge(data1.len()))?;
    let len2 = u16::try_from(data2.len()).map_err(|_| FrameError::PayloadTooLarge(data2.len()))?;

    let mut frame = Vec::with_capacity(length::OUTPUT_OVERHEAD + data1.len() + data2.len());
    frame.extend_from_slice(&[command, command, mode, marker::DATA1_START]);
    frame.extend_from_slice(&len1.to_le_bytes());
    frame.extend_from_slice(data1);
    frame.extend_from_slice(&[marker::DATA1_END, marker::DATA2_START]);
    frame.extend_from_slice(&len2.to_le_bytes());
    frame.extend_from_slice(data2);
    frame.push(marker::DATA2_END);
    frame.extend_from_slice(&[0; length::OUTPUT_RESERVED]);
    let checksum_at = frame.len();
    frame.push(0);
    frame.extend_from_slice(&[marker::OUTPUT_END, marker::OUTPUT_END]);
    frame[checksum_at] = checksum(&frame);
    Ok(frame)
}

/// A decoded host-to-device frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFrame {
    pub command: u8,
    pub mode: u8,
    pub data1: Vec<u8>,
    pub data2: Vec<u8>,
}

impl OutputFrame {
    /// Decode and verify a complete frame produced by [`build_long_write`]
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        let mut cursor = OutputCursor { bytes, pos: 0 };

        let command = cursor.byte()?;
        let repeat = cursor.byte()?;
        if command != repeat {
            return Err(FrameError::CommandMismatch(command, repeat));
        }
        let mode = cursor.byte()?;

        cursor.expect_byte(marker::DATA1_START)?;
        let len1 = cursor.u16_le()?;
        let data1 = cursor.take(len1 as usize)?.to_vec();
        cursor.expect_byte(marker::DATA1_END)?;

        cursor.expect_byte(marker::DATA2_START)?;
        let len2 = cursor.u16_le()?;
        let data2 = cursor.take(len2 as usize)?.to_vec();
        cursor.expect_byte(marker::DATA2_END)?;

        for _ in 0..length::OUTPUT_RESERVED {
            cursor.expect_byte(0)?;
        }
        let carried = cursor.byte()?;
        cursor.expect_byte(marker::OUTPUT_END)?;
        cursor.expect_byte(marker::OUTPUT_END)?;

        if cursor.pos != bytes.len() {
            return Err(FrameError::TrailingBytes(bytes.len() - cursor.pos));
        }

        let computed = checksum(bytes).wrapping_sub(carried);
        if computed != carried {
            return Err(FrameError::ChecksumMismatch { computed, carried });
        }

        Ok(Self {
            command,
            mode,
            data1,
            data2,
        })
    }
}

struct OutputCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> OutputCursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], FrameError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(FrameError::Truncated {
                needed: end,
                got: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, FrameError> {
        Ok(self.take(1)?[0])
    }

    fn u16_le(&mut self) -> Result<u16, FrameError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<(), FrameError> {
        let offset = self.pos;
        let got = self.byte()?;
        if got != expected {
            return Err(FrameError::BadMarker {
                offset,
                expected,
                got,
            });
        }
        Ok(())
    }
}
