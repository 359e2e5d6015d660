//! Display and input interface for Nattiq braille displays
//!
//! This crate speaks the Nattiq wire protocol on top of any
//! [`nattiq_transport::Channel`]: it frames and verifies inbound bytes,
//! identifies the attached model, negotiates the cell count, pushes cell
//! updates only when they change and turns key frames into events.
//!
//! The whole core is synchronous and single threaded. Timeouts are the only
//! waits: 200 ms per identity read, two 1000 ms cell count attempts, and
//! none at all when polling for input.

pub mod cell_count;
pub mod dots;
pub mod driver;
pub mod error;
pub mod frame;
pub mod identity;
pub mod input;
pub mod keys;
pub mod profile;
pub mod protocol;
pub mod reader;
pub mod render;

pub use cell_count::CellCount;
pub use dots::{DotTable, OutputTable, ISO_11548_1};
pub use driver::BrailleDriver;
pub use error::BrailleError;
pub use frame::{
    build_long_write, build_short_frame, Classification, Frame, FrameDecoder, FrameError,
    FrameKind, LongFrame, OutputFrame, ShortFrame,
};
pub use input::{InputEvent, PollResult};
pub use keys::{KeyGroup, KeyTableId};
pub use profile::{DeviceIdentity, KeyTableOverride, ProtocolProfile, ProtocolSet};
pub use reader::FramedChannel;
pub use render::{DisplayRenderer, RenderOutcome};
