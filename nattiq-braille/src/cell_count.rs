//! Cell count negotiation

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::BrailleError;
use crate::frame::{build_long_write, Frame};
use crate::protocol::{command, packet_type, timing, MAXIMUM_CELL_COUNT};
use crate::reader::FramedChannel;

/// Where the cell count came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCount {
    /// The device answered the request
    Reported(u8),
    /// The device stayed silent; the profile default applies
    Default(u8),
}

impl CellCount {
    pub fn cells(self) -> u8 {
        match self {
            Self::Reported(n) | Self::Default(n) => n,
        }
    }

    pub fn is_reported(self) -> bool {
        matches!(self, Self::Reported(_))
    }
}

/// Ask the device for its cell count, falling back to `default_cells`
pub fn negotiate(link: &mut FramedChannel, default_cells: u8) -> CellCount {
    for attempt in 1..=timing::CELL_COUNT_ATTEMPTS {
        match request(link) {
            Ok(Some(cells)) => {
                info!("cell count: {}", cells);
                return CellCount::Reported(cells);
            }
            Ok(None) => debug!("no cell count response (attempt {})", attempt),
            Err(e) => warn!("cell count request failed (attempt {}): {}", attempt, e),
        }
    }

    warn!("device did not report its cell count, assuming {}", default_cells);
    CellCount::Default(default_cells)
}

/// One request and its wait window
///
/// Frames that are not a cell count are skipped, but only until the window
/// closes, so a device streaming key frames cannot hold the attempt open.
fn request(link: &mut FramedChannel) -> Result<Option<u8>, BrailleError> {
    let frame = build_long_write(
        command::CELL_COUNT_REQUEST,
        command::MODE_DEFAULT,
        &[0; command::CELL_COUNT_REQUEST_LEN],
        None,
    )?;
    link.write(&frame)?;

    let deadline = Instant::now() + timing::CELL_COUNT_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        let frame = match link.read_frame(remaining)? {
            Some(frame) => frame,
            None => return Ok(None),
        };

        match frame {
            Frame::Long(f) if f.packet_type() == packet_type::CELLS => match f.data() {
                0 => warn!("device reported zero cells, ignoring"),
                n if n > MAXIMUM_CELL_COUNT => {
                    warn!(
                        "device reported {} cells, limiting to {}",
                        n, MAXIMUM_CELL_COUNT
                    );
                    return Ok(Some(MAXIMUM_CELL_COUNT));
                }
                n => return Ok(Some(n)),
            },
            other => debug!("ignoring frame while awaiting cell count: {}", other),
        }
    }
}
