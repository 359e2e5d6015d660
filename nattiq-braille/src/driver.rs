//! Driver lifecycle for one connected display
//!
//! ```text
//! select profile -> probe identity -> negotiate cells -> bind keys -> clear
//! ```
//!
//! after which the host alternates [`BrailleDriver::write_window`] and
//! [`BrailleDriver::read_command`] until it calls
//! [`BrailleDriver::destruct`] or a poll reports
//! [`PollResult::RestartRequested`].

use nattiq_transport::{BoxedChannel, ChannelInfo, TransportError};
use tracing::{info, warn};

use crate::cell_count::{self, CellCount};
use crate::error::BrailleError;
use crate::identity;
use crate::input::{self, PollResult};
use crate::keys::KeyTableId;
use crate::profile::{DeviceIdentity, ProtocolProfile, ProtocolSet};
use crate::protocol::TEXT_ROWS;
use crate::reader::FramedChannel;
use crate::render::{DisplayRenderer, RenderOutcome};

/// A connected, initialised braille display
pub struct BrailleDriver {
    link: FramedChannel,
    profile: ProtocolProfile,
    identity: Option<DeviceIdentity>,
    cell_count: CellCount,
    key_table: KeyTableId,
    renderer: DisplayRenderer,
}

impl BrailleDriver {
    /// Initialise a display on an open channel
    ///
    /// Takes ownership of the channel. If initialisation fails the channel
    /// has been closed by the time the error is returned.
    pub fn construct(channel: BoxedChannel, protocols: &ProtocolSet) -> Result<Self, BrailleError> {
        let mut link = FramedChannel::new(channel);

        let profile = protocols.select(link.info()).clone();
        info!("detected: {}", profile.model_name);

        let identity = profile
            .identities
            .as_deref()
            .and_then(|candidates| identity::probe(&mut link, candidates));

        let cell_count = cell_count::negotiate(&mut link, profile.default_cell_count);
        let key_table =
            profile.bind_key_table(identity.map(|i| i.key_table), cell_count.cells());
        let mut renderer = DisplayRenderer::new(cell_count.cells(), &profile.dot_table);

        if let Err(e) = renderer.clear(&mut link) {
            warn!("initial clear failed: {}", e);
            if let Err(close_err) = link.close() {
                warn!("closing channel failed: {}", close_err);
            }
            return Err(e);
        }

        info!(
            "{}: {} cells, key table {}",
            profile.model_name,
            cell_count.cells(),
            key_table
        );
        Ok(Self {
            link,
            profile,
            identity,
            cell_count,
            key_table,
            renderer,
        })
    }

    /// Release the channel
    pub fn destruct(mut self) -> Result<(), TransportError> {
        self.link.close()
    }

    /// Show `cells` on the display, sending only if they changed
    ///
    /// An error means the cells could not be transmitted; nothing is retried.
    pub fn write_window(&mut self, cells: &[u8]) -> Result<RenderOutcome, BrailleError> {
        self.renderer.render(&mut self.link, cells)
    }

    /// Blank the display unconditionally
    pub fn clear(&mut self) -> Result<(), BrailleError> {
        self.renderer.clear(&mut self.link)
    }

    /// Next pending key event, without blocking
    pub fn read_command(&mut self) -> PollResult {
        input::poll(&mut self.link)
    }

    pub fn profile(&self) -> &ProtocolProfile {
        &self.profile
    }

    pub fn model_name(&self) -> &str {
        &self.profile.model_name
    }

    /// Identity confirmed by probing, if the profile probes
    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.identity
    }

    pub fn cell_count(&self) -> CellCount {
        self.cell_count
    }

    /// Display width in cells
    pub fn text_columns(&self) -> usize {
        self.renderer.cell_count()
    }

    pub fn text_rows(&self) -> u8 {
        TEXT_ROWS
    }

    pub fn key_table(&self) -> KeyTableId {
        self.key_table
    }

    /// Cells the display is known to show
    pub fn previous_cells(&self) -> &[u8] {
        self.renderer.previous_cells()
    }

    pub fn channel_info(&self) -> &ChannelInfo {
        self.link.info()
    }
}
