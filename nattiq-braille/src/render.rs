//! Display output with change suppression

use tracing::debug;

use crate::dots::{DotTable, OutputTable};
use crate::error::BrailleError;
use crate::frame::build_long_write;
use crate::protocol::command;
use crate::reader::FramedChannel;

/// What a render call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Cells matched what the display already shows; nothing was sent
    Unchanged,
    /// A cell write was sent
    Transmitted,
}

/// Keeps the display in step with the host's cell buffer
///
/// `previous_cells` always holds the last buffer the device accepted, so a
/// failed write is retried by the next render of the same cells.
#[derive(Debug, Clone)]
pub struct DisplayRenderer {
    previous_cells: Vec<u8>,
    output_table: OutputTable,
}

impl DisplayRenderer {
    pub fn new(cell_count: u8, dots: &DotTable) -> Self {
        Self {
            previous_cells: vec![0; cell_count as usize],
            output_table: OutputTable::new(dots),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.previous_cells.len()
    }

    /// Cells the display is known to show
    pub fn previous_cells(&self) -> &[u8] {
        &self.previous_cells
    }

    /// Send `cells` if they differ from what is displayed
    pub fn render(
        &mut self,
        link: &mut FramedChannel,
        cells: &[u8],
    ) -> Result<RenderOutcome, BrailleError> {
        if cells.len() != self.previous_cells.len() {
            return Err(BrailleError::CellCountMismatch {
                expected: self.previous_cells.len(),
                got: cells.len(),
            });
        }
        if cells == self.previous_cells.as_slice() {
            return Ok(RenderOutcome::Unchanged);
        }

        self.transmit(link, cells)?;
        Ok(RenderOutcome::Transmitted)
    }

    /// Blank the display, whatever it is believed to show
    pub fn clear(&mut self, link: &mut FramedChannel) -> Result<(), BrailleError> {
        let blank = vec![0; self.previous_cells.len()];
        self.transmit(link, &blank)
    }

    fn transmit(&mut self, link: &mut FramedChannel, cells: &[u8]) -> Result<(), BrailleError> {
        let device_cells = self.output_table.translate(cells);
        let frame = build_long_write(
            command::WRITE_CELLS,
            command::MODE_DEFAULT,
            &device_cells,
            None,
        )?;
        link.write(&frame)?;
        debug!("wrote {} cells", cells.len());
        self.previous_cells.copy_from_slice(cells);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dots::ISO_11548_1;
    use crate::frame::OutputFrame;
    use nattiq_transport::{MockChannel, MockHandle};

    fn setup(cells: u8) -> (DisplayRenderer, FramedChannel, MockHandle) {
        let (channel, handle) = MockChannel::new();
        (
            DisplayRenderer::new(cells, &ISO_11548_1),
            FramedChannel::new(Box::new(channel)),
            handle,
        )
    }

    #[test]
    fn same_cells_are_sent_once() {
        let (mut renderer, mut link, handle) = setup(4);
        let cells = [0x01, 0x03, 0x00, 0xFF];
        assert_eq!(
            renderer.render(&mut link, &cells).unwrap(),
            RenderOutcome::Transmitted
        );
        assert_eq!(
            renderer.render(&mut link, &cells).unwrap(),
            RenderOutcome::Unchanged
        );

        let written = handle.written();
        assert_eq!(written.len(), 1);
        let frame = OutputFrame::parse(&written[0]).unwrap();
        assert_eq!(frame.command, command::WRITE_CELLS);
        assert_eq!(frame.data1, cells.to_vec());
    }

    #[test]
    fn blank_render_on_fresh_display_sends_nothing() {
        let (mut renderer, mut link, handle) = setup(2);
        assert_eq!(
            renderer.render(&mut link, &[0, 0]).unwrap(),
            RenderOutcome::Unchanged
        );
        assert!(handle.written().is_empty());
    }

    #[test]
    fn clear_is_always_sent() {
        let (mut renderer, mut link, handle) = setup(3);
        renderer.clear(&mut link).unwrap();
        renderer.clear(&mut link).unwrap();
        assert_eq!(handle.written().len(), 2);
        assert_eq!(renderer.previous_cells(), &[0, 0, 0]);
    }

    #[test]
    fn failed_write_keeps_previous_cells() {
        let (mut renderer, mut link, handle) = setup(2);
        handle.fail_writes(true);
        assert!(renderer.render(&mut link, &[1, 2]).is_err());
        assert_eq!(renderer.previous_cells(), &[0, 0]);

        handle.fail_writes(false);
        assert_eq!(
            renderer.render(&mut link, &[1, 2]).unwrap(),
            RenderOutcome::Transmitted
        );
        assert_eq!(renderer.previous_cells(), &[1, 2]);
    }

    #[test]
    fn wrong_length_is_rejected_without_io() {
        let (mut renderer, mut link, handle) = setup(4);
        assert!(matches!(
            renderer.render(&mut link, &[1, 2]),
            Err(BrailleError::CellCountMismatch {
                expected: 4,
                got: 2
            })
        ));
        assert!(handle.written().is_empty());
    }

    #[test]
    fn cells_are_translated_for_the_device() {
        let (channel, handle) = MockChannel::new();
        let mut link = FramedChannel::new(Box::new(channel));
        let swapped = DotTable([0x02, 0x01, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80]);
        let mut renderer = DisplayRenderer::new(1, &swapped);

        renderer.render(&mut link, &[0x01]).unwrap();
        let frame = OutputFrame::parse(&handle.written()[0]).unwrap();
        assert_eq!(frame.data1, vec![0x02]);
        // Logical cells are remembered, not device cells
        assert_eq!(renderer.previous_cells(), &[0x01]);
    }
}
