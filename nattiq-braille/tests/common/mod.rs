//! Scripted Nattiq device for integration tests

#![allow(dead_code)]

use nattiq_braille::frame::{build_short_frame, LongFrame, OutputFrame};
use nattiq_braille::protocol::{command, packet_type};
use nattiq_transport::{MockChannel, MockHandle};

/// How the simulated device answers host writes
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceModel {
    /// Identity the device echoes; any other probe gets this identity back
    pub identity: Option<(u8, u8)>,
    /// Answer cell count requests with this many cells
    pub cells: Option<u8>,
}

impl DeviceModel {
    pub fn identity(mut self, id1: u8, id2: u8) -> Self {
        self.identity = Some((id1, id2));
        self
    }

    pub fn cells(mut self, cells: u8) -> Self {
        self.cells = Some(cells);
        self
    }

    /// Reply to one host write
    pub fn respond(&self, written: &[u8]) -> Vec<u8> {
        if written.len() == 4 && written[0] == 0x1C {
            return match self.identity {
                Some((id1, id2)) if written[1] == id1 && written[2] == id2 => written.to_vec(),
                Some((id1, id2)) => build_short_frame(id1, id2).to_vec(),
                None => Vec::new(),
            };
        }

        match OutputFrame::parse(written) {
            Ok(frame) if frame.command == command::CELL_COUNT_REQUEST => {
                self.cells.map(cells_frame).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// A mock channel driven by this model
    pub fn attach(self) -> (MockChannel, MockHandle) {
        let (channel, handle) = MockChannel::new();
        handle.respond_with(move |w| self.respond(w));
        (channel, handle)
    }
}

/// Cell buffers the host has written, in order
pub fn shown_cells(handle: &MockHandle) -> Vec<Vec<u8>> {
    handle
        .written()
        .iter()
        .filter_map(|w| OutputFrame::parse(w).ok())
        .filter(|f| f.command == command::WRITE_CELLS)
        .map(|f| f.data1)
        .collect()
}

/// Identity probes the host has written, as (id1, id2)
pub fn probes(handle: &MockHandle) -> Vec<(u8, u8)> {
    handle
        .written()
        .iter()
        .filter(|w| w.len() == 4 && w[0] == 0x1C)
        .map(|w| (w[1], w[2]))
        .collect()
}

pub fn cells_frame(n: u8) -> Vec<u8> {
    LongFrame::new(packet_type::CELLS, 0, n, [0; 4])
        .to_bytes()
        .to_vec()
}

pub fn cursor_frame(index: u8) -> Vec<u8> {
    LongFrame::new(packet_type::CURSOR, 0, index, [0; 4])
        .to_bytes()
        .to_vec()
}

pub fn keys_frame(reserved: [u8; 4]) -> Vec<u8> {
    LongFrame::new(packet_type::KEYS, 0, 0, reserved)
        .to_bytes()
        .to_vec()
}
