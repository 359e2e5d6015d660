//! Protocol constants for Nattiq display communication

/// Fixed marker bytes of the inbound and outbound frame shapes
pub mod marker {
    /// Start of a short (identity) frame
    pub const SHORT_START: u8 = 0x1C;
    /// End of a short (identity) frame
    pub const SHORT_END: u8 = 0x1F;
    /// Start of a long (input) frame
    pub const LONG_START: u8 = 0xFA;
    /// End of a long (input) frame
    pub const LONG_END: u8 = 0xFB;

    /// Output frame: data section 1 start / end
    pub const DATA1_START: u8 = 0xF0;
    pub const DATA1_END: u8 = 0xF1;
    /// Output frame: data section 2 start / end
    pub const DATA2_START: u8 = 0xF2;
    pub const DATA2_END: u8 = 0xF3;
    /// Output frame: trailing end byte (written twice)
    pub const OUTPUT_END: u8 = 0xFD;
}

/// Frame lengths
pub mod length {
    pub const SHORT_FRAME: usize = 4;
    pub const LONG_FRAME: usize = 10;
    /// Reserved zero bytes before an output frame's checksum
    pub const OUTPUT_RESERVED: usize = 4;
    /// Output frame bytes excluding both data sections
    pub const OUTPUT_OVERHEAD: usize = 2 + 1 + 1 + 2 + 1 + 1 + 2 + 1 + OUTPUT_RESERVED + 1 + 2;
}

/// Long frame type byte (what the device is reporting)
pub mod packet_type {
    /// Routing key press; `data` is the cell index
    pub const CURSOR: u8 = 0x00;
    /// Navigation keys; reserved bytes hold the pressed-key bitset
    pub const KEYS: u8 = 0x01;
    /// Cell count response; `data` is the number of cells
    pub const CELLS: u8 = 0x02;

    /// Get human-readable name for a packet type
    pub fn name(kind: u8) -> &'static str {
        match kind {
            CURSOR => "CURSOR",
            KEYS => "KEYS",
            CELLS => "CELLS",
            _ => "UNKNOWN",
        }
    }
}

/// Output frame command byte (what the host is asking for)
pub mod command {
    /// Ask the device how many cells it has
    pub const CELL_COUNT_REQUEST: u8 = 0xFB;
    /// Write the braille window
    pub const WRITE_CELLS: u8 = 0xFC;

    /// The only mode either command is sent with
    pub const MODE_DEFAULT: u8 = 0x01;

    /// Zero bytes padding the cell count request
    pub const CELL_COUNT_REQUEST_LEN: usize = 32;

    /// Get human-readable name for a command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            CELL_COUNT_REQUEST => "CELL_COUNT_REQUEST",
            WRITE_CELLS => "WRITE_CELLS",
            _ => "UNKNOWN",
        }
    }
}

/// Communication timing constants
pub mod timing {
    use std::time::Duration;

    /// Wait for each response read while probing an identity
    pub const IDENTITY_READ_TIMEOUT: Duration = Duration::from_millis(200);
    /// Wait for a cell count response, per attempt
    pub const CELL_COUNT_TIMEOUT: Duration = Duration::from_millis(1000);
    /// Cell count request attempts before falling back to the default
    pub const CELL_COUNT_ATTEMPTS: usize = 2;
}

/// Largest display the hardware family has
pub const MAXIMUM_CELL_COUNT: u8 = 40;

/// Displays are a single row of cells
pub const TEXT_ROWS: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_overhead_matches_layout() {
        // type,type,mode,F0,len1(2),F1,F2,len2(2),F3,reserved(4),checksum,FD,FD
        assert_eq!(length::OUTPUT_OVERHEAD, 18);
    }

    #[test]
    fn names() {
        assert_eq!(packet_type::name(packet_type::KEYS), "KEYS");
        assert_eq!(packet_type::name(0x7F), "UNKNOWN");
        assert_eq!(command::name(command::WRITE_CELLS), "WRITE_CELLS");
    }
}
