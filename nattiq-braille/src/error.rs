//! Braille display interface error types

use nattiq_transport::TransportError;
use thiserror::Error;

/// Errors from display operations
#[derive(Error, Debug)]
pub enum BrailleError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cell buffer length differs from the negotiated cell count
    #[error("Cell count mismatch: display has {expected} cells, got {got}")]
    CellCountMismatch { expected: usize, got: usize },

    /// A cell could not be parsed from its dot-number notation
    #[error("Invalid cell: {0}")]
    InvalidCell(String),

    /// Outbound frame could not be built
    #[error("Frame error: {0}")]
    Frame(#[from] crate::frame::FrameError),
}
