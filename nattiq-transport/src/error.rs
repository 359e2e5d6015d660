//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Channel already closed")]
    Closed,

    #[error("Short write: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error("Invalid device locator: {0}")]
    InvalidLocator(String),

    #[error("Unsupported transport: {0}")]
    Unsupported(String),

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_write_message_names_both_counts() {
        let err = TransportError::ShortWrite {
            sent: 3,
            expected: 10,
        };
        assert_eq!(err.to_string(), "Short write: sent 3 of 10 bytes");
    }
}
