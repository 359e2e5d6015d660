//! Device locator parsing
//!
//! Locators select which physical display to open:
//!
//! - `auto` or empty - first matching display on any bus
//! - `usb:` - first display on USB
//! - `usb:<serial>` - the USB display with that serial number
//! - `bluetooth:<address>` (or `bt:`) - the Bluetooth display with that address
//! - `serial:<path>` - a serial line (recognized, not supported)

use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Which device the host asked for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceLocator {
    #[default]
    Any,
    Usb {
        serial: Option<String>,
    },
    Bluetooth {
        address: String,
    },
    Serial {
        path: String,
    },
}

impl DeviceLocator {
    /// Check whether a discovered device satisfies this locator
    pub fn accepts(&self, device: &crate::DiscoveredDevice) -> bool {
        use crate::TransportType;

        let info = &device.info;
        match self {
            Self::Any => true,
            Self::Usb { serial } => {
                info.transport_type == TransportType::Usb
                    && serial
                        .as_deref()
                        .map_or(true, |s| info.serial.as_deref() == Some(s))
            }
            Self::Bluetooth { address } => {
                info.transport_type == TransportType::Bluetooth
                    && info
                        .serial
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(address))
            }
            Self::Serial { .. } => false,
        }
    }
}

impl FromStr for DeviceLocator {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Any);
        }

        let (qualifier, operand) = s
            .split_once(':')
            .ok_or_else(|| TransportError::InvalidLocator(format!("missing qualifier: \"{s}\"")))?;

        match qualifier.to_ascii_lowercase().as_str() {
            "usb" => Ok(Self::Usb {
                serial: (!operand.is_empty()).then(|| operand.to_string()),
            }),
            "bluetooth" | "bt" => {
                if operand.is_empty() {
                    return Err(TransportError::InvalidLocator(
                        "bluetooth locator needs an address".into(),
                    ));
                }
                Ok(Self::Bluetooth {
                    address: operand.to_string(),
                })
            }
            "serial" => {
                if operand.is_empty() {
                    return Err(TransportError::InvalidLocator(
                        "serial locator needs a device path".into(),
                    ));
                }
                Ok(Self::Serial {
                    path: operand.to_string(),
                })
            }
            other => Err(TransportError::InvalidLocator(format!(
                "unknown qualifier \"{other}\". Use usb:, bluetooth: or serial:"
            ))),
        }
    }
}

impl fmt::Display for DeviceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("auto"),
            Self::Usb { serial: None } => f.write_str("usb:"),
            Self::Usb { serial: Some(s) } => write!(f, "usb:{s}"),
            Self::Bluetooth { address } => write!(f, "bluetooth:{address}"),
            Self::Serial { path } => write!(f, "serial:{path}"),
        }
    }
}
