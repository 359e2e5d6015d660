//! Common types for transport layer

use serde::Serialize;

/// Transport type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    /// Direct USB connection
    Usb,
    /// Bluetooth connection
    Bluetooth,
    /// In-memory channel (tests and simulation)
    Mock,
}

/// Channel identification information
#[derive(Debug, Clone, Serialize)]
pub struct ChannelInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Transport type
    pub transport_type: TransportType,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number (Bluetooth address for wireless devices) if available
    pub serial: Option<String>,
    /// Resource name reported by the device, matched against profile prefixes
    pub resource_name: Option<String>,
    /// Protocol profile name attached to the matched channel definition
    pub profile_hint: Option<String>,
}

/// Discovered device that can be opened
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: ChannelInfo,
    /// HID interface number, -1 when the bus does not report one
    pub interface: i32,
}
