//! Transport discovery parameters for Nattiq displays

/// USB identification and channel selection
pub mod usb {
    /// Microchip Technology vendor ID (used by the Nattiq firmware)
    pub const VENDOR_ID: u16 = 0x04D8;
    /// Nattiq Note / Mokey product ID (both models share it)
    pub const PRODUCT_ID: u16 = 0xEB69;
    /// USB configuration number
    pub const CONFIGURATION: u8 = 1;
    /// Interface number carrying the braille channel
    pub const INTERFACE: u8 = 0;
    /// Alternate setting of that interface
    pub const ALTERNATIVE: u8 = 0;
    /// The firmware misbehaves if its endpoints are reset on open
    pub const DISABLE_ENDPOINT_RESET: bool = true;
}

/// Bluetooth channel selection
pub mod bluetooth {
    /// RFCOMM channel number
    pub const CHANNEL_NUMBER: u8 = 4;
    /// Ask SDP for the channel instead of trusting the fixed number
    pub const DISCOVER_CHANNEL: bool = true;
}

/// HID report framing
pub mod hid {
    /// Output/input report payload size (excluding report ID)
    pub const REPORT_SIZE: usize = 64;
    /// Report ID used for all reports (the device has no numbered reports)
    pub const REPORT_ID: u8 = 0x00;
}

/// One USB channel the driver knows how to talk to
///
/// `configuration`, `alternative` and `disable_endpoint_reset` describe the
/// device as the firmware expects to be opened. They are recorded but not
/// applied: hidapi selects configuration and alternate setting itself.
/// Discovery matches on vendor, product and interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDefinition {
    pub vendor: u16,
    pub product: u16,
    pub configuration: u8,
    pub interface: u8,
    pub alternative: u8,
    pub disable_endpoint_reset: bool,
    /// Protocol profile to use when this definition matches, if it is
    /// enough on its own to tell the models apart
    pub profile_hint: Option<&'static str>,
}

impl ChannelDefinition {
    /// Check whether a USB vendor/product pair belongs to this definition
    pub fn matches(&self, vid: u16, pid: u16) -> bool {
        self.vendor == vid && self.product == pid
    }
}

/// The Nattiq channel definition
///
/// Note and Mokey enumerate identically, so the definition carries no
/// profile hint and the identity probe tells them apart.
pub const NATTIQ_CHANNEL: ChannelDefinition = ChannelDefinition {
    vendor: usb::VENDOR_ID,
    product: usb::PRODUCT_ID,
    configuration: usb::CONFIGURATION,
    interface: usb::INTERFACE,
    alternative: usb::ALTERNATIVE,
    disable_endpoint_reset: usb::DISABLE_ENDPOINT_RESET,
    profile_hint: None,
};

/// Bluetooth connection parameters
///
/// Recorded only: Bluetooth displays are reached through the HID bus, where
/// the RFCOMM channel is not selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BluetoothParams {
    pub channel_number: u8,
    pub discover_channel: bool,
}

impl Default for BluetoothParams {
    fn default() -> Self {
        Self {
            channel_number: bluetooth::CHANNEL_NUMBER,
            discover_channel: bluetooth::DISCOVER_CHANNEL,
        }
    }
}

/// Everything discovery needs to find and open a display
#[derive(Debug, Clone)]
pub struct ChannelDescriptor {
    pub usb: Vec<ChannelDefinition>,
    pub bluetooth: BluetoothParams,
}

impl Default for ChannelDescriptor {
    fn default() -> Self {
        Self {
            usb: vec![NATTIQ_CHANNEL],
            bluetooth: BluetoothParams::default(),
        }
    }
}

impl ChannelDescriptor {
    /// Find the first definition matching a vendor/product pair
    pub fn find(&self, vid: u16, pid: u16) -> Option<&ChannelDefinition> {
        self.usb.iter().find(|d| d.matches(vid, pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_descriptor_matches_nattiq_ids() {
        let descriptor = ChannelDescriptor::default();
        let def = descriptor.find(0x04D8, 0xEB69).unwrap();
        assert_eq!(def.configuration, 1);
        assert_eq!(def.interface, 0);
        assert_eq!(def.alternative, 0);
        assert!(def.disable_endpoint_reset);
        assert!(def.profile_hint.is_none());
    }

    #[test]
    fn other_microchip_products_do_not_match() {
        let descriptor = ChannelDescriptor::default();
        assert!(descriptor.find(0x04D8, 0x000A).is_none());
        assert!(descriptor.find(0x3151, 0xEB69).is_none());
    }

    #[test]
    fn bluetooth_defaults() {
        let params = BluetoothParams::default();
        assert_eq!(params.channel_number, 4);
        assert!(params.discover_channel);
    }
}
