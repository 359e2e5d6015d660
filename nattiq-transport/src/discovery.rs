//! Device discovery for Nattiq displays

use hidapi::{BusType, HidApi};
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid::HidChannel;
use crate::locator::DeviceLocator;
use crate::protocol::ChannelDescriptor;
use crate::types::{ChannelInfo, DiscoveredDevice, TransportType};
use crate::BoxedChannel;

/// Check if a device is connected via Bluetooth
fn is_bluetooth_bus(device_info: &hidapi::DeviceInfo) -> bool {
    matches!(device_info.bus_type(), BusType::Bluetooth)
}

/// HID device discovery for USB and Bluetooth connections
pub struct HidDiscovery {
    descriptor: ChannelDescriptor,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HidDiscovery {
    /// Create a discovery instance for the builtin Nattiq channel
    pub fn new() -> Self {
        Self {
            descriptor: ChannelDescriptor::default(),
        }
    }

    /// Create a discovery instance with a custom descriptor
    pub fn with_descriptor(descriptor: ChannelDescriptor) -> Self {
        Self { descriptor }
    }

    /// Get the descriptor in use
    pub fn descriptor(&self) -> &ChannelDescriptor {
        &self.descriptor
    }

    /// Check if this HID interface is the braille channel
    ///
    /// Bluetooth HID does not report interface numbers, so any interface
    /// with matching IDs qualifies there.
    fn is_braille_interface(&self, device_info: &hidapi::DeviceInfo) -> bool {
        let Some(def) = self
            .descriptor
            .find(device_info.vendor_id(), device_info.product_id())
        else {
            return false;
        };

        is_bluetooth_bus(device_info) || device_info.interface_number() == i32::from(def.interface)
    }

    fn describe(&self, device_info: &hidapi::DeviceInfo) -> DiscoveredDevice {
        let vid = device_info.vendor_id();
        let pid = device_info.product_id();
        let transport_type = if is_bluetooth_bus(device_info) {
            TransportType::Bluetooth
        } else {
            TransportType::Usb
        };
        let profile_hint = self
            .descriptor
            .find(vid, pid)
            .and_then(|d| d.profile_hint)
            .map(str::to_string);

        DiscoveredDevice {
            info: ChannelInfo {
                vid,
                pid,
                transport_type,
                device_path: device_info.path().to_string_lossy().to_string(),
                serial: device_info.serial_number().map(str::to_string),
                resource_name: device_info.product_string().map(str::to_string),
                profile_hint,
            },
            interface: device_info.interface_number(),
        }
    }

    fn list_with(&self, api: &HidApi) -> Vec<DiscoveredDevice> {
        let devices: Vec<DiscoveredDevice> = api
            .device_list()
            .filter(|d| self.is_braille_interface(d))
            .map(|d| {
                let device = self.describe(d);
                debug!(
                    "Found device: VID={:04X} PID={:04X} type={:?} path={}",
                    device.info.vid,
                    device.info.pid,
                    device.info.transport_type,
                    device.info.device_path
                );
                device
            })
            .collect();

        info!("Found {} devices", devices.len());
        devices
    }

    /// List currently attached displays
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new()?;
        Ok(self.list_with(&api))
    }

    /// Open the first display accepted by `locator`
    pub fn open(&self, locator: &DeviceLocator) -> Result<BoxedChannel, TransportError> {
        if let DeviceLocator::Serial { path } = locator {
            return Err(TransportError::Unsupported(format!(
                "serial line {path}: only HID connections are supported"
            )));
        }

        let api = HidApi::new()?;
        let device = self
            .list_with(&api)
            .into_iter()
            .find(|d| locator.accepts(d))
            .ok_or_else(|| TransportError::DeviceNotFound(format!("no display for {locator}")))?;

        let hid = api
            .device_list()
            .find(|d| d.path().to_string_lossy() == device.info.device_path)
            .ok_or_else(|| TransportError::DeviceNotFound(device.info.device_path.clone()))?
            .open_device(&api)?;

        info!(
            "Opened {:?} channel for {:04X}:{:04X}",
            device.info.transport_type, device.info.vid, device.info.pid
        );

        Ok(Box::new(HidChannel::new(hid, device.info)))
    }
}
