use std::collections::HashMap;

use async_trait::async_trait;
use model::boat::BoatId;
use utility::id::Id;

/// Resolves a GPS device (usually by IMEI) to the boat carrying it.
#[async_trait]
pub trait DeviceDirectory: Send + Sync + 'static {
    async fn resolve(&self, device_id: &str) -> Option<BoatId>;
}

/// A device directory loaded once from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceDirectory {
    devices: HashMap<String, BoatId>,
    passthrough: bool,
}

impl StaticDeviceDirectory {
    pub fn new(devices: HashMap<String, String>) -> Self {
        Self {
            devices: devices
                .into_iter()
                .map(|(device, boat)| (device, Id::new(boat)))
                .collect(),
            passthrough: false,
        }
    }

    /// A directory where every device id is used as the boat id.
    pub fn passthrough() -> Self {
        Self {
            devices: HashMap::new(),
            passthrough: true,
        }
    }
}

#[async_trait]
impl DeviceDirectory for StaticDeviceDirectory {
    async fn resolve(&self, device_id: &str) -> Option<BoatId> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return None;
        }
        match self.devices.get(device_id) {
            Some(boat) => Some(boat.clone()),
            None if self.passthrough => Some(Id::from(device_id)),
            None => None,
        }
    }
}
