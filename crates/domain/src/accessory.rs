//! Accessory information record exposed alongside the characteristics.

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceCategory};
use crate::id::{AccessoryId, DeviceId};

pub const MANUFACTURER: &str = "Nest";

const FIRMWARE_REVISION_LEN: usize = 5;

/// Identity of one locally exposed accessory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInfo {
    pub id: AccessoryId,
    pub category: DeviceCategory,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: Option<String>,
}

impl AccessoryInfo {
    /// Build the record for a device, applying a configured override if any.
    #[must_use]
    pub fn for_device(
        category: DeviceCategory,
        device: &Device,
        overrides: Option<&AccessoryInfoOverride>,
    ) -> Self {
        let model = overrides
            .and_then(|o| o.model.clone())
            .unwrap_or_else(|| category.default_model().to_string());
        let serial_number = overrides
            .and_then(|o| o.serial_number.clone())
            .unwrap_or_else(|| device.device_id.to_string());
        let firmware_revision = device
            .software_version
            .as_deref()
            .map(|version| version.chars().take(FIRMWARE_REVISION_LEN).collect());

        Self {
            id: AccessoryId::for_device(category.device_type(), &device.device_id),
            category,
            name: format!("{} Nest {model}", device.display_name()),
            manufacturer: MANUFACTURER.to_string(),
            model,
            serial_number,
            firmware_revision,
        }
    }
}

/// Per-device override of the information record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInfoOverride {
    pub device_id: DeviceId,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}
