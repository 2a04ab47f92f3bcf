//! Snapshots of the remote tree and the paths used to write into it.
//!
//! The remote service delivers `{devices: {<group>: {<id>: Device}},
//! structures: {<id>: Structure}}` on every push.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceCategory};
use crate::id::{DeviceId, StructureId};
use crate::structure::Structure;

/// Full state of the remote tree at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub devices: BTreeMap<String, BTreeMap<String, Device>>,
    pub structures: BTreeMap<String, Structure>,
}

impl Snapshot {
    /// Devices of one category, in key order.
    pub fn devices_in(&self, category: DeviceCategory) -> impl Iterator<Item = &Device> {
        self.devices
            .get(category.device_group())
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Every known device with its category, thermostats first.
    pub fn all_devices(&self) -> impl Iterator<Item = (DeviceCategory, &Device)> {
        DeviceCategory::ALL
            .into_iter()
            .flat_map(move |category| self.devices_in(category).map(move |d| (category, d)))
    }

    #[must_use]
    pub fn device(&self, category: DeviceCategory, id: &DeviceId) -> Option<&Device> {
        self.devices_in(category).find(|device| &device.device_id == id)
    }

    #[must_use]
    pub fn structure(&self, id: &StructureId) -> Option<&Structure> {
        self.structures.get(id.as_str()).or_else(|| {
            self.structures
                .values()
                .find(|structure| &structure.structure_id == id)
        })
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.values().map(BTreeMap::len).sum()
    }
}

/// Address of a writable leaf in the remote tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    Device {
        group: &'static str,
        device_id: DeviceId,
        property: &'static str,
    },
    Structure {
        structure_id: StructureId,
        property: &'static str,
    },
}

impl PropertyPath {
    #[must_use]
    pub fn device(category: DeviceCategory, device_id: DeviceId, property: &'static str) -> Self {
        Self::Device {
            group: category.device_group(),
            device_id,
            property,
        }
    }

    #[must_use]
    pub fn structure(structure_id: StructureId, property: &'static str) -> Self {
        Self::Structure {
            structure_id,
            property,
        }
    }

    /// Name of the leaf field.
    #[must_use]
    pub fn property(&self) -> &'static str {
        match self {
            Self::Device { property, .. } | Self::Structure { property, .. } => property,
        }
    }

    /// Path segments from the root of the tree.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Device {
                group,
                device_id,
                property,
            } => vec!["devices", *group, device_id.as_str(), *property],
            Self::Structure {
                structure_id,
                property,
            } => vec!["structures", structure_id.as_str(), *property],
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use crate::units::TemperatureScale;

    use super::*;

    fn sample() -> Snapshot {
        serde_json::from_value(serde_json::json!({
            "devices": {
                "thermostats": {
                    "t1": { "device_id": "t1", "structure_id": "s1" }
                },
                "smoke_co_alarms": {
                    "p1": { "device_id": "p1", "structure_id": "s1" },
                    "p2": { "device_id": "p2", "structure_id": "s1" }
                }
            },
            "structures": {
                "s1": { "structure_id": "s1", "away": "home" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn should_list_devices_by_category() {
        let snapshot = sample();
        assert_eq!(snapshot.devices_in(DeviceCategory::Protect).count(), 2);
        assert_eq!(snapshot.devices_in(DeviceCategory::Cam).count(), 0);
        assert_eq!(snapshot.device_count(), 3);
    }

    #[test]
    fn should_yield_thermostats_before_protects() {
        let snapshot = sample();
        let categories: Vec<_> = snapshot.all_devices().map(|(c, _)| c).collect();
        assert_eq!(
            categories,
            vec![
                DeviceCategory::Thermostat,
                DeviceCategory::Protect,
                DeviceCategory::Protect
            ]
        );
    }

    #[test]
    fn should_find_structure_by_id() {
        let snapshot = sample();
        assert!(snapshot.structure(&StructureId::new("s1")).is_some());
        assert!(snapshot.structure(&StructureId::new("nope")).is_none());
    }

    #[test]
    fn should_accept_snapshot_without_structures() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"devices": {}}"#).unwrap();
        assert!(snapshot.structures.is_empty());
    }

    #[test]
    fn should_keep_snapshot_with_odd_device_values() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "devices": {
                "thermostats": {
                    "t1": {
                        "device_id": "t1",
                        "structure_id": "s1",
                        "hvac_mode": "bogus",
                        "temperature_scale": "K"
                    },
                    "t2": {
                        "device_id": "t2",
                        "structure_id": "s1",
                        "temperature_scale": null
                    }
                },
                "cameras": {
                    "c1": {
                        "device_id": "c1",
                        "structure_id": "s1",
                        "last_event": { "has_motion": null }
                    }
                }
            },
            "structures": {
                "s1": { "structure_id": "s1", "away": "vacation" }
            }
        }))
        .unwrap();

        assert_eq!(snapshot.device_count(), 3);
        let t1 = snapshot
            .device(DeviceCategory::Thermostat, &DeviceId::new("t1"))
            .unwrap();
        assert_eq!(t1.temperature_scale, TemperatureScale::Celsius);
        assert!(!snapshot
            .device(DeviceCategory::Cam, &DeviceId::new("c1"))
            .unwrap()
            .motion_in_progress());
    }

    #[test]
    fn should_render_device_path() {
        let path = PropertyPath::device(
            DeviceCategory::Thermostat,
            DeviceId::new("t1"),
            "target_temperature_c",
        );
        assert_eq!(path.to_string(), "devices/thermostats/t1/target_temperature_c");
        assert_eq!(path.property(), "target_temperature_c");
    }

    #[test]
    fn should_render_structure_path() {
        let path = PropertyPath::structure(StructureId::new("s1"), "away");
        assert_eq!(path.to_string(), "structures/s1/away");
    }
}
