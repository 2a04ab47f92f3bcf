//! Device: one physical unit as last reported by the remote service.
//!
//! A [`Device`] is a replace-only snapshot: every refresh hands over a whole
//! new value, nothing mutates individual fields in place. Fields specific to
//! a category are optional so a single type covers thermostats, smoke/CO
//! alarms and cameras; a field the device did not report reads as `None`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InvalidSnapshotError;
use crate::id::{DeviceId, StructureId};
use crate::units::TemperatureScale;

/// UTC timestamp as reported in camera events.
pub type Timestamp = DateTime<Utc>;

/// Snapshot of a single remote device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub device_id: DeviceId,
    pub structure_id: StructureId,
    pub name: Option<String>,
    pub name_long: Option<String>,
    pub software_version: Option<String>,
    pub is_online: Option<bool>,

    // Thermostat
    pub hvac_mode: Option<HvacMode>,
    pub previous_hvac_mode: Option<HvacMode>,
    pub hvac_state: Option<HvacState>,
    pub temperature_scale: TemperatureScale,
    pub ambient_temperature_c: Option<f64>,
    pub ambient_temperature_f: Option<f64>,
    pub target_temperature_c: Option<f64>,
    pub target_temperature_f: Option<f64>,
    pub target_temperature_low_c: Option<f64>,
    pub target_temperature_low_f: Option<f64>,
    pub target_temperature_high_c: Option<f64>,
    pub target_temperature_high_f: Option<f64>,
    pub eco_temperature_low_c: Option<f64>,
    pub eco_temperature_low_f: Option<f64>,
    pub eco_temperature_high_c: Option<f64>,
    pub eco_temperature_high_f: Option<f64>,
    pub humidity: Option<f64>,
    pub can_heat: Option<bool>,
    pub can_cool: Option<bool>,
    pub fan_timer_active: Option<bool>,
    pub fan_timer_duration: Option<i64>,
    pub has_leaf: Option<bool>,
    pub sunlight_correction_enabled: Option<bool>,
    pub sunlight_correction_active: Option<bool>,
    pub is_using_emergency_heat: Option<bool>,

    // Smoke + CO alarm
    pub co_alarm_state: Option<AlarmState>,
    pub smoke_alarm_state: Option<AlarmState>,
    pub battery_health: Option<BatteryHealth>,
    pub is_manual_test_active: Option<bool>,

    // Camera
    pub last_event: Option<CameraEvent>,
}

impl Device {
    /// Check the identity invariants an accessory relies on.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSnapshotError::MissingDeviceId`] or
    /// [`InvalidSnapshotError::MissingStructureId`] when either identifier
    /// is empty.
    pub fn validate(&self) -> Result<(), InvalidSnapshotError> {
        if self.device_id.is_empty() {
            return Err(InvalidSnapshotError::MissingDeviceId);
        }
        if self.structure_id.is_empty() {
            return Err(InvalidSnapshotError::MissingStructureId {
                device_id: self.device_id.to_string(),
            });
        }
        Ok(())
    }

    /// Display name reported by the device, falling back to its id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.device_id.as_str())
    }

    /// Read a temperature reported as a `_c` / `_f` field pair, returned in
    /// Celsius according to the device's current scale.
    #[must_use]
    pub fn temperature(&self, celsius: Option<f64>, fahrenheit: Option<f64>) -> Option<f64> {
        match self.temperature_scale {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => fahrenheit.map(crate::units::fahrenheit_to_celsius),
        }
    }

    /// Whether the camera's last event is an ongoing motion event.
    #[must_use]
    pub fn motion_in_progress(&self) -> bool {
        self.last_event
            .as_ref()
            .is_some_and(|event| event.has_motion && event.end_time.is_none())
    }
}

/// Operating mode of a thermostat (`hvac_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Eco,
    #[serde(other)]
    Unknown,
}

impl HvacMode {
    /// Wire representation of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::HeatCool => "heat-cool",
            Self::Eco => "eco",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the thermostat is currently doing (`hvac_state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacState {
    Off,
    Heating,
    Cooling,
    #[serde(other)]
    Unknown,
}

/// Smoke or carbon monoxide alarm level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmState {
    Ok,
    Warning,
    Emergency,
    #[serde(other)]
    Unknown,
}

impl AlarmState {
    /// Anything other than `ok` counts as detected.
    #[must_use]
    pub fn is_alarming(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

/// Battery condition of a smoke/CO alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryHealth {
    Ok,
    Replace,
    #[serde(other)]
    Unknown,
}

/// Most recent event recorded by a camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraEvent {
    #[serde(deserialize_with = "null_as_false")]
    pub has_motion: bool,
    #[serde(deserialize_with = "null_as_false")]
    pub has_sound: bool,
    #[serde(deserialize_with = "null_as_false")]
    pub has_person: bool,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// Device category, which decides the exposed characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Thermostat,
    Protect,
    Cam,
}

impl DeviceCategory {
    /// All categories, in the order accessories are created.
    pub const ALL: [Self; 3] = [Self::Thermostat, Self::Protect, Self::Cam];

    /// Short type name used to derive accessory identifiers.
    #[must_use]
    pub fn device_type(self) -> &'static str {
        match self {
            Self::Thermostat => "thermostat",
            Self::Protect => "protect",
            Self::Cam => "cam",
        }
    }

    /// Name of the group holding this category in the remote tree.
    #[must_use]
    pub fn device_group(self) -> &'static str {
        match self {
            Self::Thermostat => "thermostats",
            Self::Protect => "smoke_co_alarms",
            Self::Cam => "cameras",
        }
    }

    /// Model name used when no override is configured.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Thermostat => "Thermostat",
            Self::Protect => "Protect",
            Self::Cam => "Cam",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.device_type())
    }
}
