//! Characteristic: a locally exposed, typed, observable value.
//!
//! A characteristic is addressed by the accessory that owns it and the
//! [`PropertyKey`] (service + characteristic kind) inside that accessory.

mod hap;
mod value;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::AccessoryId;

pub use self::hap::{
    CarbonMonoxideDetected, CurrentHeatingCoolingState, SmokeDetected, StatusLowBattery,
    TargetHeatingCoolingState, TemperatureDisplayUnits,
};
pub use self::value::CharacteristicValue;

/// Service grouping characteristics inside an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    Thermostat,
    SmokeSensor,
    CarbonMonoxideSensor,
    MotionSensor,
}

impl ServiceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thermostat => "Thermostat",
            Self::SmokeSensor => "SmokeSensor",
            Self::CarbonMonoxideSensor => "CarbonMonoxideSensor",
            Self::MotionSensor => "MotionSensor",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of characteristic exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CharacteristicKind {
    CurrentHeatingCoolingState,
    TargetHeatingCoolingState,
    CurrentTemperature,
    TargetTemperature,
    TemperatureDisplayUnits,
    CurrentRelativeHumidity,
    CoolingThresholdTemperature,
    HeatingThresholdTemperature,
    SmokeDetected,
    CarbonMonoxideDetected,
    StatusActive,
    StatusLowBattery,
    MotionDetected,

    Away,
    EcoMode,
    FanTimerActive,
    FanTimerDuration,
    HasLeaf,
    ManualTestActive,
    SunlightCorrectionEnabled,
    SunlightCorrectionActive,
    UsingEmergencyHeat,
}

impl CharacteristicKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentHeatingCoolingState => "CurrentHeatingCoolingState",
            Self::TargetHeatingCoolingState => "TargetHeatingCoolingState",
            Self::CurrentTemperature => "CurrentTemperature",
            Self::TargetTemperature => "TargetTemperature",
            Self::TemperatureDisplayUnits => "TemperatureDisplayUnits",
            Self::CurrentRelativeHumidity => "CurrentRelativeHumidity",
            Self::CoolingThresholdTemperature => "CoolingThresholdTemperature",
            Self::HeatingThresholdTemperature => "HeatingThresholdTemperature",
            Self::SmokeDetected => "SmokeDetected",
            Self::CarbonMonoxideDetected => "CarbonMonoxideDetected",
            Self::StatusActive => "StatusActive",
            Self::StatusLowBattery => "StatusLowBattery",
            Self::MotionDetected => "MotionDetected",
            Self::Away => "Away",
            Self::EcoMode => "EcoMode",
            Self::FanTimerActive => "FanTimerActive",
            Self::FanTimerDuration => "FanTimerDuration",
            Self::HasLeaf => "HasLeaf",
            Self::ManualTestActive => "ManualTestActive",
            Self::SunlightCorrectionEnabled => "SunlightCorrectionEnabled",
            Self::SunlightCorrectionActive => "SunlightCorrectionActive",
            Self::UsingEmergencyHeat => "UsingEmergencyHeat",
        }
    }

    /// Whether the value is a temperature in Celsius.
    #[must_use]
    pub fn is_temperature(self) -> bool {
        matches!(
            self,
            Self::CurrentTemperature
                | Self::TargetTemperature
                | Self::CoolingThresholdTemperature
                | Self::HeatingThresholdTemperature
        )
    }
}

impl fmt::Display for CharacteristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a characteristic inside one accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyKey {
    pub service: ServiceKind,
    pub characteristic: CharacteristicKind,
}

impl PropertyKey {
    #[must_use]
    pub const fn new(service: ServiceKind, characteristic: CharacteristicKind) -> Self {
        Self {
            service,
            characteristic,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.characteristic)
    }
}

/// Fully qualified characteristic address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacteristicRef {
    pub accessory: AccessoryId,
    pub key: PropertyKey,
}

impl CharacteristicRef {
    #[must_use]
    pub const fn new(accessory: AccessoryId, key: PropertyKey) -> Self {
        Self { accessory, key }
    }
}

impl fmt::Display for CharacteristicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.accessory, self.key)
    }
}

/// Host-side permissions of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DeviceId;

    #[test]
    fn should_display_characteristic_ref_with_service_and_kind() {
        let accessory = AccessoryId::for_device("thermostat", &DeviceId::new("t1"));
        let key = PropertyKey::new(ServiceKind::Thermostat, CharacteristicKind::TargetTemperature);
        let reference = CharacteristicRef::new(accessory, key);
        assert_eq!(
            reference.to_string(),
            format!("{accessory}/Thermostat.TargetTemperature")
        );
    }

    #[test]
    fn should_flag_temperature_kinds() {
        assert!(CharacteristicKind::HeatingThresholdTemperature.is_temperature());
        assert!(!CharacteristicKind::CurrentRelativeHumidity.is_temperature());
    }

    #[test]
    fn should_order_keys_by_service_first() {
        let a = PropertyKey::new(ServiceKind::Thermostat, CharacteristicKind::UsingEmergencyHeat);
        let b = PropertyKey::new(ServiceKind::SmokeSensor, CharacteristicKind::SmokeDetected);
        assert!(a < b);
    }
}
