//! Smoke + carbon monoxide alarm controller. Read-only.

use nestkit_domain::characteristic::{
    CarbonMonoxideDetected, CharacteristicKind, CharacteristicValue, PropertyKey, ServiceKind,
    SmokeDetected, StatusLowBattery,
};
use nestkit_domain::device::{AlarmState, BatteryHealth};

use crate::accessory::AccessoryState;
use crate::binding::PropertyBinding;

use super::{extended, format_status_active};

pub const SMOKE_DETECTED: PropertyKey =
    PropertyKey::new(ServiceKind::SmokeSensor, CharacteristicKind::SmokeDetected);
pub const SMOKE_STATUS_ACTIVE: PropertyKey =
    PropertyKey::new(ServiceKind::SmokeSensor, CharacteristicKind::StatusActive);
pub const SMOKE_STATUS_LOW_BATTERY: PropertyKey =
    PropertyKey::new(ServiceKind::SmokeSensor, CharacteristicKind::StatusLowBattery);
pub const CARBON_MONOXIDE_DETECTED: PropertyKey = PropertyKey::new(
    ServiceKind::CarbonMonoxideSensor,
    CharacteristicKind::CarbonMonoxideDetected,
);
pub const CARBON_MONOXIDE_STATUS_LOW_BATTERY: PropertyKey = PropertyKey::new(
    ServiceKind::CarbonMonoxideSensor,
    CharacteristicKind::StatusLowBattery,
);
pub const CARBON_MONOXIDE_STATUS_ACTIVE: PropertyKey = PropertyKey::new(
    ServiceKind::CarbonMonoxideSensor,
    CharacteristicKind::StatusActive,
);

#[derive(Debug)]
pub struct ProtectController {
    bindings: Vec<PropertyBinding>,
}

impl ProtectController {
    #[must_use]
    pub fn new(extended: bool) -> Self {
        let mut bindings = vec![
            PropertyBinding::new(SMOKE_DETECTED, "Smoke", smoke_detected)
                .with_formatter(format_smoke_detected),
            PropertyBinding::new(
                SMOKE_STATUS_ACTIVE,
                "Online status (smoke sensor)",
                status_active,
            )
            .with_formatter(format_status_active),
            PropertyBinding::new(
                SMOKE_STATUS_LOW_BATTERY,
                "Battery status (smoke sensor)",
                status_low_battery,
            )
            .with_formatter(format_status_low_battery),
            PropertyBinding::new(
                CARBON_MONOXIDE_DETECTED,
                "Carbon monoxide",
                carbon_monoxide_detected,
            )
            .with_formatter(format_carbon_monoxide_detected),
            PropertyBinding::new(
                CARBON_MONOXIDE_STATUS_LOW_BATTERY,
                "Battery status (carbon monoxide sensor)",
                status_low_battery,
            )
            .with_formatter(format_status_low_battery),
            PropertyBinding::new(
                CARBON_MONOXIDE_STATUS_ACTIVE,
                "Online status (carbon monoxide sensor)",
                status_active,
            )
            .with_formatter(format_status_active),
        ];
        if extended {
            bindings.extend(extended::protect_bindings());
        }
        Self { bindings }
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }
}

// Anything but an explicit `ok`, including a missing state, counts as an alarm.

fn smoke_detected(state: &AccessoryState) -> CharacteristicValue {
    match state.device().smoke_alarm_state {
        Some(AlarmState::Ok) => SmokeDetected::NotDetected,
        _ => SmokeDetected::Detected,
    }
    .into()
}

fn carbon_monoxide_detected(state: &AccessoryState) -> CharacteristicValue {
    match state.device().co_alarm_state {
        Some(AlarmState::Ok) => CarbonMonoxideDetected::Normal,
        _ => CarbonMonoxideDetected::Abnormal,
    }
    .into()
}

fn status_low_battery(state: &AccessoryState) -> CharacteristicValue {
    match state.device().battery_health {
        Some(BatteryHealth::Ok) => StatusLowBattery::Normal,
        _ => StatusLowBattery::Low,
    }
    .into()
}

fn status_active(state: &AccessoryState) -> CharacteristicValue {
    state.device().is_online.into()
}

fn format_smoke_detected(value: CharacteristicValue) -> String {
    match SmokeDetected::try_from(value) {
        Ok(SmokeDetected::NotDetected) => "not detected".to_string(),
        Ok(SmokeDetected::Detected) => "detected".to_string(),
        Err(_) => format!("unknown ({value})"),
    }
}

fn format_carbon_monoxide_detected(value: CharacteristicValue) -> String {
    match CarbonMonoxideDetected::try_from(value) {
        Ok(CarbonMonoxideDetected::Normal) => "normal".to_string(),
        Ok(CarbonMonoxideDetected::Abnormal) => "abnormal".to_string(),
        Err(_) => format!("unknown ({value})"),
    }
}

fn format_status_low_battery(value: CharacteristicValue) -> String {
    match StatusLowBattery::try_from(value) {
        Ok(StatusLowBattery::Normal) => "normal".to_string(),
        Ok(StatusLowBattery::Low) => "low".to_string(),
        Err(_) => format!("unknown ({value})"),
    }
}
