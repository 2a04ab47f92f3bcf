//! Non-standard characteristics: away, eco mode, fan timer and the
//! read-only thermostat and protect flags.

use nestkit_domain::characteristic::{
    CharacteristicKind, CharacteristicValue, PropertyKey, ServiceKind,
};
use nestkit_domain::device::{HvacMode, HvacState};
use nestkit_domain::error::NestKitError;
use nestkit_domain::structure::AwayState;
use nestkit_domain::write::Rejection;

use crate::accessory::AccessoryState;
use crate::binding::{PropertyBinding, WritePlan};

use super::thermostat::mode_name;

pub const AWAY: PropertyKey = thermostat(CharacteristicKind::Away);
pub const ECO_MODE: PropertyKey = thermostat(CharacteristicKind::EcoMode);
pub const FAN_TIMER_ACTIVE: PropertyKey = thermostat(CharacteristicKind::FanTimerActive);
pub const FAN_TIMER_DURATION: PropertyKey = thermostat(CharacteristicKind::FanTimerDuration);
pub const HAS_LEAF: PropertyKey = thermostat(CharacteristicKind::HasLeaf);
pub const SUNLIGHT_CORRECTION_ENABLED: PropertyKey =
    thermostat(CharacteristicKind::SunlightCorrectionEnabled);
pub const SUNLIGHT_CORRECTION_ACTIVE: PropertyKey =
    thermostat(CharacteristicKind::SunlightCorrectionActive);
pub const USING_EMERGENCY_HEAT: PropertyKey = thermostat(CharacteristicKind::UsingEmergencyHeat);
pub const MANUAL_TEST_ACTIVE: PropertyKey = PropertyKey::new(
    ServiceKind::SmokeSensor,
    CharacteristicKind::ManualTestActive,
);

const fn thermostat(characteristic: CharacteristicKind) -> PropertyKey {
    PropertyKey::new(ServiceKind::Thermostat, characteristic)
}

pub(crate) fn thermostat_bindings() -> Vec<PropertyBinding> {
    vec![
        PropertyBinding::new(AWAY, "Away", |state| state.structure().is_away().into())
            .with_setter(set_away),
        PropertyBinding::new(ECO_MODE, "Eco Mode", |state| {
            (state.device().hvac_mode == Some(HvacMode::Eco)).into()
        })
        .with_setter(set_eco_mode),
        PropertyBinding::new(FAN_TIMER_ACTIVE, "Fan Timer Active", |state| {
            state.device().fan_timer_active.into()
        })
        .with_setter(set_fan_timer_active),
        PropertyBinding::new(FAN_TIMER_DURATION, "Fan Timer Duration", |state| {
            state.device().fan_timer_duration.into()
        })
        .with_setter(set_fan_timer_duration),
        PropertyBinding::new(HAS_LEAF, "Has Leaf", |state| state.device().has_leaf.into()),
        PropertyBinding::new(
            SUNLIGHT_CORRECTION_ENABLED,
            "Sunlight Correction Enabled",
            |state| state.device().sunlight_correction_enabled.into(),
        ),
        PropertyBinding::new(
            SUNLIGHT_CORRECTION_ACTIVE,
            "Sunlight Correction Active",
            |state| state.device().sunlight_correction_active.into(),
        ),
        PropertyBinding::new(USING_EMERGENCY_HEAT, "Using Emergency Heat", |state| {
            state.device().is_using_emergency_heat.into()
        }),
    ]
}

pub(crate) fn protect_bindings() -> Vec<PropertyBinding> {
    vec![PropertyBinding::new(
        MANUAL_TEST_ACTIVE,
        "Manual Test Active",
        |state| state.device().is_manual_test_active.into(),
    )]
}

fn set_away(state: &AccessoryState, value: CharacteristicValue) -> Result<WritePlan, NestKitError> {
    let away = if value.as_bool()? {
        AwayState::Away
    } else {
        AwayState::Home
    };
    Ok(WritePlan::Send {
        path: state.structure_path("away"),
        value: away.as_str().into(),
        description: "away",
    })
}

fn set_eco_mode(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    let mode = if value.as_bool()? {
        HvacMode::Eco
    } else {
        match state.device().previous_hvac_mode {
            Some(mode) if mode != HvacMode::Unknown => mode,
            _ => {
                return Ok(WritePlan::Reject(Rejection::Unavailable {
                    field: "previous_hvac_mode",
                }));
            }
        }
    };
    Ok(WritePlan::Send {
        path: state.device_path("hvac_mode"),
        value: mode.as_str().into(),
        description: "target heating cooling",
    })
}

fn set_fan_timer_active(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    let active = value.as_bool()?;
    let device = state.device();
    let idle = device.hvac_mode != Some(HvacMode::Off) && device.hvac_state == Some(HvacState::Off);
    if !idle {
        return Ok(WritePlan::Reject(Rejection::UnsupportedMode {
            mode: mode_name(device).to_string(),
        }));
    }
    Ok(WritePlan::Send {
        path: state.device_path("fan_timer_active"),
        value: active.into(),
        description: "fan timer active",
    })
}

fn set_fan_timer_duration(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    let minutes = value.as_i64()?;
    Ok(WritePlan::Send {
        path: state.device_path("fan_timer_duration"),
        value: minutes.into(),
        description: "fan timer duration",
    })
}
