//! Thermostat controller and its mode-gated setpoints.
//!
//! Characteristics are always in Celsius. Reads and writes cross into the
//! device's `temperature_scale` at the device boundary.
//!
//! | `hvac_mode` | target temperature | heating / cooling threshold |
//! |-------------|--------------------|-----------------------------|
//! | `heat-cool` | reads 10, not set  | `target_temperature_low/high` |
//! | `eco`       | reads 10, not set  | `eco_temperature_low/high` (read only) |
//! | `off`       | readable, not set  | reads 0 / 10, not set |
//! | other       | `target_temperature` | reads 0 / 10, not set |

use nestkit_domain::characteristic::{
    CharacteristicKind, CharacteristicValue, CurrentHeatingCoolingState, PropertyKey,
    ServiceKind, TargetHeatingCoolingState, TemperatureDisplayUnits,
};
use nestkit_domain::device::{Device, HvacMode, HvacState};
use nestkit_domain::error::NestKitError;
use nestkit_domain::snapshot::PropertyPath;
use nestkit_domain::units::{TemperatureScale, format_temperature};
use nestkit_domain::write::Rejection;

use crate::accessory::AccessoryState;
use crate::binding::{PropertyBinding, WritePlan};

use super::extended;

pub const CURRENT_HEATING_COOLING_STATE: PropertyKey =
    key(CharacteristicKind::CurrentHeatingCoolingState);
pub const TARGET_HEATING_COOLING_STATE: PropertyKey =
    key(CharacteristicKind::TargetHeatingCoolingState);
pub const CURRENT_TEMPERATURE: PropertyKey = key(CharacteristicKind::CurrentTemperature);
pub const TARGET_TEMPERATURE: PropertyKey = key(CharacteristicKind::TargetTemperature);
pub const TEMPERATURE_DISPLAY_UNITS: PropertyKey =
    key(CharacteristicKind::TemperatureDisplayUnits);
pub const CURRENT_RELATIVE_HUMIDITY: PropertyKey =
    key(CharacteristicKind::CurrentRelativeHumidity);
pub const COOLING_THRESHOLD_TEMPERATURE: PropertyKey =
    key(CharacteristicKind::CoolingThresholdTemperature);
pub const HEATING_THRESHOLD_TEMPERATURE: PropertyKey =
    key(CharacteristicKind::HeatingThresholdTemperature);

// Values reported when a setpoint has no meaning in the current mode.
const TARGET_FALLBACK: f64 = 10.0;
const COOLING_THRESHOLD_FALLBACK: f64 = 10.0;
const HEATING_THRESHOLD_FALLBACK: f64 = 0.0;

const fn key(characteristic: CharacteristicKind) -> PropertyKey {
    PropertyKey::new(ServiceKind::Thermostat, characteristic)
}

#[derive(Debug)]
pub struct ThermostatController {
    bindings: Vec<PropertyBinding>,
}

impl ThermostatController {
    #[must_use]
    pub fn new(extended: bool) -> Self {
        let mut bindings = vec![
            PropertyBinding::new(
                CURRENT_HEATING_COOLING_STATE,
                "Current heating/cooling state",
                current_heating_cooling_state,
            )
            .with_formatter(format_current_heating_cooling_state),
            PropertyBinding::new(
                TARGET_HEATING_COOLING_STATE,
                "Target heating cooling state",
                target_heating_cooling_state,
            )
            .with_setter(set_target_heating_cooling_state)
            .with_formatter(format_target_heating_cooling_state),
            PropertyBinding::new(CURRENT_TEMPERATURE, "Current temperature", current_temperature)
                .with_formatter(format_celsius),
            PropertyBinding::new(TARGET_TEMPERATURE, "Target temperature", target_temperature)
                .with_setter(set_target_temperature)
                .with_formatter(format_celsius),
            PropertyBinding::new(
                TEMPERATURE_DISPLAY_UNITS,
                "Temperature units",
                temperature_display_units,
            )
            .with_setter(set_temperature_display_units)
            .with_formatter(format_display_units),
            PropertyBinding::new(
                CURRENT_RELATIVE_HUMIDITY,
                "Current humidity",
                current_relative_humidity,
            )
            .with_formatter(|value| format!("{value}%")),
            PropertyBinding::new(
                COOLING_THRESHOLD_TEMPERATURE,
                "Cooling threshold temperature",
                cooling_threshold_temperature,
            )
            .with_setter(set_cooling_threshold_temperature)
            .with_formatter(format_celsius),
            PropertyBinding::new(
                HEATING_THRESHOLD_TEMPERATURE,
                "Heating threshold temperature",
                heating_threshold_temperature,
            )
            .with_setter(set_heating_threshold_temperature)
            .with_formatter(format_celsius),
        ];
        if extended {
            bindings.extend(extended::thermostat_bindings());
        }
        Self { bindings }
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }
}

/// Temperature setpoints that go through the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setpoint {
    Target,
    HeatingThreshold,
    CoolingThreshold,
}

impl Setpoint {
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Target => "target temperature",
            Self::HeatingThreshold => "heating threshold temperature",
            Self::CoolingThreshold => "cooling threshold temperature",
        }
    }

    /// Device field receiving the value for a given scale.
    #[must_use]
    pub fn field(self, scale: TemperatureScale) -> &'static str {
        match (self, scale) {
            (Self::Target, TemperatureScale::Celsius) => "target_temperature_c",
            (Self::Target, TemperatureScale::Fahrenheit) => "target_temperature_f",
            (Self::HeatingThreshold, TemperatureScale::Celsius) => "target_temperature_low_c",
            (Self::HeatingThreshold, TemperatureScale::Fahrenheit) => "target_temperature_low_f",
            (Self::CoolingThreshold, TemperatureScale::Celsius) => "target_temperature_high_c",
            (Self::CoolingThreshold, TemperatureScale::Fahrenheit) => "target_temperature_high_f",
        }
    }

    /// Whether the setpoint may be written while the device is in `mode`.
    #[must_use]
    pub fn writable_in(self, mode: Option<HvacMode>) -> bool {
        match self {
            Self::Target => !matches!(
                mode,
                Some(HvacMode::Eco | HvacMode::HeatCool | HvacMode::Off)
            ),
            Self::HeatingThreshold | Self::CoolingThreshold => mode == Some(HvacMode::HeatCool),
        }
    }
}

/// A temperature write waiting in the debouncer.
///
/// The value is already rounded and expressed in `scale`, the scale the
/// device displayed when the write was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSetpoint {
    pub setpoint: Setpoint,
    pub value: f64,
    pub scale: TemperatureScale,
}

impl PendingSetpoint {
    #[must_use]
    pub fn new(setpoint: Setpoint, celsius: f64, scale: TemperatureScale) -> Self {
        Self {
            setpoint,
            value: scale.from_celsius_rounded(celsius),
            scale,
        }
    }

    /// Value as sent on the wire: whole degrees for Fahrenheit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn wire_value(&self) -> serde_json::Value {
        match self.scale {
            TemperatureScale::Celsius => serde_json::Value::from(self.value),
            TemperatureScale::Fahrenheit => serde_json::Value::from(self.value as i64),
        }
    }
}

/// Turn a due setpoint into a write against the device as it is now.
///
/// The mode is checked at this point, not when the value was requested.
///
/// # Errors
///
/// Returns [`Rejection::UnsupportedMode`] when the current mode does not
/// accept this setpoint.
pub fn resolve_setpoint(
    state: &AccessoryState,
    pending: &PendingSetpoint,
) -> Result<(PropertyPath, serde_json::Value), Rejection> {
    let mode = state.device().hvac_mode;
    if !pending.setpoint.writable_in(mode) {
        return Err(Rejection::UnsupportedMode {
            mode: mode_name(state.device()).to_string(),
        });
    }
    Ok((
        state.device_path(pending.setpoint.field(pending.scale)),
        pending.wire_value(),
    ))
}

pub(crate) fn mode_name(device: &Device) -> &'static str {
    device.hvac_mode.map_or("unknown", HvacMode::as_str)
}

// ── Getters ─────────────────────────────────────────────────────────

fn current_heating_cooling_state(state: &AccessoryState) -> CharacteristicValue {
    match state.device().hvac_state {
        Some(HvacState::Heating) => CurrentHeatingCoolingState::Heat,
        Some(HvacState::Cooling) => CurrentHeatingCoolingState::Cool,
        _ => CurrentHeatingCoolingState::Off,
    }
    .into()
}

fn target_heating_cooling_state(state: &AccessoryState) -> CharacteristicValue {
    match state.device().hvac_mode {
        Some(HvacMode::Heat) => TargetHeatingCoolingState::Heat,
        Some(HvacMode::Cool) => TargetHeatingCoolingState::Cool,
        Some(HvacMode::Eco | HvacMode::HeatCool) => TargetHeatingCoolingState::Auto,
        _ => TargetHeatingCoolingState::Off,
    }
    .into()
}

fn current_temperature(state: &AccessoryState) -> CharacteristicValue {
    let device = state.device();
    device
        .temperature(device.ambient_temperature_c, device.ambient_temperature_f)
        .into()
}

fn target_temperature(state: &AccessoryState) -> CharacteristicValue {
    let device = state.device();
    match device.hvac_mode {
        Some(HvacMode::Eco | HvacMode::HeatCool) => {
            tracing::debug!(
                "Mode is set to {}, unable to get target temperature",
                mode_name(device)
            );
            TARGET_FALLBACK.into()
        }
        _ => device
            .temperature(device.target_temperature_c, device.target_temperature_f)
            .into(),
    }
}

fn temperature_display_units(state: &AccessoryState) -> CharacteristicValue {
    match state.device().temperature_scale {
        TemperatureScale::Fahrenheit => TemperatureDisplayUnits::Fahrenheit,
        TemperatureScale::Celsius => TemperatureDisplayUnits::Celsius,
    }
    .into()
}

fn current_relative_humidity(state: &AccessoryState) -> CharacteristicValue {
    state.device().humidity.into()
}

fn cooling_threshold_temperature(state: &AccessoryState) -> CharacteristicValue {
    let device = state.device();
    match device.hvac_mode {
        Some(HvacMode::HeatCool) => device
            .temperature(
                device.target_temperature_high_c,
                device.target_temperature_high_f,
            )
            .into(),
        Some(HvacMode::Eco) => device
            .temperature(device.eco_temperature_high_c, device.eco_temperature_high_f)
            .into(),
        _ => {
            tracing::debug!(
                "Mode is set to {}, unable to get cooling threshold temperature",
                mode_name(device)
            );
            COOLING_THRESHOLD_FALLBACK.into()
        }
    }
}

fn heating_threshold_temperature(state: &AccessoryState) -> CharacteristicValue {
    let device = state.device();
    match device.hvac_mode {
        Some(HvacMode::HeatCool) => device
            .temperature(
                device.target_temperature_low_c,
                device.target_temperature_low_f,
            )
            .into(),
        Some(HvacMode::Eco) => device
            .temperature(device.eco_temperature_low_c, device.eco_temperature_low_f)
            .into(),
        _ => {
            tracing::debug!(
                "Mode is set to {}, unable to get heating threshold temperature",
                mode_name(device)
            );
            HEATING_THRESHOLD_FALLBACK.into()
        }
    }
}

// ── Setters ─────────────────────────────────────────────────────────

fn set_target_heating_cooling_state(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    let device = state.device();
    let can_heat = device.can_heat == Some(true);
    let can_cool = device.can_cool == Some(true);

    let (mode, capability) = match TargetHeatingCoolingState::try_from(value)? {
        TargetHeatingCoolingState::Heat => (HvacMode::Heat, can_heat.then_some(()).ok_or("heat")),
        TargetHeatingCoolingState::Cool => (HvacMode::Cool, can_cool.then_some(()).ok_or("cool")),
        TargetHeatingCoolingState::Auto => (
            HvacMode::HeatCool,
            (can_heat && can_cool).then_some(()).ok_or("heat and cool"),
        ),
        TargetHeatingCoolingState::Off => (HvacMode::Off, Ok(())),
    };

    if let Err(capability) = capability {
        tracing::warn!(
            device_id = %state.device_id(),
            "Device does not support {capability}, cannot set mode to {mode}"
        );
        return Ok(WritePlan::Reject(Rejection::CapabilityDenied { capability }));
    }

    Ok(WritePlan::Send {
        path: state.device_path("hvac_mode"),
        value: mode.as_str().into(),
        description: "target heating cooling",
    })
}

fn set_temperature_display_units(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    let scale = match TemperatureDisplayUnits::try_from(value)? {
        TemperatureDisplayUnits::Fahrenheit => TemperatureScale::Fahrenheit,
        TemperatureDisplayUnits::Celsius => TemperatureScale::Celsius,
    };
    Ok(WritePlan::Send {
        path: state.device_path("temperature_scale"),
        value: scale.as_str().into(),
        description: "temperature display units",
    })
}

fn debounced(
    setpoint: Setpoint,
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    let celsius = value.as_f64()?;
    Ok(WritePlan::Debounce(PendingSetpoint::new(
        setpoint,
        celsius,
        state.device().temperature_scale,
    )))
}

fn set_target_temperature(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    debounced(Setpoint::Target, state, value)
}

fn set_cooling_threshold_temperature(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    debounced(Setpoint::CoolingThreshold, state, value)
}

fn set_heating_threshold_temperature(
    state: &AccessoryState,
    value: CharacteristicValue,
) -> Result<WritePlan, NestKitError> {
    debounced(Setpoint::HeatingThreshold, state, value)
}

// ── Formatters ──────────────────────────────────────────────────────

fn format_celsius(value: CharacteristicValue) -> String {
    value
        .as_f64()
        .map_or_else(|_| value.to_string(), format_temperature)
}

fn format_current_heating_cooling_state(value: CharacteristicValue) -> String {
    match CurrentHeatingCoolingState::try_from(value) {
        Ok(CurrentHeatingCoolingState::Off) => "Off",
        Ok(CurrentHeatingCoolingState::Heat) => "Heating",
        Ok(CurrentHeatingCoolingState::Cool) => "Cooling",
        Err(_) => "Unknown",
    }
    .to_string()
}

fn format_target_heating_cooling_state(value: CharacteristicValue) -> String {
    match TargetHeatingCoolingState::try_from(value) {
        Ok(TargetHeatingCoolingState::Off) => "Off",
        Ok(TargetHeatingCoolingState::Heat) => "Heat",
        Ok(TargetHeatingCoolingState::Cool) => "Cool",
        Ok(TargetHeatingCoolingState::Auto) => "Auto",
        Err(_) => "Unknown",
    }
    .to_string()
}

fn format_display_units(value: CharacteristicValue) -> String {
    match TemperatureDisplayUnits::try_from(value) {
        Ok(TemperatureDisplayUnits::Fahrenheit) => "Fahrenheit",
        _ => "Celsius",
    }
    .to_string()
}
