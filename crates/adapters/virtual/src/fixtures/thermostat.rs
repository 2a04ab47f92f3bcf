//! Demo thermostat, heating, displayed in Celsius.

use serde_json::{Value, json};

use super::STRUCTURE_ID;

pub(super) const DEVICE_ID: &str = "demo-thermostat";

pub(super) fn device() -> Value {
    json!({
        "device_id": DEVICE_ID,
        "structure_id": STRUCTURE_ID,
        "name": "Living Room",
        "name_long": "Living Room Thermostat",
        "software_version": "5.9.3-5",
        "is_online": true,
        "hvac_mode": "heat",
        "previous_hvac_mode": "heat-cool",
        "hvac_state": "heating",
        "temperature_scale": "C",
        "ambient_temperature_c": 19.5,
        "ambient_temperature_f": 67,
        "target_temperature_c": 21.0,
        "target_temperature_f": 70,
        "target_temperature_low_c": 19.0,
        "target_temperature_low_f": 66,
        "target_temperature_high_c": 24.0,
        "target_temperature_high_f": 75,
        "eco_temperature_low_c": 15.5,
        "eco_temperature_low_f": 60,
        "eco_temperature_high_c": 26.5,
        "eco_temperature_high_f": 80,
        "humidity": 45,
        "can_heat": true,
        "can_cool": true,
        "fan_timer_active": false,
        "fan_timer_duration": 15,
        "has_leaf": true,
        "sunlight_correction_enabled": true,
        "sunlight_correction_active": false,
        "is_using_emergency_heat": false,
    })
}
