//! Demo smoke/CO alarm, all clear.

use serde_json::{Value, json};

use super::STRUCTURE_ID;

pub(super) const DEVICE_ID: &str = "demo-protect";

pub(super) fn device() -> Value {
    json!({
        "device_id": DEVICE_ID,
        "structure_id": STRUCTURE_ID,
        "name": "Hallway",
        "software_version": "3.1rc9",
        "is_online": true,
        "smoke_alarm_state": "ok",
        "co_alarm_state": "ok",
        "battery_health": "ok",
        "is_manual_test_active": false,
    })
}

#[cfg(test)]
mod tests {
    use nestkit_domain::device::{AlarmState, BatteryHealth, Device};

    use super::*;

    #[test]
    fn should_report_all_clear() {
        let device: Device = serde_json::from_value(device()).unwrap();
        assert_eq!(device.smoke_alarm_state, Some(AlarmState::Ok));
        assert_eq!(device.co_alarm_state, Some(AlarmState::Ok));
        assert_eq!(device.battery_health, Some(BatteryHealth::Ok));
    }
}
