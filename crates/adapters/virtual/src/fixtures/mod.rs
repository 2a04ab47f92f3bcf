//! Demo device tree: one home with a thermostat, a smoke/CO alarm and a
//! camera.

mod cam;
mod protect;
mod thermostat;

use serde_json::{Value, json};

pub(crate) const STRUCTURE_ID: &str = "demo-home";

/// Full tree served by [`VirtualConnection::demo`](crate::VirtualConnection::demo).
pub(crate) fn demo_tree() -> Value {
    json!({
        "devices": {
            "thermostats": { (thermostat::DEVICE_ID): thermostat::device() },
            "smoke_co_alarms": { (protect::DEVICE_ID): protect::device() },
            "cameras": { (cam::DEVICE_ID): cam::device() },
        },
        "structures": {
            (STRUCTURE_ID): {
                "structure_id": STRUCTURE_ID,
                "name": "Demo Home",
                "away": "home",
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::snapshot;

    #[test]
    fn should_parse_demo_tree_into_three_devices() {
        let snapshot = snapshot(&demo_tree()).unwrap();
        assert_eq!(snapshot.device_count(), 3);
        assert_eq!(snapshot.structures.len(), 1);
    }

    #[test]
    fn should_attach_every_device_to_demo_home() {
        let snapshot = snapshot(&demo_tree()).unwrap();
        for (_, device) in snapshot.all_devices() {
            assert_eq!(device.structure_id.as_str(), STRUCTURE_ID);
            assert!(device.validate().is_ok());
        }
    }
}
