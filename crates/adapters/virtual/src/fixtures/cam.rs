//! Demo camera whose last motion event has ended.

use serde_json::{Value, json};

use super::STRUCTURE_ID;

pub(super) const DEVICE_ID: &str = "demo-cam";

pub(super) fn device() -> Value {
    json!({
        "device_id": DEVICE_ID,
        "structure_id": STRUCTURE_ID,
        "name": "Front Door",
        "software_version": "205-600052",
        "is_online": true,
        "last_event": {
            "has_motion": true,
            "has_sound": false,
            "has_person": false,
            "start_time": "2016-12-29T00:00:00.000Z",
            "end_time": "2016-12-29T00:01:00.000Z",
        },
    })
}
