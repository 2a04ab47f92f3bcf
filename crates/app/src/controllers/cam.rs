//! Camera controller: a motion sensor and an online flag. Read-only.

use nestkit_domain::characteristic::{
    CharacteristicKind, CharacteristicValue, PropertyKey, ServiceKind,
};

use crate::accessory::AccessoryState;
use crate::binding::PropertyBinding;

use super::format_status_active;

pub const MOTION_DETECTED: PropertyKey =
    PropertyKey::new(ServiceKind::MotionSensor, CharacteristicKind::MotionDetected);
pub const MOTION_STATUS_ACTIVE: PropertyKey =
    PropertyKey::new(ServiceKind::MotionSensor, CharacteristicKind::StatusActive);

#[derive(Debug)]
pub struct CamController {
    bindings: Vec<PropertyBinding>,
}

impl CamController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: vec![
                PropertyBinding::new(MOTION_DETECTED, "Motion", motion_detected)
                    .with_formatter(format_motion_detected),
                PropertyBinding::new(
                    MOTION_STATUS_ACTIVE,
                    "Online status (motion sensor)",
                    |state| state.device().is_online.into(),
                )
                .with_formatter(format_status_active),
            ],
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }
}

impl Default for CamController {
    fn default() -> Self {
        Self::new()
    }
}

fn motion_detected(state: &AccessoryState) -> CharacteristicValue {
    state.device().motion_in_progress().into()
}

fn format_motion_detected(value: CharacteristicValue) -> String {
    if value.as_bool().unwrap_or(false) {
        "detected".to_string()
    } else {
        "not detected".to_string()
    }
}
