//! Per-category controllers.
//!
//! Each category is a fixed variant holding its own ordered list of
//! [`PropertyBinding`]s; the variant is picked from the
//! [`DeviceCategory`] when the accessory is created.

pub mod cam;
pub mod extended;
pub mod protect;
pub mod thermostat;

use nestkit_domain::characteristic::CharacteristicValue;
use nestkit_domain::device::DeviceCategory;

use crate::binding::PropertyBinding;

pub use self::cam::CamController;
pub use self::protect::ProtectController;
pub use self::thermostat::ThermostatController;

#[derive(Debug)]
pub enum Controller {
    Thermostat(ThermostatController),
    Protect(ProtectController),
    Cam(CamController),
}

impl Controller {
    /// Controller for `category`; `extended` adds the non-standard
    /// characteristics (away, eco mode, fan timer, ...).
    #[must_use]
    pub fn for_category(category: DeviceCategory, extended: bool) -> Self {
        match category {
            DeviceCategory::Thermostat => Self::Thermostat(ThermostatController::new(extended)),
            DeviceCategory::Protect => Self::Protect(ProtectController::new(extended)),
            DeviceCategory::Cam => Self::Cam(CamController::new()),
        }
    }

    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        match self {
            Self::Thermostat(_) => DeviceCategory::Thermostat,
            Self::Protect(_) => DeviceCategory::Protect,
            Self::Cam(_) => DeviceCategory::Cam,
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        match self {
            Self::Thermostat(controller) => controller.bindings(),
            Self::Protect(controller) => controller.bindings(),
            Self::Cam(controller) => controller.bindings(),
        }
    }
}

pub(crate) fn format_status_active(value: CharacteristicValue) -> String {
    match value {
        CharacteristicValue::Bool(true) => "online".to_string(),
        CharacteristicValue::Bool(false) => "offline".to_string(),
        other => format!("unknown ({other})"),
    }
}
