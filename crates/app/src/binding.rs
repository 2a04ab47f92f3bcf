//! Property bindings: one local characteristic tied to remote state.
//!
//! A binding pairs a [`PropertyKey`] with a getter, an optional setter and
//! an optional formatter. Getters are pure functions of the owning
//! [`AccessoryState`]; setters never touch the network themselves but
//! return a [`WritePlan`] the engine carries out.

use nestkit_domain::characteristic::{Access, CharacteristicValue, PropertyKey};
use nestkit_domain::error::NestKitError;
use nestkit_domain::snapshot::PropertyPath;
use nestkit_domain::write::Rejection;

use crate::accessory::AccessoryState;
use crate::controllers::thermostat::PendingSetpoint;

pub type Getter = fn(&AccessoryState) -> CharacteristicValue;
pub type Setter = fn(&AccessoryState, CharacteristicValue) -> Result<WritePlan, NestKitError>;
pub type Formatter = fn(CharacteristicValue) -> String;

/// What a setter wants done with a write.
#[derive(Debug, Clone, PartialEq)]
pub enum WritePlan {
    /// Update one remote leaf right away.
    Send {
        path: PropertyPath,
        value: serde_json::Value,
        description: &'static str,
    },
    /// Hand the value to the debouncer; mode is checked again when it fires.
    Debounce(PendingSetpoint),
    /// Refuse locally.
    Reject(Rejection),
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyBinding {
    key: PropertyKey,
    description: &'static str,
    getter: Getter,
    setter: Option<Setter>,
    formatter: Option<Formatter>,
}

impl PropertyBinding {
    /// Read-only binding.
    #[must_use]
    pub fn new(key: PropertyKey, description: &'static str, getter: Getter) -> Self {
        Self {
            key,
            description,
            getter,
            setter: None,
            formatter: None,
        }
    }

    #[must_use]
    pub fn with_setter(mut self, setter: Setter) -> Self {
        self.setter = Some(setter);
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn key(&self) -> PropertyKey {
        self.key
    }

    /// Human readable name used in diagnostics, e.g. `Target temperature`.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    #[must_use]
    pub fn access(&self) -> Access {
        if self.setter.is_some() {
            Access::ReadWrite
        } else {
            Access::ReadOnly
        }
    }

    /// Evaluate the getter against the current snapshots.
    #[must_use]
    pub fn get(&self, state: &AccessoryState) -> CharacteristicValue {
        (self.getter)(state)
    }

    /// Evaluate the setter.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::NotWritable`] when the binding has no setter,
    /// or whatever the setter itself reports for a malformed value.
    pub fn set(
        &self,
        state: &AccessoryState,
        value: CharacteristicValue,
    ) -> Result<WritePlan, NestKitError> {
        let setter = self
            .setter
            .ok_or_else(|| NestKitError::NotWritable(state.reference(self.key)))?;
        setter(state, value)
    }

    /// Render a value for logging. `Null` is never passed to the formatter.
    #[must_use]
    pub fn format(&self, value: CharacteristicValue) -> String {
        match self.formatter {
            Some(formatter) if !value.is_null() => formatter(value),
            _ => value.to_string(),
        }
    }
}
