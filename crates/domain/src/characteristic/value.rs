use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Value carried by a characteristic.
///
/// `Null` stands for a field the device did not report.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    #[default]
    Null,
}

impl CharacteristicValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] for booleans and `Null`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match *self {
            Self::Int(value) => Ok(value as f64),
            Self::Float(value) => Ok(value),
            _ => Err(ValueError::TypeMismatch { expected: "number" }),
        }
    }

    /// Integer view of the value. Floats are accepted when integral.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] for anything else.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Result<i64, ValueError> {
        match *self {
            Self::Int(value) => Ok(value),
            Self::Float(value) if value.fract() == 0.0 => Ok(value as i64),
            _ => Err(ValueError::TypeMismatch {
                expected: "integer",
            }),
        }
    }

    /// Boolean view of the value; hosts may send `0` / `1` for booleans.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TypeMismatch`] for anything else.
    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match *self {
            Self::Bool(value) => Ok(value),
            Self::Int(0) => Ok(false),
            Self::Int(1) => Ok(true),
            _ => Err(ValueError::TypeMismatch { expected: "boolean" }),
        }
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Int(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<CharacteristicValue>> From<Option<T>> for CharacteristicValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
