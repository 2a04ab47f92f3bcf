//! Temperature scales, conversion and display rounding.
//!
//! Characteristics always carry Celsius. Devices report and accept values in
//! the scale given by their `temperature_scale` field, so every temperature
//! crosses this module on the way in and out.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Scale a device uses to display and accept temperatures.
///
/// Any wire value other than `F`, `null` included, reads as Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TemperatureScale {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureScale {
    /// Suffix used in log lines (`°C` / `°F`).
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Celsius => "\u{b0}C",
            Self::Fahrenheit => "\u{b0}F",
        }
    }

    /// Wire representation of the scale.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Round a Celsius value into the precision this scale accepts.
    ///
    /// Celsius devices take half degrees; Fahrenheit devices take whole
    /// degrees, so the value is converted first.
    #[must_use]
    pub fn from_celsius_rounded(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => round_half(celsius),
            Self::Fahrenheit => celsius_to_fahrenheit(celsius).round(),
        }
    }

    /// Convert a value expressed in this scale into Celsius.
    #[must_use]
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => fahrenheit_to_celsius(value),
        }
    }
}

impl<'de> Deserialize<'de> for TemperatureScale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let letter = Option::<String>::deserialize(deserializer)?;
        Ok(match letter.as_deref() {
            Some("F") => Self::Fahrenheit,
            _ => Self::Celsius,
        })
    }
}

impl fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert Celsius to Fahrenheit.
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Convert Fahrenheit to Celsius.
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) / 1.8
}

/// Round to the nearest half degree.
#[must_use]
pub fn round_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Human readable rendering of a Celsius temperature in both scales,
/// e.g. `21.5°C and 71°F`.
#[must_use]
pub fn format_temperature(celsius: f64) -> String {
    format!(
        "{}\u{b0}C and {}\u{b0}F",
        round_half(celsius),
        celsius_to_fahrenheit(celsius).round()
    )
}
