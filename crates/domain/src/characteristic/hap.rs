//! Standard enumerated characteristic values and their numeric codes.

use crate::error::ValueError;

use super::CharacteristicValue;

macro_rules! hap_enum {
    ($(#[doc = $doc:expr])* $name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Numeric code sent to the host.
            #[must_use]
            pub fn code(self) -> i64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl From<$name> for CharacteristicValue {
            fn from(value: $name) -> Self {
                Self::Int(value.code())
            }
        }

        impl TryFrom<CharacteristicValue> for $name {
            type Error = ValueError;

            fn try_from(value: CharacteristicValue) -> Result<Self, Self::Error> {
                match value.as_i64()? {
                    $($code => Ok(Self::$variant),)+
                    other => Err(ValueError::OutOfRange {
                        kind: stringify!($name),
                        value: other,
                    }),
                }
            }
        }
    };
}

hap_enum!(
    /// What the thermostat is doing right now.
    CurrentHeatingCoolingState { Off = 0, Heat = 1, Cool = 2 }
);

hap_enum!(
    /// Mode requested by the user.
    TargetHeatingCoolingState { Off = 0, Heat = 1, Cool = 2, Auto = 3 }
);

hap_enum!(
    TemperatureDisplayUnits { Celsius = 0, Fahrenheit = 1 }
);

hap_enum!(
    SmokeDetected { NotDetected = 0, Detected = 1 }
);

hap_enum!(
    CarbonMonoxideDetected { Normal = 0, Abnormal = 1 }
);

hap_enum!(
    StatusLowBattery { Normal = 0, Low = 1 }
);
