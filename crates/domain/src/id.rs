//! Typed identifier newtypes.
//!
//! Remote identifiers (`device_id`, `structure_id`) are opaque strings issued
//! by the cloud service. Accessory identifiers are name-based UUIDs so they
//! stay stable across restarts.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_remote_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a remote identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_remote_id!(
    /// Identifier of a remote [`Device`](crate::device::Device).
    DeviceId
);

define_remote_id!(
    /// Identifier of a remote [`Structure`](crate::structure::Structure).
    StructureId
);

/// Stable identifier of a locally exposed accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessoryId(uuid::Uuid);

impl AccessoryId {
    /// Derive the identifier from the device type and remote device id.
    ///
    /// The same inputs always produce the same identifier.
    #[must_use]
    pub fn for_device(device_type: &str, device_id: &DeviceId) -> Self {
        let name = format!("nest.{device_type}.{device_id}");
        Self(uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
