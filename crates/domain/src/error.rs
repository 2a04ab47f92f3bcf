//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`NestKitError`]
//! via `#[from]` (or an explicit `From` impl for adapter errors).

use crate::characteristic::CharacteristicRef;

/// Boxed error used for failures coming from outside the domain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every fallible operation of the bridge.
#[derive(Debug, thiserror::Error)]
pub enum NestKitError {
    /// A device or structure snapshot is missing its identity.
    #[error("invalid snapshot")]
    InvalidSnapshot(#[from] InvalidSnapshotError),

    /// The requested accessory or characteristic does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The host handed over a value of the wrong type.
    #[error("invalid characteristic value")]
    InvalidValue(#[from] ValueError),

    /// The characteristic has no setter.
    #[error("characteristic {0} is read-only")]
    NotWritable(CharacteristicRef),

    /// The remote update call failed.
    #[error("remote write failed")]
    RemoteWrite(#[source] BoxError),

    /// Opening or subscribing to the remote feed failed.
    #[error("connection error")]
    Connection(#[source] BoxError),

    /// The engine task is no longer running.
    #[error("engine stopped")]
    EngineStopped,
}

/// Reasons a snapshot cannot back an accessory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSnapshotError {
    #[error("device has no device_id")]
    MissingDeviceId,

    #[error("device {device_id} has no structure_id")]
    MissingStructureId { device_id: String },

    #[error("structure has no structure_id")]
    StructureWithoutId,

    #[error("structure {structure_id} referenced by device {device_id} is not in the snapshot")]
    UnknownStructure {
        device_id: String,
        structure_id: String,
    },

    #[error("structure {expected} was replaced by a snapshot for {actual}")]
    StructureMismatch { expected: String, actual: String },

    #[error("device {expected} was replaced by a snapshot for {actual}")]
    DeviceMismatch { expected: String, actual: String },
}

/// Lookup failure for a named thing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A characteristic value could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("expected a {expected} value")]
    TypeMismatch { expected: &'static str },

    #[error("{value} is not a valid {kind}")]
    OutOfRange { kind: &'static str, value: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_invalid_snapshot_into_top_level_error() {
        let err: NestKitError = InvalidSnapshotError::MissingDeviceId.into();
        assert!(matches!(
            err,
            NestKitError::InvalidSnapshot(InvalidSnapshotError::MissingDeviceId)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Accessory",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Accessory abc not found");
    }

    #[test]
    fn should_display_unknown_structure_details() {
        let err = InvalidSnapshotError::UnknownStructure {
            device_id: "dev".to_string(),
            structure_id: "st".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "structure st referenced by device dev is not in the snapshot"
        );
    }

    #[test]
    fn should_keep_remote_write_source() {
        let source: BoxError = "timeout".into();
        let err = NestKitError::RemoteWrite(source);
        let inner = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(inner.as_deref(), Some("timeout"));
    }
}
