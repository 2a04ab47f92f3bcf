//! Virtual adapter error types.

use nestkit_domain::error::NestKitError;

/// Errors specific to the virtual connection.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// `open` has not been called yet.
    #[error("virtual connection not opened")]
    NotConnected,

    /// The tree does not deserialize into a snapshot.
    #[error("failed to parse device tree")]
    Parse(#[source] serde_json::Error),

    /// The fixture file could not be read.
    #[error("failed to read fixture {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The path does not point below an existing device or structure.
    #[error("no node at {path}")]
    InvalidPath { path: String },

    /// Failure requested through `fail_next_update`.
    #[error("injected update failure")]
    InjectedFailure,
}

impl VirtualError {
    /// Convert into the top-level error: write failures become
    /// [`NestKitError::RemoteWrite`], everything else
    /// [`NestKitError::Connection`].
    pub fn into_domain(self) -> NestKitError {
        match self {
            Self::InvalidPath { .. } | Self::InjectedFailure => {
                NestKitError::RemoteWrite(Box::new(self))
            }
            other => NestKitError::Connection(Box::new(other)),
        }
    }
}

impl From<VirtualError> for NestKitError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_not_connected_error() {
        let err = VirtualError::NotConnected;
        assert_eq!(err.to_string(), "virtual connection not opened");
    }

    #[test]
    fn should_convert_not_connected_to_connection_error() {
        let err: NestKitError = VirtualError::NotConnected.into();
        assert!(matches!(err, NestKitError::Connection(_)));
    }

    #[test]
    fn should_convert_injected_failure_to_remote_write_error() {
        let err: NestKitError = VirtualError::InjectedFailure.into();
        assert!(matches!(err, NestKitError::RemoteWrite(_)));
    }

    #[test]
    fn should_display_invalid_path() {
        let err = VirtualError::InvalidPath {
            path: "devices/thermostats/nope/hvac_mode".to_string(),
        };
        assert_eq!(err.to_string(), "no node at devices/thermostats/nope/hvac_mode");
    }
}
