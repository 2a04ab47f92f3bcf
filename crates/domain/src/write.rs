//! Outcome of a host-initiated write.

use serde::Serialize;

/// What happened to a write request.
///
/// Locally refused writes are not errors: they are acknowledged with
/// [`WriteOutcome::Rejected`] and never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Delivered to the remote service.
    Sent,
    /// Queued behind the debounce window.
    Scheduled,
    /// Refused before any network call.
    Rejected(Rejection),
}

impl WriteOutcome {
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Reason a write was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The device lacks the capability the value needs (e.g. cooling).
    #[error("device cannot {capability}")]
    CapabilityDenied { capability: &'static str },

    /// The property is not writable in the device's current mode.
    #[error("not writable while mode is {mode}")]
    UnsupportedMode { mode: String },

    /// The device does not report what the write relies on.
    #[error("{field} is not available")]
    Unavailable { field: &'static str },
}
