//! Host-side handle to a running [`SyncEngine`](crate::engine::SyncEngine).
//!
//! Read and write calls from the host are turned into [`HostRequest`]s and
//! processed by the engine loop in arrival order, interleaved with snapshot
//! refreshes.

use nestkit_domain::characteristic::{CharacteristicRef, CharacteristicValue};
use nestkit_domain::error::NestKitError;
use nestkit_domain::write::WriteOutcome;
use tokio::sync::{mpsc, oneshot};

/// Request processed by the engine loop.
#[derive(Debug)]
pub enum HostRequest {
    Read {
        reference: CharacteristicRef,
        reply: oneshot::Sender<Result<CharacteristicValue, NestKitError>>,
    },
    Write {
        reference: CharacteristicRef,
        value: CharacteristicValue,
        reply: oneshot::Sender<Result<WriteOutcome, NestKitError>>,
    },
}

/// Cloneable sender side of the request channel.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<HostRequest>,
}

impl EngineHandle {
    /// Create a handle and the receiver to pass to
    /// [`SyncEngine::run`](crate::engine::SyncEngine::run).
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<HostRequest>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Current value of a characteristic.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::EngineStopped`] when the loop is gone, or the
    /// engine's own error for an unknown characteristic.
    pub async fn read(
        &self,
        reference: CharacteristicRef,
    ) -> Result<CharacteristicValue, NestKitError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(HostRequest::Read { reference, reply })
            .await
            .map_err(|_| NestKitError::EngineStopped)?;
        response.await.map_err(|_| NestKitError::EngineStopped)?
    }

    /// Write a characteristic.
    ///
    /// Resolves as soon as the write is sent, scheduled or rejected; a
    /// debounced write going out later is not awaited.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::EngineStopped`] when the loop is gone, or the
    /// engine's own error (read-only characteristic, wrong value type,
    /// failed immediate remote write).
    pub async fn write(
        &self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<WriteOutcome, NestKitError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(HostRequest::Write {
                reference,
                value,
                reply,
            })
            .await
            .map_err(|_| NestKitError::EngineStopped)?;
        response.await.map_err(|_| NestKitError::EngineStopped)?
    }
}
