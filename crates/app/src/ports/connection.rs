//! Connection port: the session with the remote device service.
//!
//! Authentication and transport belong to the adapter. The engine only sees
//! snapshots coming in and leaf updates going out.

use std::future::Future;
use std::sync::Arc;

use nestkit_domain::error::NestKitError;
use nestkit_domain::snapshot::{PropertyPath, Snapshot};
use tokio::sync::mpsc;

/// Result of [`Connection::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    /// Full tree at the time of subscription.
    pub initial: Snapshot,
    /// Every later push, in the order the service sent them.
    pub updates: mpsc::Receiver<Snapshot>,
}

/// Streams snapshots of the remote tree and writes single leaves into it.
pub trait Connection: Send + Sync {
    /// Establish the session. Must be called before anything else.
    fn open(&self) -> impl Future<Output = Result<(), NestKitError>> + Send;

    /// Fetch the current tree and start receiving pushes.
    fn subscribe(&self) -> impl Future<Output = Result<Subscription, NestKitError>> + Send;

    /// Write `value` at `path`.
    ///
    /// No timeout is applied by the engine; the adapter owns that concern.
    fn update(
        &self,
        path: &PropertyPath,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send;
}

impl<T: Connection> Connection for Arc<T> {
    fn open(&self) -> impl Future<Output = Result<(), NestKitError>> + Send {
        (**self).open()
    }

    fn subscribe(&self) -> impl Future<Output = Result<Subscription, NestKitError>> + Send {
        (**self).subscribe()
    }

    fn update(
        &self,
        path: &PropertyPath,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        (**self).update(path, value)
    }
}
