//! # nestkit-adapter-virtual
//!
//! Simulated cloud service for demos and tests. The remote tree lives in
//! memory as JSON; writes land in the tree and are pushed back to every
//! subscriber as a fresh snapshot, the way the real service echoes changes.
//!
//! ## Demo tree
//!
//! | Group | Device id | Behaviour |
//! |-------|-----------|-----------|
//! | `thermostats` | `demo-thermostat` | Heating, Celsius, heat and cool capable |
//! | `smoke_co_alarms` | `demo-protect` | All clear |
//! | `cameras` | `demo-cam` | Last motion event ended |
//!
//! ## Dependency rule
//!
//! Depends on `nestkit-app` (port traits) and `nestkit-domain` only.

pub mod error;
mod fixtures;
mod tree;

use std::path::Path;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::mpsc;

use nestkit_app::ports::{Connection, Subscription};
use nestkit_domain::error::NestKitError;
use nestkit_domain::snapshot::{PropertyPath, Snapshot};

pub use error::VirtualError;

const SUBSCRIPTION_CAPACITY: usize = 32;

#[derive(Default)]
struct State {
    tree: Value,
    opened: bool,
    fail_next_update: bool,
    subscribers: Vec<mpsc::Sender<Snapshot>>,
    updates: Vec<(String, Value)>,
}

/// In-memory [`Connection`] serving a JSON device tree.
pub struct VirtualConnection {
    state: Mutex<State>,
}

impl VirtualConnection {
    /// One home with a thermostat, a smoke/CO alarm and a camera.
    #[must_use]
    pub fn demo() -> Self {
        Self::with_tree(fixtures::demo_tree())
    }

    /// Serve the given tree.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::Parse`] when the tree is not a valid snapshot.
    pub fn from_json(tree: Value) -> Result<Self, VirtualError> {
        tree::snapshot(&tree)?;
        Ok(Self::with_tree(tree))
    }

    /// Serve the tree stored in a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::Io`] when the file cannot be read and
    /// [`VirtualError::Parse`] when it is not a valid snapshot.
    pub fn from_fixture(path: impl AsRef<Path>) -> Result<Self, VirtualError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| VirtualError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tree = serde_json::from_str(&content).map_err(VirtualError::Parse)?;
        Self::from_json(tree)
    }

    fn with_tree(tree: Value) -> Self {
        Self {
            state: Mutex::new(State {
                tree,
                ..State::default()
            }),
        }
    }

    /// Make the next `update` call fail.
    pub fn fail_next_update(&self) {
        self.lock().fail_next_update = true;
    }

    /// Every successful `update` call so far, as `(path, value)`.
    #[must_use]
    pub fn updates(&self) -> Vec<(String, Value)> {
        self.lock().updates.clone()
    }

    /// Current tree as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::Parse`] when a write left the tree invalid.
    pub fn snapshot(&self) -> Result<Snapshot, VirtualError> {
        tree::snapshot(&self.lock().tree)
    }

    /// Replace the whole tree, as if the service pushed a change, and notify
    /// every subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::Parse`] when the tree is not a valid snapshot;
    /// the previous tree is kept.
    pub fn push(&self, tree: Value) -> Result<(), VirtualError> {
        let snapshot = tree::snapshot(&tree)?;
        self.lock().tree = tree;
        self.broadcast(&snapshot);
        Ok(())
    }

    /// Drop every subscriber, ending their update streams.
    pub fn disconnect(&self) {
        let mut state = self.lock();
        state.subscribers.clear();
        state.opened = false;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn ensure_open(&self) -> Result<(), VirtualError> {
        if self.lock().opened {
            Ok(())
        } else {
            Err(VirtualError::NotConnected)
        }
    }

    // Every snapshot is a full tree, superseded by the next one.
    fn broadcast(&self, snapshot: &Snapshot) {
        self.lock().subscribers.retain(|subscriber| {
            match subscriber.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!("subscriber lagging, snapshot dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn write(&self, path: &PropertyPath, value: Value) -> Result<Snapshot, VirtualError> {
        let mut state = self.lock();
        if !state.opened {
            return Err(VirtualError::NotConnected);
        }
        if std::mem::take(&mut state.fail_next_update) {
            return Err(VirtualError::InjectedFailure);
        }
        let mut tree = state.tree.clone();
        tree::set_leaf(&mut tree, path, value.clone())?;
        let snapshot = tree::snapshot(&tree)?;
        state.tree = tree;
        state.updates.push((path.to_string(), value));
        Ok(snapshot)
    }
}

impl Connection for VirtualConnection {
    async fn open(&self) -> Result<(), NestKitError> {
        self.lock().opened = true;
        tracing::info!("virtual connection opened");
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, NestKitError> {
        self.ensure_open()?;
        let (sender, updates) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let initial = {
            let mut state = self.lock();
            let initial = tree::snapshot(&state.tree)?;
            state.subscribers.push(sender);
            initial
        };
        Ok(Subscription { initial, updates })
    }

    async fn update(&self, path: &PropertyPath, value: Value) -> Result<(), NestKitError> {
        let snapshot = self.write(path, value).map_err(|err| {
            tracing::warn!(path = %path, error = %err, "virtual update failed");
            NestKitError::RemoteWrite(Box::new(err))
        })?;
        tracing::debug!(path = %path, "virtual update applied");
        self.broadcast(&snapshot);
        Ok(())
    }
}
