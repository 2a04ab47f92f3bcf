//! Synchronization engine: one task owning the registry, the debouncer,
//! the connection and the host.
//!
//! Inbound snapshots refresh every bound characteristic; outbound writes run
//! the binding's setter and are either sent, scheduled behind the debounce
//! window, or rejected locally. Everything happens on a single task, so
//! snapshots are applied in the order received and a debounced write always
//! sees the latest snapshot when it fires.

use std::time::Duration;

use nestkit_domain::accessory::AccessoryInfoOverride;
use nestkit_domain::characteristic::{CharacteristicRef, CharacteristicValue};
use nestkit_domain::error::{NestKitError, NotFoundError};
use nestkit_domain::snapshot::Snapshot;
use nestkit_domain::write::WriteOutcome;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::accessory::AccessoryState;
use crate::binding::WritePlan;
use crate::controllers::thermostat::{PendingSetpoint, resolve_setpoint};
use crate::debounce::{self, Debouncer};
use crate::handle::HostRequest;
use crate::ports::{CharacteristicHost, Connection};
use crate::registry::{ApplyReport, LoadReport, Registry, RegistryOptions};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Quiet period before a temperature write goes out.
    pub debounce: Duration,
    /// Consecutive snapshots a device may be missing from; `0` disables removal.
    pub stale_after_misses: u32,
    /// Expose away, eco mode, fan timer and the read-only flags.
    pub extended_characteristics: bool,
    pub accessory_info: Vec<AccessoryInfoOverride>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let registry = RegistryOptions::default();
        Self {
            debounce: debounce::DEFAULT_DELAY,
            stale_after_misses: registry.stale_after_misses,
            extended_characteristics: registry.extended_characteristics,
            accessory_info: registry.accessory_info,
        }
    }
}

pub struct SyncEngine<C, H> {
    connection: C,
    host: H,
    registry: Registry,
    debouncer: Debouncer<CharacteristicRef, PendingSetpoint>,
}

impl<C, H> SyncEngine<C, H>
where
    C: Connection,
    H: CharacteristicHost,
{
    pub fn new(connection: C, host: H, options: EngineOptions) -> Self {
        Self {
            connection,
            host,
            registry: Registry::new(RegistryOptions {
                stale_after_misses: options.stale_after_misses,
                extended_characteristics: options.extended_characteristics,
                accessory_info: options.accessory_info,
            }),
            debouncer: Debouncer::new(options.debounce),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Number of debounced writes waiting to fire.
    pub fn pending_writes(&self) -> usize {
        self.debouncer.len()
    }

    /// Open the connection, subscribe and build the accessories from the
    /// initial snapshot.
    ///
    /// Returns the stream of later snapshots, to be handed to
    /// [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Propagates connection and host failures.
    pub async fn connect(&mut self) -> Result<mpsc::Receiver<Snapshot>, NestKitError> {
        tracing::info!("fetching devices");
        self.connection.open().await?;
        let subscription = self.connection.subscribe().await?;
        self.load(&subscription.initial).await?;
        Ok(subscription.updates)
    }

    /// Rebuild every accessory from a full snapshot. Pending writes are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub async fn load(&mut self, snapshot: &Snapshot) -> Result<LoadReport, NestKitError> {
        let dropped = self.debouncer.cancel_where(|_| true);
        if dropped > 0 {
            tracing::warn!(dropped, "pending writes dropped by full reload");
        }
        self.registry.load(snapshot, &self.host).await
    }

    /// Route an incremental snapshot to the accessories.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub async fn apply_snapshot(
        &mut self,
        snapshot: &Snapshot,
    ) -> Result<ApplyReport, NestKitError> {
        let report = self.registry.apply(snapshot, &self.host).await?;
        for removed in &report.removed {
            self.debouncer
                .cancel_where(|reference| reference.accessory == *removed);
        }
        Ok(report)
    }

    /// Evaluate the getter of a characteristic.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::NotFound`] for an unknown accessory or
    /// characteristic.
    pub fn read(&self, reference: CharacteristicRef) -> Result<CharacteristicValue, NestKitError> {
        self.accessory(reference)?.read(reference.key)
    }

    /// Run the setter of a characteristic and carry out its plan.
    ///
    /// Locally refused writes are acknowledged with
    /// [`WriteOutcome::Rejected`]; they are not errors.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::NotFound`], [`NestKitError::NotWritable`],
    /// [`NestKitError::InvalidValue`], or the connection's error when an
    /// immediate remote write fails.
    pub async fn write(
        &mut self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<WriteOutcome, NestKitError> {
        let state = self.accessory(reference)?;
        let binding = state
            .binding(reference.key)
            .ok_or_else(|| state.missing(reference.key))?;
        let plan = binding.set(state, value)?;

        match plan {
            WritePlan::Send {
                path,
                value,
                description,
            } => {
                tracing::info!("Setting {description} for {} to: {value}", state.name());
                if let Err(err) = self.connection.update(&path, value).await {
                    tracing::warn!(path = %path, error = %err, "remote write failed");
                    return Err(err);
                }
                Ok(WriteOutcome::Sent)
            }
            WritePlan::Debounce(pending) => {
                tracing::info!(
                    "Trying to set {} for {} to {}{}",
                    pending.setpoint.description(),
                    state.name(),
                    pending.value,
                    pending.scale.unit()
                );
                self.debouncer.schedule(reference, pending, Instant::now());
                Ok(WriteOutcome::Scheduled)
            }
            WritePlan::Reject(rejection) => {
                tracing::warn!(
                    characteristic = %reference,
                    reason = %rejection,
                    "write rejected for {}",
                    state.name()
                );
                Ok(WriteOutcome::Rejected(rejection))
            }
        }
    }

    /// When the earliest debounced write is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// Fire every debounced write due at `now`.
    ///
    /// Returns how many network writes were attempted. Writes whose mode no
    /// longer allows them are dropped; failures are logged, never returned.
    pub async fn flush_due(&mut self, now: Instant) -> usize {
        let mut attempted = 0;
        for (reference, pending) in self.debouncer.take_due(now) {
            let Some(state) = self.registry.get(reference.accessory) else {
                continue;
            };
            let description = pending.setpoint.description();
            let (path, value) = match resolve_setpoint(state, &pending) {
                Ok(write) => write,
                Err(rejection) => {
                    tracing::warn!(
                        characteristic = %reference,
                        "{rejection}, unable to set {description} for {}",
                        state.name()
                    );
                    continue;
                }
            };

            tracing::info!("Setting {description} for {} to: {value}", state.name());
            attempted += 1;
            match self.connection.update(&path, value).await {
                Ok(()) => tracing::info!(
                    "{description} for {} set to {}{}",
                    state.name(),
                    pending.value,
                    pending.scale.unit()
                ),
                Err(err) => tracing::warn!(
                    path = %path,
                    error = %err,
                    "unable to set {description} for {}",
                    state.name()
                ),
            }
        }
        attempted
    }

    /// Drive the engine until the snapshot stream ends.
    ///
    /// Multiplexes snapshots, host requests and the debounce deadline on the
    /// current task. Host requests stop being polled once every
    /// [`EngineHandle`](crate::handle::EngineHandle) is dropped; snapshots
    /// keep flowing.
    ///
    /// # Errors
    ///
    /// Snapshot and write failures are logged, not returned; the loop only
    /// ends when the snapshot stream closes.
    pub async fn run(
        mut self,
        mut updates: mpsc::Receiver<Snapshot>,
        mut requests: mpsc::Receiver<HostRequest>,
    ) -> Result<(), NestKitError> {
        let mut requests_open = true;
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                snapshot = updates.recv() => {
                    let Some(snapshot) = snapshot else {
                        tracing::info!("snapshot stream closed");
                        break;
                    };
                    if let Err(err) = self.apply_snapshot(&snapshot).await {
                        tracing::warn!(error = %err, "unable to apply snapshot");
                    }
                }
                request = requests.recv(), if requests_open => {
                    match request {
                        Some(request) => self.handle(request).await,
                        None => requests_open = false,
                    }
                }
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.flush_due(Instant::now()).await;
                }
            }
        }

        if !self.debouncer.is_empty() {
            tracing::warn!(
                dropped = self.debouncer.len(),
                "pending writes dropped on shutdown"
            );
        }
        Ok(())
    }

    async fn handle(&mut self, request: HostRequest) {
        match request {
            HostRequest::Read { reference, reply } => {
                let _ = reply.send(self.read(reference));
            }
            HostRequest::Write {
                reference,
                value,
                reply,
            } => {
                let _ = reply.send(self.write(reference, value).await);
            }
        }
    }

    fn accessory(&self, reference: CharacteristicRef) -> Result<&AccessoryState, NestKitError> {
        self.registry.get(reference.accessory).ok_or_else(|| {
            NotFoundError {
                entity: "Accessory",
                id: reference.accessory.to_string(),
            }
            .into()
        })
    }
}
