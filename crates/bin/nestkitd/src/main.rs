//! # nestkitd — nestkit daemon
//!
//! Composition root that wires the adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Construct the connection (virtual cloud) and the characteristic host
//! - Construct the sync engine, injecting both through their port traits
//! - Run the engine loop until Ctrl-C or the end of the update stream
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use nestkit_adapter_virtual::VirtualConnection;
use nestkit_app::engine::SyncEngine;
use nestkit_app::handle::EngineHandle;
use nestkit_app::memory_host::InMemoryHost;

use crate::config::Config;

const CHANGE_CHANNEL_CAPACITY: usize = 256;
const REQUEST_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading nestkit.toml")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Connection
    let connection = match &config.simulation.fixture {
        Some(path) => VirtualConnection::from_fixture(path)
            .with_context(|| format!("loading fixture {}", path.display()))?,
        None => VirtualConnection::demo(),
    };

    // Host
    let host = Arc::new(InMemoryHost::new(CHANGE_CHANNEL_CAPACITY));
    let mut changes = host.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => tracing::info!(
                    characteristic = %change.reference,
                    value = %change.value,
                    "characteristic changed"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "change log lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Engine
    let mut engine = SyncEngine::new(connection, Arc::clone(&host), config.engine_options());
    let updates = engine.connect().await.context("connecting to the device service")?;
    tracing::info!(accessories = engine.registry().len(), "nestkitd ready");

    let (_handle, requests) = EngineHandle::channel(REQUEST_CHANNEL_CAPACITY);
    tokio::select! {
        result = engine.run(updates, requests) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
