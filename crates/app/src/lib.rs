//! # nestkit-app
//!
//! Application layer: the accessory synchronization engine and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Connection`: open, subscribe to and write into the remote tree
//!   - `CharacteristicHost`: expose accessories and characteristics locally
//! - Bind every characteristic to a getter / optional setter / optional
//!   formatter (`PropertyBinding`) per device category (`controllers`)
//! - Fan every snapshot refresh out to all bindings (`AccessoryState`)
//! - Coalesce rapid temperature writes behind a trailing-edge debounce
//! - Track which devices are alive (`Registry`) and drive everything from a
//!   single event loop (`SyncEngine`)
//! - Provide an **in-process host** (`InMemoryHost`) that needs no IO
//!
//! ## Dependency rule
//! Depends on `nestkit-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod accessory;
pub mod binding;
pub mod controllers;
pub mod debounce;
pub mod engine;
pub mod handle;
pub mod memory_host;
pub mod ports;
pub mod registry;

#[cfg(test)]
mod test_support;
