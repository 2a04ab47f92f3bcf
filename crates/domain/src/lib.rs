//! # nestkit-domain
//!
//! Pure domain model for the nestkit bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and error conventions
//! - Define **Devices** and **Structures** (replace-only snapshots of the remote tree)
//! - Define **Snapshots** and remote property paths
//! - Define **Characteristics** (locally exposed, typed, observable values)
//! - Temperature unit conversion and rounding
//! - Write outcomes and the reasons a write can be refused locally
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod accessory;
pub mod characteristic;
pub mod device;
pub mod snapshot;
pub mod structure;
pub mod units;
pub mod write;
