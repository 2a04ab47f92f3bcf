//! Host port: the framework that exposes characteristics to local clients.
//!
//! The engine registers accessories and bindings with the host, then pushes
//! every refreshed value through [`CharacteristicHost::publish`]. Reads and
//! writes coming from clients travel back through an
//! [`EngineHandle`](crate::handle::EngineHandle).

use std::future::Future;
use std::sync::Arc;

use nestkit_domain::accessory::AccessoryInfo;
use nestkit_domain::characteristic::{Access, CharacteristicRef, CharacteristicValue};
use nestkit_domain::error::NestKitError;
use nestkit_domain::id::AccessoryId;

pub trait CharacteristicHost: Send + Sync {
    /// Announce a new accessory.
    fn add_accessory(
        &self,
        info: &AccessoryInfo,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send;

    /// Declare one characteristic of an already added accessory.
    fn bind(
        &self,
        reference: CharacteristicRef,
        access: Access,
        description: &'static str,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send;

    /// Store the latest value of a characteristic.
    ///
    /// Called on every refresh even when nothing changed. Returns whether
    /// the stored value differs from the previous one.
    fn publish(
        &self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<bool, NestKitError>> + Send;

    /// Withdraw an accessory and all its characteristics.
    fn remove_accessory(
        &self,
        id: AccessoryId,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send;
}

impl<T: CharacteristicHost> CharacteristicHost for Arc<T> {
    fn add_accessory(
        &self,
        info: &AccessoryInfo,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        (**self).add_accessory(info)
    }

    fn bind(
        &self,
        reference: CharacteristicRef,
        access: Access,
        description: &'static str,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        (**self).bind(reference, access, description)
    }

    fn publish(
        &self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<bool, NestKitError>> + Send {
        (**self).publish(reference, value)
    }

    fn remove_accessory(
        &self,
        id: AccessoryId,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        (**self).remove_accessory(id)
    }
}
