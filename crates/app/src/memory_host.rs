//! In-process characteristic host backed by a map and a tokio broadcast
//! channel.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::broadcast;

use nestkit_domain::accessory::AccessoryInfo;
use nestkit_domain::characteristic::{Access, CharacteristicRef, CharacteristicValue};
use nestkit_domain::error::{NestKitError, NotFoundError};
use nestkit_domain::id::AccessoryId;

use crate::ports::CharacteristicHost;

/// Emitted whenever a published value differs from the stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacteristicChanged {
    pub reference: CharacteristicRef,
    pub value: CharacteristicValue,
}

/// One bound characteristic as seen by local clients.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacteristicEntry {
    pub access: Access,
    pub description: &'static str,
    pub value: CharacteristicValue,
}

#[derive(Default)]
struct Inner {
    accessories: BTreeMap<AccessoryId, AccessoryInfo>,
    characteristics: HashMap<CharacteristicRef, CharacteristicEntry>,
}

/// Host keeping every characteristic in memory.
///
/// Change notifications go out on a [`broadcast`] channel; publishing
/// succeeds even when nobody listens.
pub struct InMemoryHost {
    inner: Mutex<Inner>,
    sender: broadcast::Sender<CharacteristicChanged>,
}

impl InMemoryHost {
    /// Create a host with the given notification channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Mutex::new(Inner::default()),
            sender,
        }
    }

    /// Subscribe to changes published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CharacteristicChanged> {
        self.sender.subscribe()
    }

    /// Last published value of a characteristic.
    #[must_use]
    pub fn value(&self, reference: CharacteristicRef) -> Option<CharacteristicValue> {
        self.entry(reference).map(|entry| entry.value)
    }

    #[must_use]
    pub fn entry(&self, reference: CharacteristicRef) -> Option<CharacteristicEntry> {
        self.lock().characteristics.get(&reference).cloned()
    }

    /// Every accessory currently exposed, ordered by id.
    #[must_use]
    pub fn accessories(&self) -> Vec<AccessoryInfo> {
        self.lock().accessories.values().cloned().collect()
    }

    /// Characteristics of one accessory, ordered by key.
    #[must_use]
    pub fn characteristics(&self, id: AccessoryId) -> Vec<(CharacteristicRef, CharacteristicEntry)> {
        let mut found: Vec<_> = self
            .lock()
            .characteristics
            .iter()
            .filter(|(reference, _)| reference.accessory == id)
            .map(|(reference, entry)| (*reference, entry.clone()))
            .collect();
        found.sort_by_key(|(reference, _)| *reference);
        found
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn add(&self, info: &AccessoryInfo) {
        self.lock().accessories.insert(info.id, info.clone());
    }

    fn declare(
        &self,
        reference: CharacteristicRef,
        access: Access,
        description: &'static str,
    ) -> Result<(), NestKitError> {
        let mut inner = self.lock();
        if !inner.accessories.contains_key(&reference.accessory) {
            return Err(NotFoundError {
                entity: "Accessory",
                id: reference.accessory.to_string(),
            }
            .into());
        }
        inner
            .characteristics
            .entry(reference)
            .and_modify(|entry| {
                entry.access = access;
                entry.description = description;
            })
            .or_insert(CharacteristicEntry {
                access,
                description,
                value: CharacteristicValue::Null,
            });
        Ok(())
    }

    fn store(
        &self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<bool, NestKitError> {
        let changed = {
            let mut inner = self.lock();
            let entry = inner.characteristics.get_mut(&reference).ok_or_else(|| {
                NotFoundError {
                    entity: "Characteristic",
                    id: reference.to_string(),
                }
            })?;
            let changed = entry.value != value;
            entry.value = value;
            changed
        };
        if changed {
            // broadcast::send fails only when there are zero receivers.
            let _ = self.sender.send(CharacteristicChanged { reference, value });
        }
        Ok(changed)
    }

    fn remove(&self, id: AccessoryId) {
        let mut inner = self.lock();
        inner.accessories.remove(&id);
        inner
            .characteristics
            .retain(|reference, _| reference.accessory != id);
    }
}

impl CharacteristicHost for InMemoryHost {
    fn add_accessory(
        &self,
        info: &AccessoryInfo,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        self.add(info);
        async { Ok(()) }
    }

    fn bind(
        &self,
        reference: CharacteristicRef,
        access: Access,
        description: &'static str,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        let result = self.declare(reference, access, description);
        async move { result }
    }

    fn publish(
        &self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<bool, NestKitError>> + Send {
        let result = self.store(reference, value);
        async move { result }
    }

    fn remove_accessory(
        &self,
        id: AccessoryId,
    ) -> impl Future<Output = Result<(), NestKitError>> + Send {
        self.remove(id);
        async { Ok(()) }
    }
}
