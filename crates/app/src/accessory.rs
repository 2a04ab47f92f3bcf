//! Accessory state: current truth for one device.
//!
//! An [`AccessoryState`] owns the latest [`Device`] and [`Structure`]
//! snapshots and the ordered bindings of its [`Controller`]. Snapshots are
//! replaced wholesale; the device and structure identifiers never change
//! after construction.

use nestkit_domain::accessory::AccessoryInfo;
use nestkit_domain::characteristic::{CharacteristicRef, CharacteristicValue, PropertyKey};
use nestkit_domain::device::{Device, DeviceCategory};
use nestkit_domain::error::{InvalidSnapshotError, NestKitError, NotFoundError};
use nestkit_domain::id::{AccessoryId, DeviceId, StructureId};
use nestkit_domain::snapshot::PropertyPath;
use nestkit_domain::structure::Structure;

use crate::binding::PropertyBinding;
use crate::controllers::Controller;
use crate::ports::CharacteristicHost;

#[derive(Debug)]
pub struct AccessoryState {
    info: AccessoryInfo,
    device_id: DeviceId,
    structure_id: StructureId,
    device: Device,
    structure: Structure,
    controller: Controller,
}

impl AccessoryState {
    /// Build the state for a device and the structure it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::InvalidSnapshot`] when the device or the
    /// structure is missing its identifier, or when the structure is not the
    /// one the device points at.
    pub fn new(
        info: AccessoryInfo,
        device: Device,
        structure: Structure,
        controller: Controller,
    ) -> Result<Self, NestKitError> {
        device.validate()?;
        structure.validate()?;
        if device.structure_id != structure.structure_id {
            return Err(InvalidSnapshotError::StructureMismatch {
                expected: device.structure_id.to_string(),
                actual: structure.structure_id.to_string(),
            }
            .into());
        }

        Ok(Self {
            info,
            device_id: device.device_id.clone(),
            structure_id: structure.structure_id.clone(),
            device,
            structure,
            controller,
        })
    }

    #[must_use]
    pub fn id(&self) -> AccessoryId {
        self.info.id
    }

    #[must_use]
    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        self.info.category
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    #[must_use]
    pub fn structure_id(&self) -> &StructureId {
        &self.structure_id
    }

    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    #[must_use]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        self.controller.bindings()
    }

    #[must_use]
    pub fn binding(&self, key: PropertyKey) -> Option<&PropertyBinding> {
        self.bindings().iter().find(|binding| binding.key() == key)
    }

    #[must_use]
    pub fn reference(&self, key: PropertyKey) -> CharacteristicRef {
        CharacteristicRef::new(self.id(), key)
    }

    /// `devices/<group>/<id>/<property>`
    #[must_use]
    pub fn device_path(&self, property: &'static str) -> PropertyPath {
        PropertyPath::device(self.category(), self.device_id.clone(), property)
    }

    /// `structures/<id>/<property>`
    #[must_use]
    pub fn structure_path(&self, property: &'static str) -> PropertyPath {
        PropertyPath::structure(self.structure_id.clone(), property)
    }

    /// Evaluate the getter bound to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`NestKitError::NotFound`] when nothing is bound to `key`.
    pub fn read(&self, key: PropertyKey) -> Result<CharacteristicValue, NestKitError> {
        self.binding(key)
            .map(|binding| binding.get(self))
            .ok_or_else(|| self.missing(key))
    }

    pub(crate) fn missing(&self, key: PropertyKey) -> NestKitError {
        NotFoundError {
            entity: "Characteristic",
            id: self.reference(key).to_string(),
        }
        .into()
    }

    /// Replace whichever snapshot is given, keeping the other.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSnapshotError::DeviceMismatch`] or
    /// [`InvalidSnapshotError::StructureMismatch`] if a snapshot belongs to
    /// another device or structure; nothing is replaced in that case.
    pub fn replace(
        &mut self,
        device: Option<Device>,
        structure: Option<Structure>,
    ) -> Result<(), InvalidSnapshotError> {
        if let Some(device) = &device
            && device.device_id != self.device_id
        {
            return Err(InvalidSnapshotError::DeviceMismatch {
                expected: self.device_id.to_string(),
                actual: device.device_id.to_string(),
            });
        }
        if let Some(structure) = &structure
            && structure.structure_id != self.structure_id
        {
            return Err(InvalidSnapshotError::StructureMismatch {
                expected: self.structure_id.to_string(),
                actual: structure.structure_id.to_string(),
            });
        }

        if let Some(device) = device {
            if device.structure_id != self.structure_id {
                tracing::warn!(
                    device_id = %self.device_id,
                    from = %self.structure_id,
                    to = %device.structure_id,
                    "device moved to another structure, keeping the original one"
                );
            }
            self.device = device;
        }
        if let Some(structure) = structure {
            self.structure = structure;
        }
        Ok(())
    }

    /// Replace the given snapshots, then re-evaluate every binding and push
    /// the result to the host, changed or not.
    ///
    /// Returns how many characteristics were published.
    ///
    /// # Errors
    ///
    /// Fails on an identity mismatch (see [`replace`](Self::replace)) or
    /// when the host refuses a value.
    pub async fn refresh<H: CharacteristicHost>(
        &mut self,
        device: Option<Device>,
        structure: Option<Structure>,
        host: &H,
    ) -> Result<usize, NestKitError> {
        self.replace(device, structure)?;
        self.publish_all(host).await
    }

    /// Announce the accessory and its characteristics to the host, then
    /// publish the initial values.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub async fn register<H: CharacteristicHost>(&self, host: &H) -> Result<(), NestKitError> {
        host.add_accessory(&self.info).await?;
        for binding in self.bindings() {
            host.bind(
                self.reference(binding.key()),
                binding.access(),
                binding.description(),
            )
            .await?;
        }
        self.publish_all(host).await?;
        tracing::info!(
            accessory = %self.id(),
            device_id = %self.device_id,
            name = %self.info.name,
            characteristics = self.bindings().len(),
            "accessory created"
        );
        Ok(())
    }

    async fn publish_all<H: CharacteristicHost>(&self, host: &H) -> Result<usize, NestKitError> {
        let mut published = 0;
        for binding in self.bindings() {
            let value = binding.get(self);
            let changed = host.publish(self.reference(binding.key()), value).await?;
            if changed {
                tracing::debug!(
                    "{} for {} is: {}",
                    binding.description(),
                    self.info.name,
                    binding.format(value)
                );
            }
            published += 1;
        }
        Ok(published)
    }
}
