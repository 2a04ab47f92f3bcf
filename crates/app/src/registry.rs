//! Registry: remote device identifier to accessory state.
//!
//! The first snapshot builds one accessory per device (thermostats, then
//! protects, then cameras). Later snapshots are routed to existing
//! accessories by device identifier. Devices that vanish are counted as
//! missed and dropped after a configurable number of consecutive misses;
//! devices seen for the first time are adopted.

use std::collections::{BTreeMap, HashMap};

use nestkit_domain::accessory::{AccessoryInfo, AccessoryInfoOverride};
use nestkit_domain::device::{Device, DeviceCategory};
use nestkit_domain::error::{InvalidSnapshotError, NestKitError};
use nestkit_domain::id::{AccessoryId, DeviceId};
use nestkit_domain::snapshot::Snapshot;

use crate::accessory::AccessoryState;
use crate::controllers::Controller;
use crate::ports::CharacteristicHost;

/// Default number of consecutive snapshots a device may be missing from.
pub const DEFAULT_STALE_AFTER_MISSES: u32 = 3;

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// `0` keeps vanished devices forever.
    pub stale_after_misses: u32,
    pub extended_characteristics: bool,
    pub accessory_info: Vec<AccessoryInfoOverride>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            stale_after_misses: DEFAULT_STALE_AFTER_MISSES,
            extended_characteristics: false,
            accessory_info: Vec::new(),
        }
    }
}

/// Outcome of a full rebuild.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub created: Vec<AccessoryId>,
    pub skipped: usize,
}

/// Outcome of routing an incremental snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub refreshed: usize,
    pub missing: usize,
    pub created: Vec<AccessoryId>,
    pub removed: Vec<AccessoryId>,
}

#[derive(Debug)]
struct Entry {
    state: AccessoryState,
    missed: u32,
}

#[derive(Debug, Default)]
pub struct Registry {
    options: RegistryOptions,
    entries: BTreeMap<DeviceId, Entry>,
    accessories: HashMap<AccessoryId, DeviceId>,
}

impl Registry {
    #[must_use]
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            entries: BTreeMap::new(),
            accessories: HashMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: AccessoryId) -> Option<&AccessoryState> {
        let device_id = self.accessories.get(&id)?;
        self.entries.get(device_id).map(|entry| &entry.state)
    }

    #[must_use]
    pub fn by_device(&self, device_id: &DeviceId) -> Option<&AccessoryState> {
        self.entries.get(device_id).map(|entry| &entry.state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessoryState> {
        self.entries.values().map(|entry| &entry.state)
    }

    /// Consecutive snapshots the device has been missing from.
    #[must_use]
    pub fn missed(&self, device_id: &DeviceId) -> Option<u32> {
        self.entries.get(device_id).map(|entry| entry.missed)
    }

    /// Drop every accessory and rebuild from `snapshot`.
    ///
    /// Devices that cannot back an accessory are logged and skipped.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub async fn load<H: CharacteristicHost>(
        &mut self,
        snapshot: &Snapshot,
        host: &H,
    ) -> Result<LoadReport, NestKitError> {
        for id in self.accessories.keys() {
            host.remove_accessory(*id).await?;
        }
        self.entries.clear();
        self.accessories.clear();

        let mut report = LoadReport::default();
        for (category, device) in snapshot.all_devices() {
            match self.adopt(category, device, snapshot, host).await? {
                Some(id) => report.created.push(id),
                None => report.skipped += 1,
            }
        }
        tracing::info!(
            accessories = report.created.len(),
            skipped = report.skipped,
            "registry loaded"
        );
        Ok(report)
    }

    /// Route `snapshot` to the known accessories, count missing devices and
    /// adopt new ones.
    ///
    /// # Errors
    ///
    /// Propagates host failures. Invalid device snapshots are logged and
    /// skipped.
    pub async fn apply<H: CharacteristicHost>(
        &mut self,
        snapshot: &Snapshot,
        host: &H,
    ) -> Result<ApplyReport, NestKitError> {
        let mut report = ApplyReport::default();
        let mut stale = Vec::new();

        for (device_id, entry) in &mut self.entries {
            let category = entry.state.category();
            let Some(device) = snapshot.device(category, device_id) else {
                entry.missed += 1;
                report.missing += 1;
                tracing::debug!(
                    device_id = %device_id,
                    missed = entry.missed,
                    "device missing from snapshot"
                );
                if self.options.stale_after_misses > 0
                    && entry.missed >= self.options.stale_after_misses
                {
                    stale.push(device_id.clone());
                }
                continue;
            };

            entry.missed = 0;
            let structure = snapshot.structure(entry.state.structure_id()).cloned();
            match entry
                .state
                .refresh(Some(device.clone()), structure, host)
                .await
            {
                Ok(_) => report.refreshed += 1,
                Err(NestKitError::InvalidSnapshot(err)) => {
                    tracing::warn!(device_id = %device_id, error = %err, "ignoring invalid snapshot");
                }
                Err(err) => return Err(err),
            }
        }

        for device_id in stale {
            if let Some(entry) = self.entries.remove(&device_id) {
                let id = entry.state.id();
                self.accessories.remove(&id);
                host.remove_accessory(id).await?;
                tracing::warn!(
                    accessory = %id,
                    device_id = %device_id,
                    missed = entry.missed,
                    "accessory removed after device went stale"
                );
                report.removed.push(id);
            }
        }

        for (category, device) in snapshot.all_devices() {
            if device.device_id.is_empty() || self.entries.contains_key(&device.device_id) {
                continue;
            }
            if let Some(id) = self.adopt(category, device, snapshot, host).await? {
                report.created.push(id);
            }
        }

        Ok(report)
    }

    /// Build, register and insert the accessory for one device.
    ///
    /// Returns `None` when the device snapshot is invalid.
    async fn adopt<H: CharacteristicHost>(
        &mut self,
        category: DeviceCategory,
        device: &Device,
        snapshot: &Snapshot,
        host: &H,
    ) -> Result<Option<AccessoryId>, NestKitError> {
        let state = match self.build(category, device, snapshot) {
            Ok(state) => state,
            Err(NestKitError::InvalidSnapshot(err)) => {
                tracing::warn!(
                    category = %category,
                    device_id = %device.device_id,
                    error = %err,
                    "skipping device"
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if self.entries.contains_key(state.device_id()) {
            tracing::warn!(device_id = %state.device_id(), "duplicate device id, skipping");
            return Ok(None);
        }

        state.register(host).await?;
        let id = state.id();
        self.accessories.insert(id, state.device_id().clone());
        self.entries
            .insert(state.device_id().clone(), Entry { state, missed: 0 });
        Ok(Some(id))
    }

    fn build(
        &self,
        category: DeviceCategory,
        device: &Device,
        snapshot: &Snapshot,
    ) -> Result<AccessoryState, NestKitError> {
        device.validate()?;
        let structure = snapshot.structure(&device.structure_id).ok_or_else(|| {
            InvalidSnapshotError::UnknownStructure {
                device_id: device.device_id.to_string(),
                structure_id: device.structure_id.to_string(),
            }
        })?;
        let overrides = self
            .options
            .accessory_info
            .iter()
            .find(|o| o.device_id == device.device_id);
        let info = AccessoryInfo::for_device(category, device, overrides);
        AccessoryState::new(
            info,
            device.clone(),
            structure.clone(),
            Controller::for_category(category, self.options.extended_characteristics),
        )
    }
}

#[cfg(test)]
mod tests {
    use nestkit_domain::device::AlarmState;

    use super::*;
    use crate::test_support::{CountingHost, snapshot_of};

    fn options(stale_after_misses: u32) -> RegistryOptions {
        RegistryOptions {
            stale_after_misses,
            ..RegistryOptions::default()
        }
    }

    #[tokio::test]
    async fn should_create_one_accessory_per_device_in_category_order() {
        let host = CountingHost::default();
        let mut registry = Registry::new(RegistryOptions::default());
        let snapshot = snapshot_of(&["t1", "p1", "c1"]);

        let report = registry.load(&snapshot, &host).await.unwrap();

        assert_eq!(report.created.len(), 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(host.accessories(), report.created);
        let categories: Vec<_> = report
            .created
            .iter()
            .map(|id| registry.get(*id).unwrap().category())
            .collect();
        assert_eq!(
            categories,
            vec![
                DeviceCategory::Thermostat,
                DeviceCategory::Protect,
                DeviceCategory::Cam
            ]
        );
    }

    #[tokio::test]
    async fn should_skip_device_whose_structure_is_missing() {
        let host = CountingHost::default();
        let mut registry = Registry::new(RegistryOptions::default());
        let mut snapshot = snapshot_of(&["t1", "p1"]);
        snapshot.structures.clear();

        let report = registry.load(&snapshot, &host).await.unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.skipped, 2);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn should_route_snapshot_to_existing_accessory() {
        let host = CountingHost::default();
        let mut registry = Registry::new(RegistryOptions::default());
        let mut snapshot = snapshot_of(&["p1"]);
        registry.load(&snapshot, &host).await.unwrap();

        if let Some(device) = snapshot
            .devices
            .get_mut("smoke_co_alarms")
            .and_then(|group| group.get_mut("p1"))
        {
            device.smoke_alarm_state = Some(AlarmState::Emergency);
        }
        let report = registry.apply(&snapshot, &host).await.unwrap();

        assert_eq!(report.refreshed, 1);
        let state = registry.by_device(&DeviceId::new("p1")).unwrap();
        assert_eq!(state.device().smoke_alarm_state, Some(AlarmState::Emergency));
    }

    #[tokio::test]
    async fn should_remove_device_after_consecutive_misses() {
        let host = CountingHost::default();
        let mut registry = Registry::new(options(2));
        registry
            .load(&snapshot_of(&["t1", "p1"]), &host)
            .await
            .unwrap();
        let without = snapshot_of(&["t1"]);

        let first = registry.apply(&without, &host).await.unwrap();
        assert_eq!(first.missing, 1);
        assert!(first.removed.is_empty());
        assert_eq!(registry.missed(&DeviceId::new("p1")), Some(1));

        let second = registry.apply(&without, &host).await.unwrap();
        assert_eq!(second.removed.len(), 1);
        assert!(registry.by_device(&DeviceId::new("p1")).is_none());
        assert_eq!(host.accessories().len(), 1);
    }

    #[tokio::test]
    async fn should_reset_miss_counter_when_device_reappears() {
        let host = CountingHost::default();
        let mut registry = Registry::new(options(2));
        let full = snapshot_of(&["t1", "p1"]);
        registry.load(&full, &host).await.unwrap();

        registry.apply(&snapshot_of(&["t1"]), &host).await.unwrap();
        registry.apply(&full, &host).await.unwrap();
        assert_eq!(registry.missed(&DeviceId::new("p1")), Some(0));

        let report = registry.apply(&snapshot_of(&["t1"]), &host).await.unwrap();
        assert!(report.removed.is_empty());
    }

    #[tokio::test]
    async fn should_keep_vanished_devices_when_removal_is_disabled() {
        let host = CountingHost::default();
        let mut registry = Registry::new(options(0));
        registry.load(&snapshot_of(&["c1"]), &host).await.unwrap();

        for _ in 0..10 {
            registry.apply(&snapshot_of(&[]), &host).await.unwrap();
        }
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn should_adopt_devices_first_seen_later() {
        let host = CountingHost::default();
        let mut registry = Registry::new(RegistryOptions::default());
        registry.load(&snapshot_of(&["t1"]), &host).await.unwrap();

        let report = registry
            .apply(&snapshot_of(&["t1", "c1"]), &host)
            .await
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(registry.len(), 2);
        assert!(registry.by_device(&DeviceId::new("c1")).is_some());
    }

    #[tokio::test]
    async fn should_apply_accessory_info_override() {
        let host = CountingHost::default();
        let mut registry = Registry::new(RegistryOptions {
            accessory_info: vec![AccessoryInfoOverride {
                device_id: DeviceId::new("t1"),
                model: Some("Learning Thermostat".to_string()),
                serial_number: None,
            }],
            ..RegistryOptions::default()
        });
        registry.load(&snapshot_of(&["t1"]), &host).await.unwrap();

        let state = registry.by_device(&DeviceId::new("t1")).unwrap();
        assert_eq!(state.info().model, "Learning Thermostat");
        assert_eq!(state.info().serial_number, "t1");
    }

    #[tokio::test]
    async fn should_replace_everything_on_reload() {
        let host = CountingHost::default();
        let mut registry = Registry::new(RegistryOptions::default());
        registry
            .load(&snapshot_of(&["t1", "p1"]), &host)
            .await
            .unwrap();

        registry.load(&snapshot_of(&["c1"]), &host).await.unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(host.accessories().len(), 1);
    }
}
