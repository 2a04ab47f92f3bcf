//! Fixtures and fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use nestkit_domain::accessory::AccessoryInfo;
use nestkit_domain::characteristic::{Access, CharacteristicRef, CharacteristicValue};
use nestkit_domain::device::{AlarmState, BatteryHealth, Device, DeviceCategory, HvacMode, HvacState};
use nestkit_domain::error::NestKitError;
use nestkit_domain::id::{AccessoryId, DeviceId, StructureId};
use nestkit_domain::snapshot::{PropertyPath, Snapshot};
use nestkit_domain::structure::{AwayState, Structure};
use nestkit_domain::units::TemperatureScale;
use tokio::sync::mpsc;

use crate::accessory::AccessoryState;
use crate::controllers::Controller;
use crate::ports::{CharacteristicHost, Connection, Subscription};

// ── Fixtures ────────────────────────────────────────────────────────

pub fn structure() -> Structure {
    Structure {
        structure_id: StructureId::new("s1"),
        name: Some("Home".to_string()),
        away: Some(AwayState::Home),
    }
}

pub fn thermostat() -> Device {
    Device {
        device_id: DeviceId::new("t1"),
        structure_id: StructureId::new("s1"),
        name: Some("Hallway".to_string()),
        software_version: Some("5.6.3".to_string()),
        is_online: Some(true),
        hvac_mode: Some(HvacMode::Heat),
        hvac_state: Some(HvacState::Off),
        temperature_scale: TemperatureScale::Celsius,
        ambient_temperature_c: Some(20.5),
        ambient_temperature_f: Some(69.0),
        target_temperature_c: Some(21.0),
        target_temperature_f: Some(70.0),
        humidity: Some(40.0),
        can_heat: Some(true),
        can_cool: Some(true),
        ..Device::default()
    }
}

pub fn protect() -> Device {
    Device {
        device_id: DeviceId::new("p1"),
        structure_id: StructureId::new("s1"),
        name: Some("Kitchen".to_string()),
        software_version: Some("3.1rc9".to_string()),
        is_online: Some(true),
        smoke_alarm_state: Some(AlarmState::Ok),
        co_alarm_state: Some(AlarmState::Ok),
        battery_health: Some(BatteryHealth::Ok),
        ..Device::default()
    }
}

pub fn camera() -> Device {
    Device {
        device_id: DeviceId::new("c1"),
        structure_id: StructureId::new("s1"),
        name: Some("Porch".to_string()),
        software_version: Some("205-600052".to_string()),
        is_online: Some(true),
        ..Device::default()
    }
}

fn category_of(device_id: &str) -> DeviceCategory {
    match device_id.chars().next() {
        Some('p') => DeviceCategory::Protect,
        Some('c') => DeviceCategory::Cam,
        _ => DeviceCategory::Thermostat,
    }
}

pub fn state_for(category: DeviceCategory, device: Device) -> Result<AccessoryState, NestKitError> {
    build_state(category, device, false)
}

pub fn extended_state_for(
    category: DeviceCategory,
    device: Device,
) -> Result<AccessoryState, NestKitError> {
    build_state(category, device, true)
}

fn build_state(
    category: DeviceCategory,
    device: Device,
    extended: bool,
) -> Result<AccessoryState, NestKitError> {
    let info = AccessoryInfo::for_device(category, &device, None);
    AccessoryState::new(
        info,
        device,
        structure(),
        Controller::for_category(category, extended),
    )
}

/// Snapshot holding the given devices plus structure `s1`.
///
/// The category is taken from the first letter of the device id: `p` for a
/// protect, `c` for a camera, anything else for a thermostat.
pub fn snapshot_with(devices: Vec<Device>) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for device in devices {
        let group = category_of(device.device_id.as_str()).device_group();
        snapshot
            .devices
            .entry(group.to_string())
            .or_default()
            .insert(device.device_id.to_string(), device);
    }
    snapshot.structures.insert("s1".to_string(), structure());
    snapshot
}

/// Snapshot with one fixture device per id, see [`snapshot_with`].
pub fn snapshot_of(ids: &[&str]) -> Snapshot {
    snapshot_with(
        ids.iter()
            .map(|id| {
                let fixture = match category_of(id) {
                    DeviceCategory::Thermostat => thermostat(),
                    DeviceCategory::Protect => protect(),
                    DeviceCategory::Cam => camera(),
                };
                Device {
                    device_id: DeviceId::new(*id),
                    ..fixture
                }
            })
            .collect(),
    )
}

// ── Counting host ───────────────────────────────────────────────────

#[derive(Default)]
struct HostCalls {
    accessories: Vec<AccessoryId>,
    bound: usize,
    publishes: Vec<CharacteristicRef>,
    changed: usize,
    values: HashMap<CharacteristicRef, CharacteristicValue>,
}

/// Host that records every call.
#[derive(Default)]
pub struct CountingHost {
    calls: Mutex<HostCalls>,
}

impl CountingHost {
    pub fn publish_count(&self) -> usize {
        self.calls.lock().unwrap().publishes.len()
    }

    pub fn count_for(&self, reference: CharacteristicRef) -> usize {
        self.calls
            .lock()
            .unwrap()
            .publishes
            .iter()
            .filter(|published| **published == reference)
            .count()
    }

    pub fn values(&self) -> HashMap<CharacteristicRef, CharacteristicValue> {
        self.calls.lock().unwrap().values.clone()
    }

    pub fn value(&self, reference: CharacteristicRef) -> Option<CharacteristicValue> {
        self.calls.lock().unwrap().values.get(&reference).copied()
    }

    pub fn changed_count(&self) -> usize {
        self.calls.lock().unwrap().changed
    }

    pub fn accessories(&self) -> Vec<AccessoryId> {
        self.calls.lock().unwrap().accessories.clone()
    }

    pub fn bound_count(&self) -> usize {
        self.calls.lock().unwrap().bound
    }
}

impl CharacteristicHost for CountingHost {
    async fn add_accessory(&self, info: &AccessoryInfo) -> Result<(), NestKitError> {
        self.calls.lock().unwrap().accessories.push(info.id);
        Ok(())
    }

    async fn bind(
        &self,
        _reference: CharacteristicRef,
        _access: Access,
        _description: &'static str,
    ) -> Result<(), NestKitError> {
        self.calls.lock().unwrap().bound += 1;
        Ok(())
    }

    async fn publish(
        &self,
        reference: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<bool, NestKitError> {
        let mut calls = self.calls.lock().unwrap();
        calls.publishes.push(reference);
        let changed = calls.values.insert(reference, value) != Some(value);
        if changed {
            calls.changed += 1;
        }
        Ok(changed)
    }

    async fn remove_accessory(&self, id: AccessoryId) -> Result<(), NestKitError> {
        self.calls.lock().unwrap().accessories.retain(|known| *known != id);
        Ok(())
    }
}

// ── Recording connection ────────────────────────────────────────────

/// Connection serving a fixed initial snapshot and recording every update.
pub struct RecordingConnection {
    initial: Snapshot,
    sender: Mutex<Option<mpsc::Sender<Snapshot>>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    fail_next: Mutex<bool>,
}

impl RecordingConnection {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            initial,
            sender: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(false),
        }
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next_update(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// Push a snapshot to the subscriber.
    pub async fn push(&self, snapshot: Snapshot) {
        let sender = self.sender.lock().unwrap().clone();
        if let Some(sender) = sender {
            sender.send(snapshot).await.unwrap();
        }
    }

    /// End the snapshot stream.
    pub fn close(&self) {
        self.sender.lock().unwrap().take();
    }
}

impl Connection for RecordingConnection {
    async fn open(&self) -> Result<(), NestKitError> {
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, NestKitError> {
        let (sender, updates) = mpsc::channel(16);
        *self.sender.lock().unwrap() = Some(sender);
        Ok(Subscription {
            initial: self.initial.clone(),
            updates,
        })
    }

    async fn update(
        &self,
        path: &PropertyPath,
        value: serde_json::Value,
    ) -> Result<(), NestKitError> {
        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return Err(NestKitError::RemoteWrite("injected failure".into()));
        }
        self.calls.lock().unwrap().push((path.to_string(), value));
        Ok(())
    }
}
