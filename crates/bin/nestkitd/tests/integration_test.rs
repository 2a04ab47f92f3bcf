//! End-to-end tests for the full nestkitd stack.
//!
//! Each test wires the virtual cloud, the in-memory host and a running sync
//! engine, then talks to it through an `EngineHandle` the way a host
//! framework would.

use std::sync::Arc;
use std::time::Duration;

use nestkit_adapter_virtual::VirtualConnection;
use nestkit_app::controllers::{extended, protect, thermostat};
use nestkit_app::engine::{EngineOptions, SyncEngine};
use nestkit_app::handle::EngineHandle;
use nestkit_app::memory_host::InMemoryHost;
use nestkit_domain::characteristic::{
    CharacteristicRef, CharacteristicValue, PropertyKey, SmokeDetected, TargetHeatingCoolingState,
};
use nestkit_domain::device::DeviceCategory;
use nestkit_domain::error::NestKitError;
use nestkit_domain::id::{AccessoryId, DeviceId};
use nestkit_domain::write::WriteOutcome;
use tokio::task::JoinHandle;

struct Bridge {
    connection: Arc<VirtualConnection>,
    host: Arc<InMemoryHost>,
    handle: EngineHandle,
    task: JoinHandle<Result<(), NestKitError>>,
}

async fn start(options: EngineOptions) -> Bridge {
    let connection = Arc::new(VirtualConnection::demo());
    let host = Arc::new(InMemoryHost::new(256));
    let mut engine = SyncEngine::new(Arc::clone(&connection), Arc::clone(&host), options);
    let updates = engine.connect().await.unwrap();
    let (handle, requests) = EngineHandle::channel(16);
    let task = tokio::spawn(engine.run(updates, requests));
    Bridge {
        connection,
        host,
        handle,
        task,
    }
}

fn reference(category: DeviceCategory, device_id: &str, key: PropertyKey) -> CharacteristicRef {
    CharacteristicRef::new(
        AccessoryId::for_device(category.device_type(), &DeviceId::new(device_id)),
        key,
    )
}

fn thermostat_ref(key: PropertyKey) -> CharacteristicRef {
    reference(DeviceCategory::Thermostat, "demo-thermostat", key)
}

/// Poll `condition` until it holds, failing after a generous timeout.
async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_expose_every_demo_device() {
    let bridge = start(EngineOptions::default()).await;

    assert_eq!(bridge.host.accessories().len(), 3);
    assert_eq!(
        bridge.host.value(thermostat_ref(thermostat::CURRENT_TEMPERATURE)),
        Some(CharacteristicValue::Float(19.5))
    );
    assert_eq!(
        bridge.host.value(reference(
            DeviceCategory::Protect,
            "demo-protect",
            protect::SMOKE_DETECTED
        )),
        Some(CharacteristicValue::from(SmokeDetected::NotDetected))
    );
}

#[tokio::test]
async fn should_read_through_handle() {
    let bridge = start(EngineOptions::default()).await;

    let value = bridge
        .handle
        .read(thermostat_ref(thermostat::CURRENT_RELATIVE_HUMIDITY))
        .await
        .unwrap();

    assert_eq!(value, CharacteristicValue::Float(45.0));
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_send_mode_change_and_reflect_echo() {
    let bridge = start(EngineOptions::default()).await;
    let target = thermostat_ref(thermostat::TARGET_HEATING_COOLING_STATE);

    let outcome = bridge
        .handle
        .write(target, TargetHeatingCoolingState::Cool.into())
        .await
        .unwrap();

    assert_eq!(outcome, WriteOutcome::Sent);
    assert_eq!(
        bridge.connection.updates(),
        vec![(
            "devices/thermostats/demo-thermostat/hvac_mode".to_string(),
            serde_json::json!("cool")
        )]
    );
    let host = Arc::clone(&bridge.host);
    eventually(move || {
        host.value(target) == Some(CharacteristicValue::from(TargetHeatingCoolingState::Cool))
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn should_debounce_target_temperature_to_last_value() {
    let bridge = start(EngineOptions::default()).await;
    let target = thermostat_ref(thermostat::TARGET_TEMPERATURE);

    for value in [20.0, 21.0, 22.5] {
        let outcome = bridge.handle.write(target, value.into()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Scheduled);
        tokio::time::sleep(Duration::from_millis(1000)).await;
    }
    assert!(bridge.connection.updates().is_empty());

    tokio::time::sleep(Duration::from_millis(4100)).await;

    assert_eq!(
        bridge.connection.updates(),
        vec![(
            "devices/thermostats/demo-thermostat/target_temperature_c".to_string(),
            serde_json::json!(22.5)
        )]
    );
    let host = Arc::clone(&bridge.host);
    eventually(move || host.value(target) == Some(CharacteristicValue::Float(22.5))).await;
}

#[tokio::test]
async fn should_surface_failed_immediate_write() {
    let bridge = start(EngineOptions::default()).await;
    bridge.connection.fail_next_update();

    let result = bridge
        .handle
        .write(
            thermostat_ref(thermostat::TARGET_HEATING_COOLING_STATE),
            TargetHeatingCoolingState::Off.into(),
        )
        .await;

    assert!(matches!(result, Err(NestKitError::RemoteWrite(_))));
}

#[tokio::test]
async fn should_reject_fan_timer_while_heating() {
    let bridge = start(EngineOptions {
        extended_characteristics: true,
        ..EngineOptions::default()
    })
    .await;

    let outcome = bridge
        .handle
        .write(
            thermostat_ref(extended::FAN_TIMER_ACTIVE),
            CharacteristicValue::Bool(true),
        )
        .await
        .unwrap();

    assert!(outcome.is_rejected());
    assert!(bridge.connection.updates().is_empty());
}

#[tokio::test]
async fn should_refuse_write_to_read_only_characteristic() {
    let bridge = start(EngineOptions::default()).await;
    let current = thermostat_ref(thermostat::CURRENT_TEMPERATURE);

    let result = bridge.handle.write(current, 25.0.into()).await;

    assert!(matches!(result, Err(NestKitError::NotWritable(r)) if r == current));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_remove_device_missing_from_pushed_snapshots() {
    let bridge = start(EngineOptions {
        stale_after_misses: 1,
        ..EngineOptions::default()
    })
    .await;
    let mut tree = serde_json::to_value(bridge.connection.snapshot().unwrap()).unwrap();
    tree["devices"]
        .as_object_mut()
        .unwrap()
        .remove("smoke_co_alarms");

    bridge.connection.push(tree).unwrap();

    let host = Arc::clone(&bridge.host);
    eventually(move || host.accessories().len() == 2).await;
}

#[tokio::test]
async fn should_stop_when_update_stream_ends() {
    let bridge = start(EngineOptions::default()).await;

    bridge.connection.disconnect();
    bridge.task.await.unwrap().unwrap();

    let result = bridge
        .handle
        .read(thermostat_ref(thermostat::CURRENT_TEMPERATURE))
        .await;
    assert!(matches!(result, Err(NestKitError::EngineStopped)));
}
