//! Attribute writes, shared state and persistence end to end.

use std::sync::Arc;

use cctlamp::app::attributes::AttributeHandler;
use cctlamp::app::commands::AttributeValue;
use cctlamp::app::commands::zcl::*;
use cctlamp::app::events::LampEvent;
use cctlamp::app::light_store::{self, KEY, LightStateStore};
use cctlamp::app::service::LampService;
use cctlamp::config::LampConfig;
use cctlamp::state::{LampCommand, LampState};

use crate::mock_hw::{MockDelay, MockPwm, MockStore, RecordingSink};

const DEFAULT: LampCommand = LampCommand {
    brightness: 50,
    mireds: 327,
};

fn handler(store: MockStore) -> (AttributeHandler<MockStore>, Arc<LampState>) {
    let lights = LightStateStore::new(store, DEFAULT);
    let state = Arc::new(LampState::new(lights.load()));
    (AttributeHandler::new(Arc::clone(&state), lights), state)
}

#[test]
fn level_write_updates_state_and_persists() {
    let (mut h, state) = handler(MockStore::new());
    let mut sink = RecordingSink::new();

    assert!(h.on_attribute_write(
        CLUSTER_LEVEL_CONTROL,
        ATTR_CURRENT_LEVEL,
        AttributeValue::U8(200),
        &mut sink
    ));
    let cmd = LampCommand {
        brightness: 200,
        mireds: 327,
    };
    assert_eq!(state.command(), cmd);
    assert_eq!(
        h.store().backend().committed.get(KEY),
        Some(&light_store::pack(cmd))
    );
    assert_eq!(sink.events, vec![LampEvent::CommandReceived(cmd)]);
}

#[test]
fn colour_temperature_write_keeps_brightness() {
    let (mut h, state) = handler(MockStore::new());
    h.on_attribute_write(
        CLUSTER_COLOR_CONTROL,
        ATTR_COLOR_TEMPERATURE,
        AttributeValue::U16(400),
        &mut RecordingSink::new(),
    );
    assert_eq!(
        state.command(),
        LampCommand {
            brightness: 50,
            mireds: 400
        }
    );
}

#[test]
fn on_off_is_not_persisted() {
    let (mut h, state) = handler(MockStore::new());
    let mut sink = RecordingSink::new();

    h.on_attribute_write(CLUSTER_ON_OFF, ATTR_ON_OFF, AttributeValue::Bool(false), &mut sink);
    assert!(!state.snapshot().power_on);
    assert_eq!(state.snapshot().effective_brightness(), 0);
    assert_eq!(h.store().backend().commits, 0);
    assert_eq!(sink.events, vec![LampEvent::PowerChanged(false)]);
}

#[test]
fn unknown_or_mistyped_writes_change_nothing() {
    let (mut h, state) = handler(MockStore::new());
    let mut sink = RecordingSink::new();
    let before = state.snapshot();

    assert!(!h.on_attribute_write(0x0402, 0x0000, AttributeValue::U16(2000), &mut sink));
    assert!(!h.on_attribute_write(
        CLUSTER_LEVEL_CONTROL,
        ATTR_CURRENT_LEVEL,
        AttributeValue::U16(200),
        &mut sink
    ));
    assert!(!h.on_attribute_write(CLUSTER_COLOR_CONTROL, 0x0003, AttributeValue::U16(1), &mut sink));

    assert_eq!(state.snapshot(), before);
    assert!(sink.events.is_empty());
    assert_eq!(h.store().backend().commits, 0);
}

#[test]
fn save_failure_keeps_in_memory_state() {
    let store = MockStore {
        fail_commit: true,
        ..MockStore::default()
    };
    let (mut h, state) = handler(store);
    let mut sink = RecordingSink::new();

    h.on_attribute_write(
        CLUSTER_LEVEL_CONTROL,
        ATTR_CURRENT_LEVEL,
        AttributeValue::U8(10),
        &mut sink,
    );
    assert_eq!(state.command().brightness, 10);
    assert!(sink.events.contains(&LampEvent::PersistFailed));
    assert!(h.store().backend().committed.is_empty());
}

#[test]
fn last_command_survives_reboot() {
    let (mut h, _) = handler(MockStore::new());
    let mut sink = RecordingSink::new();
    h.on_attribute_write(
        CLUSTER_LEVEL_CONTROL,
        ATTR_CURRENT_LEVEL,
        AttributeValue::U8(90),
        &mut sink,
    );
    h.on_attribute_write(
        CLUSTER_COLOR_CONTROL,
        ATTR_COLOR_TEMPERATURE,
        AttributeValue::U16(454),
        &mut sink,
    );

    let rebooted = LightStateStore::new(h.store().backend().reboot(), DEFAULT);
    assert_eq!(
        rebooted.load(),
        LampCommand {
            brightness: 90,
            mireds: 454
        }
    );
}

#[test]
fn load_falls_back_to_default() {
    assert_eq!(LightStateStore::new(MockStore::new(), DEFAULT).load(), DEFAULT);

    let failing = MockStore {
        fail_get: true,
        ..MockStore::with(KEY, light_store::pack(LampCommand {
            brightness: 1,
            mireds: 300,
        }))
    };
    assert_eq!(LightStateStore::new(failing, DEFAULT).load(), DEFAULT);

    for garbage in [-1, 0, 0x7F00_0000] {
        let store = MockStore::with(KEY, garbage);
        assert_eq!(
            LightStateStore::new(store, DEFAULT).load(),
            DEFAULT,
            "raw {:#x}",
            garbage
        );
    }
}

#[test]
fn default_command_comes_from_config() {
    assert_eq!(light_store::default_command(&LampConfig::default()), DEFAULT);
}

#[test]
fn attribute_write_reaches_outputs_within_one_tick() {
    let config = LampConfig::default();
    let (mut h, state) = handler(MockStore::new());
    let mut service = LampService::new(MockPwm::new(), Arc::clone(&state), &config);
    let mut delay = MockDelay::default();
    let mut sink = RecordingSink::new();
    service.start(&mut delay, &mut sink);
    service.tick(true, &mut delay, &mut sink);

    h.on_attribute_write(
        CLUSTER_LEVEL_CONTROL,
        ATTR_CURRENT_LEVEL,
        AttributeValue::U8(0),
        &mut sink,
    );
    service.tick(true, &mut delay, &mut sink);
    assert_eq!(service.pwm().duties, [0; 8]);
}
