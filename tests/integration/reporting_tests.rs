//! Sensor report cycle against a mock bridge.

use cctlamp::app::events::{LampEvent, SkipReason};
use cctlamp::app::reporting::report;
use cctlamp::sensors::SensorSnapshot;

use crate::mock_hw::{MockBridge, RecordingSink};

fn tc74_only(celsius: i8) -> SensorSnapshot {
    SensorSnapshot {
        tc74_celsius: Some(celsius),
        ..SensorSnapshot::default()
    }
}

#[test]
fn joined_bridge_receives_reading() {
    let bridge = MockBridge::joined();
    let mut sink = RecordingSink::new();

    assert_eq!(report(&tc74_only(23), &bridge, &mut sink), Some(23.0));
    assert_eq!(*bridge.reports.borrow(), vec![23.0]);
    assert_eq!(
        sink.events,
        vec![LampEvent::TemperatureReported { celsius: 23.0 }]
    );
}

#[test]
fn not_joined_skips_without_forwarding() {
    let bridge = MockBridge::default();
    let mut sink = RecordingSink::new();

    assert_eq!(report(&tc74_only(23), &bridge, &mut sink), None);
    assert!(bridge.reports.borrow().is_empty());
    assert_eq!(
        sink.events,
        vec![LampEvent::ReportSkipped(SkipReason::NotJoined)]
    );
}

#[test]
fn missing_reading_is_never_invented() {
    let bridge = MockBridge::joined();
    let mut sink = RecordingSink::new();

    let snap = SensorSnapshot {
        humidity_percent: Some(40.0),
        ..SensorSnapshot::default()
    };
    assert_eq!(report(&snap, &bridge, &mut sink), None);
    assert!(bridge.reports.borrow().is_empty());
    assert_eq!(
        sink.events,
        vec![LampEvent::ReportSkipped(SkipReason::NoReading)]
    );
}

#[test]
fn calibrated_sensor_wins_over_tc74() {
    let bridge = MockBridge::joined();
    let snap = SensorSnapshot {
        ms8607_celsius: Some(21.25),
        humidity_percent: Some(40.0),
        tc74_celsius: Some(24),
    };
    assert_eq!(
        report(&snap, &bridge, &mut RecordingSink::new()),
        Some(21.25)
    );
}
