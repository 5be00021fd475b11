//! Periodic sensor reporting.
//!
//! Called once per report cycle by the sensor task. A cycle with no reading
//! or no network is skipped; nothing stale or made-up is ever forwarded.

use log::{debug, info};

use super::events::{LampEvent, SkipReason};
use super::ports::{EventSink, ProtocolBridge};
use crate::sensors::SensorSnapshot;

/// Forward the preferred temperature if there is one and the device is
/// joined. Returns the value sent.
pub fn report(
    snapshot: &SensorSnapshot,
    bridge: &impl ProtocolBridge,
    sink: &mut impl EventSink,
) -> Option<f32> {
    if let Some(rh) = snapshot.humidity_percent {
        debug!("humidity {:.1} %", rh);
    }

    let Some(celsius) = snapshot.temperature() else {
        sink.emit(&LampEvent::ReportSkipped(SkipReason::NoReading));
        return None;
    };
    if !bridge.is_joined() {
        debug!("not joined, holding {:.2} °C", celsius);
        sink.emit(&LampEvent::ReportSkipped(SkipReason::NotJoined));
        return None;
    }

    bridge.report_temperature(celsius);
    info!("reported {:.2} °C", celsius);
    sink.emit(&LampEvent::TemperatureReported { celsius });
    Some(celsius)
}
