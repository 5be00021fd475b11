//! CCT lamp firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │  I2cBus (BusPort)   NvsStore (KeyValueStore)   LogEventSink  │
//! │  ZigbeeBridge (ProtocolBridge, C hooks for the stack glue)   │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │   LED task            protocol callback       sensor task    │
//! │   LampService ◀─rev── AttributeHandler        SensorHub      │
//! │   (anim + mixer)      (LampState + store)     + reporting    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use cctlamp::adapters::i2c_bus::{I2cBus, scan_bus};
use cctlamp::adapters::log_sink::LogEventSink;
use cctlamp::adapters::nvs::NvsStore;
use cctlamp::adapters::zigbee::{self, ZigbeeBridge};
use cctlamp::app::attributes::AttributeHandler;
use cctlamp::app::light_store::{self, LightStateStore};
use cctlamp::app::ports::ProtocolBridge;
use cctlamp::app::reporting;
use cctlamp::app::service::LampService;
use cctlamp::config::LampConfig;
use cctlamp::drivers::task::spawn_task;
use cctlamp::drivers::tlc59108::Tlc59108;
use cctlamp::pins;
use cctlamp::sensors::SensorHub;
use cctlamp::state::LampState;

const SENSOR_TASK_PRIORITY: u8 = 4;
const SENSOR_TASK_STACK_KB: usize = 4;
/// Wait between LED driver bring-up attempts.
const TLC_RETRY_MS: u32 = 1000;

unsafe extern "C" {
    /// Provided by the Zigbee stack glue component: registers the endpoint
    /// and starts the stack task, which calls back into `lamp_zb_*`.
    fn lamp_zb_start();
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    info!("CCT lamp v{} starting", env!("CARGO_PKG_VERSION"));

    let config = LampConfig::default();
    config.validate()?;

    // ── 2. Bus and LED driver bring-up ────────────────────────
    let peripherals = Peripherals::take()?;
    let pins_io = peripherals.pins;

    // TLC59108 RESET, pins::LED_RESET_GPIO. Released (high) for normal operation.
    let mut led_reset = PinDriver::output(pins_io.gpio15)?;
    led_reset.set_high()?;

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        pins_io.gpio6,
        pins_io.gpio7,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    info!(
        "I2C0 up: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_HZ
    );
    let bus = I2cBus::new(i2c);
    // LED supply enable, pins::LED_POWER_GPIO.
    let led_power = PinDriver::output(pins_io.gpio10)?;

    let mut tlc = Tlc59108::new(bus.clone(), led_power, pins::TLC59108_ADDR);
    let mut tlc_ready = tlc
        .bring_up(&mut led_reset, &mut FreeRtos)
        .inspect_err(|e| error!("TLC59108 unavailable ({}), outputs held until it answers", e))
        .is_ok();
    if tlc_ready {
        tlc.dump_registers();
    }

    // ── 3. Persisted light state ──────────────────────────────
    let store = LightStateStore::new(
        NvsStore::open(light_store::NAMESPACE),
        light_store::default_command(&config),
    );
    let state = Arc::new(LampState::new(store.load()));

    // ── 4. Protocol bridge ────────────────────────────────────
    let bridge = Arc::new(ZigbeeBridge::new());
    if !zigbee::ffi::install(
        Arc::clone(&bridge),
        AttributeHandler::new(Arc::clone(&state), store),
    ) {
        warn!("Zigbee hooks already installed");
    }
    scan_bus(&mut bus.clone());
    // SAFETY: hooks are installed; the glue only calls the exported entry points.
    unsafe { lamp_zb_start() };

    // ── 5. Sensor task ────────────────────────────────────────
    let sensor_bus = bus.clone();
    let sensor_bridge = Arc::clone(&bridge);
    let sensor_config = config.clone();
    spawn_task(
        SENSOR_TASK_PRIORITY,
        SENSOR_TASK_STACK_KB,
        "sensors\0",
        move || {
            let mut hub = SensorHub::new(sensor_bus, FreeRtos, &sensor_config);
            let mut sink = LogEventSink::new();
            loop {
                let snapshot = hub.read_all();
                reporting::report(&snapshot, &*sensor_bridge, &mut sink);
                FreeRtos::delay_ms(sensor_config.report_interval_ms);
            }
        },
    )?;

    // ── 6. LED task (this thread) ─────────────────────────────
    // Nothing drives the outputs until the driver has been programmed.
    while !tlc_ready {
        FreeRtos::delay_ms(TLC_RETRY_MS);
        tlc_ready = tlc.bring_up(&mut led_reset, &mut FreeRtos).is_ok();
        if tlc_ready {
            info!("TLC59108 recovered");
            tlc.dump_registers();
        }
    }

    let mut sink = LogEventSink::new();
    let mut service = LampService::new(tlc, state, &config);
    service.start(&mut FreeRtos, &mut sink);
    loop {
        service.tick(bridge.is_joined(), &mut FreeRtos, &mut sink);
        FreeRtos::delay_ms(config.animation_tick_ms);
    }
}
