//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                 |
//! |------------|----------------|-----------------------------|
//! | `i2c_bus`  | BusPort        | ESP32 I2C0 controller       |
//! | `log_sink` | EventSink      | Serial log output           |
//! | `nvs`      | KeyValueStore  | NVS / in-memory store       |
//! | `zigbee`   | ProtocolBridge | Zigbee stack glue (C hooks) |

pub mod i2c_bus;
pub mod log_sink;
pub mod nvs;
pub mod zigbee;
