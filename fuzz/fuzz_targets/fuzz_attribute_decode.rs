//! Fuzz target: attribute-write decoding
//!
//! Feeds arbitrary `(cluster, attribute, zcl_type, raw)` tuples through the
//! same path the stack glue uses and checks that only the recognised
//! cluster/attribute pairs ever decode.
//!
//! cargo fuzz run fuzz_attribute_decode

#![no_main]

use cctlamp::app::commands::zcl::*;
use cctlamp::app::commands::{AttributeValue, AttributeWrite};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u16, u16, u8, u32)| {
    let (cluster, attribute, zcl_type, raw) = input;
    let Some(value) = AttributeValue::from_zcl(zcl_type, raw) else {
        return;
    };
    match AttributeWrite::decode(cluster, attribute, value) {
        Some(AttributeWrite::OnOff(_)) => {
            assert_eq!((cluster, attribute), (CLUSTER_ON_OFF, ATTR_ON_OFF));
        }
        Some(AttributeWrite::Level(level)) => {
            assert_eq!((cluster, attribute), (CLUSTER_LEVEL_CONTROL, ATTR_CURRENT_LEVEL));
            assert_eq!(u32::from(level), raw);
        }
        Some(AttributeWrite::ColorTemperature(mireds)) => {
            assert_eq!((cluster, attribute), (CLUSTER_COLOR_CONTROL, ATTR_COLOR_TEMPERATURE));
            assert_eq!(u32::from(mireds), raw);
        }
        None => {}
    }
});
