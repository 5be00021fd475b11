//! Inbound attribute writes from the protocol stack.
//!
//! The stack hands over `(cluster, attribute, value)` triples. Only a closed
//! set of pairs means anything to the lamp; [`AttributeWrite::decode`] maps
//! those onto variants and everything else onto `None`, so an unhandled pair
//! is a missing match arm rather than a silent numeric fall-through.

/// Zigbee Cluster Library identifiers used by the lamp endpoint.
pub mod zcl {
    pub const CLUSTER_ON_OFF: u16 = 0x0006;
    pub const CLUSTER_LEVEL_CONTROL: u16 = 0x0008;
    pub const CLUSTER_COLOR_CONTROL: u16 = 0x0300;

    pub const ATTR_ON_OFF: u16 = 0x0000;
    pub const ATTR_CURRENT_LEVEL: u16 = 0x0000;
    pub const ATTR_COLOR_TEMPERATURE: u16 = 0x0007;

    pub const TYPE_BOOL: u8 = 0x10;
    pub const TYPE_U8: u8 = 0x20;
    pub const TYPE_U16: u8 = 0x21;
}

/// Typed attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue {
    Bool(bool),
    U8(u8),
    U16(u16),
}

impl AttributeValue {
    /// Decode a ZCL data-type tag plus its value widened to `u32`.
    pub fn from_zcl(type_id: u8, raw: u32) -> Option<Self> {
        match type_id {
            zcl::TYPE_BOOL => Some(Self::Bool(raw != 0)),
            zcl::TYPE_U8 => u8::try_from(raw).ok().map(Self::U8),
            zcl::TYPE_U16 => u16::try_from(raw).ok().map(Self::U16),
            _ => None,
        }
    }
}

/// Every attribute write the lamp reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeWrite {
    /// On/Off cluster, OnOff attribute.
    OnOff(bool),
    /// Level Control cluster, CurrentLevel attribute.
    Level(u8),
    /// Color Control cluster, ColorTemperatureMireds attribute.
    ColorTemperature(u16),
}

impl AttributeWrite {
    /// `None` for any pair or payload type outside the recognised set.
    pub fn decode(cluster: u16, attribute: u16, value: AttributeValue) -> Option<Self> {
        use zcl::*;
        match (cluster, attribute, value) {
            (CLUSTER_ON_OFF, ATTR_ON_OFF, AttributeValue::Bool(on)) => Some(Self::OnOff(on)),
            (CLUSTER_LEVEL_CONTROL, ATTR_CURRENT_LEVEL, AttributeValue::U8(level)) => {
                Some(Self::Level(level))
            }
            (CLUSTER_COLOR_CONTROL, ATTR_COLOR_TEMPERATURE, AttributeValue::U16(mireds)) => {
                Some(Self::ColorTemperature(mireds))
            }
            _ => None,
        }
    }
}
