//! Output control: warm/cool channel mixing.

pub mod mixer;
