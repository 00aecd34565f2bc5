//! Status LED pins (active low).
use super::PinDef;
use hal::gpio::{PinMode, Port};

pub const RED: PinDef = PinDef::new(Port::B, 15, PinMode::Output);

pub const GRN: PinDef = PinDef::new(Port::B, 14, PinMode::Output);

pub const BLU: PinDef = PinDef::new(Port::B, 13, PinMode::Output);
