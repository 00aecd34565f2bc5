//! I2C1 pins wired to the AS5600 angle sensor.
use super::PinDef;
use hal::gpio::{PinMode, Port};

/// I2C1 clock, open drain
pub const I2C1_SCL: PinDef = PinDef::new(Port::B, 8, PinMode::Alt(4));

/// I2C1 data, open drain
pub const I2C1_SDA: PinDef = PinDef::new(Port::B, 9, PinMode::Alt(4));
