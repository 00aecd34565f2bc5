//! TIM3 outputs driving the ESC and the steering servo.
use super::PinDef;
use hal::gpio::{PinMode, Port};

/// TIM3_CH1, ESC signal
pub const ESC: PinDef = PinDef::new(Port::B, 4, PinMode::Alt(2));

/// TIM3_CH2, servo signal
pub const SERVO: PinDef = PinDef::new(Port::B, 5, PinMode::Alt(2));
