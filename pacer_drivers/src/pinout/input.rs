use super::PinDef;
use hal::gpio::{PinMode, Port};

/// User button, pulled up, pressed = low. Routed to EXTI line 15.
pub const BUTTON: PinDef = PinDef::new(Port::A, 15, PinMode::Input);
