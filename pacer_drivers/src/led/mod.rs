use hal::gpio::Pin;

use pacer_algo::hw::{Rgb, StatusPixels};

use super::pinout;

/// On-board RGB LED used as a one-pixel status strip.
///
/// Each channel is a plain GPIO, so a color component is either on (>= 128)
/// or off.
pub struct RgbLed {
    red: Pin,
    green: Pin,
    blue: Pin,
    buffer: Rgb,
}

impl RgbLed {
    pub fn new() -> Self {
        let mut led = RgbLed {
            red: pinout::led::RED.init(),
            green: pinout::led::GRN.init(),
            blue: pinout::led::BLU.init(),
            buffer: Rgb::default(),
        };
        led.show();
        led
    }

    fn drive(pin: &mut Pin, level: u8) {
        // Active low
        if level >= 128 {
            pin.set_low();
        } else {
            pin.set_high();
        }
    }
}

impl Default for RgbLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPixels for RgbLed {
    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if index == 0 {
            self.buffer = color;
        }
    }

    fn show(&mut self) {
        Self::drive(&mut self.red, self.buffer.r);
        Self::drive(&mut self.green, self.buffer.g);
        Self::drive(&mut self.blue, self.buffer.b);
    }
}
