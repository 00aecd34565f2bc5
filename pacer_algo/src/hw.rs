//! Hardware capabilities consumed by the pacer algorithms.
//!
//! The estimator and the pacing controller never touch peripherals directly;
//! they are generic over these traits. `pacer_drivers` implements them on the
//! STM32, tests implement them with in-memory fakes.

use crate::error::SensorError;

/// Source of raw 12-bit rotor angles.
pub trait AngleSensor {
    /// Reads the current raw angle (0..=4095).
    ///
    /// Implementations must bound any wait for the bus and report
    /// `SensorError::Timeout` instead of blocking forever.
    fn read_raw_angle(&mut self) -> Result<u16, SensorError>;
}

/// Monotonic microsecond counter. Wraps at `u32::MAX`.
pub trait MicrosClock {
    fn now_micros(&mut self) -> u32;
}

/// Fixed-frequency PWM output addressed by channel id.
pub trait PwmSink {
    /// Configures `channel` for the given frequency and duty resolution.
    fn attach(&mut self, channel: u8, frequency_hz: u32, resolution_bits: u8);
    /// Writes a duty value scaled to the resolution passed to `attach`.
    fn write_duty(&mut self, channel: u8, duty: u32);
}

/// RGB color of a status pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Addressable status LEDs.
pub trait StatusPixels {
    /// Stores a color for pixel `index` in the output buffer.
    fn set_pixel(&mut self, index: usize, color: Rgb);
    /// Pushes the buffer to the hardware.
    fn show(&mut self);
}

impl<T: AngleSensor + ?Sized> AngleSensor for &mut T {
    fn read_raw_angle(&mut self) -> Result<u16, SensorError> {
        (**self).read_raw_angle()
    }
}

impl<T: MicrosClock + ?Sized> MicrosClock for &mut T {
    fn now_micros(&mut self) -> u32 {
        (**self).now_micros()
    }
}

impl<T: PwmSink + ?Sized> PwmSink for &mut T {
    fn attach(&mut self, channel: u8, frequency_hz: u32, resolution_bits: u8) {
        (**self).attach(channel, frequency_hz, resolution_bits)
    }

    fn write_duty(&mut self, channel: u8, duty: u32) {
        (**self).write_duty(channel, duty)
    }
}

impl<T: StatusPixels + ?Sized> StatusPixels for &mut T {
    fn set_pixel(&mut self, index: usize, color: Rgb) {
        (**self).set_pixel(index, color)
    }

    fn show(&mut self) {
        (**self).show()
    }
}
