#![no_std]

pub mod angle_i2c;
pub mod clock;
pub mod led;
pub mod pinout;
pub mod pwm;
