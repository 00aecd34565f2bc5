// Physical constants of the pacer hardware and default tuning values.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::encoder_position::Direction;

/// 7-bit I2C address of the AS5600 magnetic angle sensor.
pub const SENSOR_ADDRESS: u8 = 0x36;
/// First register of the RAW ANGLE pair (high byte, low byte follows).
pub const SENSOR_RAW_ANGLE_REG: u8 = 0x0C;
/// Bus read attempts before a sensor read is reported as timed out.
pub const DEFAULT_READ_ATTEMPTS: u32 = 1000;

/// Counts per revolution of the 12-bit angle sensor.
pub const ANGLE_COUNTS: i32 = 4096;
/// Half a revolution, the largest change that can be unwrapped unambiguously.
pub const ANGLE_HALF_TURN: i32 = ANGLE_COUNTS / 2;
/// Mask selecting the angle bits of the sensor register pair.
pub const ANGLE_MASK: u16 = 0x0FFF;

/// ESC and servo refresh rate.
pub const PWM_FREQUENCY_HZ: u32 = 50;
/// Duty resolution in bits.
pub const PWM_RESOLUTION_BITS: u8 = 14;
/// Largest duty value at `PWM_RESOLUTION_BITS`.
pub const PWM_RESOLUTION_MAX: u32 = (1 << PWM_RESOLUTION_BITS) - 1;
/// Length of one PWM period in microseconds.
pub const PWM_PERIOD_US: u32 = 1_000_000 / PWM_FREQUENCY_HZ;

/// Shortest accepted command pulse.
pub const PULSE_MIN_US: i32 = 1000;
/// Longest accepted command pulse.
pub const PULSE_MAX_US: i32 = 2000;
/// ESC pulse that holds the motor stopped.
pub const ESC_NEUTRAL_US: i32 = 1500;
/// ESC pulse that `velocity_output == 0` maps to (forward biased).
pub const ESC_CENTER_US: i32 = 1575;
/// Servo angle for driving straight.
pub const SERVO_CENTER_DEG: i32 = 90;
/// Servo travel limits.
pub const SERVO_MIN_DEG: i32 = 0;
pub const SERVO_MAX_DEG: i32 = 180;

/// Default wheel circumference in meters.
pub const DEFAULT_WHEEL_CIRCUMFERENCE: f64 = 0.2;
/// Default ratio of sensor shaft rotations to wheel rotations.
pub const DEFAULT_GEAR_RATIO: f64 = 1.0;

/// Runtime choices for one pacer build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacerConfig {
    /// Mounting direction of the angle sensor relative to forward travel.
    pub direction: Direction,
    /// Sensor shaft rotations per wheel rotation.
    pub gear_ratio: f64,
    /// Wheel circumference, in the same unit as pacing distances.
    pub wheel_circumference: f64,
    /// Rate at which the control tick runs.
    pub tick_hz: u32,
    /// Goal used by the start button.
    pub default_distance: f64,
    /// Pace used by the start button (seconds per unit distance).
    pub default_pace: f64,
    /// Velocity PID gains (proportional, integral, derivative, feedforward).
    pub velocity_gains: [f64; 4],
    /// Velocity PID output limit, in ESC microseconds around center.
    pub velocity_limit: f64,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            gear_ratio: DEFAULT_GEAR_RATIO,
            wheel_circumference: DEFAULT_WHEEL_CIRCUMFERENCE,
            tick_hz: 100,
            default_distance: 400.0,
            default_pace: 0.3,
            velocity_gains: [40.0, 0.5, 0.0, 0.0],
            velocity_limit: 425.0,
        }
    }
}
