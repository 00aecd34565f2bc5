//! Mapping of control outputs to ESC and servo pulse widths.
//!
//! Both actuators take a 1000..2000 µs pulse at 50 Hz. Out-of-range commands
//! are clamped, never rejected.

use crate::config::{
    ESC_CENTER_US, PULSE_MAX_US, PULSE_MIN_US, PWM_PERIOD_US, PWM_RESOLUTION_MAX,
    SERVO_CENTER_DEG, SERVO_MAX_DEG, SERVO_MIN_DEG,
};

/// ESC pulse for a velocity output (µs offset from the forward-biased center).
#[inline(always)]
pub fn esc_pulse_us(velocity_output: f64) -> i32 {
    // `as` truncates towards zero and saturates, NaN maps to 0
    ESC_CENTER_US
        .saturating_add(velocity_output as i32)
        .clamp(PULSE_MIN_US, PULSE_MAX_US)
}

/// Servo angle for a steering output (degrees offset from straight).
#[inline(always)]
pub fn servo_angle_deg(steering_output: f64) -> i32 {
    SERVO_CENTER_DEG
        .saturating_add(steering_output as i32)
        .clamp(SERVO_MIN_DEG, SERVO_MAX_DEG)
}

/// Linear map of a servo angle onto the pulse range.
#[inline(always)]
pub fn servo_pulse_us(angle_deg: i32) -> i32 {
    let angle = angle_deg.clamp(SERVO_MIN_DEG, SERVO_MAX_DEG);
    (angle - SERVO_MIN_DEG) * (PULSE_MAX_US - PULSE_MIN_US) / (SERVO_MAX_DEG - SERVO_MIN_DEG)
        + PULSE_MIN_US
}

/// Duty value at `PWM_RESOLUTION_MAX` for a pulse width inside one period.
#[inline(always)]
pub fn pulse_to_duty(pulse_us: i32) -> u32 {
    let pulse = pulse_us.clamp(PULSE_MIN_US, PULSE_MAX_US) as u32;
    pulse * PWM_RESOLUTION_MAX / PWM_PERIOD_US
}

/// Full-scale duty for a channel resolution, kept within 1..=31 bits.
#[inline(always)]
pub fn resolution_max(resolution_bits: u8) -> u32 {
    (1u32 << resolution_bits.clamp(1, 31)) - 1
}

/// Rescales a duty from `resolution_max` full scale to a timer's `max_duty`.
#[inline(always)]
pub fn rescale_duty(duty: u32, resolution_max: u32, max_duty: u32) -> u32 {
    let full_scale = resolution_max.max(1) as u64;
    ((duty as u64).min(full_scale) * max_duty as u64 / full_scale) as u32
}
