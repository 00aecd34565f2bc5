// Implements the pacing controller: goal math, ESC/servo command mapping, the
// Idle/Pacing state machine and the status color.

// Key Features:
// - Turns a (distance, pace) goal into a target sensor rotation rate.
// - Maps steering and velocity outputs onto clamped 50 Hz pulse widths.
// - Stops automatically once the traveled distance reaches the goal.
// - Signals state through a single status pixel (green idle, white pacing).

// Detailed Operation:
// The controller owns both PWM channels and the status LED. `start()` validates
// the pace and stores the goal, `update()` writes both actuators every tick and
// checks the stop condition, `stop()` returns everything to neutral. `update()`
// does not look at the state, so calling it while idle still drives the
// actuators and re-runs the stop check against the last goal.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::{
    ESC_NEUTRAL_US, PWM_FREQUENCY_HZ, PWM_RESOLUTION_BITS, SERVO_CENTER_DEG,
};
use crate::error::PacerError;
use crate::hw::{PwmSink, Rgb, StatusPixels};

pub mod actuator;
pub mod status;

/// Pacing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacingState {
    Idle,
    Pacing,
}

/// Distance and pace requested by `start()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingGoal {
    pub distance: f64,
    pub pace: f64, // Time per unit distance
    pub goal_rotations_per_second: f64,
}

impl PacingGoal {
    /// Derives the target sensor rotation rate for a goal.
    pub fn new(
        distance: f64,
        pace: f64,
        gear_ratio: f64,
        wheel_circumference: f64,
    ) -> Result<Self, PacerError> {
        if pace == 0.0 || !pace.is_finite() {
            return Err(PacerError::InvalidPace);
        }
        Ok(Self {
            distance,
            pace,
            goal_rotations_per_second: distance / (pace * wheel_circumference) * gear_ratio,
        })
    }
}

/// Drives the ESC and steering servo towards a pacing goal.
pub struct PacingController<P, L> {
    esc_channel: u8,
    servo_channel: u8,
    gear_ratio: f64,
    wheel_circumference: f64,

    pwm: P,
    led: L,

    state: PacingState,
    goal: Option<PacingGoal>,

    esc_pulse_us: i32,    // Last commanded ESC pulse
    servo_angle_deg: i32, // Last commanded servo angle
}

impl<P: PwmSink, L: StatusPixels> PacingController<P, L> {
    pub fn new(
        esc_channel: u8,
        servo_channel: u8,
        gear_ratio: f64,
        wheel_circumference: f64,
        pwm: P,
        led: L,
    ) -> Self {
        Self {
            esc_channel,
            servo_channel,
            gear_ratio,
            wheel_circumference,
            pwm,
            led,
            state: PacingState::Idle,
            goal: None,
            esc_pulse_us: ESC_NEUTRAL_US,
            servo_angle_deg: SERVO_CENTER_DEG,
        }
    }

    /// Attaches both PWM channels and moves the actuators to neutral.
    pub fn initialize(&mut self) {
        self.pwm
            .attach(self.esc_channel, PWM_FREQUENCY_HZ, PWM_RESOLUTION_BITS);
        self.pwm
            .attach(self.servo_channel, PWM_FREQUENCY_HZ, PWM_RESOLUTION_BITS);
        self.reset_controls();
    }

    /// Stores a new goal and enters `Pacing`.
    ///
    /// A zero pace is rejected; the previous goal and state are kept.
    pub fn start(&mut self, distance: f64, pace: f64) -> Result<(), PacerError> {
        let goal = match PacingGoal::new(distance, pace, self.gear_ratio, self.wheel_circumference) {
            Ok(goal) => goal,
            Err(err) => {
                warn!("PACING: start rejected: {}", err);
                return Err(err);
            }
        };
        info!(
            "PACING: start, distance {}, pace {}, goal {} rps",
            goal.distance,
            goal.pace,
            goal.goal_rotations_per_second
        );
        self.goal = Some(goal);
        self.show_status(status::PACING);
        self.state = PacingState::Pacing;
        Ok(())
    }

    /// Neutral actuators, green status, `Idle`. Safe to repeat.
    pub fn stop(&mut self) {
        if self.state == PacingState::Pacing {
            info!("PACING: stop");
        }
        self.reset_controls();
        self.state = PacingState::Idle;
    }

    /// Writes both actuators and stops once `distance_traveled` reaches the goal.
    pub fn update(&mut self, steering_output: f64, velocity_output: f64, distance_traveled: f64) {
        self.set_esc_pulse(actuator::esc_pulse_us(velocity_output));
        self.set_servo_angle(actuator::servo_angle_deg(steering_output));

        if let Some(goal) = self.goal {
            if distance_traveled >= goal.distance {
                if self.state == PacingState::Pacing {
                    info!("PACING: goal of {} reached", goal.distance);
                }
                self.stop();
            }
        }
    }

    /// Sets the status pixel and pushes it to the strip.
    pub fn set_status_color(&mut self, r: u8, g: u8, b: u8) {
        self.show_status(Rgb::new(r, g, b));
    }

    pub fn is_pacing(&self) -> bool {
        self.state == PacingState::Pacing
    }

    pub fn state(&self) -> PacingState {
        self.state
    }

    /// Target rotation rate of the current goal, 0.0 before the first `start()`.
    pub fn goal_rotations_per_second(&self) -> f64 {
        self.goal.map_or(0.0, |goal| goal.goal_rotations_per_second)
    }

    pub fn goal(&self) -> Option<PacingGoal> {
        self.goal
    }

    pub fn esc_pulse_us(&self) -> i32 {
        self.esc_pulse_us
    }

    pub fn servo_angle_deg(&self) -> i32 {
        self.servo_angle_deg
    }

    fn reset_controls(&mut self) {
        self.set_esc_pulse(ESC_NEUTRAL_US);
        self.set_servo_angle(SERVO_CENTER_DEG);
        self.show_status(status::READY);
    }

    fn set_esc_pulse(&mut self, pulse_us: i32) {
        self.esc_pulse_us = pulse_us;
        self.pwm
            .write_duty(self.esc_channel, actuator::pulse_to_duty(pulse_us));
    }

    fn set_servo_angle(&mut self, angle_deg: i32) {
        self.servo_angle_deg = angle_deg;
        let pulse_us = actuator::servo_pulse_us(angle_deg);
        self.pwm
            .write_duty(self.servo_channel, actuator::pulse_to_duty(pulse_us));
    }

    fn show_status(&mut self, color: Rgb) {
        self.led.set_pixel(status::STATUS_PIXEL, color);
        self.led.show();
    }
}
