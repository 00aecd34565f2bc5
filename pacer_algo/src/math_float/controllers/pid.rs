// Implements a floating-point PID controller used as the outer velocity loop:
// it turns the difference between the goal and the measured wheel rotation rate
// into the velocity output consumed by the pacing controller.

// Key Features:
// - Configurable proportional, integral, derivative, and feedforward gains.
// - Integrates error using Tustin's method with anti-windup via integral clamping.
// - Output limited symmetrically around zero.
// - `reset()` clears the history when pacing restarts.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// PID controller for the velocity loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PID {
    kp: f64,             // Proportional gain.
    ki: f64,             // Integral gain.
    kd: f64,             // Derivative gain.
    kff: f64,            // Feedforward gain.
    integral: f64,       // Accumulated integral of error.
    previous_error: f64, // Previous error value for derivative calculation.
    output: f64,
}

impl PID {
    /// Creates a new PID controller with specified gains.
    pub fn new(kp: f64, ki: f64, kd: f64, kff: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            kff,
            integral: 0.0,
            previous_error: 0.0,
            output: 0.0,
        }
    }

    /// Builds the controller from a `[kp, ki, kd, kff]` array.
    pub fn from_gains(gains: [f64; 4]) -> Self {
        Self::new(gains[0], gains[1], gains[2], gains[3])
    }

    /// Updates the controller with the current error, feedforward value, and output limit.
    pub fn tick(&mut self, error: f64, feedfwd: f64, limit: f64) -> f64 {
        let p = self.kp * error;

        // Tustin's method for integrating the error
        self.integral += (error + self.previous_error) * 0.5;

        // Anti-windup: the integral alone never exceeds what the output may reach
        if self.ki != 0.0 {
            let i_limit = limit / self.ki;
            self.integral = self.integral.clamp(-i_limit, i_limit);
        }

        let i = self.ki * self.integral;
        let d = self.kd * (error - self.previous_error);
        let ff = self.kff * feedfwd;

        self.previous_error = error;

        self.output = (p + i + d + ff).clamp(-limit, limit);
        self.output
    }

    /// Clears integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.output = 0.0;
    }

    /// Retrieves the current output of the PID controller.
    pub fn output(&self) -> f64 {
        self.output
    }
}
