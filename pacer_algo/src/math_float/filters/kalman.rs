// Implements a scalar Kalman filter used to smooth the instantaneous rotation
// rate measured between two encoder samples.

// Key Features:
// - One-dimensional constant-velocity model with fixed noise parameters.
// - Filter memory (`FilterState`) is owned by each filter instance.
// - Large measurement noise relative to process noise favors smoothing.

// Detailed Operation:
// Each tick computes the Kalman gain from the persisted error covariance, moves
// the estimate towards the measurement by that gain and propagates the
// covariance with the process noise. The covariance converges to a fixed point
// that does not depend on the measurements, so the filter settles into a
// constant-gain low-pass after a few dozen ticks.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Fixed noise model of the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanParams {
    pub r: f64, // Measurement noise.
    pub q: f64, // Process noise.
    pub h: f64, // Observation gain.
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            r: 50.0,
            q: 0.1,
            h: 1.0,
        }
    }
}

/// Persisted filter memory: error covariance and state estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    pub p: f64,
    pub u_hat: f64,
}

/// Scalar Kalman filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarKalman {
    params: KalmanParams,
    state: FilterState,
}

impl ScalarKalman {
    pub fn new(params: KalmanParams) -> Self {
        Self {
            params,
            state: FilterState::default(),
        }
    }

    /// Feeds measurement `u` and returns the updated estimate.
    pub fn tick(&mut self, u: f64) -> f64 {
        let KalmanParams { r, q, h } = self.params;
        let FilterState { p, u_hat } = self.state;

        let k = p * h / (h * p * h + r);
        let u_hat = u_hat + k * (u - h * u_hat);
        let p = (1.0 - k * h) * p + q;

        self.state = FilterState { p, u_hat };
        u_hat
    }

    pub fn estimate(&self) -> f64 {
        self.state.u_hat
    }

    pub fn state(&self) -> FilterState {
        self.state
    }
}

impl Default for ScalarKalman {
    fn default() -> Self {
        Self::new(KalmanParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_gain() {
        // p starts at zero, so the first measurement is ignored entirely.
        let mut kf = ScalarKalman::default();
        assert_eq!(kf.tick(10.0), 0.0);
        assert!((kf.state().p - 0.1).abs() < 1e-12);
    }

    #[test]
    fn second_tick_follows_the_recursion() {
        let mut kf = ScalarKalman::default();
        kf.tick(10.0);
        let out = kf.tick(10.0);
        let k = 0.1 / (0.1 + 50.0);
        assert!((out - k * 10.0).abs() < 1e-12);
        assert!((kf.state().p - ((1.0 - k) * 0.1 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn covariance_converges_independent_of_input() {
        let mut a = ScalarKalman::default();
        let mut b = ScalarKalman::default();
        for i in 0..2000 {
            a.tick(0.0);
            b.tick((i as f64).sin() * 1e3);
        }
        assert!((a.state().p - b.state().p).abs() < 1e-9);
        // Fixed point of p = (1 - p/(p + r)) p + q.
        let p = a.state().p;
        let next = (1.0 - p / (p + 50.0)) * p + 0.1;
        assert!((next - p).abs() < 1e-9);
    }

    #[test]
    fn estimate_tracks_a_constant_measurement() {
        let mut kf = ScalarKalman::default();
        for _ in 0..3000 {
            kf.tick(2.5);
        }
        assert!((kf.estimate() - 2.5).abs() < 1e-3);
    }

    #[test]
    fn instances_do_not_share_memory() {
        let mut a = ScalarKalman::default();
        let b = ScalarKalman::default();
        for _ in 0..10 {
            a.tick(100.0);
        }
        assert!(a.estimate() > 0.0);
        assert_eq!(b.state(), FilterState::default());
    }
}
