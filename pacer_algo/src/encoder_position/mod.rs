// Implements the wheel velocity and distance estimator fed by a 12-bit
// magnetic angle sensor.

// Key Features:
// - Wrap-aware angle differencing over the 4096-count circle.
// - Instantaneous rotation rate smoothed by a per-instance scalar Kalman filter.
// - Signed linear distance accumulated through gear ratio and wheel circumference.
// - Sensor mounting direction fixed at construction.

// Detailed Operation:
// `initialize()` records one (angle, timestamp) pair as the baseline. Every
// `sample()` reads a new pair, unwraps the angle change to the shortest signed
// path, converts it to sensor revolutions and divides by the elapsed time. The
// resulting rate goes through the Kalman filter, and the same revolution count
// is scaled into wheel distance. Distance is never clamped; it only changes
// through `sample()` or `reset_distance()`.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::str::FromStr;

use crate::error::{PacerError, SensorError};
use crate::hw::{AngleSensor, MicrosClock};
use crate::math_float::filters::kalman::{FilterState, ScalarKalman};

pub mod angle_delta;
pub mod as5600;

use self::angle_delta::{counts_to_turns, wrap_delta};

/// Mounting direction of the angle sensor relative to forward travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// +1.0 for `Forward`, -1.0 for `Reverse`.
    #[inline(always)]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

impl FromStr for Direction {
    type Err = PacerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD" => Ok(Direction::Forward),
            "REVERSE" => Ok(Direction::Reverse),
            _ => Err(PacerError::InvalidDirection),
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = PacerError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One raw angle reading and the time it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderSample {
    pub raw_angle: u16,
    pub timestamp_us: u32,
}

/// Result of a successful `sample()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleOutcome {
    /// Velocity and distance were updated.
    Updated,
    /// No time elapsed since the baseline; the reading was dropped and the
    /// baseline kept, so the angle change is folded into the next sample.
    /// `PacerSystem::tick` also reports this when it takes a late baseline.
    Skipped,
    /// The clock ran backwards. Distance took the angle change, velocity was
    /// held and this reading became the new baseline.
    Rebaselined,
}

/// Estimates wheel rotation rate and distance from an angle sensor.
pub struct VelocityEstimator<S, C> {
    sensor: S,
    clock: C,
    direction: Direction,
    gear_ratio: f64,
    wheel_circumference: f64,

    previous: Option<EncoderSample>, // Baseline; `None` until initialized
    filter: ScalarKalman,            // Rotation rate filter, owned per instance
    rotations_per_second: f64,
    distance: f64,
}

impl<S: AngleSensor, C: MicrosClock> VelocityEstimator<S, C> {
    /// Creates a new estimator.
    ///
    /// # Arguments
    /// * `direction` - sign applied to both rate and distance
    /// * `gear_ratio` - sensor shaft rotations per wheel rotation
    /// * `wheel_circumference` - distance covered by one wheel rotation
    pub fn new(
        sensor: S,
        clock: C,
        direction: Direction,
        gear_ratio: f64,
        wheel_circumference: f64,
    ) -> Self {
        Self {
            sensor,
            clock,
            direction,
            gear_ratio,
            wheel_circumference,
            previous: None,
            filter: ScalarKalman::default(),
            rotations_per_second: 0.0,
            distance: 0.0,
        }
    }

    /// Takes the baseline sample. Must precede the first `sample()`.
    pub fn initialize(&mut self) -> Result<(), PacerError> {
        let baseline = self.read()?;
        self.previous = Some(baseline);
        Ok(())
    }

    /// Reads the sensor and advances velocity and distance by one tick.
    ///
    /// On a sensor error nothing changes and the next call retries against the
    /// same baseline.
    pub fn sample(&mut self) -> Result<SampleOutcome, PacerError> {
        let previous = self.previous.ok_or(PacerError::NotInitialized)?;
        let current = self.read()?;

        // Wrapping difference tolerates one clock overflow between samples;
        // anything in the upper half is a clock running backwards.
        let elapsed_us = current.timestamp_us.wrapping_sub(previous.timestamp_us);
        if elapsed_us == 0 {
            debug!("ENCODER: sample skipped, no time elapsed");
            return Ok(SampleOutcome::Skipped);
        }

        let turns = self.direction.sign() * counts_to_turns(wrap_delta(
            current.raw_angle,
            previous.raw_angle,
        ));
        self.distance += turns / self.gear_ratio * self.wheel_circumference;

        if elapsed_us > i32::MAX as u32 {
            warn!("ENCODER: clock ran backwards, rebaselining");
            self.previous = Some(current);
            return Ok(SampleOutcome::Rebaselined);
        }
        let delta_time = elapsed_us as f64 / 1e6;
        self.rotations_per_second = self.filter.tick(turns / delta_time);

        self.previous = Some(current);
        Ok(SampleOutcome::Updated)
    }

    fn read(&mut self) -> Result<EncoderSample, SensorError> {
        let raw_angle = self.sensor.read_raw_angle().map_err(|err| {
            warn!("ENCODER: angle read failed: {}", err);
            err
        })?;
        let timestamp_us = self.clock.now_micros();
        Ok(EncoderSample {
            raw_angle,
            timestamp_us,
        })
    }

    /// Zeroes the distance. Filter and velocity are left untouched.
    pub fn reset_distance(&mut self) {
        self.distance = 0.0;
    }

    /// Signed distance since construction or the last reset.
    pub fn distance_traveled(&self) -> f64 {
        self.distance
    }

    /// Filtered sensor shaft rotation rate.
    pub fn rotations_per_second(&self) -> f64 {
        self.rotations_per_second
    }

    /// Filtered linear wheel speed, distance units per second.
    pub fn wheel_speed(&self) -> f64 {
        self.rotations_per_second / self.gear_ratio * self.wheel_circumference
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Last accepted sample, `None` before `initialize()`.
    pub fn last_sample(&self) -> Option<EncoderSample> {
        self.previous
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{ScriptedSensor, StepClock};

    const TICK_US: u32 = 10_000;

    fn estimator(
        angles: &[u16],
        direction: Direction,
    ) -> VelocityEstimator<ScriptedSensor, StepClock> {
        VelocityEstimator::new(
            ScriptedSensor::new(angles),
            StepClock::new(0, TICK_US),
            direction,
            1.0,
            1.0,
        )
    }

    fn run(est: &mut VelocityEstimator<ScriptedSensor, StepClock>, ticks: usize) {
        est.initialize().unwrap();
        for _ in 0..ticks {
            assert_eq!(est.sample().unwrap(), SampleOutcome::Updated);
        }
    }

    #[test]
    fn direction_parsing_rejects_unknown_text() {
        assert_eq!("FORWARD".parse::<Direction>(), Ok(Direction::Forward));
        assert_eq!(Direction::try_from("REVERSE"), Ok(Direction::Reverse));
        assert_eq!(
            Direction::try_from("reverse"),
            Err(PacerError::InvalidDirection)
        );
        assert_eq!(
            " FORWARD".parse::<Direction>(),
            Err(PacerError::InvalidDirection)
        );
        assert_eq!(
            "SIDEWAYS".parse::<Direction>(),
            Err(PacerError::InvalidDirection)
        );
        assert_eq!(Direction::try_from(""), Err(PacerError::InvalidDirection));
    }

    #[test]
    fn sample_before_initialize_is_an_error() {
        let mut est = estimator(&[0, 10], Direction::Forward);
        assert_eq!(est.sample(), Err(PacerError::NotInitialized));
        assert_eq!(est.last_sample(), None);
    }

    #[test]
    fn distance_follows_gear_ratio_and_circumference() {
        let mut est = VelocityEstimator::new(
            ScriptedSensor::new(&[0, 1024, 2048]),
            StepClock::new(0, TICK_US),
            Direction::Forward,
            2.0,
            0.5,
        );
        est.initialize().unwrap();
        est.sample().unwrap();
        assert!((est.distance_traveled() - 0.0625).abs() < 1e-12);
        est.sample().unwrap();
        assert!((est.distance_traveled() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn distance_is_continuous_across_the_zero_crossing() {
        // 4000 -> 4090 -> 84 -> 178: three steps of 90/94 counts forward
        let mut est = estimator(&[4000, 4090, 84, 178], Direction::Forward);
        run(&mut est, 3);
        let expected = (90 + 90 + 94) as f64 / 4096.0;
        assert!((est.distance_traveled() - expected).abs() < 1e-12);
    }

    #[test]
    fn reverse_mounting_negates_rate_and_distance() {
        let angles = [0, 100, 200, 300, 400];
        let mut fwd = estimator(&angles, Direction::Forward);
        let mut rev = estimator(&angles, Direction::Reverse);
        run(&mut fwd, 4);
        run(&mut rev, 4);
        assert!(fwd.distance_traveled() > 0.0);
        assert_eq!(rev.distance_traveled(), -fwd.distance_traveled());
        assert_eq!(rev.rotations_per_second(), -fwd.rotations_per_second());
    }

    #[test]
    fn forward_then_back_returns_to_start() {
        let mut est = estimator(
            &[0, 300, 600, 900, 1200, 900, 600, 300, 0],
            Direction::Reverse,
        );
        run(&mut est, 8);
        assert!(est.distance_traveled().abs() < 1e-12);
    }

    #[test]
    fn stationary_sensor_decays_rate_and_holds_distance() {
        let mut angles = std::vec![0u16, 400, 800, 1200, 1600];
        angles.extend(std::iter::repeat(1600).take(400));
        let mut est = estimator(&angles, Direction::Forward);
        run(&mut est, 4);
        let moving_rate = est.rotations_per_second();
        let distance = est.distance_traveled();
        assert!(moving_rate > 0.0);

        let mut last = moving_rate;
        for _ in 0..400 {
            est.sample().unwrap();
            assert!(est.rotations_per_second() <= last);
            last = est.rotations_per_second();
        }
        assert!(last < moving_rate * 1e-3);
        assert!(last >= 0.0);
        assert_eq!(est.distance_traveled(), distance);
    }

    #[test]
    fn reset_distance_keeps_filter() {
        let mut est = estimator(&[0, 500, 1000, 1500], Direction::Forward);
        run(&mut est, 3);
        let rate = est.rotations_per_second();
        let filter = est.filter_state();
        est.reset_distance();
        assert_eq!(est.distance_traveled(), 0.0);
        assert_eq!(est.rotations_per_second(), rate);
        assert_eq!(est.filter_state(), filter);
    }

    #[test]
    fn zero_elapsed_time_skips_without_losing_motion() {
        let mut est = VelocityEstimator::new(
            ScriptedSensor::new(&[0, 50, 100]),
            StepClock::scripted(&[1_000, 1_000, 2_000]),
            Direction::Forward,
            1.0,
            1.0,
        );
        est.initialize().unwrap();
        assert_eq!(est.sample(), Ok(SampleOutcome::Skipped));
        assert_eq!(est.distance_traveled(), 0.0);
        assert_eq!(est.filter_state(), FilterState::default());

        assert_eq!(est.sample(), Ok(SampleOutcome::Updated));
        assert!((est.distance_traveled() - 100.0 / 4096.0).abs() < 1e-12);
        assert_eq!(
            est.last_sample(),
            Some(EncoderSample {
                raw_angle: 100,
                timestamp_us: 2_000
            })
        );
    }

    #[test]
    fn clock_overflow_between_samples_is_tolerated() {
        let start = u32::MAX - 4_999;
        let mut est = VelocityEstimator::new(
            ScriptedSensor::new(&[0, 0, 41]),
            StepClock::scripted(&[start, start.wrapping_add(10_000), start.wrapping_add(20_000)]),
            Direction::Forward,
            1.0,
            1.0,
        );
        est.initialize().unwrap();
        assert_eq!(est.sample(), Ok(SampleOutcome::Updated));
        assert_eq!(est.sample(), Ok(SampleOutcome::Updated));
        assert!(est.rotations_per_second() > 0.0);
    }

    #[test]
    fn clock_running_backwards_moves_the_baseline() {
        let mut est = VelocityEstimator::new(
            ScriptedSensor::new(&[0, 100, 200, 300]),
            StepClock::scripted(&[5_000_000, 15_000_000, 4_000, 14_000]),
            Direction::Forward,
            1.0,
            1.0,
        );
        est.initialize().unwrap();
        assert_eq!(est.sample(), Ok(SampleOutcome::Updated));
        let rate = est.rotations_per_second();
        let filter = est.filter_state();

        assert_eq!(est.sample(), Ok(SampleOutcome::Rebaselined));
        assert_eq!(est.rotations_per_second(), rate);
        assert_eq!(est.filter_state(), filter);
        assert!((est.distance_traveled() - 200.0 / 4096.0).abs() < 1e-12);
        assert_eq!(
            est.last_sample(),
            Some(EncoderSample {
                raw_angle: 200,
                timestamp_us: 4_000
            })
        );

        // Next reading is timed against the reset clock
        assert_eq!(est.sample(), Ok(SampleOutcome::Updated));
        assert!((est.distance_traveled() - 300.0 / 4096.0).abs() < 1e-12);
    }

    #[test]
    fn sensor_failure_leaves_state_untouched() {
        let mut sensor = ScriptedSensor::new(&[0, 200]);
        sensor.push(Err(SensorError::Timeout));
        sensor.push(Ok(400));
        let mut est = VelocityEstimator::new(
            sensor,
            StepClock::new(0, TICK_US),
            Direction::Forward,
            1.0,
            1.0,
        );
        est.initialize().unwrap();
        est.sample().unwrap();
        let before = (est.distance_traveled(), est.last_sample());

        assert_eq!(
            est.sample(),
            Err(PacerError::Sensor(SensorError::Timeout))
        );
        assert_eq!((est.distance_traveled(), est.last_sample()), before);

        est.sample().unwrap();
        assert!((est.distance_traveled() - 400.0 / 4096.0).abs() < 1e-12);
    }

    #[test]
    fn wheel_speed_scales_rotation_rate() {
        let mut est = VelocityEstimator::new(
            ScriptedSensor::new(&[0, 100, 200, 300]),
            StepClock::new(0, TICK_US),
            Direction::Forward,
            4.0,
            2.0,
        );
        run(&mut est, 3);
        assert!((est.wheel_speed() - est.rotations_per_second() / 2.0).abs() < 1e-12);
    }
}
