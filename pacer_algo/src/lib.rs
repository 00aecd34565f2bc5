#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Logging macros must be declared before the modules using them
#[macro_use]
mod fmt;

pub mod config;
pub mod encoder_position;
pub mod error;
pub mod hw;
pub mod math_float;
pub mod pacing;

use config::PacerConfig;
use encoder_position::{SampleOutcome, VelocityEstimator};
use error::PacerError;
use hw::{AngleSensor, MicrosClock, PwmSink, StatusPixels};
use math_float::controllers::pid::PID;
use pacing::{status, PacingController};

/// Complete pacer: odometry, velocity loop and pacing controller driven from
/// one periodic tick.
pub struct PacerSystem<S, C, P, L> {
    estimator: VelocityEstimator<S, C>, // Wheel rotation rate and distance
    controller: PacingController<P, L>, // Actuators, goal and status LED
    velocity_pid: PID,                  // Goal rate -> ESC offset
    velocity_limit: f64,
    sensor_fault: bool, // Last sensor read failed
}

impl<S, C, P, L> PacerSystem<S, C, P, L>
where
    S: AngleSensor,
    C: MicrosClock,
    P: PwmSink,
    L: StatusPixels,
{
    /// Create a new pacer.
    ///
    /// # Arguments
    /// * `config` - mounting direction, wheel geometry and velocity loop gains
    /// * `sensor`, `clock` - odometry inputs
    /// * `esc_channel`, `servo_channel` - PWM channel ids on `pwm`
    /// * `led` - status pixel strip
    pub fn new(
        config: &PacerConfig,
        sensor: S,
        clock: C,
        esc_channel: u8,
        servo_channel: u8,
        pwm: P,
        led: L,
    ) -> Self {
        Self {
            estimator: VelocityEstimator::new(
                sensor,
                clock,
                config.direction,
                config.gear_ratio,
                config.wheel_circumference,
            ),
            controller: PacingController::new(
                esc_channel,
                servo_channel,
                config.gear_ratio,
                config.wheel_circumference,
                pwm,
                led,
            ),
            velocity_pid: PID::from_gains(config.velocity_gains),
            velocity_limit: config.velocity_limit,
            sensor_fault: false,
        }
    }

    /// Neutral actuators first, then the odometry baseline.
    pub fn initialize(&mut self) -> Result<(), PacerError> {
        self.controller.initialize();
        if let Err(err) = self.estimator.initialize() {
            error!("PACER: encoder baseline failed: {}", err);
            self.flag_sensor_fault();
            return Err(err);
        }
        info!("PACER: ready");
        Ok(())
    }

    /// Starts a new run from zero distance.
    pub fn start(&mut self, distance: f64, pace: f64) -> Result<(), PacerError> {
        self.controller.start(distance, pace)?;
        self.estimator.reset_distance();
        self.velocity_pid.reset();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// One control period: sample odometry, run the velocity loop and update
    /// the actuators while pacing.
    ///
    /// A failed sensor read stops an active run and turns the status pixel red
    /// until a read succeeds again. Without a baseline the tick only retries
    /// taking one and reports `Skipped` once it succeeds.
    pub fn tick(&mut self, steering_output: f64) -> Result<SampleOutcome, PacerError> {
        let result = if self.estimator.last_sample().is_none() {
            self.estimator
                .initialize()
                .map(|()| SampleOutcome::Skipped)
        } else {
            self.estimator.sample()
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if self.controller.is_pacing() {
                    warn!("PACER: stopping, odometry lost");
                    self.controller.stop();
                }
                self.flag_sensor_fault();
                return Err(err);
            }
        };

        if self.sensor_fault {
            info!("PACER: encoder recovered");
            self.sensor_fault = false;
            let color = if self.controller.is_pacing() {
                status::PACING
            } else {
                status::READY
            };
            self.controller.set_status_color(color.r, color.g, color.b);
        }

        if self.controller.is_pacing() {
            let goal = self.controller.goal_rotations_per_second();
            let error = goal - self.estimator.rotations_per_second();
            let velocity_output = self.velocity_pid.tick(error, goal, self.velocity_limit);
            self.controller.update(
                steering_output,
                velocity_output,
                self.estimator.distance_traveled(),
            );
        }
        Ok(outcome)
    }

    fn flag_sensor_fault(&mut self) {
        if !self.sensor_fault {
            self.sensor_fault = true;
            let color = status::FAULT;
            self.controller.set_status_color(color.r, color.g, color.b);
        }
    }

    pub fn is_pacing(&self) -> bool {
        self.controller.is_pacing()
    }

    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    pub fn estimator(&self) -> &VelocityEstimator<S, C> {
        &self.estimator
    }

    pub fn controller(&self) -> &PacingController<P, L> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PacingController<P, L> {
        &mut self.controller
    }
}
