// Error types shared by the estimator, the pacing controller and the
// hardware capability traits. All errors are small `Copy` values so they can be
// returned from interrupt context without allocation.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::fmt;

/// Failure reported by an angle sensor read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The sensor did not return data within the bounded number of attempts.
    Timeout,
    /// The bus transaction itself failed (NACK, arbitration loss, ...).
    Bus,
}

/// Errors surfaced by the pacer algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacerError {
    /// Direction text was neither "FORWARD" nor "REVERSE".
    InvalidDirection,
    /// Pace of zero (or not a finite number) cannot produce a goal rate.
    InvalidPace,
    /// `sample()` was called before `initialize()`.
    NotInitialized,
    /// Angle sensor could not be read.
    Sensor(SensorError),
}

impl From<SensorError> for PacerError {
    fn from(err: SensorError) -> Self {
        PacerError::Sensor(err)
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Timeout => f.write_str("sensor unavailable: read timed out"),
            SensorError::Bus => f.write_str("sensor unavailable: bus error"),
        }
    }
}

impl fmt::Display for PacerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacerError::InvalidDirection => f.write_str("direction must be FORWARD or REVERSE"),
            PacerError::InvalidPace => f.write_str("pace must be a non-zero finite value"),
            PacerError::NotInitialized => f.write_str("estimator used before initialize()"),
            PacerError::Sensor(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_error_converts_into_pacer_error() {
        let err: PacerError = SensorError::Timeout.into();
        assert_eq!(err, PacerError::Sensor(SensorError::Timeout));
    }

    #[test]
    fn display_names_the_failure() {
        assert_eq!(
            PacerError::Sensor(SensorError::Bus).to_string(),
            "sensor unavailable: bus error"
        );
        assert!(PacerError::InvalidPace.to_string().contains("pace"));
    }
}
