use crate::hw::Rgb;

/// Idle and ready to start.
pub const READY: Rgb = Rgb::new(0, 255, 0);
/// Pacing in progress.
pub const PACING: Rgb = Rgb::new(255, 255, 255);
/// Angle sensor unavailable.
pub const FAULT: Rgb = Rgb::new(255, 0, 0);

/// Index of the status pixel on the strip.
pub const STATUS_PIXEL: usize = 0;
