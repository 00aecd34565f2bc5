use crate::config::{ANGLE_COUNTS, ANGLE_HALF_TURN, ANGLE_MASK};

/// Signed shortest-path change between two raw 12-bit angles.
///
/// The result lies in (-2048, 2048]: an exact half turn is always reported as
/// a positive half turn. Changes larger than half a revolution between two
/// samples alias to the opposite direction, so the sampling rate has to keep
/// the rotor below half a turn per tick.
pub fn wrap_delta(current: u16, previous: u16) -> i32 {
    let mut delta = (current & ANGLE_MASK) as i32 - (previous & ANGLE_MASK) as i32;

    if delta > ANGLE_HALF_TURN {
        delta -= ANGLE_COUNTS;
    }
    if delta <= -ANGLE_HALF_TURN {
        delta += ANGLE_COUNTS;
    }
    delta
}

/// Converts a count delta to revolutions of the sensor shaft.
#[inline(always)]
pub fn counts_to_turns(delta: i32) -> f64 {
    delta as f64 / ANGLE_COUNTS as f64
}
