// Frame decoding for the AS5600 magnetic angle sensor.
// The RAW ANGLE register pair is read as two bytes, high byte first; only the
// low 12 bits carry the angle.

use crate::config::ANGLE_MASK;

/// Number of bytes in one angle read.
pub const FRAME_LEN: usize = 2;

/// Assembles the raw angle (0..=4095) from a big-endian register pair.
#[inline(always)]
pub fn angle_from_bytes(high: u8, low: u8) -> u16 {
    (((high as u16) << 8) | low as u16) & ANGLE_MASK
}

/// Same as `angle_from_bytes` for a read buffer.
#[inline(always)]
pub fn angle_from_frame(frame: [u8; FRAME_LEN]) -> u16 {
    angle_from_bytes(frame[0], frame[1])
}
