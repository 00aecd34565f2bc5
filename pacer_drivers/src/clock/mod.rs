use cortex_m::peripheral::{DCB, DWT};

use pacer_algo::hw::MicrosClock;

/// Microsecond clock derived from the DWT cycle counter.
///
/// The cycle counter wraps every 2^32 cycles (~25 s at 170 MHz), so
/// `now_micros()` must be called at least that often; the control tick does.
pub struct DwtClock {
    cycles_per_us: u32,
    last_cycles: u32,
    remainder: u32, // Cycles not yet converted to a full microsecond
    micros: u32,
}

impl DwtClock {
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();

        DwtClock {
            cycles_per_us: (sysclk_hz / 1_000_000).max(1),
            last_cycles: DWT::cycle_count(),
            remainder: 0,
            micros: 0,
        }
    }
}

impl MicrosClock for DwtClock {
    fn now_micros(&mut self) -> u32 {
        let now = DWT::cycle_count();
        let elapsed = now.wrapping_sub(self.last_cycles) as u64 + self.remainder as u64;
        self.last_cycles = now;

        let cycles_per_us = self.cycles_per_us as u64;
        self.micros = self.micros.wrapping_add((elapsed / cycles_per_us) as u32);
        self.remainder = (elapsed % cycles_per_us) as u32;
        self.micros
    }
}
