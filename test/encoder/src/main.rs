//! Bench test for the wheel odometry: reads the AS5600 at 100 Hz and prints
//! raw angle, filtered rotation rate and distance over RTT.

#![no_main]
#![no_std]

use cortex_m::delay::Delay;
use cortex_m_rt::entry;

use hal::{self, clocks::Clocks, pac};

use defmt_rtt as _; // global logger
use panic_probe as _;

use pacer_algo::config::PacerConfig;
use pacer_algo::encoder_position::VelocityEstimator;
use pacer_drivers::{angle_i2c::As5600I2c, clock::DwtClock};

const SAMPLE_PERIOD_MS: u32 = 10;
const PRINT_EVERY: u32 = 10;

#[entry]
fn main() -> ! {
    // Set up CPU peripherals
    let mut cp = cortex_m::Peripherals::take().unwrap();
    // Set up microcontroller peripherals
    let dp = pac::Peripherals::take().unwrap();

    let clock_cfg = Clocks::default();
    clock_cfg.setup().unwrap();
    let sysclk_freq = clock_cfg.sysclk();
    defmt::println!("Encoder test, system clock {} Hz", sysclk_freq);

    let clock = DwtClock::new(&mut cp.DCB, &mut cp.DWT, sysclk_freq);
    let mut delay = Delay::new(cp.SYST, clock_cfg.systick());

    let mut sensor = As5600I2c::new(dp.I2C1, &clock_cfg);
    if sensor.begin().is_err() {
        defmt::println!("Sensor not found, check wiring");
    }

    let config = PacerConfig::default();
    let mut odometry = VelocityEstimator::new(
        sensor,
        clock,
        config.direction,
        config.gear_ratio,
        config.wheel_circumference,
    );
    while let Err(err) = odometry.initialize() {
        defmt::println!("Baseline read failed: {}", err);
        delay.delay_ms(500);
    }

    let mut count: u32 = 0;
    loop {
        delay.delay_ms(SAMPLE_PERIOD_MS);
        if let Err(err) = odometry.sample() {
            defmt::println!("Sample failed: {}", err);
            continue;
        }

        count += 1;
        if count % PRINT_EVERY == 0 {
            let angle = odometry.last_sample().map_or(0, |s| s.raw_angle);
            defmt::println!(
                "angle:{} rps:{} distance:{}",
                angle,
                odometry.rotations_per_second(),
                odometry.distance_traveled()
            );
        }
    }
}

// same panicking *behavior* as panic-probe but doesn't print a panic message
// this prevents the panic message being printed *twice* when defmt::panic is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
