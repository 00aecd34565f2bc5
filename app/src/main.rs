#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use hal::{
    self,
    clocks::Clocks,
    gpio::{self, Edge, Pin, Pull},
    pac,
    pac::TIM2,
    timer::{Timer, TimerConfig, TimerInterrupt},
};

use pacer_algo::{config::PacerConfig, PacerSystem};
use pacer_drivers::{angle_i2c::As5600I2c, clock::DwtClock, led::RgbLed, pwm::ServoPwm};

type Pacer = PacerSystem<As5600I2c, DwtClock, ServoPwm, RgbLed>;

/// No steering source on this build: hold the wheels straight.
const STEERING_TRIM: f64 = 0.0;

#[rtic::app(device = pac, peripherals = true)]
mod app {
    use super::*;

    use pacer_drivers::{pinout, pwm};

    #[shared]
    struct Shared {
        pacer: Pacer,
    }

    #[local]
    struct Local {
        tick_timer: Timer<TIM2>,
        button: Pin,
        config: PacerConfig,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let mut cp = ctx.core;
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        clock_cfg.setup().unwrap();

        let sysclk_freq = clock_cfg.sysclk(); // System clock frequency in Hz
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);

        let config = PacerConfig::default();

        let clock = DwtClock::new(&mut cp.DCB, &mut cp.DWT, sysclk_freq);
        let mut sensor = As5600I2c::new(dp.I2C1, &clock_cfg);
        if sensor.begin().is_err() {
            defmt::error!("SYSTEM: angle sensor not responding");
        }
        let servo_pwm = ServoPwm::new(dp.TIM3, &clock_cfg);
        let led = RgbLed::new();

        let mut pacer = PacerSystem::new(
            &config,
            sensor,
            clock,
            pwm::ESC_CHANNEL,
            pwm::SERVO_CHANNEL,
            servo_pwm,
            led,
        );
        if let Err(err) = pacer.initialize() {
            defmt::error!("SYSTEM: pacer init failed: {}", err);
        }

        let mut button = pinout::input::BUTTON.init();
        button.pull(Pull::Up);
        button.enable_interrupt(Edge::Falling);

        let mut tick_timer = Timer::new_tim2(
            dp.TIM2,
            config.tick_hz as f32,
            TimerConfig::default(),
            &clock_cfg,
        );
        tick_timer.enable_interrupt(TimerInterrupt::Update);
        tick_timer.enable();

        defmt::info!("SYSTEM: control tick at {} Hz", config.tick_hz);

        (
            Shared { pacer },
            Local {
                tick_timer,
                button,
                config,
            },
        )
    }

    #[task(binds = TIM2, shared = [pacer], local = [tick_timer], priority = 2)]
    fn control_tick(mut cx: control_tick::Context) {
        // Clear the update interrupt flag
        cx.local
            .tick_timer
            .clear_interrupt(TimerInterrupt::Update);

        cx.shared.pacer.lock(|pacer| {
            if let Err(err) = pacer.tick(STEERING_TRIM) {
                defmt::warn!("TICK: {}", err);
            }
        });
    }

    #[task(binds = EXTI15_10, shared = [pacer], local = [button, config], priority = 1)]
    fn button_pressed(mut cx: button_pressed::Context) {
        gpio::clear_exti_interrupt(15);
        if !cx.local.button.is_low() {
            return;
        }

        let config = cx.local.config;
        cx.shared.pacer.lock(|pacer| {
            if pacer.is_pacing() {
                pacer.stop();
            } else if let Err(err) = pacer.start(config.default_distance, config.default_pace) {
                defmt::warn!("BUTTON: start refused: {}", err);
            }
        });
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
