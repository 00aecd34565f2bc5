use hal::{
    clocks::Clocks,
    pac::TIM3,
    timer::{
        Alignment, CaptureCompareDma, CountDir, OutputCompare, TimChannel, Timer, TimerConfig,
        UpdateReqSrc,
    },
};

use pacer_algo::config::{PWM_FREQUENCY_HZ, PWM_RESOLUTION_MAX};
use pacer_algo::hw::PwmSink;
use pacer_algo::pacing::actuator;

use super::pinout;

/// Channel id of the ESC output (TIM3_CH1).
pub const ESC_CHANNEL: u8 = 1;
/// Channel id of the servo output (TIM3_CH2).
pub const SERVO_CHANNEL: u8 = 2;

/// 50 Hz hobby-servo style PWM on TIM3, shared by the ESC and the servo.
pub struct ServoPwm {
    tim: Timer<TIM3>,
    resolution_max: u32, // Full scale of the duty values passed to write_duty
}

impl ServoPwm {
    pub fn new(tim3: TIM3, clock_cfg: &Clocks) -> Self {
        // Edge aligned so one timer period equals one pulse period
        let mut timer = Timer::new_tim3(
            tim3,
            PWM_FREQUENCY_HZ as f32,
            TimerConfig {
                one_pulse_mode: false,
                update_request_source: UpdateReqSrc::Any,
                auto_reload_preload: true,
                alignment: Alignment::Edge,
                capture_compare_dma: CaptureCompareDma::Update,
                direction: CountDir::Up,
            },
            clock_cfg,
        );
        timer.enable();

        ServoPwm {
            tim: timer,
            resolution_max: PWM_RESOLUTION_MAX,
        }
    }

    fn tim_channel(channel: u8) -> Option<TimChannel> {
        match channel {
            ESC_CHANNEL => Some(TimChannel::C1),
            SERVO_CHANNEL => Some(TimChannel::C2),
            _ => None,
        }
    }
}

impl PwmSink for ServoPwm {
    fn attach(&mut self, channel: u8, frequency_hz: u32, resolution_bits: u8) {
        let Some(tim_channel) = Self::tim_channel(channel) else {
            defmt::error!("PWM: unknown channel {}", channel);
            return;
        };
        if frequency_hz != PWM_FREQUENCY_HZ {
            defmt::warn!(
                "PWM: TIM3 runs at {} Hz, requested {} Hz",
                PWM_FREQUENCY_HZ,
                frequency_hz
            );
        }
        self.resolution_max = actuator::resolution_max(resolution_bits);

        match channel {
            ESC_CHANNEL => pinout::actuator::ESC.init(),
            _ => pinout::actuator::SERVO.init(),
        };
        self.tim
            .enable_pwm_output(tim_channel, OutputCompare::Pwm1, 0.0);
    }

    fn write_duty(&mut self, channel: u8, duty: u32) {
        if let Some(tim_channel) = Self::tim_channel(channel) {
            let max_duty = self.tim.get_max_duty();
            self.tim.set_duty(
                tim_channel,
                actuator::rescale_duty(duty, self.resolution_max, max_duty),
            );
        }
    }
}
