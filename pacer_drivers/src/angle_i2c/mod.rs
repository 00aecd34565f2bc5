use hal::{
    clocks::Clocks,
    gpio::OutputType,
    i2c::{I2c, I2cConfig, I2cSpeed},
    pac::I2C1,
};

use pacer_algo::config::{DEFAULT_READ_ATTEMPTS, SENSOR_ADDRESS, SENSOR_RAW_ANGLE_REG};
use pacer_algo::encoder_position::as5600::{angle_from_frame, FRAME_LEN};
use pacer_algo::error::SensorError;
use pacer_algo::hw::AngleSensor;

use super::pinout;

/// AS5600 magnetic angle sensor on I2C1.
pub struct As5600I2c {
    i2c: I2c<I2C1>,
    attempts: u32, // Read attempts before reporting a timeout
}

impl As5600I2c {
    pub fn new(i2c_reg: I2C1, clock_cfg: &Clocks) -> Self {
        let mut scl = pinout::sensor::I2C1_SCL.init();
        scl.output_type(OutputType::OpenDrain);
        let mut sda = pinout::sensor::I2C1_SDA.init();
        sda.output_type(OutputType::OpenDrain);

        let i2c_cfg = I2cConfig {
            speed: I2cSpeed::FastPlus1M,
            ..Default::default()
        };

        As5600I2c {
            i2c: I2c::new(i2c_reg, i2c_cfg, clock_cfg),
            attempts: DEFAULT_READ_ATTEMPTS,
        }
    }

    pub fn set_attempts(&mut self, attempts: u32) {
        self.attempts = attempts.max(1);
    }

    /// Points the sensor's address register at RAW ANGLE so later reads can
    /// skip the register write.
    pub fn begin(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(SENSOR_ADDRESS, &[SENSOR_RAW_ANGLE_REG])
            .map_err(|_| {
                defmt::error!("AS5600: no ACK at address {=u8:#x}", SENSOR_ADDRESS);
                SensorError::Bus
            })
    }
}

impl AngleSensor for As5600I2c {
    fn read_raw_angle(&mut self) -> Result<u16, SensorError> {
        let mut frame = [0u8; FRAME_LEN];
        for _ in 0..self.attempts {
            // A NACK while the sensor is busy is retried
            if self.i2c.read(SENSOR_ADDRESS, &mut frame).is_ok() {
                return Ok(angle_from_frame(frame));
            }
        }
        defmt::warn!("AS5600: no data after {} attempts", self.attempts);
        Err(SensorError::Timeout)
    }
}
