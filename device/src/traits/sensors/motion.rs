use super::{Axes, SensorDriver};
use embedded_hal::i2c::I2c;

/// Accelerometer and gyroscope combo chip.
pub trait MotionSensor<I: I2c>: SensorDriver<I> {
    fn acceleration(&mut self, i2c: &mut I) -> Result<Axes, Self::Error>;

    fn angular_rate(&mut self, i2c: &mut I) -> Result<Axes, Self::Error>;
}
