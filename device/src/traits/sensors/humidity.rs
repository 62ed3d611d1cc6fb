use super::SensorDriver;
use crate::domain::temperature::{Celsius, Temperature};
use embedded_hal::i2c::I2c;

/// Combined relative humidity and temperature chip.
pub trait HumiditySensor<I: I2c>: SensorDriver<I> {
    fn temperature(&mut self, i2c: &mut I) -> Result<Temperature<Celsius>, Self::Error>;

    /// Relative humidity, in percent.
    fn relative_humidity(&mut self, i2c: &mut I) -> Result<f32, Self::Error>;
}
