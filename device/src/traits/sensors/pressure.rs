use super::SensorDriver;
use crate::domain::temperature::{Celsius, Temperature};
use embedded_hal::i2c::I2c;

/// Barometric pressure chip.
pub trait PressureSensor<I: I2c>: SensorDriver<I> {
    /// Pressure, in hPa.
    fn pressure(&mut self, i2c: &mut I) -> Result<f32, Self::Error>;

    /// Reading of the on-die temperature sensor.
    fn temperature(&mut self, i2c: &mut I) -> Result<Temperature<Celsius>, Self::Error>;
}
