use super::{Axes, SensorDriver};
use embedded_hal::i2c::I2c;

pub trait MagnetometerSensor<I: I2c>: SensorDriver<I> {
    fn magnetic_field(&mut self, i2c: &mut I) -> Result<Axes, Self::Error>;
}
