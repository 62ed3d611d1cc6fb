//! Sensor driver contracts.
//!
//! Drivers never own the bus. Every operation borrows it for the duration of
//! one transaction, so two drivers can never have a transaction in flight at
//! the same time.

pub mod humidity;
pub mod magnetometer;
pub mod motion;
pub mod pressure;

pub use humidity::HumiditySensor;
pub use magnetometer::MagnetometerSensor;
pub use motion::MotionSensor;
pub use pressure::PressureSensor;

use embedded_hal::i2c::I2c;

/// Raw X, Y, Z reading in a driver's native integer scale.
pub type Axes = [i32; 3];

/// Capability shared by every sensor driver.
pub trait SensorDriver<I: I2c> {
    type Error;

    /// Configure the chip. Called exactly once per driver instance.
    fn initialize(&mut self, i2c: &mut I) -> Result<(), Self::Error>;
}
