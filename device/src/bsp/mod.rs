//! Board Support Packages (BSP).

use crate::traits::sensors::{HumiditySensor, MagnetometerSensor, MotionSensor, PressureSensor};
use embedded_hal::i2c::I2c;

/// A board that can bring up the sensor bus and the drivers wired to it.
///
/// Pin assignment, bus speed and chip addresses are board concerns and stay
/// behind this trait.
pub trait SensorBoard {
    /// The I2C peripheral shared by every sensor on the board.
    type Bus: I2c;
    type Magnetometer: MagnetometerSensor<Self::Bus>;
    type Humidity: HumiditySensor<Self::Bus>;
    type Pressure: PressureSensor<Self::Bus>;
    type Motion: MotionSensor<Self::Bus>;

    /// Claim the bus peripheral, returning `None` if it cannot be acquired.
    fn claim_bus(&mut self) -> Option<Self::Bus>;

    fn magnetometer(&mut self) -> Self::Magnetometer;

    fn humidity(&mut self) -> Self::Humidity;

    fn pressure(&mut self) -> Self::Pressure;

    fn motion(&mut self) -> Self::Motion;
}
