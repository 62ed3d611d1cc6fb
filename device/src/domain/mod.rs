pub mod temperature;

use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// A point-in-time aggregate of every sensor field.
///
/// Fields carry no validity of their own: a value is only meaningful if the read
/// operation that targeted it reported success. A snapshot holds no reference to
/// drivers or to the bus and can be copied around freely once filled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorData {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, in percent.
    pub humidity: f32,
    /// Hectopascal.
    pub pressure: f32,
    /// Raw X, Y, Z in the magnetometer's native scale.
    pub magnetic: [i32; 3],
    /// Raw X, Y, Z in the accelerometer's native scale.
    pub acceleration: [i32; 3],
    /// Raw X, Y, Z in the gyroscope's native scale.
    pub gyroscope: [i32; 3],
}

impl SensorData {
    pub const fn new() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            pressure: 0.0,
            magnetic: [0; 3],
            acceleration: [0; 3],
            gyroscope: [0; 3],
        }
    }
}

/// The closed set of drivers an aggregator binds, in initialization order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    Magnetometer,
    Humidity,
    Pressure,
    Motion,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Magnetometer,
        SensorKind::Humidity,
        SensorKind::Pressure,
        SensorKind::Motion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Magnetometer => "magnetometer",
            SensorKind::Humidity => "humidity",
            SensorKind::Pressure => "pressure",
            SensorKind::Motion => "motion",
        }
    }

    /// The snapshot fields this driver is able to fill.
    pub fn fields(&self) -> Fields {
        match self {
            SensorKind::Magnetometer => Fields::MAGNETIC,
            SensorKind::Humidity => Fields::TEMPERATURE | Fields::HUMIDITY,
            SensorKind::Pressure => Fields::PRESSURE | Fields::TEMPERATURE,
            SensorKind::Motion => Fields::MOTION,
        }
    }
}

impl Display for SensorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field of [`SensorData`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Temperature,
    Humidity,
    Pressure,
    Magnetic,
    Acceleration,
    Gyroscope,
}

impl Field {
    /// Fields in the order a full read visits them, grouped by driver.
    pub const READ_ORDER: [Field; 6] = [
        Field::Magnetic,
        Field::Temperature,
        Field::Humidity,
        Field::Pressure,
        Field::Acceleration,
        Field::Gyroscope,
    ];

    pub fn flag(&self) -> Fields {
        match self {
            Field::Temperature => Fields::TEMPERATURE,
            Field::Humidity => Fields::HUMIDITY,
            Field::Pressure => Fields::PRESSURE,
            Field::Magnetic => Fields::MAGNETIC,
            Field::Acceleration => Fields::ACCELERATION,
            Field::Gyroscope => Fields::GYROSCOPE,
        }
    }
}

bitflags::bitflags! {
    /// A set of [`SensorData`] fields.
    #[derive(Default)]
    pub struct Fields: u8 {
        const TEMPERATURE  = 0b0000_0001;
        const HUMIDITY     = 0b0000_0010;
        const PRESSURE     = 0b0000_0100;
        const MAGNETIC     = 0b0000_1000;
        const ACCELERATION = 0b0001_0000;
        const GYROSCOPE    = 0b0010_0000;

        const ENVIRONMENT = Self::TEMPERATURE.bits | Self::HUMIDITY.bits | Self::PRESSURE.bits;
        const MOTION = Self::ACCELERATION.bits | Self::GYROSCOPE.bits;
    }
}

impl Fields {
    /// Iterate the contained fields in read order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::READ_ORDER
            .into_iter()
            .filter(move |field| self.contains(field.flag()))
    }
}

impl From<Field> for Fields {
    fn from(field: Field) -> Self {
        field.flag()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Fields {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "Fields({=u8:b})", self.bits())
    }
}
