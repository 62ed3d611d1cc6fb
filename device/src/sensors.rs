//! The sensor aggregator.
//!
//! [`Sensors`] binds every driver of a [`SensorBoard`] to the shared bus once,
//! then fills [`SensorData`] snapshots on request. A driver that fails to come up
//! or to answer a read only costs the fields it is responsible for: every other
//! driver is still initialized and still read.

use crate::bsp::SensorBoard;
use crate::bus::BusHandle;
use crate::domain::{Field, Fields, SensorData, SensorKind};
use crate::traits::sensors::{
    Axes, HumiditySensor, MagnetometerSensor, MotionSensor, PressureSensor, SensorDriver,
};
use core::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// `init()` has not been called yet.
    NotInitialized,
    AlreadyInitialized,
    /// The bus could not be claimed. No driver will ever be reachable.
    BusUnavailable,
    /// The driver failed to initialize and has been left out.
    Unavailable(SensorKind),
    /// A single transaction with the driver failed.
    Read(SensorKind),
    /// The aggregator is already in use by another caller.
    Busy,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::NotInitialized => f.write_str("sensors not initialized"),
            Error::AlreadyInitialized => f.write_str("sensors already initialized"),
            Error::BusUnavailable => f.write_str("sensor bus unavailable"),
            Error::Unavailable(kind) => write!(f, "{} sensor unavailable", kind),
            Error::Read(kind) => write!(f, "{} sensor read failed", kind),
            Error::Busy => f.write_str("sensors busy"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Lifecycle of the aggregator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Uninitialized,
    /// Bus claimed and drivers bound. Some drivers may be unavailable.
    Ready,
    BusUnavailable,
}

/// Which drivers came up during initialization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Availability {
    magnetometer: bool,
    humidity: bool,
    pressure: bool,
    motion: bool,
}

impl Availability {
    pub fn is_available(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Magnetometer => self.magnetometer,
            SensorKind::Humidity => self.humidity,
            SensorKind::Pressure => self.pressure,
            SensorKind::Motion => self.motion,
        }
    }

    /// Every driver is available.
    pub fn is_complete(&self) -> bool {
        SensorKind::ALL.iter().all(|kind| self.is_available(*kind))
    }

    pub fn unavailable(&self) -> impl Iterator<Item = SensorKind> + '_ {
        SensorKind::ALL
            .into_iter()
            .filter(move |kind| !self.is_available(*kind))
    }

    /// Fields that at least one available driver can fill.
    pub fn fields(&self) -> Fields {
        SensorKind::ALL
            .iter()
            .filter(|kind| self.is_available(**kind))
            .fold(Fields::empty(), |acc, kind| acc | kind.fields())
    }
}

enum Slot<D> {
    Available(D),
    Unavailable,
}

impl<D> Slot<D> {
    fn bind<I>(kind: SensorKind, mut driver: D, i2c: &mut I) -> Self
    where
        I: embedded_hal::i2c::I2c,
        D: SensorDriver<I>,
    {
        match driver.initialize(i2c) {
            Ok(()) => {
                info!("{:?} sensor initialized", kind);
                Slot::Available(driver)
            }
            Err(_) => {
                warn!("{:?} sensor failed to initialize, leaving it out", kind);
                Slot::Unavailable
            }
        }
    }

    fn is_available(&self) -> bool {
        matches!(self, Slot::Available(_))
    }

    fn read<I, T, E>(
        &mut self,
        kind: SensorKind,
        i2c: &mut I,
        op: impl FnOnce(&mut D, &mut I) -> Result<T, E>,
    ) -> Result<T, Error> {
        match self {
            Slot::Available(driver) => op(driver, i2c).map_err(|_| {
                warn!("{:?} sensor read failed", kind);
                Error::Read(kind)
            }),
            Slot::Unavailable => Err(Error::Unavailable(kind)),
        }
    }
}

/// Drivers bound to a claimed bus.
struct Bound<B: SensorBoard> {
    magnetometer: Slot<B::Magnetometer>,
    humidity: Slot<B::Humidity>,
    pressure: Slot<B::Pressure>,
    motion: Slot<B::Motion>,
    // Declared last: dropped after every driver.
    bus: BusHandle<B::Bus>,
}

impl<B: SensorBoard> Bound<B> {
    fn availability(&self) -> Availability {
        Availability {
            magnetometer: self.magnetometer.is_available(),
            humidity: self.humidity.is_available(),
            pressure: self.pressure.is_available(),
            motion: self.motion.is_available(),
        }
    }

    fn magnetic(&mut self) -> Result<Axes, Error> {
        self.magnetometer
            .read(SensorKind::Magnetometer, self.bus.bind(), |driver, i2c| {
                driver.magnetic_field(i2c)
            })
    }

    fn temperature(&mut self) -> Result<f32, Error> {
        let primary = self
            .humidity
            .read(SensorKind::Humidity, self.bus.bind(), |driver, i2c| {
                HumiditySensor::temperature(driver, i2c)
            });
        // Only a humidity unit that never came up is replaced. A failed read
        // stays a failed read.
        match primary {
            Ok(temperature) => Ok(temperature.raw_value()),
            Err(Error::Unavailable(_)) if self.pressure.is_available() => {
                debug!("humidity sensor unavailable, reading temperature from pressure sensor");
                self.pressure
                    .read(SensorKind::Pressure, self.bus.bind(), |driver, i2c| {
                        PressureSensor::temperature(driver, i2c)
                    })
                    .map(|temperature| temperature.raw_value())
            }
            Err(e) => Err(e),
        }
    }

    fn humidity(&mut self) -> Result<f32, Error> {
        self.humidity
            .read(SensorKind::Humidity, self.bus.bind(), |driver, i2c| {
                driver.relative_humidity(i2c)
            })
    }

    fn pressure(&mut self) -> Result<f32, Error> {
        self.pressure
            .read(SensorKind::Pressure, self.bus.bind(), |driver, i2c| {
                driver.pressure(i2c)
            })
    }

    fn acceleration(&mut self) -> Result<Axes, Error> {
        self.motion
            .read(SensorKind::Motion, self.bus.bind(), |driver, i2c| {
                driver.acceleration(i2c)
            })
    }

    fn gyroscope(&mut self) -> Result<Axes, Error> {
        self.motion
            .read(SensorKind::Motion, self.bus.bind(), |driver, i2c| {
                driver.angular_rate(i2c)
            })
    }

    fn release(self) -> B::Bus {
        let Self {
            magnetometer,
            humidity,
            pressure,
            motion,
            bus,
        } = self;
        drop(magnetometer);
        drop(humidity);
        drop(pressure);
        drop(motion);
        debug!("sensor drivers released");
        bus.release()
    }

    fn fill(&mut self, field: Field, data: &mut SensorData) -> Result<(), Error> {
        match field {
            Field::Temperature => data.temperature = self.temperature()?,
            Field::Humidity => data.humidity = self.humidity()?,
            Field::Pressure => data.pressure = self.pressure()?,
            Field::Magnetic => data.magnetic = self.magnetic()?,
            Field::Acceleration => data.acceleration = self.acceleration()?,
            Field::Gyroscope => data.gyroscope = self.gyroscope()?,
        }
        trace!("{:?} updated", field);
        Ok(())
    }
}

enum Binding<B: SensorBoard> {
    Uninitialized,
    Ready(Bound<B>),
    BusUnavailable,
}

/// Aggregates every sensor of a board behind one snapshot.
///
/// All operations take `&mut self`: callers sharing an aggregator between
/// tasks must serialize access, see [`SharedSensors`](crate::shared::SharedSensors).
pub struct Sensors<B: SensorBoard> {
    board: B,
    binding: Binding<B>,
}

impl<B: SensorBoard> Sensors<B> {
    /// Create an aggregator for `board`. Nothing touches the hardware until
    /// [`init`](Self::init).
    pub fn new(board: B) -> Self {
        Self {
            board,
            binding: Binding::Uninitialized,
        }
    }

    /// Claim the bus, then construct and initialize the magnetometer, humidity,
    /// pressure and motion drivers, in that order.
    ///
    /// A driver that fails to initialize is reported in the returned
    /// [`Availability`] and does not prevent the others from coming up. Failing
    /// to claim the bus is fatal: the aggregator stays unusable for good.
    pub fn init(&mut self) -> Result<Availability, Error> {
        if !matches!(self.binding, Binding::Uninitialized) {
            warn!("sensors already initialized");
            return Err(Error::AlreadyInitialized);
        }

        let Some(i2c) = self.board.claim_bus() else {
            error!("unable to claim the sensor bus");
            self.binding = Binding::BusUnavailable;
            return Err(Error::BusUnavailable);
        };
        let mut bus = BusHandle::new(i2c);

        let magnetometer = Slot::bind(
            SensorKind::Magnetometer,
            self.board.magnetometer(),
            bus.bind(),
        );
        let humidity = Slot::bind(SensorKind::Humidity, self.board.humidity(), bus.bind());
        let pressure = Slot::bind(SensorKind::Pressure, self.board.pressure(), bus.bind());
        let motion = Slot::bind(SensorKind::Motion, self.board.motion(), bus.bind());

        let bound = Bound {
            magnetometer,
            humidity,
            pressure,
            motion,
            bus,
        };
        let availability = bound.availability();
        if availability.is_complete() {
            info!("all sensors ready");
        } else {
            warn!("sensors ready, degraded");
        }
        self.binding = Binding::Ready(bound);
        Ok(availability)
    }

    pub fn state(&self) -> State {
        match self.binding {
            Binding::Uninitialized => State::Uninitialized,
            Binding::Ready(_) => State::Ready,
            Binding::BusUnavailable => State::BusUnavailable,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == State::Ready
    }

    /// Drivers available since `init()`. Empty before initialization.
    pub fn availability(&self) -> Availability {
        match &self.binding {
            Binding::Ready(bound) => bound.availability(),
            _ => Availability::default(),
        }
    }

    /// Read the requested fields into `data`, returning the fields actually
    /// updated. Fields that could not be read are left untouched.
    pub fn read_fields(&mut self, data: &mut SensorData, fields: Fields) -> Fields {
        let bound = match self.bound() {
            Ok(bound) => bound,
            Err(e) => {
                debug!("skipping read: {:?}", e);
                return Fields::empty();
            }
        };

        let mut updated = Fields::empty();
        for field in fields.fields() {
            if bound.fill(field, data).is_ok() {
                updated |= field.flag();
            }
        }
        updated
    }

    /// Read every field. Returns `true` only if all of them were updated; on
    /// `false`, the fields that could be read are still written.
    pub fn read_all(&mut self, data: &mut SensorData) -> bool {
        self.read_fields(data, Fields::all()).is_all()
    }

    pub fn read_temperature(&mut self, data: &mut SensorData) -> bool {
        self.read_field(data, Field::Temperature)
    }

    pub fn read_humidity(&mut self, data: &mut SensorData) -> bool {
        self.read_field(data, Field::Humidity)
    }

    pub fn read_pressure(&mut self, data: &mut SensorData) -> bool {
        self.read_field(data, Field::Pressure)
    }

    pub fn read_acceleration(&mut self, data: &mut SensorData) -> bool {
        self.read_field(data, Field::Acceleration)
    }

    pub fn read_gyroscope(&mut self, data: &mut SensorData) -> bool {
        self.read_field(data, Field::Gyroscope)
    }

    pub fn read_magnetic(&mut self, data: &mut SensorData) -> bool {
        self.read_field(data, Field::Magnetic)
    }

    /// Degrees Celsius, from the humidity sensor, or from the pressure sensor
    /// when the humidity sensor is unavailable.
    pub fn temperature(&mut self) -> Result<f32, Error> {
        self.bound()?.temperature()
    }

    pub fn humidity(&mut self) -> Result<f32, Error> {
        self.bound()?.humidity()
    }

    pub fn pressure(&mut self) -> Result<f32, Error> {
        self.bound()?.pressure()
    }

    pub fn magnetic(&mut self) -> Result<Axes, Error> {
        self.bound()?.magnetic()
    }

    pub fn acceleration(&mut self) -> Result<Axes, Error> {
        self.bound()?.acceleration()
    }

    pub fn gyroscope(&mut self) -> Result<Axes, Error> {
        self.bound()?.gyroscope()
    }

    /// Tear down every driver and hand the board back, together with the bus
    /// peripheral if one was claimed.
    pub fn release(self) -> (B, Option<B::Bus>) {
        let Self { board, binding } = self;
        let bus = match binding {
            Binding::Ready(bound) => Some(bound.release()),
            _ => None,
        };
        (board, bus)
    }

    fn read_field(&mut self, data: &mut SensorData, field: Field) -> bool {
        let flag = Fields::from(field);
        self.read_fields(data, flag).contains(flag)
    }

    fn bound(&mut self) -> Result<&mut Bound<B>, Error> {
        match &mut self.binding {
            Binding::Ready(bound) => Ok(bound),
            Binding::Uninitialized => Err(Error::NotInitialized),
            Binding::BusUnavailable => Err(Error::BusUnavailable),
        }
    }
}
