//! Mock hardware that can be scripted from tests.
//!
//! A [`MockHardware`] is shared between the test, the [`MockBoard`], the
//! [`MockBus`] and every [`MockSensor`]. Tests script failures on it and
//! inspect what the aggregator did to the bus.

use crate::bsp::SensorBoard;
use crate::domain::temperature::{Celsius, Temperature};
use crate::domain::{SensorData, SensorKind};
use crate::traits::sensors::{
    Axes, HumiditySensor, MagnetometerSensor, MotionSensor, PressureSensor, SensorDriver,
};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use std::cell::RefCell;
use std::rc::Rc;

/// LIS2MDL
pub const MAGNETOMETER_ADDR: u8 = 0x1E;
/// HTS221
pub const HUMIDITY_ADDR: u8 = 0x5F;
/// LPS22HB
pub const PRESSURE_ADDR: u8 = 0x5C;
/// LSM6DSL
pub const MOTION_ADDR: u8 = 0x6A;

pub fn address_of(kind: SensorKind) -> u8 {
    match kind {
        SensorKind::Magnetometer => MAGNETOMETER_ADDR,
        SensorKind::Humidity => HUMIDITY_ADDR,
        SensorKind::Pressure => PRESSURE_ADDR,
        SensorKind::Motion => MOTION_ADDR,
    }
}

/// Something that was torn down, in the order it happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Teardown {
    Driver(SensorKind),
    Bus,
}

struct HardwareState {
    bus_claimable: bool,
    transactions: usize,
    initialized: Vec<SensorKind>,
    failing_init: Vec<SensorKind>,
    disconnected: Vec<u8>,
    glitches: Vec<u8>,
    readings: SensorData,
    pressure_temperature: f32,
    teardown: Vec<Teardown>,
}

/// Shared, scriptable state of a simulated board.
#[derive(Clone)]
pub struct MockHardware {
    state: Rc<RefCell<HardwareState>>,
}

impl MockHardware {
    /// Hardware whose sensors report `readings`.
    pub fn new(readings: SensorData) -> Self {
        Self {
            state: Rc::new(RefCell::new(HardwareState {
                bus_claimable: true,
                transactions: 0,
                initialized: Vec::new(),
                failing_init: Vec::new(),
                disconnected: Vec::new(),
                glitches: Vec::new(),
                readings,
                pressure_temperature: readings.temperature,
                teardown: Vec::new(),
            })),
        }
    }

    pub fn board(&self) -> MockBoard {
        MockBoard { hw: self.clone() }
    }

    pub fn set_readings(&self, readings: SensorData) {
        self.state.borrow_mut().readings = readings;
    }

    /// Temperature reported by the pressure chip's on-die sensor. Starts out
    /// equal to the humidity chip's.
    pub fn set_pressure_temperature(&self, temperature: f32) {
        self.state.borrow_mut().pressure_temperature = temperature;
    }

    /// The bus peripheral cannot be claimed.
    pub fn fail_bus_claim(&self) {
        self.state.borrow_mut().bus_claimable = false;
    }

    /// The driver rejects its configuration during initialization.
    pub fn fail_init(&self, kind: SensorKind) {
        self.state.borrow_mut().failing_init.push(kind);
    }

    /// The chip stops acknowledging its address until reconnected.
    pub fn disconnect(&self, kind: SensorKind) {
        self.state.borrow_mut().disconnected.push(address_of(kind));
    }

    pub fn reconnect(&self, kind: SensorKind) {
        let address = address_of(kind);
        self.state
            .borrow_mut()
            .disconnected
            .retain(|a| *a != address);
    }

    /// The next transaction addressed to the chip fails.
    pub fn glitch(&self, kind: SensorKind) {
        self.state.borrow_mut().glitches.push(address_of(kind));
    }

    /// Number of bus transactions attempted so far.
    pub fn transactions(&self) -> usize {
        self.state.borrow().transactions
    }

    /// Drivers that had `initialize` called, in call order.
    pub fn initialized(&self) -> Vec<SensorKind> {
        self.state.borrow().initialized.clone()
    }

    pub fn teardown(&self) -> Vec<Teardown> {
        self.state.borrow().teardown.clone()
    }

    fn readings(&self) -> SensorData {
        self.state.borrow().readings
    }

    fn pressure_temperature(&self) -> f32 {
        self.state.borrow().pressure_temperature
    }
}

/// I2C bus that answers every transaction with zeroes unless scripted
/// otherwise.
pub struct MockBus {
    hw: MockHardware,
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.hw.state.borrow_mut();
        state.transactions += 1;

        if state.disconnected.contains(&address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let glitch = state.glitches.iter().position(|a| *a == address);
        if let Some(pos) = glitch {
            state.glitches.remove(pos);
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }

        for operation in operations.iter_mut() {
            if let Operation::Read(buffer) = operation {
                buffer.fill(0);
            }
        }
        Ok(())
    }
}

impl Drop for MockBus {
    fn drop(&mut self) {
        self.hw.state.borrow_mut().teardown.push(Teardown::Bus);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    Bus(ErrorKind),
    Configuration,
}

impl From<ErrorKind> for MockError {
    fn from(e: ErrorKind) -> Self {
        MockError::Bus(e)
    }
}

const CTRL_REG1: u8 = 0x20;
const OUTPUT_REG: u8 = 0x28;

/// A driver for any of the four sensor kinds. Each read performs one bus
/// transaction with the chip, then reports the scripted value.
pub struct MockSensor {
    kind: SensorKind,
    address: u8,
    hw: MockHardware,
}

impl MockSensor {
    pub fn new(kind: SensorKind, hw: MockHardware) -> Self {
        Self {
            kind,
            address: address_of(kind),
            hw,
        }
    }

    fn sample<T>(
        &mut self,
        i2c: &mut MockBus,
        value: impl FnOnce(&SensorData) -> T,
    ) -> Result<T, MockError> {
        self.transfer(i2c)?;
        Ok(value(&self.hw.readings()))
    }

    fn transfer(&mut self, i2c: &mut MockBus) -> Result<(), MockError> {
        let mut buf = [0; 6];
        i2c.write_read(self.address, &[OUTPUT_REG], &mut buf)?;
        Ok(())
    }
}

impl Drop for MockSensor {
    fn drop(&mut self) {
        self.hw
            .state
            .borrow_mut()
            .teardown
            .push(Teardown::Driver(self.kind));
    }
}

impl SensorDriver<MockBus> for MockSensor {
    type Error = MockError;

    fn initialize(&mut self, i2c: &mut MockBus) -> Result<(), Self::Error> {
        self.hw.state.borrow_mut().initialized.push(self.kind);
        i2c.write(self.address, &[CTRL_REG1, 0x80])?;
        if self.hw.state.borrow().failing_init.contains(&self.kind) {
            return Err(MockError::Configuration);
        }
        Ok(())
    }
}

impl MagnetometerSensor<MockBus> for MockSensor {
    fn magnetic_field(&mut self, i2c: &mut MockBus) -> Result<Axes, Self::Error> {
        self.sample(i2c, |r| r.magnetic)
    }
}

impl HumiditySensor<MockBus> for MockSensor {
    fn temperature(&mut self, i2c: &mut MockBus) -> Result<Temperature<Celsius>, Self::Error> {
        self.sample(i2c, |r| Temperature::new(r.temperature))
    }

    fn relative_humidity(&mut self, i2c: &mut MockBus) -> Result<f32, Self::Error> {
        self.sample(i2c, |r| r.humidity)
    }
}

impl PressureSensor<MockBus> for MockSensor {
    fn pressure(&mut self, i2c: &mut MockBus) -> Result<f32, Self::Error> {
        self.sample(i2c, |r| r.pressure)
    }

    fn temperature(&mut self, i2c: &mut MockBus) -> Result<Temperature<Celsius>, Self::Error> {
        self.transfer(i2c)?;
        Ok(self.hw.pressure_temperature().into())
    }
}

impl MotionSensor<MockBus> for MockSensor {
    fn acceleration(&mut self, i2c: &mut MockBus) -> Result<Axes, Self::Error> {
        self.sample(i2c, |r| r.acceleration)
    }

    fn angular_rate(&mut self, i2c: &mut MockBus) -> Result<Axes, Self::Error> {
        self.sample(i2c, |r| r.gyroscope)
    }
}

/// A board wiring the four mock sensors to one [`MockBus`].
pub struct MockBoard {
    hw: MockHardware,
}

impl SensorBoard for MockBoard {
    type Bus = MockBus;
    type Magnetometer = MockSensor;
    type Humidity = MockSensor;
    type Pressure = MockSensor;
    type Motion = MockSensor;

    fn claim_bus(&mut self) -> Option<Self::Bus> {
        if self.hw.state.borrow().bus_claimable {
            Some(MockBus {
                hw: self.hw.clone(),
            })
        } else {
            None
        }
    }

    fn magnetometer(&mut self) -> Self::Magnetometer {
        MockSensor::new(SensorKind::Magnetometer, self.hw.clone())
    }

    fn humidity(&mut self) -> Self::Humidity {
        MockSensor::new(SensorKind::Humidity, self.hw.clone())
    }

    fn pressure(&mut self) -> Self::Pressure {
        MockSensor::new(SensorKind::Pressure, self.hw.clone())
    }

    fn motion(&mut self) -> Self::Motion {
        MockSensor::new(SensorKind::Motion, self.hw.clone())
    }
}
