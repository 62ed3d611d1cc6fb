use crate::bsp::SensorBoard;
use crate::domain::SensorData;
use crate::sensors::{Error, Sensors};
use core::cell::RefCell;
use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};

/// An aggregator that can be reached from several tasks.
///
/// Every access goes through [`lock`](Self::lock), so at most one bus
/// transaction is ever in flight.
pub struct SharedSensors<M: RawMutex, B: SensorBoard> {
    sensors: Mutex<M, RefCell<Sensors<B>>>,
}

impl<M: RawMutex, B: SensorBoard> SharedSensors<M, B> {
    pub fn new(sensors: Sensors<B>) -> Self {
        Self {
            sensors: Mutex::new(RefCell::new(sensors)),
        }
    }

    /// Run `f` with exclusive access to the aggregator.
    ///
    /// Returns [`Error::Busy`] when called from within another `lock` closure.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Sensors<B>) -> R) -> Result<R, Error> {
        self.sensors.lock(|cell| {
            let mut sensors = cell.try_borrow_mut().map_err(|_| Error::Busy)?;
            Ok(f(&mut sensors))
        })
    }

    pub fn read_all(&self, data: &mut SensorData) -> bool {
        self.lock(|sensors| sensors.read_all(data)).unwrap_or(false)
    }

    pub fn into_inner(self) -> Sensors<B> {
        self.sensors.into_inner().into_inner()
    }
}
