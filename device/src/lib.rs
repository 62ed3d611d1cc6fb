#![cfg_attr(not(feature = "std"), no_std)]
//! Unified sensor acquisition for battery powered IoT peripherals.
//!
//! The crate binds the environmental (temperature, humidity, pressure) and
//! motion (magnetometer, accelerometer, gyroscope) sensors of a board to one
//! shared I2C bus, and fills a single [`SensorData`] snapshot from them.
//!
//! Sensor drivers and the bus are external collaborators, consumed through the
//! [`traits::sensors`] contracts and [`embedded_hal::i2c::I2c`]. A board wires
//! them together by implementing [`SensorBoard`].
//!
//! # Fault isolation
//!
//! A sensor that fails to initialize is left out; the others still come up. A
//! read that fails leaves its field untouched and makes the call return `false`,
//! but every field that could be read is still written. Nothing is retried and
//! no failure is remembered across calls.
//!
//! # Example
//!
//! ```ignore
//! let mut sensors = Sensors::new(board);
//! let availability = sensors.init()?;
//!
//! let mut data = SensorData::new();
//! loop {
//!     if !sensors.read_all(&mut data) {
//!         // Some fields are stale, decide whether that matters.
//!     }
//!     // Tamper check: only the motion fields, no environmental reads.
//!     sensors.read_fields(&mut data, Fields::MOTION | Fields::MAGNETIC);
//! }
//! ```

pub(crate) mod fmt;

pub mod bsp;
pub use bsp::SensorBoard;

pub mod bus;

pub mod domain;
pub use domain::{Field, Fields, SensorData, SensorKind};

pub mod traits;

pub mod sensors;
pub use sensors::{Availability, Error, Sensors, State};

pub mod shared;
pub use shared::SharedSensors;

#[cfg(feature = "std")]
pub mod testutil;
