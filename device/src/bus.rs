//! The shared I2C channel every sensor driver multiplexes over.

use embedded_hal::i2c::I2c;

/// Owns the claimed bus peripheral.
///
/// Drivers are handed `&mut I` for the duration of a single operation, which
/// keeps every transaction on the bus serialized.
pub struct BusHandle<I: I2c> {
    i2c: I,
}

impl<I: I2c> BusHandle<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Borrow the channel for one driver operation.
    pub fn bind(&mut self) -> &mut I {
        &mut self.i2c
    }

    /// Give the peripheral back to the board.
    pub fn release(self) -> I {
        self.i2c
    }
}
