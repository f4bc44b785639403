//! Register bus interface.

/// A device reachable through memory-mapped registers.
///
/// Addresses are `u32` so that a device can decode addresses outside the
/// 16-bit bank window (reserved extension registers, for example). Reads take
/// `&mut self` because many status registers clear flags or move cursors when
/// read.
pub trait Bus {
    /// Read a byte from the given register address.
    fn read(&mut self, address: u32) -> u8;

    /// Write a byte to the given register address.
    fn write(&mut self, address: u32, value: u8);

    /// Read a register without side effects.
    ///
    /// Returns `None` for addresses the device does not decode or cannot
    /// read without disturbing its state.
    fn peek(&self, _address: u32) -> Option<u8> {
        None
    }
}
