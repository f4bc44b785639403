//! Color table: 256 entries of 15-bit BGR.
//!
//! The CPU port is byte-wide. A write pair latches the low byte, then stores
//! the combined word on the high byte and advances. Reads share the same
//! phase flip-flop: even phase returns the low byte, odd phase returns the
//! high byte and advances.

/// Entries in the color table.
pub const CGRAM_ENTRIES: usize = 256;

/// Expand a 5-bit channel to 8 bits, replicating the top bits into the
/// bottom so 0 maps to 0 and 31 maps to 255.
#[must_use]
pub const fn expand5(v: u16) -> u32 {
    let v = (v & 0x1F) as u32;
    (v << 3) | (v >> 2)
}

/// Convert a 15-bit `0bbbbbgggggrrrrr` color to opaque ARGB32.
#[must_use]
pub const fn rgb15_to_argb32(color: u16) -> u32 {
    let r = expand5(color);
    let g = expand5(color >> 5);
    let b = expand5(color >> 10);
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

pub struct Cgram {
    colors: [u16; CGRAM_ENTRIES],
    address: u8,
    /// True after the first byte of a pair.
    high: bool,
    latch: u8,
}

impl Cgram {
    #[must_use]
    pub fn new() -> Self {
        Self {
            colors: [0; CGRAM_ENTRIES],
            address: 0,
            high: false,
            latch: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// CGADD. Also resets the byte phase.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
        self.high = false;
    }

    /// CGDATA.
    pub fn write(&mut self, value: u8) {
        if self.high {
            let word = (u16::from(value & 0x7F) << 8) | u16::from(self.latch);
            self.colors[usize::from(self.address)] = word;
            self.address = self.address.wrapping_add(1);
        } else {
            self.latch = value;
        }
        self.high = !self.high;
    }

    /// CGDATAREAD.
    pub fn read(&mut self) -> u8 {
        let value = self.peek();
        if self.high {
            self.address = self.address.wrapping_add(1);
        }
        self.high = !self.high;
        value
    }

    /// The byte the next read would return, without side effects.
    #[must_use]
    pub fn peek(&self) -> u8 {
        let word = self.colors[usize::from(self.address)];
        if self.high {
            (word >> 8) as u8
        } else {
            word as u8
        }
    }

    #[must_use]
    pub fn color(&self, index: u8) -> u16 {
        self.colors[usize::from(index)]
    }

    pub fn set_color(&mut self, index: u8, color: u16) {
        self.colors[usize::from(index)] = color & 0x7FFF;
    }

    /// Entry `index` as opaque ARGB32.
    #[must_use]
    pub fn argb(&self, index: u8) -> u32 {
        rgb15_to_argb32(self.color(index))
    }
}

impl Default for Cgram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_expansion_is_exact_at_extremes() {
        assert_eq!(expand5(0), 0);
        assert_eq!(expand5(31), 255);
        assert_eq!(expand5(16), 0x84);
    }

    #[test]
    fn argb_conversion() {
        assert_eq!(rgb15_to_argb32(0x0000), 0xFF00_0000);
        assert_eq!(rgb15_to_argb32(0x001F), 0xFFFF_0000);
        assert_eq!(rgb15_to_argb32(0x03E0), 0xFF00_FF00);
        assert_eq!(rgb15_to_argb32(0x7C00), 0xFF00_00FF);
        assert_eq!(rgb15_to_argb32(0x7FFF), 0xFFFF_FFFF);
    }

    #[test]
    fn pair_write_advances_once() {
        let mut cg = Cgram::new();
        cg.set_address(5);
        cg.write(0x34);
        assert_eq!(cg.address(), 5);
        assert_eq!(cg.color(5), 0);
        cg.write(0x12);
        assert_eq!(cg.address(), 6);
        assert_eq!(cg.color(5), 0x1234);
    }

    #[test]
    fn high_byte_bit_7_is_dropped() {
        let mut cg = Cgram::new();
        cg.write(0xFF);
        cg.write(0xFF);
        assert_eq!(cg.color(0), 0x7FFF);
    }

    #[test]
    fn write_then_read_returns_bytes_in_order() {
        let mut cg = Cgram::new();
        cg.set_address(0x40);
        cg.write(0xCD);
        cg.write(0x2B);
        cg.set_address(0x40);
        assert_eq!(cg.read(), 0xCD);
        assert_eq!(cg.address(), 0x40);
        assert_eq!(cg.read(), 0x2B);
        assert_eq!(cg.address(), 0x41);
    }

    #[test]
    fn address_wraps_after_last_entry() {
        let mut cg = Cgram::new();
        cg.set_address(0xFF);
        cg.write(0x01);
        cg.write(0x00);
        assert_eq!(cg.address(), 0x00);
        assert_eq!(cg.color(0xFF), 0x0001);
    }

    #[test]
    fn set_address_resets_phase() {
        let mut cg = Cgram::new();
        cg.write(0xAA);
        cg.set_address(3);
        cg.write(0x11);
        cg.write(0x22);
        assert_eq!(cg.color(3), 0x2211);
        assert_eq!(cg.color(0), 0);
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut cg = Cgram::new();
        cg.set_color(0, 0x1357);
        assert_eq!(cg.peek(), 0x57);
        assert_eq!(cg.peek(), 0x57);
        assert_eq!(cg.read(), 0x57);
        assert_eq!(cg.peek(), 0x13);
    }
}
