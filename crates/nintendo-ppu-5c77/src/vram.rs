//! Video memory: 64 KiB of tile and tilemap storage.
//!
//! The CPU reaches VRAM through a word-address cursor (VMADD), a data port
//! split into low and high halves (VMDATAL/VMDATAH) and a control register
//! (VMAIN) that selects the increment step, which half advances the cursor,
//! and an address remap used to transpose bitmap data on upload.
//!
//! Word `n` occupies bytes `2n` (low) and `2n + 1` (high). The store has 32K
//! words; bit 15 of a word address is not connected.

/// Words in VRAM.
pub const VRAM_WORDS: usize = 0x8000;

/// Bytes in VRAM.
pub const VRAM_BYTES: usize = VRAM_WORDS * 2;

const WORD_ADDRESS_MASK: u16 = 0x7FFF;

/// Which byte of a word an access targets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    #[default]
    Low,
    High,
}

/// Address remap applied to the cursor before each data-port access.
///
/// The three non-identity modes rotate a low field of the address left by
/// three bits and move that field's top three bits further up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Remap {
    #[default]
    Identity,
    /// Rotates the low 8 bits (VMAIN bits 2-3 = 1).
    Bits8,
    /// Rotates the low 9 bits (VMAIN bits 2-3 = 2).
    Bits9,
    /// Rotates the low 10 bits (VMAIN bits 2-3 = 3).
    Bits10,
}

impl Remap {
    /// Decode the 2-bit remap code from VMAIN bits 2-3.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::Identity,
            1 => Self::Bits8,
            2 => Self::Bits9,
            _ => Self::Bits10,
        }
    }

    /// Apply the remap to a 16-bit word address.
    ///
    /// Bits shifted beyond bit 15 are lost, as they are in the 16-bit
    /// address register.
    #[must_use]
    pub const fn apply(self, a: u16) -> u16 {
        match self {
            Self::Identity => a,
            Self::Bits8 => (a & 0xFF00) | ((a & 0x001F) << 3) | ((a & 0x00E0) << 5),
            Self::Bits9 => (a & 0xFE00) | ((a & 0x003F) << 3) | ((a & 0x01C0) << 6),
            Self::Bits10 => (a & 0xFC00) | ((a & 0x007F) << 3) | ((a & 0x0380) << 7),
        }
    }

    /// Number of low addresses over which the remap is one-to-one.
    ///
    /// For [`Remap::Bits10`] bit 9 lands on bit 16 and is lost, so the
    /// window is only 9 bits wide.
    #[must_use]
    pub const fn window(self) -> u32 {
        match self {
            Self::Identity => 0x1_0000,
            Self::Bits8 => 0x100,
            Self::Bits9 | Self::Bits10 => 0x200,
        }
    }
}

/// Cursor step after a triggering data-port access.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    #[default]
    By1,
    By32,
    By128,
}

impl Increment {
    /// Decode VMAIN bits 0-1. Codes 2 and 3 both step by 128.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::By1,
            1 => Self::By32,
            _ => Self::By128,
        }
    }

    #[must_use]
    pub const fn words(self) -> u16 {
        match self {
            Self::By1 => 1,
            Self::By32 => 32,
            Self::By128 => 128,
        }
    }
}

/// Video memory and its CPU-side access cursor.
pub struct Vram {
    mem: Box<[u8]>,
    address: u16,
    increment: Increment,
    trigger: Half,
    remap: Remap,
}

impl Vram {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mem: vec![0; VRAM_BYTES].into_boxed_slice(),
            address: 0,
            increment: Increment::By1,
            trigger: Half::Low,
            remap: Remap::Identity,
        }
    }

    /// Clear memory and the cursor.
    pub fn reset(&mut self) {
        self.mem.fill(0);
        self.address = 0;
        self.increment = Increment::By1;
        self.trigger = Half::Low;
        self.remap = Remap::Identity;
    }

    /// Set the cursor behaviour (VMAIN).
    pub fn configure(&mut self, trigger: Half, remap: Remap, increment: Increment) {
        self.trigger = trigger;
        self.remap = remap;
        self.increment = increment;
    }

    #[must_use]
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn set_address(&mut self, address: u16) {
        self.address = address;
    }

    /// VMADDL.
    pub fn set_address_low(&mut self, value: u8) {
        self.address = (self.address & 0xFF00) | u16::from(value);
    }

    /// VMADDH.
    pub fn set_address_high(&mut self, value: u8) {
        self.address = (self.address & 0x00FF) | (u16::from(value) << 8);
    }

    #[must_use]
    pub fn increment(&self) -> Increment {
        self.increment
    }

    #[must_use]
    pub fn trigger(&self) -> Half {
        self.trigger
    }

    #[must_use]
    pub fn remap(&self) -> Remap {
        self.remap
    }

    /// Data-port write into one half of the word under the (remapped) cursor.
    pub fn write(&mut self, half: Half, value: u8) {
        let index = self.cursor_index(half);
        self.mem[index] = value;
        self.step(half);
    }

    /// Data-port read from one half of the word under the (remapped) cursor.
    pub fn read(&mut self, half: Half) -> u8 {
        let value = self.mem[self.cursor_index(half)];
        self.step(half);
        value
    }

    /// Data-port read without moving the cursor.
    #[must_use]
    pub fn peek(&self, half: Half) -> u8 {
        self.mem[self.cursor_index(half)]
    }

    /// Word at a word address, bypassing the cursor.
    #[must_use]
    pub fn word(&self, address: u16) -> u16 {
        let lo = self.mem[Self::index(address, Half::Low)];
        let hi = self.mem[Self::index(address, Half::High)];
        u16::from(lo) | (u16::from(hi) << 8)
    }

    /// Byte at a byte address, bypassing the cursor.
    #[must_use]
    pub fn byte(&self, address: u16) -> u8 {
        self.mem[usize::from(address)]
    }

    /// Store a word at a word address, bypassing the cursor.
    pub fn set_word(&mut self, address: u16, value: u16) {
        self.mem[Self::index(address, Half::Low)] = value as u8;
        self.mem[Self::index(address, Half::High)] = (value >> 8) as u8;
    }

    fn cursor_index(&self, half: Half) -> usize {
        Self::index(self.remap.apply(self.address), half)
    }

    /// Byte index of one half of a word. The mask is the missing 16th address
    /// line, so every `u16` lands inside the store.
    fn index(word_address: u16, half: Half) -> usize {
        usize::from(word_address & WORD_ADDRESS_MASK) * 2 + usize::from(half == Half::High)
    }

    fn step(&mut self, half: Half) {
        if half == self.trigger {
            self.address = self.address.wrapping_add(self.increment.words());
        }
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}
