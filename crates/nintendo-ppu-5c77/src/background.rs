//! Background layer state: tilemap placement, character base, scroll.

/// A 13-bit scroll offset written as two sequential bytes.
///
/// Each write shifts the new byte into the high half and fills the low half
/// from the byte written before it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRegister {
    value: u16,
    prev: u8,
}

impl ScrollRegister {
    pub fn write(&mut self, byte: u8) {
        self.value = ((u16::from(byte) << 8) | u16::from(self.prev)) & 0x1FFF;
        self.prev = byte;
    }

    #[must_use]
    pub fn value(self) -> u16 {
        self.value
    }

    /// Last byte written, used for the next write's low half.
    #[must_use]
    pub fn prev(self) -> u8 {
        self.prev
    }
}

/// Tilemap arrangement in 32x32-entry screens.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSize {
    #[default]
    One,
    /// Two screens side by side (64x32 tiles).
    Wide,
    /// Two screens stacked (32x64 tiles).
    Tall,
    /// Four screens (64x64 tiles).
    Quad,
}

impl ScreenSize {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::One,
            1 => Self::Wide,
            2 => Self::Tall,
            _ => Self::Quad,
        }
    }

    /// Map extent in tiles, width then height.
    #[must_use]
    pub const fn tiles(self) -> (u16, u16) {
        match self {
            Self::One => (32, 32),
            Self::Wide => (64, 32),
            Self::Tall => (32, 64),
            Self::Quad => (64, 64),
        }
    }

    /// Screen number holding tile `(tx, ty)`, with both already wrapped.
    const fn screen(self, tx: u16, ty: u16) -> u16 {
        let right = tx >= 32;
        let below = ty >= 32;
        match self {
            Self::One => 0,
            Self::Wide => right as u16,
            Self::Tall => below as u16,
            Self::Quad => (right as u16) | ((below as u16) << 1),
        }
    }
}

/// One 16-bit tilemap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilemapEntry {
    pub tile: u16,
    pub palette: u8,
    pub priority: bool,
    pub h_flip: bool,
    pub v_flip: bool,
}

impl From<u16> for TilemapEntry {
    fn from(word: u16) -> Self {
        Self {
            tile: word & 0x03FF,
            palette: ((word >> 10) & 0x07) as u8,
            priority: word & 0x2000 != 0,
            h_flip: word & 0x4000 != 0,
            v_flip: word & 0x8000 != 0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    /// Tilemap base word address.
    pub tilemap_base: u16,
    /// Character data base word address.
    pub char_base: u16,
    pub screen_size: ScreenSize,
    /// BGMODE tile-size bit (16x16 tiles). Stored, not rendered.
    pub large_tiles: bool,
    pub hofs: ScrollRegister,
    pub vofs: ScrollRegister,
    /// TM enable bit.
    pub main_screen: bool,
    pub mosaic: bool,
}

impl Background {
    /// BGnSC.
    pub fn write_screen(&mut self, value: u8) {
        self.tilemap_base = u16::from(value & 0x7C) << 8;
        self.screen_size = ScreenSize::from_code(value);
    }

    /// One nibble of BG12NBA/BG34NBA.
    pub fn write_char_base(&mut self, nibble: u8) {
        self.char_base = u16::from(nibble & 0x07) << 12;
    }

    /// Pixel extent masks for the toroidal map, width then height.
    #[must_use]
    pub fn extent_mask(&self) -> (u16, u16) {
        let (w, h) = self.screen_size.tiles();
        (w * 8 - 1, h * 8 - 1)
    }

    /// Word address of the tilemap entry for tile `(tx, ty)`.
    #[must_use]
    pub fn tilemap_address(&self, tx: u16, ty: u16) -> u16 {
        let (w, h) = self.screen_size.tiles();
        let tx = tx & (w - 1);
        let ty = ty & (h - 1);
        let screen = self.screen_size.screen(tx, ty);
        self.tilemap_base
            .wrapping_add(screen * 0x400)
            .wrapping_add((ty & 31) * 32 + (tx & 31))
    }
}
