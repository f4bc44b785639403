//! Register decode: $2100-$213F.
//!
//! Reads and writes decode through separate tables since most addresses are
//! one-directional. Anything outside the tables is open bus on read and
//! ignored on write.

use crate::ppu::Ppu;
use crate::vram::{Half, Increment, Remap};

/// Value returned for reads with no defined source.
pub const OPEN_BUS: u8 = 0x00;

/// Reserved extended-mode offset registers. Decoded and ignored.
pub const M7HOFS_EXT: u32 = 0x1_0001;
pub const M7VOFS_EXT: u32 = 0x1_0002;

/// Write-side register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRegister {
    /// $2100 display control.
    Inidisp,
    /// $2101 object size and base.
    Obsel,
    /// $2105 background mode.
    Bgmode,
    /// $2106 mosaic.
    Mosaic,
    /// $2107-$210A tilemap address and size, per layer.
    BgSc(usize),
    /// $210B BG1/BG2 character base.
    Bg12Nba,
    /// $210C BG3/BG4 character base.
    Bg34Nba,
    /// $210D/$210F/$2111/$2113 horizontal scroll, per layer.
    BgHofs(usize),
    /// $210E/$2110/$2112/$2114 vertical scroll, per layer.
    BgVofs(usize),
    /// $2115 VRAM port control.
    Vmain,
    Vmaddl,
    Vmaddh,
    Vmdatal,
    Vmdatah,
    /// $2121 CGRAM address.
    Cgadd,
    Cgdata,
    /// $212C main screen layer enables.
    Tm,
    M7HofsExt,
    M7VofsExt,
}

impl WriteRegister {
    #[must_use]
    pub const fn decode(address: u32) -> Option<Self> {
        Some(match address {
            0x2100 => Self::Inidisp,
            0x2101 => Self::Obsel,
            0x2105 => Self::Bgmode,
            0x2106 => Self::Mosaic,
            0x2107..=0x210A => Self::BgSc((address - 0x2107) as usize),
            0x210B => Self::Bg12Nba,
            0x210C => Self::Bg34Nba,
            0x210D | 0x210F | 0x2111 | 0x2113 => Self::BgHofs(((address - 0x210D) / 2) as usize),
            0x210E | 0x2110 | 0x2112 | 0x2114 => Self::BgVofs(((address - 0x210E) / 2) as usize),
            0x2115 => Self::Vmain,
            0x2116 => Self::Vmaddl,
            0x2117 => Self::Vmaddh,
            0x2118 => Self::Vmdatal,
            0x2119 => Self::Vmdatah,
            0x2121 => Self::Cgadd,
            0x2122 => Self::Cgdata,
            0x212C => Self::Tm,
            M7HOFS_EXT => Self::M7HofsExt,
            M7VOFS_EXT => Self::M7VofsExt,
            _ => return None,
        })
    }
}

/// Read-side register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadRegister {
    /// $2137 software latch for the beam counters.
    Slhv,
    Vmdatalread,
    Vmdatahread,
    Cgdataread,
    /// $213C latched H counter.
    Ophct,
    /// $213D latched V counter.
    Opvct,
    /// $213E PPU1 status.
    Stat77,
    /// $213F PPU2 status.
    Stat78,
}

impl ReadRegister {
    #[must_use]
    pub const fn decode(address: u32) -> Option<Self> {
        Some(match address {
            0x2137 => Self::Slhv,
            0x2139 => Self::Vmdatalread,
            0x213A => Self::Vmdatahread,
            0x213B => Self::Cgdataread,
            0x213C => Self::Ophct,
            0x213D => Self::Opvct,
            0x213E => Self::Stat77,
            0x213F => Self::Stat78,
            _ => return None,
        })
    }
}

/// OBSEL size pair, small then large.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSize {
    #[default]
    S8L16,
    S8L32,
    S8L64,
    S16L32,
    S16L64,
    S32L64,
    /// 16x32 small, 32x64 large.
    S16x32L32x64,
    /// 16x32 small, 32x32 large.
    S16x32L32,
}

impl ObjectSize {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => Self::S8L16,
            1 => Self::S8L32,
            2 => Self::S8L64,
            3 => Self::S16L32,
            4 => Self::S16L64,
            5 => Self::S32L64,
            6 => Self::S16x32L32x64,
            _ => Self::S16x32L32,
        }
    }

    /// (width, height) of the small and large sizes.
    #[must_use]
    pub const fn dimensions(self) -> ((u8, u8), (u8, u8)) {
        match self {
            Self::S8L16 => ((8, 8), (16, 16)),
            Self::S8L32 => ((8, 8), (32, 32)),
            Self::S8L64 => ((8, 8), (64, 64)),
            Self::S16L32 => ((16, 16), (32, 32)),
            Self::S16L64 => ((16, 16), (64, 64)),
            Self::S32L64 => ((32, 32), (64, 64)),
            Self::S16x32L32x64 => ((16, 32), (32, 64)),
            Self::S16x32L32 => ((16, 32), (32, 32)),
        }
    }
}

/// OBSEL, held for the sprite engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSelect {
    pub size: ObjectSize,
    /// Gap between the two name tables, in words.
    pub name_select: u16,
    /// Base word address of object tiles.
    pub name_base: u16,
}

impl From<u8> for ObjectSelect {
    fn from(value: u8) -> Self {
        Self {
            size: ObjectSize::from_code(value >> 5),
            name_select: (u16::from((value >> 3) & 0x03) + 1) << 12,
            name_base: u16::from(value & 0x07) << 13,
        }
    }
}

impl Ppu {
    pub(crate) fn write_register(&mut self, reg: WriteRegister, value: u8) {
        match reg {
            WriteRegister::Inidisp => {
                self.control.force_blank = value & 0x80 != 0;
                self.control.brightness = value & 0x0F;
            }
            WriteRegister::Obsel => self.object_select = ObjectSelect::from(value),
            WriteRegister::Bgmode => {
                self.control.bg_mode = value & 0x07;
                self.control.bg3_priority = value & 0x08 != 0;
                for (i, bg) in self.backgrounds.iter_mut().enumerate() {
                    bg.large_tiles = value & (0x10 << i) != 0;
                }
            }
            WriteRegister::Mosaic => {
                self.control.mosaic_size = (value >> 4) + 1;
                for (i, bg) in self.backgrounds.iter_mut().enumerate() {
                    bg.mosaic = value & (1 << i) != 0;
                }
            }
            WriteRegister::BgSc(n) => self.backgrounds[n].write_screen(value),
            WriteRegister::Bg12Nba => {
                self.backgrounds[0].write_char_base(value);
                self.backgrounds[1].write_char_base(value >> 4);
            }
            WriteRegister::Bg34Nba => {
                self.backgrounds[2].write_char_base(value);
                self.backgrounds[3].write_char_base(value >> 4);
            }
            WriteRegister::BgHofs(n) => self.backgrounds[n].hofs.write(value),
            WriteRegister::BgVofs(n) => self.backgrounds[n].vofs.write(value),
            WriteRegister::Vmain => {
                let trigger = if value & 0x80 != 0 {
                    Half::High
                } else {
                    Half::Low
                };
                self.vram.configure(
                    trigger,
                    Remap::from_code(value >> 2),
                    Increment::from_code(value),
                );
            }
            WriteRegister::Vmaddl => self.vram.set_address_low(value),
            WriteRegister::Vmaddh => self.vram.set_address_high(value),
            WriteRegister::Vmdatal => self.vram.write(Half::Low, value),
            WriteRegister::Vmdatah => self.vram.write(Half::High, value),
            WriteRegister::Cgadd => self.cgram.set_address(value),
            WriteRegister::Cgdata => self.cgram.write(value),
            WriteRegister::Tm => {
                for (i, bg) in self.backgrounds.iter_mut().enumerate() {
                    bg.main_screen = value & (1 << i) != 0;
                }
                self.objects_main_screen = value & 0x10 != 0;
            }
            WriteRegister::M7HofsExt | WriteRegister::M7VofsExt => {}
        }
    }

    pub(crate) fn read_register(&mut self, reg: ReadRegister) -> u8 {
        match reg {
            ReadRegister::Slhv => {
                self.timing.latch();
                OPEN_BUS
            }
            ReadRegister::Vmdatalread => self.vram.read(Half::Low),
            ReadRegister::Vmdatahread => self.vram.read(Half::High),
            ReadRegister::Cgdataread => self.cgram.read(),
            ReadRegister::Ophct => self.timing.read_latched_h(),
            ReadRegister::Opvct => self.timing.read_latched_v(),
            ReadRegister::Stat77 => self.stat77(),
            ReadRegister::Stat78 => {
                let value = self.stat78();
                self.timing.acknowledge();
                value
            }
        }
    }

    /// Side-effect-free view of a readable register.
    pub(crate) fn peek_register(&self, reg: ReadRegister) -> u8 {
        match reg {
            ReadRegister::Slhv => OPEN_BUS,
            ReadRegister::Vmdatalread => self.vram.peek(Half::Low),
            ReadRegister::Vmdatahread => self.vram.peek(Half::High),
            ReadRegister::Cgdataread => self.cgram.peek(),
            ReadRegister::Ophct => self.timing.peek_latched_h(),
            ReadRegister::Opvct => self.timing.peek_latched_v(),
            ReadRegister::Stat77 => self.stat77(),
            ReadRegister::Stat78 => self.stat78(),
        }
    }

    fn stat77(&self) -> u8 {
        let mut value = self.config.ppu1_version & 0x0F;
        if self.time_over {
            value |= 0x80;
        }
        if self.range_over {
            value |= 0x40;
        }
        value
    }

    fn stat78(&self) -> u8 {
        let mut value = self.config.ppu2_version & 0x0F;
        if self.timing.interlace_field() {
            value |= 0x80;
        }
        if self.timing.latched() {
            value |= 0x40;
        }
        if self.config.standard.is_pal() {
            value |= 0x10;
        }
        value
    }
}
