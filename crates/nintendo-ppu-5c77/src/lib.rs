//! Nintendo S-PPU (5C77 + 5C78), the SNES picture processor.
//!
//! The PPU runs off the 21,477,272 Hz master crystal (21,281,370 Hz on PAL).
//! One dot is 4 master ticks; a line is 341 dots and a frame 262 lines (312
//! on PAL), of which 256x224 are visible.
//!
//! The host feeds elapsed master ticks to [`Ppu::advance`] and CPU register
//! traffic through [`emu_core::Bus`]. Finished frames land in the display
//! buffer ([`Ppu::framebuffer`]) and, optionally, in a [`frame_channel`] for
//! a display thread.

mod background;
#[cfg(feature = "capture")]
pub mod capture;
mod cgram;
mod config;
mod frame;
mod ppu;
mod registers;
mod render;
mod timing;
mod vram;

pub use background::{Background, ScreenSize, ScrollRegister, TilemapEntry};
pub use cgram::{CGRAM_ENTRIES, Cgram, expand5, rgb15_to_argb32};
pub use config::{ConfigError, FB_HEIGHT, FB_WIDTH, PpuConfig, VideoStandard, VideoTiming};
pub use frame::{Frame, FrameBuffers, FrameReceiver, FrameSender, frame_channel, rgba};
pub use ppu::{NoDma, Ppu, ScanlineDma};
pub use registers::{
    M7HOFS_EXT, M7VOFS_EXT, OPEN_BUS, ObjectSelect, ObjectSize, ReadRegister, WriteRegister,
};
pub use render::{Compositor, DisplayControl};
pub use timing::{DotEvents, InterruptConfig, Timing};
pub use vram::{Half, Increment, Remap, VRAM_BYTES, VRAM_WORDS, Vram};
