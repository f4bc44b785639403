//! Scanline compositor.
//!
//! Each visible line is composed in one go at the start of H-blank: the row
//! is filled with the backdrop, then every enabled background is drawn in
//! hardware back-to-front order of (layer, tile priority) passes. Later
//! passes overwrite earlier ones; colour 0 is transparent.

use crate::background::{Background, TilemapEntry};
use crate::cgram::Cgram;
use crate::config::FB_WIDTH;
use crate::vram::Vram;

const BLACK: u32 = 0xFF00_0000;

/// INIDISP/BGMODE/MOSAIC state that shapes the whole picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayControl {
    pub force_blank: bool,
    /// Master brightness, 0-15. Held for the host; the compositor writes
    /// converted colours unscaled.
    pub brightness: u8,
    /// Background mode, 0-7.
    pub bg_mode: u8,
    /// Mode 1 BG3 high-priority tiles on top of everything.
    pub bg3_priority: bool,
    /// Mosaic block size in pixels, 1-16.
    pub mosaic_size: u8,
}

impl Default for DisplayControl {
    /// Power-on state: forced blank, brightness 0.
    fn default() -> Self {
        Self {
            force_blank: true,
            brightness: 0,
            bg_mode: 0,
            bg3_priority: false,
            mosaic_size: 1,
        }
    }
}

/// One background draw pass: layer index and tile priority bit.
type Pass = (usize, bool);

const MODE0_PASSES: &[Pass] = &[
    (3, false),
    (2, false),
    (3, true),
    (2, true),
    (1, false),
    (0, false),
    (1, true),
    (0, true),
];

const MODE1_PASSES: &[Pass] = &[
    (2, false),
    (2, true),
    (1, false),
    (0, false),
    (1, true),
    (0, true),
];

const MODE1_BG3_PRIORITY_PASSES: &[Pass] = &[
    (2, false),
    (1, false),
    (0, false),
    (1, true),
    (0, true),
    (2, true),
];

const TWO_LAYER_PASSES: &[Pass] = &[(1, false), (0, false), (1, true), (0, true)];

/// Draw order for a mode, back to front.
#[must_use]
pub fn passes(mode: u8, bg3_priority: bool) -> &'static [Pass] {
    match mode {
        0 => MODE0_PASSES,
        1 if bg3_priority => MODE1_BG3_PRIORITY_PASSES,
        1 => MODE1_PASSES,
        2..=4 => TWO_LAYER_PASSES,
        // Hi-res and affine modes: backdrop only.
        _ => &[],
    }
}

/// Bits per pixel of `layer` in `mode`, or `None` if the layer is absent.
#[must_use]
pub fn bits_per_pixel(mode: u8, layer: usize) -> Option<u8> {
    match (mode, layer) {
        (0, 0..=3) | (1, 2) | (4, 1) => Some(2),
        (1 | 2, 0 | 1) | (3, 1) => Some(4),
        (3 | 4, 0) => Some(8),
        _ => None,
    }
}

/// Colour index from a tile pixel of `bpp` bits.
#[must_use]
pub fn palette_index(mode: u8, layer: usize, bpp: u8, group: u8, colour: u8) -> u8 {
    match bpp {
        2 => {
            let base = if mode == 0 { layer as u8 * 32 } else { 0 };
            base + group * 4 + colour
        }
        4 => group * 16 + colour,
        _ => colour,
    }
}

/// Colour bits of pixel `(fx, fy)` in tile `tile`.
///
/// Tiles are planar: each row holds two bytes (planes 0/1), with each
/// further plane pair 16 bytes on.
#[must_use]
pub fn tile_pixel(vram: &Vram, char_base: u16, tile: u16, bpp: u8, fx: u16, fy: u16) -> u8 {
    let tile_bytes = u32::from(bpp) * 8;
    let row = u32::from(char_base) * 2 + u32::from(tile) * tile_bytes + u32::from(fy) * 2;
    let bit = 7 - fx;
    let mut colour = 0;
    for pair in 0..u32::from(bpp / 2) {
        let addr = row + pair * 16;
        let lo = vram.byte((addr & 0xFFFF) as u16);
        let hi = vram.byte(((addr + 1) & 0xFFFF) as u16);
        colour |= ((lo >> bit) & 1) << (pair * 2);
        colour |= ((hi >> bit) & 1) << (pair * 2 + 1);
    }
    colour
}

/// Borrowed view of everything a line needs.
pub struct Compositor<'a> {
    pub vram: &'a Vram,
    pub cgram: &'a Cgram,
    pub backgrounds: &'a [Background; 4],
    pub control: &'a DisplayControl,
}

impl Compositor<'_> {
    /// Compose screen line `y` (0 = first visible line) into `row`.
    pub fn compose(&self, y: u16, row: &mut [u32]) {
        if self.control.force_blank {
            row.fill(BLACK);
            return;
        }
        row.fill(self.cgram.argb(0));

        let mode = self.control.bg_mode;
        for &(layer, priority) in passes(mode, self.control.bg3_priority) {
            let bg = &self.backgrounds[layer];
            if !bg.main_screen {
                continue;
            }
            if let Some(bpp) = bits_per_pixel(mode, layer) {
                self.draw_layer(layer, bpp, priority, y, row);
            }
        }
    }

    fn draw_layer(&self, layer: usize, bpp: u8, priority: bool, y: u16, row: &mut [u32]) {
        let bg = &self.backgrounds[layer];
        let mode = self.control.bg_mode;
        let mosaic = if bg.mosaic {
            u16::from(self.control.mosaic_size.max(1))
        } else {
            1
        };
        let (width_mask, height_mask) = bg.extent_mask();

        let line = y - y % mosaic;
        let py = line.wrapping_add(bg.vofs.value()) & height_mask;

        for (x, pixel) in (0..FB_WIDTH as u16).zip(row.iter_mut()) {
            let sx = x - x % mosaic;
            let px = sx.wrapping_add(bg.hofs.value()) & width_mask;

            let entry = TilemapEntry::from(self.vram.word(bg.tilemap_address(px / 8, py / 8)));
            if entry.priority != priority {
                continue;
            }

            let fx = if entry.h_flip { 7 - (px & 7) } else { px & 7 };
            let fy = if entry.v_flip { 7 - (py & 7) } else { py & 7 };
            let colour = tile_pixel(self.vram, bg.char_base, entry.tile, bpp, fx, fy);
            if colour == 0 {
                continue;
            }

            let index = palette_index(mode, layer, bpp, entry.palette, colour);
            *pixel = self.cgram.argb(index);
        }
    }
}
