//! Headless capture: PNG screenshots of the display buffer.

use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::{FB_HEIGHT, FB_WIDTH};
use crate::frame::{Frame, rgba};
use crate::ppu::{Ppu, ScanlineDma};

/// Encode a 256x224 ARGB32 frame as an RGBA PNG.
///
/// # Errors
///
/// Returns an error if the pixel count is wrong or the encoder fails.
pub fn write_png<W: Write>(out: W, pixels: &[u32]) -> Result<(), Box<dyn Error>> {
    let expected = (FB_WIDTH * FB_HEIGHT) as usize;
    if pixels.len() != expected {
        return Err(format!("expected {expected} pixels, got {}", pixels.len()).into());
    }

    let mut encoder = png::Encoder::new(out, FB_WIDTH, FB_HEIGHT);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let data: Vec<u8> = pixels.iter().flat_map(|&p| rgba(p)).collect();
    writer.write_image_data(&data)?;
    Ok(())
}

/// Save the display buffer as a PNG file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(ppu: &Ppu, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    write_png(std::io::BufWriter::new(file), ppu.framebuffer())
}

/// Save a frame received from a [`FrameReceiver`](crate::FrameReceiver).
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    write_png(std::io::BufWriter::new(file), &frame.pixels)
}

/// Run `num_frames` frames and dump each one as `frames/NNNNNN.png`.
///
/// # Errors
///
/// Returns an error if frames cannot be saved.
pub fn record(
    ppu: &mut Ppu,
    dma: &mut dyn ScanlineDma,
    dir: &Path,
    num_frames: u32,
) -> Result<(), Box<dyn Error>> {
    let frames_dir = dir.join("frames");
    fs::create_dir_all(&frames_dir)?;

    let frame_ticks = ppu.config().timing.ticks_per_frame();
    let mut saved = 0;
    while saved < num_frames {
        ppu.advance(frame_ticks, dma);
        if ppu.take_frame_ready() {
            saved += 1;
            save_screenshot(ppu, &frames_dir.join(format!("{saved:06}.png")))?;
        }
    }

    log::info!("captured {num_frames} frames to {}", frames_dir.display());
    Ok(())
}
