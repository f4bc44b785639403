//! Frame buffers and the cross-thread frame hand-off.
//!
//! The compositor writes rows into a work buffer. At V-blank the work buffer
//! is copied into the display buffer, and a copy of that is pushed through a
//! lock-free single-producer/single-consumer ring for a display thread.
//! Spent frames travel back through a second ring so their allocations are
//! reused.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::config::{FB_HEIGHT, FB_WIDTH};

const PIXELS: usize = (FB_WIDTH * FB_HEIGHT) as usize;
const BLACK: u32 = 0xFF00_0000;

/// Split ARGB32 into RGBA bytes.
#[must_use]
pub fn rgba(pixel: u32) -> [u8; 4] {
    [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8, (pixel >> 24) as u8]
}

/// Work and display buffers, each 256x224 ARGB32.
pub struct FrameBuffers {
    work: Box<[u32]>,
    display: Box<[u32]>,
}

impl FrameBuffers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            work: vec![BLACK; PIXELS].into_boxed_slice(),
            display: vec![BLACK; PIXELS].into_boxed_slice(),
        }
    }

    /// Mutable row `y` of the work buffer.
    pub fn row_mut(&mut self, y: usize) -> &mut [u32] {
        let width = FB_WIDTH as usize;
        &mut self.work[y * width..(y + 1) * width]
    }

    #[must_use]
    pub fn work(&self) -> &[u32] {
        &self.work
    }

    #[must_use]
    pub fn display(&self) -> &[u32] {
        &self.display
    }

    /// Publish the work buffer to the display buffer.
    pub fn swap(&mut self) {
        self.display.copy_from_slice(&self.work);
    }

    pub fn clear(&mut self) {
        self.work.fill(BLACK);
        self.display.fill(BLACK);
    }
}

impl Default for FrameBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// A completed frame.
#[derive(Debug)]
pub struct Frame {
    /// Frame counter value at the swap that produced it.
    pub number: u64,
    /// ARGB32, row-major, `FB_WIDTH` x `FB_HEIGHT`.
    pub pixels: Box<[u32]>,
}

/// Create a frame hand-off holding up to `depth` undelivered frames.
#[must_use]
pub fn frame_channel(depth: usize) -> (FrameSender, FrameReceiver) {
    let depth = depth.max(1);
    let (frames_tx, frames_rx) = HeapRb::<Frame>::new(depth).split();
    let (spares_tx, spares_rx) = HeapRb::<Box<[u32]>>::new(depth + 2).split();
    (
        FrameSender {
            frames: frames_tx,
            spares: spares_rx,
            dropped: 0,
        },
        FrameReceiver {
            frames: frames_rx,
            spares: spares_tx,
        },
    )
}

/// Producer half, owned by the emulation thread.
pub struct FrameSender {
    frames: HeapProd<Frame>,
    spares: HeapCons<Box<[u32]>>,
    dropped: u64,
}

impl FrameSender {
    /// Push a copy of `pixels`. Returns false if the ring was full and the
    /// frame was dropped.
    pub fn publish(&mut self, number: u64, pixels: &[u32]) -> bool {
        if self.frames.is_full() {
            self.dropped += 1;
            log::trace!("frame {number} dropped, consumer is {} behind", self.frames.occupied_len());
            return false;
        }

        let mut buffer = match self.spares.try_pop() {
            Some(spare) if spare.len() == pixels.len() => spare,
            _ => vec![0; pixels.len()].into_boxed_slice(),
        };
        buffer.copy_from_slice(pixels);

        match self.frames.try_push(Frame {
            number,
            pixels: buffer,
        }) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Frames dropped because the consumer fell behind.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Consumer half, owned by the display thread.
pub struct FrameReceiver {
    frames: HeapCons<Frame>,
    spares: HeapProd<Box<[u32]>>,
}

impl FrameReceiver {
    /// Oldest undelivered frame.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.frames.try_pop()
    }

    /// Newest undelivered frame; older ones are recycled.
    pub fn latest(&mut self) -> Option<Frame> {
        let mut newest = None;
        while let Some(frame) = self.frames.try_pop() {
            if let Some(older) = newest.replace(frame) {
                self.recycle(older);
            }
        }
        newest
    }

    /// Hand a frame's allocation back to the producer.
    pub fn recycle(&mut self, frame: Frame) {
        // A full spare ring just frees the buffer.
        let _ = self.spares.try_push(frame.pixels);
    }

    /// Frames waiting to be received.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.frames.occupied_len()
    }
}
