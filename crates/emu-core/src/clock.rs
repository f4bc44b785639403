//! Master clock configuration.

use crate::Ticks;

/// Crystal driving a system. Every chip divides its work from this rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g. `21_477_272` for an NTSC console).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Frames per second produced by a frame of `ticks_per_frame` ticks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn frame_rate(&self, ticks_per_frame: Ticks) -> f64 {
        if ticks_per_frame == Ticks::ZERO {
            return 0.0;
        }
        self.frequency_hz as f64 / ticks_per_frame.get() as f64
    }
}
