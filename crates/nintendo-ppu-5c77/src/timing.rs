//! Beam timing state machine.
//!
//! Master ticks accumulate and are consumed one dot at a time. Each dot may
//! produce edge events (H-blank start, frame ready, timed IRQ) which the
//! caller acts on; the machine itself does no rendering.
//!
//! ## Line layout (NTSC defaults)
//! - dots 0-21: H-blank (left border)
//! - dots 22-277: visible
//! - dots 278-340: H-blank
//!
//! ## Frame layout
//! - line 0: V-blank (pre-render)
//! - lines 1-224: visible
//! - lines 225-261: V-blank (225-311 on PAL)

use emu_core::Ticks;

use crate::config::VideoTiming;

/// Interrupt enables and timer targets owned by the CPU side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterruptConfig {
    pub nmi_enabled: bool,
    pub h_irq_enabled: bool,
    pub v_irq_enabled: bool,
    /// Horizontal IRQ target dot.
    pub htime: u16,
    /// Vertical IRQ target line.
    pub vtime: u16,
}

impl InterruptConfig {
    /// Whether the beam at `(h, v)` hits the armed IRQ target.
    ///
    /// With only H armed every line matches; with only V armed the target
    /// dot is 0.
    #[must_use]
    pub fn irq_matches(&self, h: u16, v: u16) -> bool {
        if !self.h_irq_enabled && !self.v_irq_enabled {
            return false;
        }
        let x = if self.h_irq_enabled { self.htime } else { 0 };
        let y = if self.v_irq_enabled { self.vtime } else { v };
        h == x && v == y
    }
}

/// Edges produced by one dot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DotEvents {
    /// H-blank began on this line.
    pub hblank_line: Option<u16>,
    /// V-blank began; the frame is complete.
    pub frame_ready: bool,
    /// Beam reached the timed IRQ target.
    pub irq: bool,
}

pub struct Timing {
    geometry: VideoTiming,
    h_counter: u16,
    v_counter: u16,
    accumulator: u64,
    in_hblank: bool,
    in_vblank: bool,
    frame_ready_guard: bool,
    latched_h: u16,
    latched_v: u16,
    latched: bool,
    /// OPHCT/OPVCT byte flip-flops: false = low byte next.
    ophct_high: bool,
    opvct_high: bool,
    interlace_field: bool,
}

impl Timing {
    #[must_use]
    pub fn new(geometry: VideoTiming) -> Self {
        Self {
            geometry,
            h_counter: 0,
            v_counter: 0,
            accumulator: 0,
            in_hblank: true,
            in_vblank: true,
            frame_ready_guard: false,
            latched_h: 0,
            latched_v: 0,
            latched: false,
            ophct_high: false,
            opvct_high: false,
            interlace_field: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.geometry);
    }

    #[must_use]
    pub fn geometry(&self) -> &VideoTiming {
        &self.geometry
    }

    /// Add elapsed master ticks to the accumulator.
    pub fn accumulate(&mut self, elapsed: Ticks) {
        self.accumulator = self.accumulator.saturating_add(elapsed.get());
    }

    /// Consume one dot if enough ticks have accumulated.
    pub fn step(&mut self, irq: &InterruptConfig) -> Option<DotEvents> {
        let per_dot = u64::from(self.geometry.ticks_per_dot);
        if self.accumulator < per_dot {
            return None;
        }
        self.accumulator -= per_dot;
        self.h_counter += 1;

        let g = &self.geometry;
        let mut events = DotEvents::default();

        if self.h_counter == g.first_active_dot {
            self.in_hblank = false;
        }
        if self.h_counter == g.hblank_start() {
            self.in_hblank = true;
            events.hblank_line = Some(self.v_counter);
        }
        if self.h_counter == g.dots_per_line() {
            self.h_counter = 0;
            self.v_counter += 1;

            if self.v_counter == g.first_active_line {
                self.in_vblank = false;
            }
            if self.v_counter == g.vblank_start() {
                self.in_vblank = true;
                if !self.frame_ready_guard {
                    self.frame_ready_guard = true;
                    events.frame_ready = true;
                }
            }
            if self.v_counter == g.lines_per_frame() {
                self.v_counter = 0;
                self.frame_ready_guard = false;
                self.interlace_field = !self.interlace_field;
            }
        }

        events.irq = irq.irq_matches(self.h_counter, self.v_counter);
        Some(events)
    }

    /// Copy the beam position into the latch (SLHV read).
    pub fn latch(&mut self) {
        self.latched_h = self.h_counter;
        self.latched_v = self.v_counter;
        self.latched = true;
    }

    /// STAT78 read: clear the latched flag and reset both byte flip-flops.
    pub fn acknowledge(&mut self) {
        self.latched = false;
        self.ophct_high = false;
        self.opvct_high = false;
    }

    /// OPHCT: low byte, then bit 8.
    pub fn read_latched_h(&mut self) -> u8 {
        let value = self.peek_latched_h();
        self.ophct_high = !self.ophct_high;
        value
    }

    /// OPVCT: low byte, then bit 8.
    pub fn read_latched_v(&mut self) -> u8 {
        let value = self.peek_latched_v();
        self.opvct_high = !self.opvct_high;
        value
    }

    #[must_use]
    pub fn peek_latched_h(&self) -> u8 {
        Self::counter_byte(self.latched_h, self.ophct_high)
    }

    #[must_use]
    pub fn peek_latched_v(&self) -> u8 {
        Self::counter_byte(self.latched_v, self.opvct_high)
    }

    fn counter_byte(value: u16, high: bool) -> u8 {
        if high {
            ((value >> 8) & 0x01) as u8
        } else {
            value as u8
        }
    }

    #[must_use]
    pub fn h_counter(&self) -> u16 {
        self.h_counter
    }

    #[must_use]
    pub fn v_counter(&self) -> u16 {
        self.v_counter
    }

    #[must_use]
    pub fn in_hblank(&self) -> bool {
        self.in_hblank
    }

    #[must_use]
    pub fn in_vblank(&self) -> bool {
        self.in_vblank
    }

    #[must_use]
    pub fn latched(&self) -> bool {
        self.latched
    }

    #[must_use]
    pub fn latched_h(&self) -> u16 {
        self.latched_h
    }

    #[must_use]
    pub fn latched_v(&self) -> u16 {
        self.latched_v
    }

    #[must_use]
    pub fn interlace_field(&self) -> bool {
        self.interlace_field
    }

    /// Ticks carried toward the next dot.
    #[must_use]
    pub fn pending_ticks(&self) -> Ticks {
        Ticks::new(self.accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VideoStandard;

    fn run(timing: &mut Timing, irq: &InterruptConfig, ticks: u64) -> Vec<DotEvents> {
        timing.accumulate(Ticks::new(ticks));
        std::iter::from_fn(|| timing.step(irq)).collect()
    }

    #[test]
    fn partial_dot_is_carried() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig::default();
        assert!(run(&mut t, &irq, 3).is_empty());
        assert_eq!(t.pending_ticks(), Ticks::new(3));
        assert_eq!(run(&mut t, &irq, 1).len(), 1);
        assert_eq!(t.h_counter(), 1);
        assert_eq!(t.pending_ticks(), Ticks::ZERO);
    }

    #[test]
    fn hblank_edges() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig::default();
        assert!(t.in_hblank());
        run(&mut t, &irq, 22 * 4);
        assert!(!t.in_hblank());
        let events = run(&mut t, &irq, 256 * 4);
        assert!(t.in_hblank());
        assert_eq!(events.last().and_then(|e| e.hblank_line), Some(0));
        assert_eq!(events.iter().filter(|e| e.hblank_line.is_some()).count(), 1);
    }

    #[test]
    fn line_wraps_after_341_dots() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig::default();
        run(&mut t, &irq, 340 * 4);
        assert_eq!(t.h_counter(), 340);
        assert_eq!(t.v_counter(), 0);
        run(&mut t, &irq, 4);
        assert_eq!(t.h_counter(), 0);
        assert_eq!(t.v_counter(), 1);
        assert!(!t.in_vblank());
    }

    #[test]
    fn frame_ready_once_per_frame() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig::default();
        let events = run(&mut t, &irq, 1364 * 262 * 2);
        let ready: Vec<_> = events.iter().filter(|e| e.frame_ready).collect();
        assert_eq!(ready.len(), 2);
        assert_eq!(t.v_counter(), 0);
        assert_eq!(t.h_counter(), 0);
    }

    #[test]
    fn vblank_starts_at_line_225() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig::default();
        run(&mut t, &irq, 1364 * 225 - 4);
        assert!(!t.in_vblank());
        let events = run(&mut t, &irq, 4);
        assert!(events[0].frame_ready);
        assert!(t.in_vblank());
        assert_eq!(t.v_counter(), 225);
    }

    #[test]
    fn interlace_field_toggles_on_wrap() {
        let mut t = Timing::new(VideoStandard::Pal.timing());
        let irq = InterruptConfig::default();
        assert!(!t.interlace_field());
        run(&mut t, &irq, 1364 * 312);
        assert!(t.interlace_field());
        run(&mut t, &irq, 1364 * 312);
        assert!(!t.interlace_field());
    }

    #[test]
    fn irq_target_matching() {
        let h_only = InterruptConfig {
            h_irq_enabled: true,
            htime: 100,
            ..InterruptConfig::default()
        };
        assert!(h_only.irq_matches(100, 0));
        assert!(h_only.irq_matches(100, 57));
        assert!(!h_only.irq_matches(99, 57));

        let v_only = InterruptConfig {
            v_irq_enabled: true,
            vtime: 30,
            ..InterruptConfig::default()
        };
        assert!(v_only.irq_matches(0, 30));
        assert!(!v_only.irq_matches(1, 30));

        let both = InterruptConfig {
            h_irq_enabled: true,
            v_irq_enabled: true,
            htime: 10,
            vtime: 20,
            ..InterruptConfig::default()
        };
        assert!(both.irq_matches(10, 20));
        assert!(!both.irq_matches(10, 21));

        assert!(!InterruptConfig::default().irq_matches(0, 0));
    }

    #[test]
    fn h_irq_fires_every_line() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig {
            h_irq_enabled: true,
            htime: 50,
            ..InterruptConfig::default()
        };
        let events = run(&mut t, &irq, 1364 * 10);
        assert_eq!(events.iter().filter(|e| e.irq).count(), 10);
    }

    #[test]
    fn latch_and_flip_flops() {
        let mut t = Timing::new(VideoStandard::Ntsc.timing());
        let irq = InterruptConfig::default();
        run(&mut t, &irq, 1364 * 260 + 300 * 4);
        t.latch();
        assert!(t.latched());
        assert_eq!(t.latched_h(), 300);
        assert_eq!(t.latched_v(), 260);

        assert_eq!(t.read_latched_h(), 300u16 as u8);
        assert_eq!(t.read_latched_h(), 1);
        assert_eq!(t.read_latched_v(), 260u16 as u8);

        t.acknowledge();
        assert!(!t.latched());
        // Flip-flop back to low byte.
        assert_eq!(t.read_latched_v(), 260u16 as u8);
    }
}
