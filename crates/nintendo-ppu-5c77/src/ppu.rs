//! S-PPU (5C77 + 5C78) core.
//!
//! The PPU is driven by elapsed master ticks. Rendering happens a line at a
//! time when the beam enters H-blank, and the finished frame is swapped to
//! the display buffer when the beam enters V-blank. The CPU talks to it
//! through [`Bus`] at $2100-$213F.

use emu_core::{Bus, Observable, Ticks, Value};

use crate::background::Background;
use crate::cgram::Cgram;
use crate::config::{ConfigError, FB_HEIGHT, PpuConfig};
use crate::frame::{FrameBuffers, FrameSender};
use crate::registers::{OPEN_BUS, ObjectSelect, ReadRegister, WriteRegister};
use crate::render::{Compositor, DisplayControl};
use crate::timing::{InterruptConfig, Timing};
use crate::vram::Vram;

/// Per-scanline DMA trigger, run at the start of H-blank on every line,
/// V-blank lines included.
pub trait ScanlineDma {
    fn run_scanline(&mut self, line: u16);
}

impl<F: FnMut(u16)> ScanlineDma for F {
    fn run_scanline(&mut self, line: u16) {
        self(line);
    }
}

/// A DMA hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDma;

impl ScanlineDma for NoDma {
    fn run_scanline(&mut self, _line: u16) {}
}

pub struct Ppu {
    pub(crate) config: PpuConfig,
    pub(crate) vram: Vram,
    pub(crate) cgram: Cgram,
    pub(crate) backgrounds: [Background; 4],
    pub(crate) control: DisplayControl,
    pub(crate) object_select: ObjectSelect,
    pub(crate) objects_main_screen: bool,
    pub(crate) timing: Timing,
    interrupts: InterruptConfig,
    frames: FrameBuffers,
    sender: Option<FrameSender>,
    frame_count: u64,
    frame_ready: bool,
    nmi_pending: bool,
    irq_pending: bool,
    /// STAT77 sprite overflow flags, set by the sprite engine.
    pub(crate) time_over: bool,
    pub(crate) range_over: bool,
}

impl Ppu {
    /// Build a PPU for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the timing descriptor does not fit the fixed
    /// 256x224 frame or the beam counters.
    pub fn new(config: PpuConfig) -> Result<Self, ConfigError> {
        config.timing.validate()?;
        log::debug!(
            "S-PPU {:?}: {} dots x {} lines, {} ticks/frame",
            config.standard,
            config.timing.dots_per_line(),
            config.timing.lines_per_frame(),
            config.timing.ticks_per_frame().get()
        );
        Ok(Self {
            config,
            vram: Vram::new(),
            cgram: Cgram::new(),
            backgrounds: [Background::default(); 4],
            control: DisplayControl::default(),
            object_select: ObjectSelect::default(),
            objects_main_screen: false,
            timing: Timing::new(config.timing),
            interrupts: InterruptConfig::default(),
            frames: FrameBuffers::new(),
            sender: None,
            frame_count: 0,
            frame_ready: false,
            nmi_pending: false,
            irq_pending: false,
            time_over: false,
            range_over: false,
        })
    }

    /// Return to power-on state. An attached frame sender stays attached.
    pub fn reset(&mut self) {
        log::debug!("S-PPU reset after {} frames", self.frame_count);
        self.vram.reset();
        self.cgram.reset();
        self.backgrounds = [Background::default(); 4];
        self.control = DisplayControl::default();
        self.object_select = ObjectSelect::default();
        self.objects_main_screen = false;
        self.timing.reset();
        self.interrupts = InterruptConfig::default();
        self.frames.clear();
        self.frame_count = 0;
        self.frame_ready = false;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.time_over = false;
        self.range_over = false;
    }

    /// Run the beam forward by `elapsed` master ticks.
    pub fn advance(&mut self, elapsed: Ticks, dma: &mut dyn ScanlineDma) {
        self.timing.accumulate(elapsed);
        while let Some(events) = self.timing.step(&self.interrupts) {
            if let Some(line) = events.hblank_line {
                self.hblank(line, dma);
            }
            if events.frame_ready {
                self.finish_frame();
            }
            if events.irq {
                self.irq_pending = true;
            }
        }
    }

    fn hblank(&mut self, line: u16, dma: &mut dyn ScanlineDma) {
        dma.run_scanline(line);
        let g = self.timing.geometry();
        let first = g.first_active_line;
        if line >= first && line < g.vblank_start() {
            let y = line - first;
            if u32::from(y) < FB_HEIGHT {
                self.render_line(y);
            }
        }
    }

    fn render_line(&mut self, y: u16) {
        let compositor = Compositor {
            vram: &self.vram,
            cgram: &self.cgram,
            backgrounds: &self.backgrounds,
            control: &self.control,
        };
        compositor.compose(y, self.frames.row_mut(usize::from(y)));
    }

    fn finish_frame(&mut self) {
        self.frames.swap();
        self.frame_count += 1;
        if let Some(sender) = &mut self.sender {
            sender.publish(self.frame_count, self.frames.display());
        }
        self.frame_ready = true;
        if self.interrupts.nmi_enabled {
            self.nmi_pending = true;
        }
    }

    /// Returns true once per completed frame.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Returns true once per NMI request.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Returns true once per timed IRQ.
    pub fn take_irq(&mut self) -> bool {
        std::mem::take(&mut self.irq_pending)
    }

    /// Update interrupt enables and targets (NMITIMEN/HTIME/VTIME).
    pub fn set_interrupts(&mut self, interrupts: InterruptConfig) {
        self.interrupts = interrupts;
    }

    #[must_use]
    pub fn interrupts(&self) -> &InterruptConfig {
        &self.interrupts
    }

    /// Latch the beam counters, as the external latch pin or SLHV does.
    pub fn latch_counters(&mut self) {
        self.timing.latch();
    }

    /// Send every completed frame to `sender`.
    pub fn attach_frame_sender(&mut self, sender: FrameSender) {
        self.sender = Some(sender);
    }

    pub fn detach_frame_sender(&mut self) -> Option<FrameSender> {
        self.sender.take()
    }

    #[must_use]
    pub fn frame_sender(&self) -> Option<&FrameSender> {
        self.sender.as_ref()
    }

    /// Report sprite overflow for STAT77.
    pub fn set_sprite_overflow(&mut self, time_over: bool, range_over: bool) {
        self.time_over = time_over;
        self.range_over = range_over;
    }

    /// Display buffer as of the last swap.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.frames.display()
    }

    /// Buffer the compositor is currently writing.
    #[must_use]
    pub fn work_buffer(&self) -> &[u32] {
        self.frames.work()
    }

    #[must_use]
    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn h_counter(&self) -> u16 {
        self.timing.h_counter()
    }

    #[must_use]
    pub fn v_counter(&self) -> u16 {
        self.timing.v_counter()
    }

    #[must_use]
    pub fn in_hblank(&self) -> bool {
        self.timing.in_hblank()
    }

    #[must_use]
    pub fn in_vblank(&self) -> bool {
        self.timing.in_vblank()
    }

    #[must_use]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    #[must_use]
    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    #[must_use]
    pub fn cgram(&self) -> &Cgram {
        &self.cgram
    }

    #[must_use]
    pub fn backgrounds(&self) -> &[Background; 4] {
        &self.backgrounds
    }

    #[must_use]
    pub fn display_control(&self) -> &DisplayControl {
        &self.control
    }

    /// OBSEL, for the sprite engine.
    #[must_use]
    pub fn object_select(&self) -> ObjectSelect {
        self.object_select
    }

    /// TM bit 4, for the sprite engine.
    #[must_use]
    pub fn objects_on_main_screen(&self) -> bool {
        self.objects_main_screen
    }

    fn query_background(&self, path: &str) -> Option<Value> {
        let (n, field) = path.split_once('.')?;
        let n: usize = n.parse().ok()?;
        let bg = self.backgrounds.get(n.checked_sub(1)?)?;
        match field {
            "tilemap_base" => Some(bg.tilemap_base.into()),
            "char_base" => Some(bg.char_base.into()),
            "hofs" => Some(bg.hofs.value().into()),
            "vofs" => Some(bg.vofs.value().into()),
            "main_screen" => Some(bg.main_screen.into()),
            "mosaic" => Some(bg.mosaic.into()),
            _ => None,
        }
    }
}

fn parse_address(s: &str) -> Option<u16> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = s.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

impl Bus for Ppu {
    fn read(&mut self, address: u32) -> u8 {
        if let Some(reg) = ReadRegister::decode(address) {
            self.read_register(reg)
        } else {
            log::trace!("S-PPU open-bus read at {address:#06X}");
            OPEN_BUS
        }
    }

    fn write(&mut self, address: u32, value: u8) {
        if let Some(reg) = WriteRegister::decode(address) {
            self.write_register(reg, value);
        } else {
            log::trace!("S-PPU ignored write {value:#04X} to {address:#06X}");
        }
    }

    fn peek(&self, address: u32) -> Option<u8> {
        ReadRegister::decode(address).map(|reg| self.peek_register(reg))
    }
}

impl Observable for Ppu {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("timing.") {
            let t = &self.timing;
            match rest {
                "h_counter" => Some(t.h_counter().into()),
                "v_counter" => Some(t.v_counter().into()),
                "in_hblank" => Some(t.in_hblank().into()),
                "in_vblank" => Some(t.in_vblank().into()),
                "latched" => Some(t.latched().into()),
                "latched_h" => Some(t.latched_h().into()),
                "latched_v" => Some(t.latched_v().into()),
                "interlace_field" => Some(t.interlace_field().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("display.") {
            let c = &self.control;
            match rest {
                "force_blank" => Some(c.force_blank.into()),
                "brightness" => Some(c.brightness.into()),
                "bg_mode" => Some(c.bg_mode.into()),
                "bg3_priority" => Some(c.bg3_priority.into()),
                "mosaic_size" => Some(c.mosaic_size.into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("vram.") {
            match rest {
                "address" => Some(self.vram.address().into()),
                _ => parse_address(rest).map(|a| self.vram.word(a).into()),
            }
        } else if let Some(rest) = path.strip_prefix("cgram.") {
            match rest {
                "address" => Some(self.cgram.address().into()),
                _ => parse_address(rest)
                    .and_then(|i| u8::try_from(i).ok())
                    .map(|i| self.cgram.color(i).into()),
            }
        } else if let Some(rest) = path.strip_prefix("bg") {
            self.query_background(rest)
        } else {
            match path {
                "frame_count" => Some(self.frame_count.into()),
                "frame_ready" => Some(self.frame_ready.into()),
                "nmi_pending" => Some(self.nmi_pending.into()),
                "irq_pending" => Some(self.irq_pending.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "timing.h_counter",
            "timing.v_counter",
            "timing.in_hblank",
            "timing.in_vblank",
            "timing.latched",
            "timing.latched_h",
            "timing.latched_v",
            "timing.interlace_field",
            "display.force_blank",
            "display.brightness",
            "display.bg_mode",
            "display.bg3_priority",
            "display.mosaic_size",
            "vram.address",
            "vram.<address>",
            "cgram.address",
            "cgram.<index>",
            "bg<n>.tilemap_base",
            "bg<n>.char_base",
            "bg<n>.hofs",
            "bg<n>.vofs",
            "bg<n>.main_screen",
            "bg<n>.mosaic",
            "frame_count",
            "frame_ready",
            "nmi_pending",
            "irq_pending",
        ]
    }
}
