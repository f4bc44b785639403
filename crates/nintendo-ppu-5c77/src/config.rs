//! Video standard descriptors and PPU configuration.
//!
//! Timings are table-driven: a [`VideoStandard`] expands into a
//! [`VideoTiming`] descriptor that the timing state machine runs against.
//! The descriptor is public so a host can inspect it, but anything that does
//! not fit the fixed 256x224 frame is rejected at construction.

use std::fmt;

use emu_core::{MasterClock, Ticks};

/// Framebuffer dimensions.
pub const FB_WIDTH: u32 = 256;
pub const FB_HEIGHT: u32 = 224;

/// Regional video standard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VideoStandard {
    /// 262 lines, 21,477,272 Hz master clock.
    #[default]
    Ntsc,
    /// 312 lines, 21,281,370 Hz master clock.
    Pal,
}

impl VideoStandard {
    #[must_use]
    pub const fn master_clock(self) -> MasterClock {
        match self {
            Self::Ntsc => MasterClock::new(21_477_272),
            Self::Pal => MasterClock::new(21_281_370),
        }
    }

    /// Timing descriptor for this standard.
    ///
    /// One dot is 4 master ticks; a line is 341 dots with the 256 visible
    /// dots starting at dot 22. Line 0 is blanked, lines 1-224 are visible.
    #[must_use]
    pub const fn timing(self) -> VideoTiming {
        let vblank_height = match self {
            Self::Ntsc => 37,
            Self::Pal => 87,
        };
        VideoTiming {
            ticks_per_dot: 4,
            first_active_dot: 22,
            active_width: 256,
            hblank_width: 63,
            first_active_line: 1,
            active_height: 224,
            vblank_height,
        }
    }

    #[must_use]
    pub const fn is_pal(self) -> bool {
        matches!(self, Self::Pal)
    }
}

/// Horizontal and vertical beam geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoTiming {
    /// Master ticks per dot.
    pub ticks_per_dot: u32,
    /// Dot at which H-blank ends.
    pub first_active_dot: u16,
    /// Visible dots per line.
    pub active_width: u16,
    /// Dots from the end of the visible area to the end of the line.
    pub hblank_width: u16,
    /// Line at which V-blank ends.
    pub first_active_line: u16,
    /// Visible lines per frame.
    pub active_height: u16,
    /// Lines from the end of the visible area to the end of the frame.
    pub vblank_height: u16,
}

impl VideoTiming {
    /// Dot at which H-blank starts (and the line is composited).
    #[must_use]
    pub const fn hblank_start(&self) -> u16 {
        self.first_active_dot + self.active_width
    }

    #[must_use]
    pub const fn dots_per_line(&self) -> u16 {
        self.hblank_start() + self.hblank_width
    }

    /// Line at which V-blank starts (and the frame is handed off).
    #[must_use]
    pub const fn vblank_start(&self) -> u16 {
        self.first_active_line + self.active_height
    }

    #[must_use]
    pub const fn lines_per_frame(&self) -> u16 {
        self.vblank_start() + self.vblank_height
    }

    #[must_use]
    pub fn ticks_per_line(&self) -> Ticks {
        Ticks::new(u64::from(self.ticks_per_dot)) * u64::from(self.dots_per_line())
    }

    #[must_use]
    pub fn ticks_per_frame(&self) -> Ticks {
        self.ticks_per_line() * u64::from(self.lines_per_frame())
    }

    /// Check the descriptor against the fixed frame geometry.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_dot == 0 {
            return Err(ConfigError::ZeroTicksPerDot);
        }
        if u32::from(self.active_width) != FB_WIDTH {
            return Err(ConfigError::ActiveWidth(self.active_width));
        }
        if self.active_height == 0 || u32::from(self.active_height) > FB_HEIGHT {
            return Err(ConfigError::ActiveHeight(self.active_height));
        }
        if self.hblank_width == 0 {
            return Err(ConfigError::ZeroHBlank);
        }
        if self.vblank_height == 0 {
            return Err(ConfigError::ZeroVBlank);
        }
        let dots = u32::from(self.first_active_dot)
            + u32::from(self.active_width)
            + u32::from(self.hblank_width);
        let lines = u32::from(self.first_active_line)
            + u32::from(self.active_height)
            + u32::from(self.vblank_height);
        if dots > u32::from(u16::MAX) || lines > u32::from(u16::MAX) {
            return Err(ConfigError::CounterOverflow { dots, lines });
        }
        Ok(())
    }
}

/// Invalid video timing descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTicksPerDot,
    ActiveWidth(u16),
    ActiveHeight(u16),
    ZeroHBlank,
    ZeroVBlank,
    CounterOverflow { dots: u32, lines: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTicksPerDot => write!(f, "ticks per dot must be non-zero"),
            Self::ActiveWidth(w) => {
                write!(f, "active width {w} does not match the {FB_WIDTH}-pixel frame")
            }
            Self::ActiveHeight(h) => {
                write!(f, "active height {h} must be between 1 and {FB_HEIGHT}")
            }
            Self::ZeroHBlank => write!(f, "H-blank width must be non-zero"),
            Self::ZeroVBlank => write!(f, "V-blank height must be non-zero"),
            Self::CounterOverflow { dots, lines } => write!(
                f,
                "{dots} dots x {lines} lines does not fit the 16-bit beam counters"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// PPU configuration.
///
/// With the `serde` feature a host can load this from its own settings
/// file; a missing `timing` falls back to the standard's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "PpuConfigRepr", into = "PpuConfigRepr"))]
pub struct PpuConfig {
    /// Region, reported in STAT78 bit 4.
    pub standard: VideoStandard,
    /// Beam geometry. Defaults to `standard.timing()`.
    pub timing: VideoTiming,
    /// 5C77 revision, reported in STAT77 bits 0-3.
    pub ppu1_version: u8,
    /// 5C78 revision, reported in STAT78 bits 0-3.
    pub ppu2_version: u8,
}

impl PpuConfig {
    #[must_use]
    pub const fn ntsc() -> Self {
        Self::for_standard(VideoStandard::Ntsc)
    }

    #[must_use]
    pub const fn pal() -> Self {
        Self::for_standard(VideoStandard::Pal)
    }

    const fn for_standard(standard: VideoStandard) -> Self {
        Self {
            standard,
            timing: standard.timing(),
            ppu1_version: 1,
            ppu2_version: 2,
        }
    }

    /// Frame rate implied by the master clock and the timing descriptor.
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        self.standard
            .master_clock()
            .frame_rate(self.timing.ticks_per_frame())
    }
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self::ntsc()
    }
}

impl From<VideoStandard> for PpuConfig {
    fn from(standard: VideoStandard) -> Self {
        Self::for_standard(standard)
    }
}

/// Serialized form of [`PpuConfig`]: every field but `standard` optional.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PpuConfigRepr {
    standard: VideoStandard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timing: Option<VideoTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ppu1_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ppu2_version: Option<u8>,
}

#[cfg(feature = "serde")]
impl From<PpuConfigRepr> for PpuConfig {
    fn from(repr: PpuConfigRepr) -> Self {
        let defaults = Self::for_standard(repr.standard);
        Self {
            standard: repr.standard,
            timing: repr.timing.unwrap_or(defaults.timing),
            ppu1_version: repr.ppu1_version.unwrap_or(defaults.ppu1_version),
            ppu2_version: repr.ppu2_version.unwrap_or(defaults.ppu2_version),
        }
    }
}

#[cfg(feature = "serde")]
impl From<PpuConfig> for PpuConfigRepr {
    fn from(config: PpuConfig) -> Self {
        let defaults = PpuConfig::for_standard(config.standard);
        Self {
            standard: config.standard,
            timing: (config.timing != defaults.timing).then_some(config.timing),
            ppu1_version: Some(config.ppu1_version),
            ppu2_version: Some(config.ppu2_version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_geometry() {
        let t = VideoStandard::Ntsc.timing();
        assert_eq!(t.hblank_start(), 278);
        assert_eq!(t.dots_per_line(), 341);
        assert_eq!(t.vblank_start(), 225);
        assert_eq!(t.lines_per_frame(), 262);
        assert_eq!(t.ticks_per_line(), Ticks::new(1364));
        assert_eq!(t.ticks_per_frame(), Ticks::new(1364 * 262));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn pal_has_longer_vblank() {
        let t = VideoStandard::Pal.timing();
        assert_eq!(t.lines_per_frame(), 312);
        assert!(t.validate().is_ok());
        assert!(VideoStandard::Pal.is_pal());
    }

    #[test]
    fn frame_rates() {
        assert!((PpuConfig::ntsc().frame_rate() - 60.1).abs() < 0.1);
        assert!((PpuConfig::pal().frame_rate() - 50.0).abs() < 0.1);
    }

    #[test]
    fn rejects_bad_descriptors() {
        let good = VideoStandard::Ntsc.timing();

        let t = VideoTiming {
            ticks_per_dot: 0,
            ..good
        };
        assert_eq!(t.validate(), Err(ConfigError::ZeroTicksPerDot));

        let t = VideoTiming {
            active_width: 255,
            ..good
        };
        assert_eq!(t.validate(), Err(ConfigError::ActiveWidth(255)));

        let t = VideoTiming {
            active_height: 239,
            ..good
        };
        assert_eq!(t.validate(), Err(ConfigError::ActiveHeight(239)));

        let t = VideoTiming {
            vblank_height: 0,
            ..good
        };
        assert_eq!(t.validate(), Err(ConfigError::ZeroVBlank));

        let t = VideoTiming {
            hblank_width: u16::MAX,
            ..good
        };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::CounterOverflow { .. })
        ));
    }

    #[test]
    fn error_messages_name_the_problem() {
        let msg = ConfigError::ActiveWidth(255).to_string();
        assert!(msg.contains("255"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_from_minimal_json() {
        let config: PpuConfig = serde_json::from_str(r#"{"standard":"pal"}"#).expect("parse");
        assert_eq!(config, PpuConfig::pal());

        let json = serde_json::to_string(&PpuConfig::ntsc()).expect("serialize");
        assert!(!json.contains("timing"));
        let back: PpuConfig = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, PpuConfig::ntsc());
    }
}
