//! Session configuration
//!
//! Host-side options are tagged enums. Frontends that expose options by
//! index map them with the `from_index` constructors; an unknown index yields
//! `None` and the caller keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vcs_core::logging::{log, LogCategory, LogLevel};
use vcs_core::DisplayFormat;

/// Requested console format; `Auto` defers to the engine's detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsoleFormat {
    #[default]
    Auto,
    Ntsc,
    Pal,
    Secam,
    Ntsc50,
    Pal60,
    Secam60,
}

impl ConsoleFormat {
    pub fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => ConsoleFormat::Auto,
            1 => ConsoleFormat::Ntsc,
            2 => ConsoleFormat::Pal,
            3 => ConsoleFormat::Secam,
            4 => ConsoleFormat::Ntsc50,
            5 => ConsoleFormat::Pal60,
            6 => ConsoleFormat::Secam60,
            _ => return None,
        })
    }

    /// Concrete format, using `detected` for `Auto`.
    pub fn resolve(self, detected: DisplayFormat) -> DisplayFormat {
        match self {
            ConsoleFormat::Auto => detected,
            ConsoleFormat::Ntsc => DisplayFormat::Ntsc,
            ConsoleFormat::Pal => DisplayFormat::Pal,
            ConsoleFormat::Secam => DisplayFormat::Secam,
            ConsoleFormat::Ntsc50 => DisplayFormat::Ntsc50,
            ConsoleFormat::Pal60 => DisplayFormat::Pal60,
            ConsoleFormat::Secam60 => DisplayFormat::Secam60,
        }
    }
}

impl From<DisplayFormat> for ConsoleFormat {
    fn from(format: DisplayFormat) -> Self {
        match format {
            DisplayFormat::Ntsc => ConsoleFormat::Ntsc,
            DisplayFormat::Pal => ConsoleFormat::Pal,
            DisplayFormat::Secam => ConsoleFormat::Secam,
            DisplayFormat::Ntsc50 => ConsoleFormat::Ntsc50,
            DisplayFormat::Pal60 => ConsoleFormat::Pal60,
            DisplayFormat::Secam60 => ConsoleFormat::Secam60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    #[default]
    Standard,
    Z26,
    Custom,
}

impl Palette {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Palette::Standard),
            1 => Some(Palette::Z26),
            2 => Some(Palette::Custom),
            _ => None,
        }
    }
}

/// TV signal filter. Any setting other than `Off` renders square pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoFilter {
    #[default]
    Off,
    Composite,
    SVideo,
    Rgb,
    Bad,
    Custom,
}

impl VideoFilter {
    pub fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => VideoFilter::Off,
            1 => VideoFilter::Composite,
            2 => VideoFilter::SVideo,
            3 => VideoFilter::Rgb,
            4 => VideoFilter::Bad,
            5 => VideoFilter::Custom,
            _ => return None,
        })
    }

    pub fn is_enabled(self) -> bool {
        self != VideoFilter::Off
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phosphor {
    #[default]
    ByRom,
    Never,
    Always,
}

impl Phosphor {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Phosphor::ByRom),
            1 => Some(Phosphor::Never),
            2 => Some(Phosphor::Always),
            _ => None,
        }
    }

    /// Whether blending is on, given the ROM's own preference.
    pub fn enabled(self, rom_default: bool) -> bool {
        match self {
            Phosphor::ByRom => rom_default,
            Phosphor::Never => false,
            Phosphor::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StereoMode {
    #[default]
    ByRom,
    Mono,
    Stereo,
}

impl StereoMode {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(StereoMode::ByRom),
            1 => Some(StereoMode::Mono),
            2 => Some(StereoMode::Stereo),
            _ => None,
        }
    }

    pub fn is_stereo(self, rom_default: bool) -> bool {
        match self {
            StereoMode::ByRom => rom_default,
            StereoMode::Mono => false,
            StereoMode::Stereo => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub format: ConsoleFormat,
    pub palette: Palette,
    pub filter: VideoFilter,
    pub phosphor: Phosphor,
    /// Percentage of the previous frame kept by phosphor blending
    pub phosphor_blend: u8,
    pub stereo: StereoMode,
    /// Rate the host plays audio at. Informational: the engine always
    /// generates samples at [`crate::AUDIO_SAMPLE_RATE`] and warns on a mismatch.
    pub sample_rate: u32,
    /// Stereo sample frames per audio fragment
    pub audio_fragment_size: usize,
    /// Fragments the engine queue holds before dropping the oldest samples
    pub audio_buffer_fragments: usize,
    /// Capacity, in i16 samples, of the per-frame host audio buffer
    pub audio_buffer_capacity: usize,
    /// Pixel aspect override in percent, 0 = derived from the color clock
    pub aspect_ntsc: u32,
    pub aspect_pal: u32,
    /// Explicit bankswitch token; "AUTO" infers from the file name
    pub bankswitch: String,
    pub logging: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: ConsoleFormat::Auto,
            palette: Palette::Standard,
            filter: VideoFilter::Off,
            phosphor: Phosphor::ByRom,
            phosphor_blend: 60,
            stereo: StereoMode::ByRom,
            sample_rate: crate::AUDIO_SAMPLE_RATE,
            audio_fragment_size: 128,
            audio_buffer_fragments: 8,
            audio_buffer_capacity: 4096,
            aspect_ntsc: 0,
            aspect_pal: 0,
            bankswitch: "AUTO".to_string(),
            logging: false,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a config file, falling back to defaults when it is missing or invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log(LogCategory::Session, LogLevel::Warn, || {
                        format!(
                            "Failed to parse {}: {}. Using defaults.",
                            path.display(),
                            e
                        )
                    });
                    Self::default()
                }
            },
            Err(e) => {
                log(LogCategory::Session, LogLevel::Warn, || {
                    format!("Cannot read {}: {}. Using defaults.", path.display(), e)
                });
                Self::default()
            }
        }
    }

    /// Host audio buffer length: an even number of samples, at least one frame.
    pub fn audio_capacity(&self) -> usize {
        (self.audio_buffer_capacity & !1).max(2)
    }

    /// Engine-side queue bound in i16 samples (stereo frames x 2).
    pub fn audio_queue_samples(&self) -> usize {
        (self.audio_fragment_size * self.audio_buffer_fragments * 2).max(2)
    }
}
