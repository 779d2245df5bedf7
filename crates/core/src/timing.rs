//! Display format timing for the VCS video standards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown display format: {0}")]
pub struct UnknownFormatError(pub String);

/// Concrete video standard a console is running with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayFormat {
    #[default]
    Ntsc,
    Pal,
    Secam,
    /// NTSC colours with 50 Hz timing
    Ntsc50,
    /// PAL colours with 60 Hz timing
    Pal60,
    /// SECAM colours with 60 Hz timing
    Secam60,
}

impl DisplayFormat {
    /// Scanlines in one frame
    pub fn scanlines_per_frame(&self) -> u32 {
        if self.is_60hz() {
            262
        } else {
            312
        }
    }

    /// True for every 60 Hz (NTSC-timed) format.
    pub fn is_60hz(&self) -> bool {
        matches!(
            self,
            DisplayFormat::Ntsc | DisplayFormat::Pal60 | DisplayFormat::Secam60
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            DisplayFormat::Ntsc => "NTSC",
            DisplayFormat::Pal => "PAL",
            DisplayFormat::Secam => "SECAM",
            DisplayFormat::Ntsc50 => "NTSC50",
            DisplayFormat::Pal60 => "PAL60",
            DisplayFormat::Secam60 => "SECAM60",
        }
    }
}

impl std::str::FromStr for DisplayFormat {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NTSC" => Ok(DisplayFormat::Ntsc),
            "PAL" => Ok(DisplayFormat::Pal),
            "SECAM" => Ok(DisplayFormat::Secam),
            "NTSC50" => Ok(DisplayFormat::Ntsc50),
            "PAL60" => Ok(DisplayFormat::Pal60),
            "SECAM60" => Ok(DisplayFormat::Secam60),
            _ => Err(UnknownFormatError(s.to_string())),
        }
    }
}
