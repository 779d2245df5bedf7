//! Color palettes
//!
//! A TIA color register holds a 4-bit hue and a 3-bit luminance (bit 0 is
//! unused), giving 128 colors. NTSC and PAL tables are generated from the
//! hue phase in YIQ space; SECAM ignores hue and maps luminance to eight
//! fixed colors.

use vcs_core::logging::{log, LogCategory, LogLevel};
use vcs_core::DisplayFormat;

use crate::config::Palette;

pub type PaletteTable = [u32; 128];

const SECAM_COLORS: [u32; 8] = [
    0xFF000000, 0xFF2121FF, 0xFFF03C79, 0xFFFF50FF, 0xFF7FFF00, 0xFF7FFFFF, 0xFFFFFF3F,
    0xFFFFFFFF,
];

struct Tuning {
    /// Luminance of level 0
    black: f32,
    /// Luminance step per level
    step: f32,
    saturation: f32,
}

const STANDARD: Tuning = Tuning {
    black: 0.0,
    step: 0.13,
    saturation: 0.22,
};

const Z26: Tuning = Tuning {
    black: 0.04,
    step: 0.135,
    saturation: 0.28,
};

/// Build the 128-entry ARGB table for a palette and display format.
pub fn build(palette: Palette, format: DisplayFormat) -> PaletteTable {
    let tuning = match palette {
        Palette::Standard => &STANDARD,
        Palette::Z26 => &Z26,
        Palette::Custom => {
            log(LogCategory::Stubs, LogLevel::Info, || {
                "Custom palette files are not supported, using standard".to_string()
            });
            &STANDARD
        }
    };

    let mut table = [0u32; 128];
    for (index, entry) in table.iter_mut().enumerate() {
        let hue = (index >> 3) as u8;
        let lum = (index & 0x07) as u8;
        *entry = match format {
            DisplayFormat::Secam | DisplayFormat::Secam60 => SECAM_COLORS[lum as usize],
            DisplayFormat::Pal | DisplayFormat::Pal60 => pal_color(hue, lum, tuning),
            DisplayFormat::Ntsc | DisplayFormat::Ntsc50 => ntsc_color(hue, lum, tuning),
        };
    }
    table
}

fn ntsc_color(hue: u8, lum: u8, tuning: &Tuning) -> u32 {
    if hue == 0 {
        return yiq_to_argb(luma(lum, tuning), 0.0, 0.0);
    }
    let phase = (-15.0 + (hue - 1) as f32 * 25.0).to_radians();
    chroma(lum, phase, tuning)
}

fn pal_color(hue: u8, lum: u8, tuning: &Tuning) -> u32 {
    // Hues 0, 1, 14 and 15 carry no color burst on PAL
    if !(2..=13).contains(&hue) {
        return yiq_to_argb(luma(lum, tuning), 0.0, 0.0);
    }
    // Even and odd hues step around the color wheel in opposite directions
    let step = (hue / 2) as f32 * 30.0;
    let degrees = if hue % 2 == 0 { -15.0 + step } else { 165.0 - step };
    chroma(lum, degrees.to_radians(), tuning)
}

fn chroma(lum: u8, phase: f32, tuning: &Tuning) -> u32 {
    let i = tuning.saturation * phase.cos();
    let q = tuning.saturation * phase.sin();
    yiq_to_argb(luma(lum, tuning), i, q)
}

fn luma(lum: u8, tuning: &Tuning) -> f32 {
    tuning.black + lum as f32 * tuning.step
}

fn yiq_to_argb(y: f32, i: f32, q: f32) -> u32 {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    let r = to_byte(y + 0.956 * i + 0.621 * q);
    let g = to_byte(y - 0.272 * i - 0.647 * q);
    let b = to_byte(y - 1.106 * i + 1.703 * q);
    0xFF000000 | (r << 16) | (g << 8) | b
}
