//! Polynomial-counter tone generator for TIA-style audio channels.
//!
//! A TIA channel is driven by the ~31.4 kHz audio clock (two ticks per
//! scanline). AUDF divides that clock; every divided tick advances the
//! waveform generator selected by AUDC, and AUDV scales the resulting bit.

use serde::{Deserialize, Serialize};

/// One TIA audio channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialCounter {
    /// 4-bit LFSR
    poly4: u8,
    /// 5-bit LFSR
    poly5: u8,
    /// 9-bit LFSR (white noise)
    poly9: u16,
    /// Counts 0..31 for the div-31 waveforms
    div31: u8,
    /// Counts 0..3 for the div-3 prescaled waveforms (AUDC 12-15)
    div3: u8,
    /// Square-wave output for the pure tones
    tone: bool,
    /// Frequency divider position
    div: u8,
    /// Waveform output latched at the last divided tick
    output: bool,
    /// AUDC (0-15)
    control: u8,
    /// AUDF (0-31)
    frequency: u8,
    /// AUDV (0-15)
    volume: u8,
}

impl PolynomialCounter {
    pub fn new() -> Self {
        Self {
            poly4: 0x0F,
            poly5: 0x1F,
            poly9: 0x1FF,
            div31: 0,
            div3: 0,
            tone: false,
            div: 0,
            output: false,
            control: 0,
            frequency: 0,
            volume: 0,
        }
    }

    /// Advance one audio-clock tick and return the channel level (0-15).
    pub fn clock(&mut self) -> u8 {
        if self.div >= self.frequency {
            self.div = 0;
            self.step_waveform();
        } else {
            self.div += 1;
        }

        if self.output {
            self.volume
        } else {
            0
        }
    }

    fn step_waveform(&mut self) {
        let poly5_bit = self.poly5 & 1 != 0;
        self.poly5 = lfsr_step(self.poly5 as u16, 5, 2) as u8;
        self.poly9 = lfsr_step(self.poly9, 9, 4);
        self.div31 = (self.div31 + 1) % 31;

        let prescaled = matches!(self.control, 0x0C..=0x0F);
        if prescaled {
            self.div3 = (self.div3 + 1) % 3;
            if self.div3 != 0 {
                return;
            }
        }

        let clock_poly4 = match self.control {
            // Poly4 clocked only twice per div-31 cycle
            0x02 => self.div31 == 0 || self.div31 == 18,
            // Poly4 gated by poly5
            0x03 => poly5_bit,
            _ => true,
        };
        if clock_poly4 {
            self.poly4 = lfsr_step(self.poly4 as u16, 4, 1) as u8;
        }
        self.tone = !self.tone;

        self.output = match self.control {
            0x00 | 0x0B => true,
            0x01..=0x03 => self.poly4 & 1 != 0,
            0x04 | 0x05 | 0x0C | 0x0D => self.tone,
            0x06 | 0x0A | 0x0E => self.div31 < 18,
            0x07 | 0x09 | 0x0F => poly5_bit,
            0x08 => self.poly9 & 1 != 0,
            _ => false,
        };
    }

    /// True when every register and counter fits its hardware width.
    ///
    /// Deserialized channels bypass the masking setters; callers restoring
    /// saved state check this before clocking.
    pub fn is_valid(&self) -> bool {
        self.control <= 0x0F
            && self.frequency <= 0x1F
            && self.volume <= 0x0F
            && self.poly4 <= 0x0F
            && self.poly5 <= 0x1F
            && self.poly9 <= 0x1FF
            && self.div31 < 31
            && self.div3 < 3
    }

    pub fn set_control(&mut self, control: u8) {
        self.control = control & 0x0F;
    }

    pub fn set_frequency(&mut self, frequency: u8) {
        self.frequency = frequency & 0x1F;
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume & 0x0F;
    }
}

impl Default for PolynomialCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift right, feeding back bit0 XOR bit `tap` into the top bit.
fn lfsr_step(value: u16, width: u32, tap: u32) -> u16 {
    let feedback = (value ^ (value >> tap)) & 1;
    (value >> 1) | (feedback << (width - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_when_volume_zero() {
        let mut poly = PolynomialCounter::new();
        poly.set_control(0x04);
        poly.set_volume(0);
        assert!((0..200).all(|_| poly.clock() == 0));
    }

    #[test]
    fn constant_mode_outputs_volume() {
        let mut poly = PolynomialCounter::new();
        poly.set_control(0x00);
        poly.set_volume(9);
        poly.clock();
        assert!((0..50).all(|_| poly.clock() == 9));
    }

    #[test]
    fn pure_tone_period_follows_frequency() {
        let mut poly = PolynomialCounter::new();
        poly.set_control(0x04);
        poly.set_volume(15);
        poly.set_frequency(3);

        let samples: Vec<u8> = (0..64).map(|_| poly.clock()).collect();
        // Divider of 4 ticks, tone toggles every divided tick: period 8
        for i in 8..64 {
            assert_eq!(samples[i], samples[i - 8]);
        }
        assert!(samples.contains(&15));
        assert!(samples.contains(&0));
    }

    #[test]
    fn poly4_has_period_fifteen() {
        let mut value = 0x0F_u16;
        let start = value;
        let mut period = 0;
        loop {
            value = lfsr_step(value, 4, 1);
            period += 1;
            if value == start {
                break;
            }
        }
        assert_eq!(period, 15);
    }

    #[test]
    fn poly5_has_period_thirty_one() {
        let mut value = 0x1F_u16;
        let start = value;
        let mut period = 0;
        loop {
            value = lfsr_step(value, 5, 2);
            period += 1;
            if value == start {
                break;
            }
        }
        assert_eq!(period, 31);
    }

    #[test]
    fn output_never_exceeds_volume() {
        for control in 0..16 {
            let mut poly = PolynomialCounter::new();
            poly.set_control(control);
            poly.set_volume(7);
            assert!((0..500).all(|_| poly.clock() <= 7));
        }
    }

    #[test]
    fn setters_keep_registers_valid() {
        let mut poly = PolynomialCounter::new();
        poly.set_control(0xFF);
        poly.set_frequency(0xFF);
        poly.set_volume(0xFF);
        assert!(poly.is_valid());
        assert_eq!(poly.volume, 0x0F);
        for _ in 0..1000 {
            assert!(poly.clock() <= 0x0F);
        }
        assert!(poly.is_valid());
    }

    #[test]
    fn out_of_range_state_is_invalid() {
        let mut poly = PolynomialCounter::new();
        poly.volume = 16;
        assert!(!poly.is_valid());

        let mut poly = PolynomialCounter::new();
        poly.div31 = 200;
        assert!(!poly.is_valid());
    }
}
