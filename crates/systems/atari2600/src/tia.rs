//! TIA (Television Interface Adapter) - Video and audio chip for Atari 2600
//!
//! The TIA has no framebuffer; it generates video one scanline at a time from
//! its registers. Here a scanline is rendered in one pass from the register
//! values in effect when the line is emitted, and the two audio channels are
//! clocked twice per line.

use serde::{Deserialize, Serialize};
use vcs_core::apu::PolynomialCounter;

/// Visible pixels per scanline
pub const VISIBLE_WIDTH: usize = 160;

/// TIA chip state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tia {
    vsync: bool,
    vblank: bool,

    // Playfield
    pf0: u8,
    pf1: u8,
    pf2: u8,
    playfield_reflect: bool,
    playfield_score_mode: bool,
    playfield_priority: bool,
    ball_size: u8,

    // Colors (palette indices)
    colubk: u8,
    colupf: u8,
    colup0: u8,
    colup1: u8,

    // Players
    nusiz0: u8,
    nusiz1: u8,
    grp0: u8,
    grp1: u8,
    player0_x: u8,
    player1_x: u8,
    player0_reflect: bool,
    player1_reflect: bool,

    // Missiles
    enam0: bool,
    enam1: bool,
    missile0_x: u8,
    missile1_x: u8,

    // Ball
    enabl: bool,
    ball_x: u8,

    // Horizontal motion
    hmp0: i8,
    hmp1: i8,
    hmm0: i8,
    hmm1: i8,
    hmbl: i8,

    /// Scanline within the frame being generated
    scanline: u16,

    /// Trigger inputs latched for the frame (true = pressed)
    triggers: [bool; 2],

    channels: [PolynomialCounter; 2],
}

impl Default for Tia {
    fn default() -> Self {
        Self::new()
    }
}

impl Tia {
    pub fn new() -> Self {
        Self {
            vsync: false,
            vblank: false,
            pf0: 0,
            pf1: 0,
            pf2: 0,
            playfield_reflect: false,
            playfield_score_mode: false,
            playfield_priority: false,
            ball_size: 1,
            colubk: 0,
            colupf: 0,
            colup0: 0,
            colup1: 0,
            nusiz0: 0,
            nusiz1: 0,
            grp0: 0,
            grp1: 0,
            player0_x: 0,
            player1_x: 0,
            player0_reflect: false,
            player1_reflect: false,
            enam0: false,
            enam1: false,
            missile0_x: 0,
            missile1_x: 0,
            enabl: false,
            ball_x: 0,
            hmp0: 0,
            hmp1: 0,
            hmm0: 0,
            hmm1: 0,
            hmbl: 0,
            scanline: 0,
            triggers: [false; 2],
            channels: [PolynomialCounter::new(), PolynomialCounter::new()],
        }
    }

    /// Write to TIA register (address already masked to 0x00-0x3F)
    pub fn write(&mut self, addr: u8, val: u8) {
        match addr & 0x3F {
            0x00 => self.vsync = (val & 0x02) != 0,
            0x01 => self.vblank = (val & 0x02) != 0,
            // WSYNC/RSYNC: the beam is always at a line boundary here
            0x02 | 0x03 => {}

            0x04 => self.nusiz0 = val,
            0x05 => self.nusiz1 = val,
            0x06 => self.colup0 = val,
            0x07 => self.colup1 = val,
            0x08 => self.colupf = val,
            0x09 => self.colubk = val,

            0x0A => {
                self.playfield_reflect = (val & 0x01) != 0;
                self.playfield_score_mode = (val & 0x02) != 0;
                self.playfield_priority = (val & 0x04) != 0;
                self.ball_size = 1 << ((val >> 4) & 0x03);
            }

            0x0B => self.player0_reflect = (val & 0x08) != 0,
            0x0C => self.player1_reflect = (val & 0x08) != 0,

            0x0D => self.pf0 = val,
            0x0E => self.pf1 = val,
            0x0F => self.pf2 = val,

            // Position strobes land on the left edge of the line
            0x10 => self.player0_x = 0,
            0x11 => self.player1_x = 0,
            0x12 => self.missile0_x = 0,
            0x13 => self.missile1_x = 0,
            0x14 => self.ball_x = 0,

            0x15 => self.channels[0].set_control(val),
            0x16 => self.channels[1].set_control(val),
            0x17 => self.channels[0].set_frequency(val),
            0x18 => self.channels[1].set_frequency(val),
            0x19 => self.channels[0].set_volume(val),
            0x1A => self.channels[1].set_volume(val),

            0x1B => self.grp0 = val,
            0x1C => self.grp1 = val,

            0x1D => self.enam0 = (val & 0x02) != 0,
            0x1E => self.enam1 = (val & 0x02) != 0,
            0x1F => self.enabl = (val & 0x02) != 0,

            0x20 => self.hmp0 = (val as i8) >> 4,
            0x21 => self.hmp1 = (val as i8) >> 4,
            0x22 => self.hmm0 = (val as i8) >> 4,
            0x23 => self.hmm1 = (val as i8) >> 4,
            0x24 => self.hmbl = (val as i8) >> 4,

            // HMOVE
            0x2A => {
                self.player0_x = apply_motion(self.player0_x, self.hmp0);
                self.player1_x = apply_motion(self.player1_x, self.hmp1);
                self.missile0_x = apply_motion(self.missile0_x, self.hmm0);
                self.missile1_x = apply_motion(self.missile1_x, self.hmm1);
                self.ball_x = apply_motion(self.ball_x, self.hmbl);
            }

            // HMCLR
            0x2B => {
                self.hmp0 = 0;
                self.hmp1 = 0;
                self.hmm0 = 0;
                self.hmm1 = 0;
                self.hmbl = 0;
            }

            _ => {}
        }
    }

    /// Read from TIA register. Collision latches are not modelled and read 0.
    pub fn read(&self, addr: u8) -> u8 {
        match addr & 0x0F {
            // INPT4/INPT5: bit 7 low while the trigger is held
            0x0C => trigger_bit(self.triggers[0]),
            0x0D => trigger_bit(self.triggers[1]),
            _ => 0,
        }
    }

    /// Latch the joystick triggers for the coming frame.
    pub fn latch_triggers(&mut self, p0: bool, p1: bool) {
        self.triggers = [p0, p1];
    }

    /// Clock both audio channels by one audio tick.
    pub fn clock_audio(&mut self) -> [u8; 2] {
        [self.channels[0].clock(), self.channels[1].clock()]
    }

    /// Advance to the next scanline; returns true when the frame wrapped.
    pub fn advance_scanline(&mut self, lines_per_frame: u16) -> bool {
        self.scanline += 1;
        if self.scanline >= lines_per_frame {
            self.scanline = 0;
            true
        } else {
            false
        }
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn in_vblank(&self) -> bool {
        self.vblank || self.vsync
    }

    /// Check values that register writes can never produce.
    ///
    /// Saved state skips the write path, so a restored chip must be checked
    /// before it renders or clocks.
    pub fn validate(&self, lines_per_frame: u16) -> Result<(), String> {
        let positions = [
            ("player0_x", self.player0_x),
            ("player1_x", self.player1_x),
            ("missile0_x", self.missile0_x),
            ("missile1_x", self.missile1_x),
            ("ball_x", self.ball_x),
        ];
        for (name, x) in positions {
            if x as usize >= VISIBLE_WIDTH {
                return Err(format!("{} {} is off the line", name, x));
            }
        }
        if !matches!(self.ball_size, 1 | 2 | 4 | 8) {
            return Err(format!("ball size {}", self.ball_size));
        }
        if self.scanline >= lines_per_frame {
            return Err(format!(
                "scanline {} past a {}-line frame",
                self.scanline, lines_per_frame
            ));
        }
        if let Some(n) = self.channels.iter().position(|c| !c.is_valid()) {
            return Err(format!("audio channel {} out of range", n));
        }
        Ok(())
    }

    /// Render the current scanline into `line` (160 pixels).
    pub fn render_scanline(&self, line: &mut [u32], palette: &[u32; 128]) {
        let blank = palette[0];
        for (x, pixel) in line.iter_mut().take(VISIBLE_WIDTH).enumerate() {
            *pixel = if self.in_vblank() {
                blank
            } else {
                palette[(self.pixel_color(x) >> 1) as usize]
            };
        }
    }

    /// Color register value of the pixel at `x`
    fn pixel_color(&self, x: usize) -> u8 {
        let playfield = self.is_playfield_pixel(x);
        let ball = self.enabl && covers(self.ball_x, self.ball_size, x);
        let p0 = self.player_pixel(self.grp0, self.player0_x, self.player0_reflect, x)
            || (self.enam0 && covers(self.missile0_x, missile_size(self.nusiz0), x));
        let p1 = self.player_pixel(self.grp1, self.player1_x, self.player1_reflect, x)
            || (self.enam1 && covers(self.missile1_x, missile_size(self.nusiz1), x));

        let pf_color = if self.playfield_score_mode && !self.playfield_priority {
            if x < VISIBLE_WIDTH / 2 {
                self.colup0
            } else {
                self.colup1
            }
        } else {
            self.colupf
        };

        if self.playfield_priority && (playfield || ball) {
            return self.colupf;
        }
        if p0 {
            self.colup0
        } else if p1 {
            self.colup1
        } else if ball {
            self.colupf
        } else if playfield {
            pf_color
        } else {
            self.colubk
        }
    }

    fn player_pixel(&self, graphics: u8, pos: u8, reflect: bool, x: usize) -> bool {
        let dx = (x + VISIBLE_WIDTH - pos as usize) % VISIBLE_WIDTH;
        if dx >= 8 {
            return false;
        }
        let bit = if reflect { dx } else { 7 - dx };
        (graphics >> bit) & 1 != 0
    }

    /// Check if a pixel is part of the playfield
    fn is_playfield_pixel(&self, x: usize) -> bool {
        // Playfield is 40 bits wide (4 pixels each), mirrored or repeated
        let half = VISIBLE_WIDTH / 2;
        if x < half {
            self.get_playfield_bit(x / 4)
        } else {
            let bit_pos = (x - half) / 4;
            if self.playfield_reflect {
                self.get_playfield_bit(19 - bit_pos)
            } else {
                self.get_playfield_bit(bit_pos)
            }
        }
    }

    /// Get a single bit from the playfield
    fn get_playfield_bit(&self, bit: usize) -> bool {
        if bit < 4 {
            // PF0 bits 4-7
            (self.pf0 & (0x10 << bit)) != 0
        } else if bit < 12 {
            // PF1 bits 7-0
            (self.pf1 & (0x80 >> (bit - 4))) != 0
        } else if bit < 20 {
            // PF2 bits 0-7
            (self.pf2 & (0x01 << (bit - 12))) != 0
        } else {
            false
        }
    }
}

fn trigger_bit(pressed: bool) -> u8 {
    if pressed {
        0x00
    } else {
        0x80
    }
}

fn missile_size(nusiz: u8) -> u8 {
    1 << ((nusiz >> 4) & 0x03)
}

fn covers(pos: u8, size: u8, x: usize) -> bool {
    let dx = (x + VISIBLE_WIDTH - pos as usize) % VISIBLE_WIDTH;
    dx < size as usize
}

/// Positive motion values move left.
fn apply_motion(pos: u8, motion: i8) -> u8 {
    (pos as i16 - motion as i16).rem_euclid(VISIBLE_WIDTH as i16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_palette() -> [u32; 128] {
        let mut palette = [0u32; 128];
        for (i, entry) in palette.iter_mut().enumerate() {
            *entry = 0xFF00_0000 | i as u32;
        }
        palette
    }

    fn render(tia: &Tia) -> Vec<u32> {
        let mut line = vec![0u32; VISIBLE_WIDTH];
        tia.render_scanline(&mut line, &gray_palette());
        line
    }

    #[test]
    fn test_tia_vsync_vblank() {
        let mut tia = Tia::new();
        tia.write(0x00, 0x02);
        assert!(tia.in_vblank());
        tia.write(0x00, 0x00);
        assert!(!tia.in_vblank());
        tia.write(0x01, 0x02);
        assert!(tia.in_vblank());
    }

    #[test]
    fn test_background_fills_line() {
        let mut tia = Tia::new();
        tia.write(0x09, 0x84);
        let line = render(&tia);
        assert!(line.iter().all(|&p| p == 0xFF00_0000 | 0x42));
    }

    #[test]
    fn test_vblank_renders_black() {
        let mut tia = Tia::new();
        tia.write(0x09, 0x84);
        tia.write(0x01, 0x02);
        assert!(render(&tia).iter().all(|&p| p == 0xFF00_0000));
    }

    #[test]
    fn test_playfield_repeat_and_reflect() {
        let mut tia = Tia::new();
        tia.write(0x08, 0x0E); // COLUPF
        tia.write(0x0D, 0x10); // PF0 bit 4: leftmost playfield bit

        let line = render(&tia);
        let pf = 0xFF00_0000 | 0x07;
        assert_eq!(line[0], pf);
        assert_eq!(line[4], 0xFF00_0000);
        // Repeated copy starts the right half
        assert_eq!(line[80], pf);

        tia.write(0x0A, 0x01);
        let line = render(&tia);
        assert_eq!(line[80], 0xFF00_0000);
        assert_eq!(line[159], pf);
    }

    #[test]
    fn test_score_mode_uses_player_colors() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x02);
        tia.write(0x07, 0x04);
        tia.write(0x0D, 0xF0);
        tia.write(0x0A, 0x02);
        let line = render(&tia);
        assert_eq!(line[0], 0xFF00_0000 | 0x01);
        assert_eq!(line[80], 0xFF00_0000 | 0x02);
    }

    #[test]
    fn test_player_graphics_and_reflect() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x1E);
        tia.write(0x10, 0);
        tia.write(0x1B, 0x80);

        let line = render(&tia);
        assert_eq!(line[0], 0xFF00_0000 | 0x0F);
        assert_eq!(line[7], 0xFF00_0000);

        tia.write(0x0B, 0x08);
        let line = render(&tia);
        assert_eq!(line[0], 0xFF00_0000);
        assert_eq!(line[7], 0xFF00_0000 | 0x0F);
    }

    #[test]
    fn test_hmove_shifts_objects() {
        let mut tia = Tia::new();
        tia.write(0x11, 0);
        tia.write(0x21, 0xF0); // -1: move right one pixel
        tia.write(0x2A, 0);
        assert_eq!(tia.player1_x, 1);

        tia.write(0x21, 0x10); // +1: move left, wrapping
        tia.write(0x2A, 0);
        tia.write(0x2A, 0);
        assert_eq!(tia.player1_x, 159);

        tia.write(0x2B, 0);
        assert_eq!(tia.hmp1, 0);
    }

    #[test]
    fn test_playfield_priority() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x20);
        tia.write(0x08, 0x40);
        tia.write(0x1B, 0xFF);
        tia.write(0x0D, 0x10);

        assert_eq!(render(&tia)[0], 0xFF00_0000 | 0x10);
        tia.write(0x0A, 0x04);
        assert_eq!(render(&tia)[0], 0xFF00_0000 | 0x20);
    }

    #[test]
    fn test_ball_size() {
        let mut tia = Tia::new();
        tia.write(0x08, 0x0E);
        tia.write(0x0A, 0x20); // 4 pixels
        tia.write(0x14, 0);
        tia.write(0x1F, 0x02);
        let line = render(&tia);
        assert_eq!(line[3], 0xFF00_0000 | 0x07);
        assert_eq!(line[4], 0xFF00_0000);
    }

    #[test]
    fn test_trigger_inputs() {
        let mut tia = Tia::new();
        assert_eq!(tia.read(0x0C), 0x80);
        tia.latch_triggers(true, false);
        assert_eq!(tia.read(0x0C), 0x00);
        assert_eq!(tia.read(0x0D), 0x80);
    }

    #[test]
    fn test_audio_registers_drive_channels() {
        let mut tia = Tia::new();
        tia.write(0x15, 0x00); // constant
        tia.write(0x19, 0x0F);
        tia.write(0x1A, 0x00);
        tia.clock_audio();
        let [left, right] = tia.clock_audio();
        assert_eq!(left, 15);
        assert_eq!(right, 0);
    }

    #[test]
    fn test_validate_accepts_written_state() {
        let mut tia = Tia::new();
        for addr in 0x00..0x2C {
            tia.write(addr, 0xFF);
        }
        tia.write(0x2A, 0);
        assert_eq!(tia.validate(262), Ok(()));
    }

    #[test]
    fn test_validate_rejects_off_line_positions() {
        let mut tia = Tia::new();
        tia.player0_x = 200;
        assert!(tia.validate(262).is_err());

        let mut tia = Tia::new();
        tia.ball_x = VISIBLE_WIDTH as u8;
        assert!(tia.validate(262).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ball_size_and_scanline() {
        let mut tia = Tia::new();
        tia.ball_size = 3;
        assert!(tia.validate(262).is_err());

        let mut tia = Tia::new();
        tia.scanline = 300;
        assert!(tia.validate(262).is_err());
        assert_eq!(tia.validate(312), Ok(()));
    }

    #[test]
    fn test_scanline_wraps_at_frame_length() {
        let mut tia = Tia::new();
        for _ in 0..261 {
            assert!(!tia.advance_scanline(262));
        }
        assert!(tia.advance_scanline(262));
        assert_eq!(tia.scanline(), 0);
    }
}
