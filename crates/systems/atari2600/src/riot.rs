//! RIOT (6532) - RAM, I/O, and Timer chip for Atari 2600
//!
//! # Memory Map (system addresses)
//!
//! ```text
//! $80-$FF:   RAM (128 bytes, mirrored at $180-$1FF)
//! $280:      SWCHA (Port A data, joysticks)
//! $281:      SWACNT (Port A direction)
//! $282:      SWCHB (Port B data, console switches)
//! $283:      SWBCNT (Port B direction)
//! $284:      INTIM (Read timer)
//! $285:      TIMINT (Read timer status, clears the underflow flag)
//! $294-$297: TIM1T / TIM8T / TIM64T / T1024T
//! ```
//!
//! The 128 bytes of RAM are the window the host mirrors every frame.
//!
//! Port pins are active low. Host input is not applied directly; it is
//! staged in the engine and latched into the port input pins once per frame
//! with [`Riot::latch_inputs`].

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use vcs_core::RAM_WINDOW_SIZE;

mod serde_ram {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use vcs_core::RAM_WINDOW_SIZE;

    pub fn serialize<S>(arr: &[u8; RAM_WINDOW_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        arr.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; RAM_WINDOW_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let vec = Vec::<u8>::deserialize(deserializer)?;
        let len = vec.len();
        vec.try_into()
            .map_err(|_| D::Error::invalid_length(len, &"128 bytes of RIOT RAM"))
    }
}

mod serde_cell_bool {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::cell::Cell;

    pub fn serialize<S>(cell: &Cell<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        cell.get().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Cell<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(Cell::new)
    }
}

/// RIOT chip state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Riot {
    #[serde(with = "serde_ram")]
    ram: [u8; RAM_WINDOW_SIZE],

    /// Timer value (counts down to 0)
    timer: u8,

    /// Timer interval (1, 8, 64, or 1024)
    timer_interval: u16,

    /// Cycles until next timer decrement
    timer_cycles: u16,

    /// Cleared when TIMINT/INSTAT is read
    #[serde(with = "serde_cell_bool")]
    timer_underflow: Cell<bool>,

    swcha_ddr: u8,
    /// Port A output register
    swcha_out: u8,
    /// Port A input pins, latched from the joysticks
    swcha_in: u8,

    swchb_ddr: u8,
    swchb_out: u8,
    /// Port B input pins, latched from the console switches
    swchb_in: u8,
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Riot {
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_WINDOW_SIZE],
            timer: 0,
            timer_interval: 1,
            timer_cycles: 0,
            timer_underflow: Cell::new(false),
            swcha_ddr: 0,
            swcha_out: 0,
            swcha_in: 0xFF,
            swchb_ddr: 0,
            swchb_out: 0,
            // Color, both difficulties B, reset/select released
            swchb_in: 0x0B,
        }
    }

    /// Read from RIOT address space (system address, not masked)
    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0080..=0x00FF | 0x0180..=0x01FF => self.ram[(addr & 0x7F) as usize],

            // I/O and timer, mirrored every 32 bytes
            0x0280..=0x029F => match addr & 0x07 {
                0x00 => (self.swcha_in & !self.swcha_ddr) | (self.swcha_out & self.swcha_ddr),
                0x01 => self.swcha_ddr,
                0x02 => (self.swchb_in & !self.swchb_ddr) | (self.swchb_out & self.swchb_ddr),
                0x03 => self.swchb_ddr,
                0x04 | 0x06 => self.timer,
                _ => {
                    // TIMINT/INSTAT - reading clears the underflow flag
                    if self.timer_underflow.replace(false) {
                        0x80
                    } else {
                        0x00
                    }
                }
            },

            _ => 0,
        }
    }

    /// Write to RIOT address space (system address, not masked)
    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0x0080..=0x00FF | 0x0180..=0x01FF => self.ram[(addr & 0x7F) as usize] = val,

            0x0280..=0x029F => match addr & 0x1F {
                0x00 => self.swcha_out = val,
                0x01 => self.swcha_ddr = val,
                0x02 => self.swchb_out = val,
                0x03 => self.swchb_ddr = val,
                0x14 => self.start_timer(val, 1),
                0x15 => self.start_timer(val, 8),
                0x16 => self.start_timer(val, 64),
                0x17 => self.start_timer(val, 1024),
                _ => {}
            },

            _ => {}
        }
    }

    fn start_timer(&mut self, val: u8, interval: u16) {
        self.timer = val;
        self.timer_interval = interval;
        self.timer_cycles = 0;
        self.timer_underflow.set(false);
    }

    /// Clock the timer by `cycles` CPU cycles
    pub fn clock(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.timer_cycles += 1;
            if self.timer_cycles < self.timer_interval {
                continue;
            }
            self.timer_cycles = 0;

            if self.timer == 0 {
                // After underflow the timer keeps counting at 1 clock/decrement
                self.timer_underflow.set(true);
                self.timer_interval = 1;
                self.timer = 0xFF;
            } else {
                self.timer -= 1;
                if self.timer == 0 {
                    self.timer_underflow.set(true);
                    self.timer_interval = 1;
                }
            }
        }
    }

    /// Latch host input into the port input pins.
    pub fn latch_inputs(&mut self, swcha: u8, swchb: u8) {
        self.swcha_in = swcha;
        self.swchb_in = swchb;
    }

    pub fn ram(&self) -> &[u8; RAM_WINDOW_SIZE] {
        &self.ram
    }

    pub fn write_ram(&mut self, offset: usize, val: u8) {
        self.ram[offset % RAM_WINDOW_SIZE] = val;
    }

    /// Check the timer against the values TIMxT writes can set.
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.timer_interval, 1 | 8 | 64 | 1024) {
            return Err(format!("timer interval {}", self.timer_interval));
        }
        if self.timer_cycles >= self.timer_interval {
            return Err(format!(
                "timer at cycle {} of a {}-cycle interval",
                self.timer_cycles, self.timer_interval
            ));
        }
        Ok(())
    }
}
