//! Atari 2600 memory bus
//!
//! The 6507 has a 13-bit address bus (8KB addressable space):
//! $0000-$002C: TIA write registers
//! $0030-$003F: TIA read registers (collision detection, input)
//! $0080-$00FF: RIOT RAM (128 bytes)
//! $0280-$0297: RIOT I/O and timer registers
//! $1000-$1FFF: Cartridge ROM (4KB, may be banked)
//!
//! With no CPU modelled, the bus is driven by host pokes and the engine's
//! per-scanline clock.

use serde::{Deserialize, Serialize};

use crate::cartridge::{Cartridge, CartridgeError, CartridgeState};
use crate::riot::Riot;
use crate::tia::Tia;

/// Serializable bus contents; the ROM image is left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusState {
    pub tia: Tia,
    pub riot: Riot,
    pub cartridge: CartridgeState,
}

/// Atari 2600 memory bus
#[derive(Debug, Clone)]
pub struct Atari2600Bus {
    pub tia: Tia,
    pub riot: Riot,
    pub cartridge: Cartridge,
}

impl Atari2600Bus {
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            tia: Tia::new(),
            riot: Riot::new(),
            cartridge,
        }
    }

    /// Clock the RIOT timer by `cycles` CPU cycles
    pub fn clock(&mut self, cycles: u32) {
        self.riot.clock(cycles);
    }

    pub fn read(&self, addr: u16) -> u8 {
        let addr = addr & 0x1FFF;

        match addr {
            // TIA write-only registers read as 0
            0x0000..=0x002F | 0x0100..=0x012F => 0,
            0x0030..=0x003F | 0x0130..=0x013F => self.tia.read((addr & 0x0F) as u8),

            // TIA mirrors: RAM is only selected with A7 set
            0x0040..=0x007F | 0x0140..=0x017F => self.tia.read((addr & 0x0F) as u8),
            0x0080..=0x00FF | 0x0180..=0x01FF => self.riot.read(addr),

            0x0200..=0x027F => 0,
            0x0280..=0x029F => self.riot.read(addr),
            0x02A0..=0x0FFF => 0,

            _ => self.cartridge.read(addr),
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        let addr = addr & 0x1FFF;

        match addr {
            0x0000..=0x002C | 0x0100..=0x013F => self.tia.write((addr & 0x3F) as u8, val),
            0x002D..=0x003F => {}
            0x0040..=0x007F | 0x0140..=0x017F => self.tia.write((addr & 0x3F) as u8, val),

            0x0080..=0x00FF | 0x0180..=0x01FF => self.riot.write(addr, val),

            0x0200..=0x027F => {}
            0x0280..=0x029F => self.riot.write(addr, val),
            0x02A0..=0x0FFF => {}

            _ => self.cartridge.write(addr, val),
        }
    }

    pub fn snapshot(&self) -> BusState {
        BusState {
            tia: self.tia.clone(),
            riot: self.riot.clone(),
            cartridge: self.cartridge.snapshot(),
        }
    }

    /// Restore from a snapshot. Nothing changes when the cartridge rejects it.
    pub fn restore(&mut self, state: &BusState) -> Result<(), CartridgeError> {
        self.cartridge.restore(&state.cartridge)?;
        self.tia = state.tia.clone();
        self.riot = state.riot.clone();
        Ok(())
    }
}
