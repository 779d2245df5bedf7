//! Atari 2600 cartridge handling and banking
//!
//! The cartridge sees the 4K window $1000-$1FFF. Hotspot schemes pick the
//! visible 4K bank when the CPU touches an address near the top of the
//! window:
//! - 2K/4K: no banking (2K images mirror)
//! - F8: $1FF8-$1FF9, FA: $1FF8-$1FFA, F6: $1FF6-$1FF9, F4: $1FF4-$1FFB
//!
//! SC variants add 128 bytes of RAM (write $1000-$107F, read $1080-$10FF);
//! FA adds 256 bytes (write $1000-$10FF, read $1100-$11FF).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vcs_core::logging::{log, LogCategory, LogLevel};

use crate::bankswitch::SchemeId;

const BANK_SIZE: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("Invalid ROM size for {scheme}: {size} bytes")]
    InvalidSize { scheme: SchemeId, size: usize },
    #[error("Unsupported banking scheme: {0}")]
    UnsupportedBanking(SchemeId),
    #[error("Cartridge state is for {found}, cartridge uses {expected}")]
    SchemeMismatch { expected: SchemeId, found: SchemeId },
    #[error("Cartridge state has {found} bytes of RAM, expected {expected}")]
    RamMismatch { expected: usize, found: usize },
    #[error("Cartridge state selects bank {bank} of {count}")]
    BankOutOfRange { bank: usize, count: usize },
}

/// Guess the scheme of a headerless image from its size.
pub fn detect_by_size(len: usize) -> Option<SchemeId> {
    match len {
        1..=2048 if len.is_power_of_two() => Some(SchemeId::Rom2K),
        4096 => Some(SchemeId::Rom4K),
        8192 => Some(SchemeId::F8),
        12288 => Some(SchemeId::FA),
        16384 => Some(SchemeId::F6),
        32768 => Some(SchemeId::F4),
        _ => None,
    }
}

/// Bank count, first hotspot and RAM size of a hotspot scheme.
fn layout(scheme: SchemeId) -> Option<(usize, u16, usize)> {
    match scheme {
        SchemeId::Rom2K | SchemeId::Rom4K => Some((1, 0, 0)),
        SchemeId::F8 => Some((2, 0x1FF8, 0)),
        SchemeId::F8SC => Some((2, 0x1FF8, 128)),
        SchemeId::FA => Some((3, 0x1FF8, 256)),
        SchemeId::F6 => Some((4, 0x1FF6, 0)),
        SchemeId::F6SC => Some((4, 0x1FF6, 128)),
        SchemeId::F4 => Some((8, 0x1FF4, 0)),
        SchemeId::F4SC => Some((8, 0x1FF4, 128)),
        _ => None,
    }
}

/// Banking registers and cartridge RAM; everything but the ROM image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeState {
    pub scheme: SchemeId,
    pub bank: usize,
    pub ram: Vec<u8>,
}

/// Atari 2600 cartridge
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
    scheme: SchemeId,
    bank_count: usize,
    hotspot: u16,
    current_bank: usize,
    ram: Vec<u8>,
}

impl Cartridge {
    /// Create a cartridge; `SchemeId::Auto` sniffs the scheme from the image.
    pub fn new(rom: Vec<u8>, scheme: SchemeId) -> Result<Self, CartridgeError> {
        let scheme = if scheme.is_auto() {
            detect_by_size(rom.len()).ok_or(CartridgeError::InvalidSize {
                scheme,
                size: rom.len(),
            })?
        } else {
            scheme
        };
        let (bank_count, hotspot, ram_size) =
            layout(scheme).ok_or(CartridgeError::UnsupportedBanking(scheme))?;

        let size_ok = match scheme {
            SchemeId::Rom2K => (1..=2048).contains(&rom.len()) && rom.len().is_power_of_two(),
            _ => rom.len() == bank_count * BANK_SIZE,
        };
        if !size_ok {
            return Err(CartridgeError::InvalidSize {
                scheme,
                size: rom.len(),
            });
        }

        log(LogCategory::Bus, LogLevel::Info, || {
            format!(
                "Cartridge: {} bytes, scheme {}, {} bank(s), {} bytes RAM",
                rom.len(),
                scheme,
                bank_count,
                ram_size
            )
        });

        Ok(Self {
            rom,
            scheme,
            bank_count,
            hotspot,
            current_bank: 0,
            ram: vec![0; ram_size],
        })
    }

    /// Read from cartridge address space
    pub fn read(&self, addr: u16) -> u8 {
        let offset = (addr & 0x0FFF) as usize;
        let ram_len = self.ram.len();
        if ram_len > 0 && (ram_len..ram_len * 2).contains(&offset) {
            return self.ram[offset - ram_len];
        }

        if self.scheme == SchemeId::Rom2K {
            return self.rom[offset % self.rom.len()];
        }
        self.rom[self.current_bank * BANK_SIZE + offset]
    }

    /// Write to cartridge address space (RAM write port or hotspots)
    pub fn write(&mut self, addr: u16, val: u8) {
        let offset = (addr & 0x0FFF) as usize;
        if offset < self.ram.len() {
            self.ram[offset] = val;
            return;
        }

        let addr = addr & 0x1FFF;
        if self.bank_count > 1 && addr >= self.hotspot {
            let bank = (addr - self.hotspot) as usize;
            if bank < self.bank_count {
                self.current_bank = bank;
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Cartridge: hotspot {:04X} -> bank {}", addr, bank)
                });
            }
        }
    }

    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    pub fn current_bank(&self) -> usize {
        self.current_bank
    }

    pub fn bank_count(&self) -> usize {
        self.bank_count
    }

    pub fn size(&self) -> usize {
        self.rom.len()
    }

    pub fn snapshot(&self) -> CartridgeState {
        CartridgeState {
            scheme: self.scheme,
            bank: self.current_bank,
            ram: self.ram.clone(),
        }
    }

    /// Restore banking and RAM captured from a cartridge of the same kind.
    pub fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError> {
        if state.scheme != self.scheme {
            return Err(CartridgeError::SchemeMismatch {
                expected: self.scheme,
                found: state.scheme,
            });
        }
        if state.ram.len() != self.ram.len() {
            return Err(CartridgeError::RamMismatch {
                expected: self.ram.len(),
                found: state.ram.len(),
            });
        }
        if state.bank >= self.bank_count {
            return Err(CartridgeError::BankOutOfRange {
                bank: state.bank,
                count: self.bank_count,
            });
        }
        self.current_bank = state.bank;
        self.ram.copy_from_slice(&state.ram);
        Ok(())
    }
}
