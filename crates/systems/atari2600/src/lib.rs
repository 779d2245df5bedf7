//! Atari 2600 (VCS) host sessions
//!
//! Bankswitch scheme resolution, the per-frame session driver, snapshot
//! codec, and a register-level engine for driving sessions headless.

#![allow(clippy::upper_case_acronyms)]

pub mod bankswitch;
mod bus;
pub mod cartridge;
pub mod config;
pub mod input;
mod palette;
mod riot;
pub mod session;
pub mod snapshot;
mod tia;

use std::collections::VecDeque;

use bus::{Atari2600Bus, BusState};
use palette::PaletteTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vcs_core::logging::{log, LogCategory, LogLevel};
use vcs_core::types::{AudioSample, Frame};
use vcs_core::{ConsoleEngine, DisplayFormat, RAM_WINDOW_SIZE};

pub use bankswitch::{SchemeCatalog, SchemeId};
pub use cartridge::{Cartridge, CartridgeError};
pub use config::SessionConfig;
pub use input::{ConsoleSwitches, InputState, Joystick};
pub use session::{FrameReport, Session};
pub use snapshot::SnapshotError;

const STATE_VERSION: u32 = 1;
const STATE_SYSTEM: &str = "atari2600";

/// CPU cycles per scanline (228 color clocks / 3)
const CYCLES_PER_SCANLINE: u32 = 76;

/// Audio clock ticks per scanline
const AUDIO_TICKS_PER_SCANLINE: usize = 2;

/// Stereo sample frames per second the engine emits (2 ticks x 15720 lines/s)
pub const AUDIO_SAMPLE_RATE: u32 = 31440;

/// Full-scale channel level in stereo; mono halves it so the sum cannot clip
const STEREO_SCALE: i16 = 2184;
const MONO_SCALE: i16 = 1092;

#[derive(Debug, Error)]
pub enum Atari2600Error {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("Malformed state: {0}")]
    State(#[from] serde_json::Error),
    #[error("Unsupported state version {0}")]
    UnsupportedVersion(u32),
    #[error("State is for system '{0}'")]
    WrongSystem(String),
    #[error("State was saved as {found:?}, engine runs {expected:?}")]
    FormatMismatch {
        expected: DisplayFormat,
        found: DisplayFormat,
    },
    #[error("State out of range: {0}")]
    OutOfRange(String),
}

/// First rendered scanline and rendered height for a format
fn visible_window(format: DisplayFormat) -> (u32, u32) {
    if format.is_60hz() {
        (34, 210)
    } else {
        (38, 250)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EngineState {
    version: u32,
    system: String,
    format: DisplayFormat,
    frames: u64,
    frame_pending: bool,
    input: InputState,
    bus: BusState,
    audio: Vec<AudioSample>,
    /// Last completed frame; only kept while phosphor blending needs it
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    phosphor_history: Vec<u32>,
}

/// Register-level Atari 2600 engine.
///
/// There is no 6507 core: the machine is driven by host RAM writes, staged
/// input and the per-scanline clock, which is enough to exercise video,
/// audio, banking and state serialization end to end.
pub struct Atari2600Engine {
    bus: Atari2600Bus,
    format: DisplayFormat,
    palette: PaletteTable,
    /// Blend percentage when phosphor is on
    phosphor: Option<u8>,
    stereo: bool,
    staged: InputState,
    latched: InputState,
    /// Frame under construction
    back: Vec<u32>,
    /// Last completed frame
    front: Vec<u32>,
    frame_pending: bool,
    frames: u64,
    audio: VecDeque<AudioSample>,
    audio_limit: usize,
}

impl Atari2600Engine {
    pub fn new(
        rom: Vec<u8>,
        scheme: SchemeId,
        config: &SessionConfig,
    ) -> Result<Self, Atari2600Error> {
        let cartridge = Cartridge::new(rom, scheme)?;
        // No per-ROM properties database: formats default to NTSC and the
        // by-ROM settings to off.
        let format = config.format.resolve(DisplayFormat::Ntsc);
        let (_, height) = visible_window(format);
        let pixels = (tia::VISIBLE_WIDTH as u32 * height) as usize;

        if config.sample_rate != AUDIO_SAMPLE_RATE {
            log(LogCategory::Audio, LogLevel::Warn, || {
                format!(
                    "Configured sample rate {} Hz ignored; audio is generated at {} Hz",
                    config.sample_rate, AUDIO_SAMPLE_RATE
                )
            });
        }

        log(LogCategory::Video, LogLevel::Debug, || {
            format!(
                "Engine: {:?}, {} lines/frame, {}x{}",
                format,
                format.scanlines_per_frame(),
                tia::VISIBLE_WIDTH,
                height
            )
        });

        Ok(Self {
            bus: Atari2600Bus::new(cartridge),
            format,
            palette: palette::build(config.palette, format),
            phosphor: config
                .phosphor
                .enabled(false)
                .then_some(config.phosphor_blend.min(100)),
            stereo: config.stereo.is_stereo(false),
            staged: InputState::default(),
            latched: InputState::default(),
            back: vec![0; pixels],
            front: vec![0; pixels],
            frame_pending: false,
            frames: 0,
            audio: VecDeque::with_capacity(config.audio_queue_samples()),
            audio_limit: config.audio_queue_samples(),
        })
    }

    /// Stage a joystick for the next `update_inputs`.
    pub fn set_joystick(&mut self, port: usize, joystick: Joystick) {
        if let Some(slot) = self.staged.joysticks.get_mut(port) {
            *slot = joystick;
        }
    }

    pub fn set_switches(&mut self, switches: ConsoleSwitches) {
        self.staged.switches = switches;
    }

    /// Write through the system bus (TIA, RIOT, cartridge hotspots).
    pub fn poke(&mut self, addr: u16, val: u8) {
        self.bus.write(addr, val);
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.bus.read(addr)
    }

    /// Completed frames since power-on
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    pub fn debug_info(&self) -> DebugInfo {
        let cart = &self.bus.cartridge;
        DebugInfo {
            rom_size: cart.size(),
            banking_scheme: cart.scheme().token().to_string(),
            current_bank: cart.current_bank(),
            bank_count: cart.bank_count(),
            scanline: self.bus.tia.scanline(),
            frames: self.frames,
            queued_audio: self.audio.len(),
        }
    }

    fn push_audio(&mut self, levels: [u8; 2]) {
        let (left, right) = if self.stereo {
            (
                levels[0] as i16 * STEREO_SCALE,
                levels[1] as i16 * STEREO_SCALE,
            )
        } else {
            let mixed = (levels[0] as i16 + levels[1] as i16) * MONO_SCALE;
            (mixed, mixed)
        };

        while self.audio.len() + 2 > self.audio_limit {
            self.audio.pop_front();
            self.audio.pop_front();
            log(LogCategory::Audio, LogLevel::Trace, || {
                "Audio queue full, dropping oldest sample frame".to_string()
            });
        }
        self.audio.push_back(left);
        self.audio.push_back(right);
    }

    fn finish_frame(&mut self) {
        match self.phosphor {
            Some(blend) => {
                for (front, &back) in self.front.iter_mut().zip(&self.back) {
                    *front = phosphor_blend(back, *front, blend);
                }
            }
            None => std::mem::swap(&mut self.front, &mut self.back),
        }
        self.frame_pending = true;
        self.frames = self.frames.wrapping_add(1);
        log(LogCategory::Video, LogLevel::Trace, || {
            format!("Frame {} complete", self.frames)
        });
    }
}

#[derive(Debug, Clone)]
pub struct DebugInfo {
    pub rom_size: usize,
    pub banking_scheme: String,
    pub current_bank: usize,
    pub bank_count: usize,
    pub scanline: u16,
    pub frames: u64,
    pub queued_audio: usize,
}

/// Keep the brighter of the new pixel and the decayed previous one, per channel.
fn phosphor_blend(new: u32, old: u32, blend: u8) -> u32 {
    let channel = |shift: u32| {
        let n = (new >> shift) & 0xFF;
        let o = ((old >> shift) & 0xFF) * blend as u32 / 100;
        n.max(o) << shift
    };
    0xFF000000 | channel(16) | channel(8) | channel(0)
}

impl ConsoleEngine for Atari2600Engine {
    type Error = Atari2600Error;

    fn write_ram(&mut self, offset: usize, value: u8) {
        self.bus.riot.write_ram(offset, value);
    }

    fn ram(&self) -> &[u8; RAM_WINDOW_SIZE] {
        self.bus.riot.ram()
    }

    fn update_inputs(&mut self) {
        self.latched = self.staged;
        self.bus
            .riot
            .latch_inputs(self.latched.swcha(), self.latched.swchb());
        let [p0, p1] = self.latched.joysticks;
        self.bus.tia.latch_triggers(p0.fire, p1.fire);
    }

    fn step_scanline(&mut self) {
        let line = self.bus.tia.scanline() as u32;
        let (start, height) = visible_window(self.format);
        if (start..start + height).contains(&line) {
            let row = (line - start) as usize * tia::VISIBLE_WIDTH;
            self.bus
                .tia
                .render_scanline(&mut self.back[row..row + tia::VISIBLE_WIDTH], &self.palette);
        }

        self.bus.clock(CYCLES_PER_SCANLINE);
        for _ in 0..AUDIO_TICKS_PER_SCANLINE {
            let levels = self.bus.tia.clock_audio();
            self.push_audio(levels);
        }

        let lines = self.format.scanlines_per_frame() as u16;
        if self.bus.tia.advance_scanline(lines) {
            self.finish_frame();
        }
    }

    fn scanlines(&self) -> u32 {
        self.bus.tia.scanline() as u32
    }

    fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    fn render(&mut self, frame: &mut Frame) {
        frame.resize(self.width(), self.height());
        frame.pixels.copy_from_slice(&self.front);
        self.frame_pending = false;
    }

    fn drain_audio(&mut self, out: &mut [AudioSample]) -> usize {
        // Whole stereo frames only
        let count = (out.len() & !1).min(self.audio.len());
        for (slot, sample) in out.iter_mut().zip(self.audio.drain(..count)) {
            *slot = sample;
        }
        count
    }

    fn save_state(&self) -> Result<Vec<u8>, Self::Error> {
        let state = EngineState {
            version: STATE_VERSION,
            system: STATE_SYSTEM.to_string(),
            format: self.format,
            frames: self.frames,
            frame_pending: self.frame_pending,
            input: self.latched,
            bus: self.bus.snapshot(),
            audio: self.audio.iter().copied().collect(),
            phosphor_history: if self.phosphor.is_some() {
                self.front.clone()
            } else {
                Vec::new()
            },
        };
        Ok(serde_json::to_vec(&state)?)
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let state: EngineState = serde_json::from_slice(data)?;
        if state.version != STATE_VERSION {
            return Err(Atari2600Error::UnsupportedVersion(state.version));
        }
        if state.system != STATE_SYSTEM {
            return Err(Atari2600Error::WrongSystem(state.system));
        }
        if state.format != self.format {
            return Err(Atari2600Error::FormatMismatch {
                expected: self.format,
                found: state.format,
            });
        }

        let lines = self.format.scanlines_per_frame() as u16;
        state
            .bus
            .tia
            .validate(lines)
            .and_then(|()| state.bus.riot.validate())
            .map_err(Atari2600Error::OutOfRange)?;
        if state.audio.len() % 2 != 0 {
            return Err(Atari2600Error::OutOfRange(format!(
                "{} queued samples split a stereo frame",
                state.audio.len()
            )));
        }

        self.bus.restore(&state.bus)?;
        self.frames = state.frames;
        self.frame_pending = state.frame_pending;
        self.latched = state.input;
        self.audio = state.audio.into_iter().collect();
        while self.audio.len() > self.audio_limit {
            self.audio.pop_front();
        }
        if self.phosphor.is_some() && state.phosphor_history.len() == self.front.len() {
            self.front = state.phosphor_history;
        }

        log(LogCategory::Snapshot, LogLevel::Debug, || {
            format!("Engine state restored at frame {}", self.frames)
        });
        Ok(())
    }

    fn display_format(&self) -> DisplayFormat {
        self.format
    }

    fn width(&self) -> u32 {
        tia::VISIBLE_WIDTH as u32
    }

    fn height(&self) -> u32 {
        visible_window(self.format).1
    }
}

/// Resolve the cartridge scheme, build the engine and wrap it in a session.
///
/// The scheme comes from `config.bankswitch` when it names a scheme, else
/// from the file extension of `name`, else from the image size.
pub fn open_session(
    name: &str,
    rom: Vec<u8>,
    config: SessionConfig,
) -> Result<Session<Atari2600Engine>, Atari2600Error> {
    let scheme = bankswitch::resolve(name, Some(&config.bankswitch));
    log(LogCategory::Session, LogLevel::Info, || {
        format!("Opening '{}' ({} bytes) as {}", name, rom.len(), scheme)
    });
    let engine = Atari2600Engine::new(rom, scheme, &config)?;
    Ok(Session::new(engine, config))
}
