//! Core runtime primitives and the console engine capability.

pub mod apu;
pub mod logging;
pub mod timing;

pub use timing::DisplayFormat;

pub mod types {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Resize in place, keeping the allocation when it is large enough.
        pub fn resize(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
            self.pixels.resize((width * height) as usize, 0);
        }
    }

    pub type AudioSample = i16;
}

/// Size of the RIOT RAM window shared with the host each frame.
pub const RAM_WINDOW_SIZE: usize = 128;

/// The emulation engine a session drives, consumed as a black box.
///
/// Implementations own CPU/video/audio simulation. The session only needs
/// scanline stepping, frame rendering, an audio drain, the RAM window and
/// whole-state serialization.
pub trait ConsoleEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write one byte of the RAM window (`offset` < [`RAM_WINDOW_SIZE`]).
    fn write_ram(&mut self, offset: usize, value: u8);

    /// Current contents of the RAM window.
    fn ram(&self) -> &[u8; RAM_WINDOW_SIZE];

    /// Latch controller and console switch state for the coming frame.
    fn update_inputs(&mut self);

    /// Advance emulation by one scanline.
    fn step_scanline(&mut self);

    /// Scanlines emitted into the frame under construction; 0 right after
    /// a frame boundary.
    fn scanlines(&self) -> u32;

    /// Whether a completed frame is waiting to be rendered.
    fn frame_pending(&self) -> bool;

    /// Render the pending frame into `frame`, resizing it if needed.
    fn render(&mut self, frame: &mut types::Frame);

    /// Move queued samples into `out`, returning how many were written.
    fn drain_audio(&mut self, out: &mut [types::AudioSample]) -> usize;

    /// Serialize the full machine state.
    fn save_state(&self) -> Result<Vec<u8>, Self::Error>;

    /// Restore machine state produced by [`ConsoleEngine::save_state`].
    fn load_state(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    fn display_format(&self) -> DisplayFormat;

    /// Width of the rendered frame in pixels
    fn width(&self) -> u32;

    /// Height of the rendered frame in pixels
    fn height(&self) -> u32;
}
