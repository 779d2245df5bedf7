//! Frame-synchronous session driver
//!
//! A [`Session`] owns one engine plus the buffers exchanged with the host:
//! the video frame, a fixed-capacity audio buffer and the 128-byte RAM
//! mirror. Each [`Session::run_frame`] call is a strictly ordered step:
//!
//! ```text
//! RAM mirror -> engine, latch inputs, step scanlines to the frame boundary,
//! render if pending, drain audio, engine RAM -> mirror
//! ```
//!
//! A session only exists once built and is consumed by [`Session::teardown`],
//! so frame calls on an unbuilt or destroyed session cannot be written.

use vcs_core::logging::{log, LogCategory, LogConfig, LogLevel};
use vcs_core::types::{AudioSample, Frame};
use vcs_core::{ConsoleEngine, RAM_WINDOW_SIZE};

use crate::config::SessionConfig;

/// NTSC pixel aspect: 1.0 pixel at the color burst, double-width pixels
const NTSC_PAR: f64 = (6.1363635 / 3.579545454) / 2.0;
/// PAL pixel aspect at 4/5 of the PAL color burst
const PAL_PAR: f64 = (7.375 / (4.43361875 * 4.0 / 5.0)) / 2.0;

/// Outcome of one frame call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// The video buffer holds a frame rendered during this call
    pub video_ready: bool,
    /// Samples (not stereo frames) written to the audio buffer
    pub audio_samples: usize,
}

pub struct Session<E: ConsoleEngine> {
    engine: E,
    config: SessionConfig,
    video: Frame,
    video_ready: bool,
    audio: Vec<AudioSample>,
    audio_len: usize,
    ram: [u8; RAM_WINDOW_SIZE],
    reported_size: (u32, u32),
    frames: u64,
}

impl<E: ConsoleEngine> Session<E> {
    /// Build a session around a constructed engine.
    pub fn new(engine: E, config: SessionConfig) -> Self {
        if config.logging {
            LogConfig::global().set_global_level(LogLevel::Debug);
        }

        let capacity = config.audio_capacity();
        let video = Frame::new(engine.width(), engine.height());
        let ram = *engine.ram();

        log(LogCategory::Session, LogLevel::Debug, || {
            format!(
                "Session built: {:?} {}x{}, {} Hz, audio capacity {}",
                engine.display_format(),
                engine.width(),
                engine.height(),
                config.sample_rate,
                capacity
            )
        });

        Self {
            engine,
            config,
            video,
            video_ready: false,
            audio: vec![0; capacity],
            audio_len: 0,
            ram,
            reported_size: (0, 0),
            frames: 0,
        }
    }

    /// Advance the console by one presentable frame.
    pub fn run_frame(&mut self) -> FrameReport {
        // Ascending order: some addresses act on the write sequence
        for (offset, &value) in self.ram.iter().enumerate() {
            self.engine.write_ram(offset, value);
        }

        self.engine.update_inputs();

        loop {
            self.engine.step_scanline();
            if self.engine.scanlines() == 0 {
                break;
            }
        }

        self.video_ready = self.engine.frame_pending();
        if self.video_ready {
            self.engine.render(&mut self.video);
        }

        self.audio_len = self.engine.drain_audio(&mut self.audio);

        self.ram.copy_from_slice(self.engine.ram());
        self.frames += 1;

        log(LogCategory::Session, LogLevel::Trace, || {
            format!(
                "Frame {}: video_ready={} audio={}",
                self.frames, self.video_ready, self.audio_len
            )
        });

        FrameReport {
            video_ready: self.video_ready,
            audio_samples: self.audio_len,
        }
    }

    /// Last rendered frame; stale when the last call reported no video.
    pub fn video(&self) -> &Frame {
        &self.video
    }

    pub fn video_ready(&self) -> bool {
        self.video_ready
    }

    /// Interleaved stereo samples drained by the last frame call
    pub fn audio(&self) -> &[AudioSample] {
        &self.audio[..self.audio_len]
    }

    pub fn audio_capacity(&self) -> usize {
        self.audio.len()
    }

    pub fn ram(&self) -> &[u8; RAM_WINDOW_SIZE] {
        &self.ram
    }

    /// Host side of the RAM mirror, applied at the start of the next frame.
    pub fn ram_mut(&mut self) -> &mut [u8; RAM_WINDOW_SIZE] {
        &mut self.ram
    }

    pub(crate) fn refresh_ram(&mut self) {
        self.ram.copy_from_slice(self.engine.ram());
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Frame calls made on this session
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// True for 60 Hz formats (NTSC, PAL60, SECAM60).
    pub fn is_ntsc(&self) -> bool {
        self.engine.display_format().is_60hz()
    }

    /// Pixel aspect ratio of the rendered frame.
    pub fn video_aspect_par(&self) -> f64 {
        let (override_percent, derived) = if self.is_ntsc() {
            (self.config.aspect_ntsc, NTSC_PAR)
        } else {
            (self.config.aspect_pal, PAL_PAR)
        };

        if override_percent != 0 {
            override_percent as f64 / 100.0
        } else if self.config.filter.is_enabled() {
            1.0
        } else {
            derived
        }
    }

    /// Display aspect ratio; TIA pixels are presented double width.
    pub fn video_aspect(&self) -> f64 {
        let width = self.engine.width() as f64 * 2.0;
        width * self.video_aspect_par() / self.engine.height() as f64
    }

    /// Report a change of render size once; the first call reports the
    /// initial size.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        let size = (self.engine.width(), self.engine.height());
        if size == self.reported_size {
            return None;
        }
        self.reported_size = size;
        Some(size)
    }

    /// Destroy the session, handing back the engine.
    pub fn teardown(self) -> E {
        log(LogCategory::Session, LogLevel::Debug, || {
            format!("Session torn down after {} frames", self.frames)
        });
        self.engine
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::VideoFilter;
    use vcs_core::DisplayFormat;

    /// Engine that records the order of calls and echoes RAM writes.
    pub(crate) struct FakeEngine {
        pub calls: Vec<&'static str>,
        pub writes: Vec<usize>,
        pub ram: [u8; RAM_WINDOW_SIZE],
        pub line: u32,
        pub lines_per_frame: u32,
        pub pending: bool,
        pub render_every_frame: bool,
        pub queued_audio: usize,
        pub audio_per_line: usize,
        pub format: DisplayFormat,
        pub frame_counter: u8,
    }

    impl FakeEngine {
        pub fn new() -> Self {
            Self {
                calls: Vec::new(),
                writes: Vec::new(),
                ram: [0; RAM_WINDOW_SIZE],
                line: 0,
                lines_per_frame: 4,
                pending: false,
                render_every_frame: true,
                queued_audio: 0,
                audio_per_line: 2,
                format: DisplayFormat::Ntsc,
                frame_counter: 0,
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake engine rejected state")]
    pub(crate) struct FakeError;

    impl ConsoleEngine for FakeEngine {
        type Error = FakeError;

        fn write_ram(&mut self, offset: usize, value: u8) {
            if self.writes.is_empty() {
                self.calls.push("write_ram");
            }
            self.writes.push(offset);
            self.ram[offset] = value;
        }

        fn ram(&self) -> &[u8; RAM_WINDOW_SIZE] {
            &self.ram
        }

        fn update_inputs(&mut self) {
            self.calls.push("update_inputs");
        }

        fn step_scanline(&mut self) {
            if self.calls.last() != Some(&"step") {
                self.calls.push("step");
            }
            self.queued_audio += self.audio_per_line;
            self.line = (self.line + 1) % self.lines_per_frame;
            if self.line == 0 {
                self.frame_counter = self.frame_counter.wrapping_add(1);
                // Engine-side work visible through the RAM window
                self.ram[0x7F] = self.frame_counter;
                self.pending = self.render_every_frame;
            }
        }

        fn scanlines(&self) -> u32 {
            self.line
        }

        fn frame_pending(&self) -> bool {
            self.pending
        }

        fn render(&mut self, frame: &mut Frame) {
            self.calls.push("render");
            frame.resize(self.width(), self.height());
            frame.pixels.fill(self.frame_counter as u32);
            self.pending = false;
        }

        fn drain_audio(&mut self, out: &mut [AudioSample]) -> usize {
            self.calls.push("drain_audio");
            let count = self.queued_audio.min(out.len());
            out[..count].fill(1);
            self.queued_audio -= count;
            count
        }

        fn save_state(&self) -> Result<Vec<u8>, Self::Error> {
            let mut state = self.ram.to_vec();
            state.push(self.frame_counter);
            Ok(state)
        }

        fn load_state(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if data.len() != RAM_WINDOW_SIZE + 1 {
                // Half-applied failure, like an engine that decodes in place
                self.ram[0] = 0xEE;
                return Err(FakeError);
            }
            self.ram.copy_from_slice(&data[..RAM_WINDOW_SIZE]);
            self.frame_counter = data[RAM_WINDOW_SIZE];
            Ok(())
        }

        fn display_format(&self) -> DisplayFormat {
            self.format
        }

        fn width(&self) -> u32 {
            4
        }

        fn height(&self) -> u32 {
            2
        }
    }

    fn session() -> Session<FakeEngine> {
        Session::new(FakeEngine::new(), SessionConfig::default())
    }

    #[test]
    fn test_new_session_has_no_video() {
        let session = session();
        assert!(!session.video_ready());
        assert!(session.audio().is_empty());
        assert_eq!(session.audio_capacity(), 4096);
    }

    #[test]
    fn test_run_frame_order() {
        let mut session = session();
        session.run_frame();
        assert_eq!(
            session.engine().calls,
            vec!["write_ram", "update_inputs", "step", "render", "drain_audio"]
        );
    }

    #[test]
    fn test_ram_written_in_ascending_order() {
        let mut session = session();
        session.run_frame();
        let expected: Vec<usize> = (0..RAM_WINDOW_SIZE).collect();
        assert_eq!(session.engine().writes, expected);
    }

    #[test]
    fn test_ram_mirror_round_trip() {
        let mut session = session();
        session.ram_mut()[3] = 0x42;
        session.run_frame();

        assert_eq!(session.engine().ram[3], 0x42);
        // Refreshed with post-step engine values
        assert_eq!(session.ram()[0x7F], 1);
        assert_eq!(session.ram()[3], 0x42);
    }

    #[test]
    fn test_video_ready_follows_frame_pending() {
        let mut session = session();
        let report = session.run_frame();
        assert!(report.video_ready);
        assert_eq!(session.video().pixels, vec![1; 8]);

        session.engine_mut().render_every_frame = false;
        let report = session.run_frame();
        assert!(!report.video_ready);
        // Stale content from the previous render
        assert_eq!(session.video().pixels, vec![1; 8]);
    }

    #[test]
    fn test_audio_bounded_by_capacity() {
        let config = SessionConfig {
            audio_buffer_capacity: 6,
            ..SessionConfig::default()
        };
        let mut session = Session::new(FakeEngine::new(), config);

        let report = session.run_frame();
        assert_eq!(report.audio_samples, 6);
        assert_eq!(session.audio().len(), 6);
        // Remaining samples drain on the next call
        let report = session.run_frame();
        assert_eq!(report.audio_samples, 6);
        assert_eq!(session.audio_capacity(), 6);
    }

    #[test]
    fn test_empty_audio_source_yields_zero() {
        let mut session = session();
        session.engine_mut().audio_per_line = 0;
        assert_eq!(session.run_frame().audio_samples, 0);
        assert!(session.audio().is_empty());
    }

    #[test]
    fn test_steady_state_audio_counts() {
        let mut session = session();
        let counts: Vec<usize> = (0..5).map(|_| session.run_frame().audio_samples).collect();
        assert!(counts.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(counts[0], 8);
    }

    #[test]
    fn test_ntsc_aspect() {
        let session = session();
        assert!(session.is_ntsc());
        assert!((session.video_aspect_par() - NTSC_PAR).abs() < 1e-9);
        let expected = 4.0 * 2.0 * NTSC_PAR / 2.0;
        assert!((session.video_aspect() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pal_aspect_and_overrides() {
        let mut engine = FakeEngine::new();
        engine.format = DisplayFormat::Pal;
        let session = Session::new(engine, SessionConfig::default());
        assert!(!session.is_ntsc());
        assert!((session.video_aspect_par() - PAL_PAR).abs() < 1e-9);

        let mut engine = FakeEngine::new();
        engine.format = DisplayFormat::Pal60;
        let config = SessionConfig {
            aspect_ntsc: 91,
            ..SessionConfig::default()
        };
        let session = Session::new(engine, config);
        assert!(session.is_ntsc());
        assert!((session.video_aspect_par() - 0.91).abs() < 1e-9);
    }

    #[test]
    fn test_filter_uses_square_pixels() {
        let config = SessionConfig {
            filter: VideoFilter::Composite,
            ..SessionConfig::default()
        };
        let session = Session::new(FakeEngine::new(), config);
        assert_eq!(session.video_aspect_par(), 1.0);
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let mut session = session();
        session.run_frame();
        let calls = session.engine().calls.len();
        let _ = session.video_aspect();
        let _ = session.is_ntsc();
        assert_eq!(session.engine().calls.len(), calls);
    }

    #[test]
    fn test_take_resize_reports_once() {
        let mut session = session();
        assert_eq!(session.take_resize(), Some((4, 2)));
        assert_eq!(session.take_resize(), None);
    }

    #[test]
    fn test_teardown_returns_engine() {
        let mut session = session();
        session.run_frame();
        let engine = session.teardown();
        assert_eq!(engine.frame_counter, 1);
    }
}
