//! Category-gated logging for the runtime core.
//!
//! Every subsystem logs through [`log()`] with a [`LogCategory`] and a
//! [`LogLevel`]. Levels are held in atomics inside a process-wide
//! [`LogConfig`], so checking whether a message is wanted costs one relaxed
//! load and the message closure is only evaluated when it will be emitted.
//!
//! Emitted messages are forwarded to the [`log`](https://docs.rs/log) facade
//! with a `vcs::<category>` target; the host (or the CLI via `env_logger`)
//! decides where they end up.
//!
//! # Usage
//!
//! ```rust
//! use vcs_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Session, LogLevel::Debug, || {
//!     format!("frame {} drained {} samples", 12, 1048)
//! });
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }

    /// Matching filter for a `log` backend such as env_logger.
    pub fn level_filter(self) -> log::LevelFilter {
        self.facade_level()
            .map_or(log::LevelFilter::Off, |level| level.to_level_filter())
    }

    fn facade_level(self) -> Option<log::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(log::Level::Error),
            LogLevel::Warn => Some(log::Level::Warn),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Debug => Some(log::Level::Debug),
            LogLevel::Trace => Some(log::Level::Trace),
        }
    }
}

/// Log category for the runtime's subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Scheme catalog construction and cartridge scheme resolution
    Bankswitch,
    /// Session build, teardown and per-frame driving
    Session,
    /// Scanline stepping and frame rendering
    Video,
    /// Audio generation and draining
    Audio,
    /// Snapshot save/load
    Snapshot,
    /// Bus and cartridge hotspot access
    Bus,
    /// Unimplemented features/stubs
    Stubs,
}

impl LogCategory {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        match self {
            LogCategory::Bankswitch => 0,
            LogCategory::Session => 1,
            LogCategory::Video => 2,
            LogCategory::Audio => 3,
            LogCategory::Snapshot => 4,
            LogCategory::Bus => 5,
            LogCategory::Stubs => 6,
        }
    }

    fn target(self) -> &'static str {
        match self {
            LogCategory::Bankswitch => "vcs::bankswitch",
            LogCategory::Session => "vcs::session",
            LogCategory::Video => "vcs::video",
            LogCategory::Audio => "vcs::audio",
            LogCategory::Snapshot => "vcs::snapshot",
            LogCategory::Bus => "vcs::bus",
            LogCategory::Stubs => "vcs::stubs",
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Applies to every category without its own level
    global_level: AtomicU8,
    category_levels: [AtomicU8; LogCategory::COUNT],
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: std::array::from_fn(|_| AtomicU8::new(LogLevel::Off as u8)),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    /// Set the global log level (applies to all categories unless overridden)
    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    /// Set log level for a specific category
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category with its own level uses it; otherwise the global level decides.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for level in &self.category_levels {
            level.store(LogLevel::Off as u8, Ordering::Relaxed);
        }
    }
}

/// Log a message with the specified category and level.
///
/// The closure only runs when the category/level pair is enabled in
/// [`LogConfig::global()`].
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    if !LogConfig::global().should_log(category, level) {
        return;
    }
    if let Some(facade) = level.facade_level() {
        log::log!(target: category.target(), facade, "{}", message_fn());
    }
}
