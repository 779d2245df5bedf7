//! Snapshot save/load into caller-owned byte buffers
//!
//! The payload is whatever the engine serializes; no framing is added here.
//! A failed load restores the state captured just before the attempt, so a
//! rejected snapshot never leaves the session half-loaded.

use thiserror::Error;
use vcs_core::logging::{log, LogCategory, LogLevel};
use vcs_core::ConsoleEngine;

use crate::session::Session;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Snapshot is empty")]
    Empty,
    #[error("Snapshot needs {needed} bytes but the buffer holds {capacity}")]
    Capacity { needed: usize, capacity: usize },
    #[error("Engine rejected snapshot: {0}")]
    Engine(String),
    #[error("Restoring the pre-load state failed: {0}")]
    Rollback(String),
}

fn engine_error<T: std::error::Error>(err: T) -> SnapshotError {
    SnapshotError::Engine(err.to_string())
}

impl<E: ConsoleEngine> Session<E> {
    /// Size in bytes of a snapshot taken now.
    pub fn snapshot_size(&self) -> Result<usize, SnapshotError> {
        let state = self.engine().save_state().map_err(engine_error)?;
        Ok(state.len())
    }

    /// Serialize the machine into `dest`, returning the bytes written.
    ///
    /// `dest` is left untouched when the snapshot does not fit.
    pub fn save_snapshot(&self, dest: &mut [u8]) -> Result<usize, SnapshotError> {
        let state = self.engine().save_state().map_err(engine_error)?;
        if state.len() > dest.len() {
            log(LogCategory::Snapshot, LogLevel::Warn, || {
                format!(
                    "Snapshot of {} bytes does not fit in {} bytes",
                    state.len(),
                    dest.len()
                )
            });
            return Err(SnapshotError::Capacity {
                needed: state.len(),
                capacity: dest.len(),
            });
        }

        dest[..state.len()].copy_from_slice(&state);
        log(LogCategory::Snapshot, LogLevel::Debug, || {
            format!("Saved snapshot ({} bytes)", state.len())
        });
        Ok(state.len())
    }

    /// Restore the machine from `src`.
    ///
    /// On failure the engine is returned to its state before the call.
    pub fn load_snapshot(&mut self, src: &[u8]) -> Result<(), SnapshotError> {
        if src.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let backup = self.engine().save_state().map_err(engine_error)?;

        match self.engine_mut().load_state(src) {
            Ok(()) => {
                self.refresh_ram();
                log(LogCategory::Snapshot, LogLevel::Debug, || {
                    format!("Loaded snapshot ({} bytes)", src.len())
                });
                Ok(())
            }
            Err(err) => {
                log(LogCategory::Snapshot, LogLevel::Warn, || {
                    format!("Snapshot rejected, rolling back: {}", err)
                });
                self.engine_mut()
                    .load_state(&backup)
                    .map_err(|rollback| SnapshotError::Rollback(rollback.to_string()))?;
                Err(engine_error(err))
            }
        }
    }
}
