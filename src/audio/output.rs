//! The audio-output seam.
//!
//! A platform adapter turns a song uri into a playing handle. The transport
//! owns at most one handle at a time and always releases it before asking
//! for another.

use super::types::{OutputError, PlaybackStatus};

pub trait AudioOutput {
    /// Open `uri` and return its handle with the initial status.
    fn create(
        &mut self,
        uri: &str,
        autoplay: bool,
    ) -> Result<(Box<dyn OutputHandle>, PlaybackStatus), OutputError>;
}

pub trait OutputHandle {
    fn pause(&mut self) -> Result<(), OutputError>;

    fn resume(&mut self) -> Result<(), OutputError>;

    fn seek(&mut self, position_ms: u64) -> Result<(), OutputError>;

    /// Latest status, if the handle has one to report.
    fn poll_status(&mut self) -> Option<PlaybackStatus>;

    /// Stop output and free the underlying stream.
    fn release(self: Box<Self>);
}

/// Output used when no audio device could be opened. Every `create` fails,
/// so every song falls back to synthetic playback.
pub struct NullOutput {
    reason: String,
}

impl NullOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioOutput for NullOutput {
    fn create(
        &mut self,
        _uri: &str,
        _autoplay: bool,
    ) -> Result<(Box<dyn OutputHandle>, PlaybackStatus), OutputError> {
        Err(OutputError::Unavailable(self.reason.clone()))
    }
}
