//! Audio-related small types.
//!
//! This module defines the repeat mode, the status reported by output
//! handles, the transport snapshot shared with the UI and the output error.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::library::Song;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop after the last track of a single-track catalog.
    #[default]
    Off,
    /// Replay the current track when it ends.
    Track,
    /// Keep advancing through the catalog.
    Queue,
}

impl RepeatMode {
    /// `Off -> Track -> Queue -> Off`.
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::Track,
            Self::Track => Self::Queue,
            Self::Queue => Self::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "Repeat: Off",
            Self::Track => "Repeat: Track",
            Self::Queue => "Repeat: Queue",
        }
    }
}

/// Status reported by an output handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub position_ms: u64,
    /// Stream length, once the backend knows it.
    pub duration_ms: Option<u64>,
    pub is_playing: bool,
    pub is_loaded: bool,
    /// Set once, on the status that reports end-of-stream.
    pub did_finish: bool,
}

/// Read-only snapshot of the transport, handed to the UI.
#[derive(Debug, Clone, Default)]
pub struct TransportState {
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub progress: Duration,
    pub duration: Duration,
    pub is_shuffle: bool,
    pub repeat_mode: RepeatMode,
    /// The current song is driven by the ticker rather than a real stream.
    pub is_synthetic: bool,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no audio output device: {0}")]
    Unavailable(String),
    #[error("cannot open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("seek failed: {0}")]
    Seek(String),
}
