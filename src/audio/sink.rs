//! `rodio` implementation of the audio-output seam.
//!
//! Each handle wraps one `Sink` fed by a single decoded file. The sink
//! empties itself when the file ends; that is reported once as `did_finish`.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::output::{AudioOutput, OutputHandle};
use super::types::{OutputError, PlaybackStatus};

pub struct RodioOutput {
    stream: OutputStream,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn open() -> Result<Self, OutputError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| OutputError::Unavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl AudioOutput for RodioOutput {
    fn create(
        &mut self,
        uri: &str,
        autoplay: bool,
    ) -> Result<(Box<dyn OutputHandle>, PlaybackStatus), OutputError> {
        let path = uri_to_path(uri);
        let file = File::open(&path).map_err(|source| OutputError::Open {
            path: path.clone(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| OutputError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        if autoplay {
            sink.play();
        } else {
            sink.pause();
        }
        debug!("opened stream for {}", path.display());

        let status = PlaybackStatus {
            position_ms: 0,
            duration_ms: duration.map(as_millis),
            is_playing: autoplay,
            is_loaded: true,
            did_finish: false,
        };
        let handle = RodioHandle {
            sink,
            duration,
            finish_reported: false,
        };
        Ok((Box::new(handle), status))
    }
}

struct RodioHandle {
    sink: Sink,
    duration: Option<Duration>,
    finish_reported: bool,
}

impl OutputHandle for RodioHandle {
    fn pause(&mut self) -> Result<(), OutputError> {
        self.sink.pause();
        Ok(())
    }

    fn resume(&mut self) -> Result<(), OutputError> {
        self.sink.play();
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<(), OutputError> {
        self.sink
            .try_seek(Duration::from_millis(position_ms))
            .map_err(|e| OutputError::Seek(e.to_string()))
    }

    fn poll_status(&mut self) -> Option<PlaybackStatus> {
        if self.finish_reported {
            return None;
        }
        let did_finish = self.sink.empty();
        self.finish_reported = did_finish;
        Some(PlaybackStatus {
            position_ms: as_millis(self.sink.get_pos()),
            duration_ms: self.duration.map(as_millis),
            is_playing: !did_finish && !self.sink.is_paused(),
            is_loaded: true,
            did_finish,
        })
    }

    fn release(self: Box<Self>) {
        self.sink.stop();
    }
}
