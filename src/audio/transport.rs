use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::library::{Catalog, Song};

use super::output::{AudioOutput, OutputHandle};
use super::ticker::Ticker;
use super::types::{PlaybackStatus, RepeatMode, TransportState};

/// What currently produces sound for the current song.
enum Source {
    /// Nothing: no song yet, or a real stream that ran out and was released.
    None,
    Stream(Box<dyn OutputHandle>),
    /// No decodable stream; the ticker advances progress instead.
    Synthetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Prev,
}

/// Play/pause/seek/next/prev state machine over a single output handle.
///
/// All transitions run synchronously on the caller's thread. `play_song`
/// releases the previous handle and stops the ticker before acquiring
/// anything new, so completion callbacks that chain into another
/// `play_song` never leave two sources alive.
pub struct Transport {
    output: Box<dyn AudioOutput>,
    source: Source,
    ticker: Ticker,
    current: Option<Song>,
    playing: bool,
    progress: Duration,
    duration: Duration,
    shuffle: bool,
    repeat: RepeatMode,
    rng: StdRng,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Transport {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self::with_rng(output, StdRng::from_entropy())
    }

    /// Transport with a caller-provided random source for shuffle picks.
    pub fn with_rng(output: Box<dyn AudioOutput>, rng: StdRng) -> Self {
        Self {
            output,
            source: Source::None,
            ticker: Ticker::default(),
            current: None,
            playing: false,
            progress: Duration::ZERO,
            duration: Duration::ZERO,
            shuffle: false,
            repeat: RepeatMode::Off,
            rng,
        }
    }

    pub fn state(&self) -> TransportState {
        TransportState {
            current_song: self.current.clone(),
            is_playing: self.playing,
            progress: self.progress,
            duration: self.duration,
            is_shuffle: self.shuffle,
            repeat_mode: self.repeat,
            is_synthetic: matches!(self.source, Source::Synthetic),
        }
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn progress(&self) -> Duration {
        self.progress
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the synthetic ticker is currently running.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.shuffle = on;
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Release whatever is producing sound and cancel the ticker.
    fn release_source(&mut self) {
        self.ticker.stop();
        if let Source::Stream(handle) = std::mem::replace(&mut self.source, Source::None) {
            handle.release();
        }
    }

    fn start_synthetic(&mut self, song: &Song) {
        self.source = Source::Synthetic;
        self.duration = song.duration;
        self.ticker.start();
    }

    /// Make `song` current and start it from the beginning.
    ///
    /// Songs without a uri, and songs whose stream cannot be opened, play
    /// synthetically for `song.duration`.
    pub fn play_song(&mut self, song: &Song) {
        self.release_source();

        if song.is_synthetic() {
            debug!("playing {} synthetically", song.id);
            self.start_synthetic(song);
        } else {
            match self.output.create(&song.uri, true) {
                Ok((handle, status)) => {
                    debug!("playing {} from {}", song.id, song.uri);
                    self.source = Source::Stream(handle);
                    self.duration = status
                        .duration_ms
                        .filter(|&ms| ms > 0)
                        .map(Duration::from_millis)
                        .unwrap_or(song.duration);
                }
                Err(e) => {
                    warn!("cannot open {}, playing synthetically: {e}", song.uri);
                    self.start_synthetic(song);
                }
            }
        }

        self.current = Some(song.clone());
        self.progress = Duration::ZERO;
        self.playing = true;
    }

    pub fn pause_song(&mut self) {
        if let Source::Stream(handle) = &mut self.source {
            if let Err(e) = handle.pause() {
                warn!("pause failed: {e}");
            }
        }
        self.ticker.stop();
        self.playing = false;
    }

    pub fn resume_song(&mut self) {
        let Some(song) = self.current.clone() else {
            return;
        };
        // The stream ran out and was released; reopen it at the last position.
        if matches!(self.source, Source::None) {
            let position = self.progress;
            self.play_song(&song);
            if !position.is_zero() && position < self.duration {
                self.seek_to(position);
            }
            return;
        }
        match &mut self.source {
            Source::Stream(handle) => {
                if let Err(e) = handle.resume() {
                    warn!("resume failed: {e}");
                }
            }
            Source::Synthetic => {
                if !self.ticker.is_active() {
                    self.ticker.start();
                }
            }
            Source::None => {}
        }
        self.playing = true;
    }

    /// Pause when playing, resume otherwise.
    pub fn toggle_play(&mut self) {
        if self.playing {
            self.pause_song();
        } else {
            self.resume_song();
        }
    }

    pub fn next_song(&mut self, catalog: &Catalog) {
        self.step(catalog, Direction::Next);
    }

    pub fn prev_song(&mut self, catalog: &Catalog) {
        self.step(catalog, Direction::Prev);
    }

    fn step(&mut self, catalog: &Catalog, direction: Direction) {
        if let Some(song) = self.pick_song(catalog, direction) {
            self.play_song(&song);
        }
    }

    fn pick_song(&mut self, catalog: &Catalog, direction: Direction) -> Option<Song> {
        self.pick_index(catalog, direction)
            .and_then(|i| catalog.get(i))
            .cloned()
    }

    /// Catalog index to move to, or `None` without a current song or catalog.
    ///
    /// With shuffle on, any index but the current one is equally likely and
    /// `direction` is ignored. A current song that is no longer in the
    /// catalog steps to the first (next) or last (prev) entry.
    fn pick_index(&mut self, catalog: &Catalog, direction: Direction) -> Option<usize> {
        let current = self.current.as_ref()?;
        if catalog.is_empty() {
            return None;
        }
        let len = catalog.len();
        let pos = catalog.position(&current.id);

        if self.shuffle && len > 1 {
            return Some(match pos {
                Some(cur) => {
                    let r = self.rng.gen_range(0..len - 1);
                    if r >= cur { r + 1 } else { r }
                }
                None => self.rng.gen_range(0..len),
            });
        }

        Some(match (pos, direction) {
            (Some(p), Direction::Next) => (p + 1) % len,
            (Some(p), Direction::Prev) => (p + len - 1) % len,
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => len - 1,
        })
    }

    pub fn seek_to(&mut self, position: Duration) {
        if let Source::Stream(handle) = &mut self.source {
            if let Err(e) = handle.seek(millis(position)) {
                warn!("seek failed: {e}");
            }
        }
        self.progress = position;
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn toggle_repeat_mode(&mut self) {
        self.repeat = self.repeat.cycle();
    }

    /// Stop playback and release the output handle. The current song stays.
    pub fn stop(&mut self) {
        self.release_source();
        self.playing = false;
        self.progress = Duration::ZERO;
    }

    /// Apply a status reported by the real stream.
    pub fn on_status(&mut self, status: PlaybackStatus, catalog: &Catalog) {
        if !status.is_loaded {
            return;
        }
        if let Some(ms) = status.duration_ms.filter(|&ms| ms > 0) {
            self.duration = Duration::from_millis(ms);
        }
        if status.is_playing {
            self.progress = Duration::from_millis(status.position_ms);
        }
        if status.did_finish {
            self.complete(catalog);
        }
    }

    /// Advance synthetic progress by the ticks elapsed up to `now`.
    pub fn tick(&mut self, now: Instant, catalog: &Catalog) {
        let ticks = self.ticker.poll(now);
        for _ in 0..ticks {
            if !self.playing || !matches!(self.source, Source::Synthetic) {
                break;
            }
            self.progress += self.ticker.interval();
            if self.progress >= self.duration {
                self.complete(catalog);
                break;
            }
        }
    }

    /// Observe the stream (if any) and drive the ticker. Called from the
    /// control loop on every iteration.
    pub fn pump(&mut self, now: Instant, catalog: &Catalog) {
        let status = match &mut self.source {
            Source::Stream(handle) => handle.poll_status(),
            _ => None,
        };
        if let Some(status) = status {
            self.on_status(status, catalog);
        }
        if self.is_ticking() {
            self.tick(now, catalog);
        }
    }

    /// End-of-track transition.
    fn complete(&mut self, catalog: &Catalog) {
        match self.repeat {
            RepeatMode::Track => self.replay_current(),
            RepeatMode::Queue => self.advance(catalog),
            RepeatMode::Off if catalog.len() > 1 => self.advance(catalog),
            RepeatMode::Off => self.finish(),
        }
    }

    fn replay_current(&mut self) {
        let Some(song) = self.current.clone() else {
            return;
        };
        if matches!(self.source, Source::Synthetic) {
            self.progress = Duration::ZERO;
            self.playing = true;
            if !self.ticker.is_active() {
                self.ticker.start();
            }
        } else {
            // A finished sink cannot be rewound; open the stream again.
            self.play_song(&song);
        }
    }

    fn advance(&mut self, catalog: &Catalog) {
        match self.pick_song(catalog, Direction::Next) {
            Some(song) => self.play_song(&song),
            None => self.finish(),
        }
    }

    fn finish(&mut self) {
        debug!("playback finished");
        if matches!(self.source, Source::Synthetic) {
            self.ticker.stop();
        } else {
            self.release_source();
        }
        self.playing = false;
        self.progress = Duration::ZERO;
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.release_source();
    }
}
