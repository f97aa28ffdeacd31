//! The playback session: one object owning the catalog, the favorites set
//! and the transport, created at startup and handed to the UI by reference.

use std::time::{Duration, Instant};

use log::info;

use crate::audio::{AudioOutput, RepeatMode, Transport, TransportState};
use crate::favorites::{FavoritesStore, KeyValueStore};
use crate::library::{Catalog, CatalogLoader, MediaIndexer, Song};

pub struct PlaybackSession {
    loader: CatalogLoader,
    favorites: FavoritesStore,
    transport: Transport,
}

impl PlaybackSession {
    pub fn new(
        indexer: Box<dyn MediaIndexer>,
        max_assets: usize,
        output: Box<dyn AudioOutput>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self::from_parts(
            CatalogLoader::with_limit(indexer, max_assets),
            FavoritesStore::load(store),
            Transport::new(output),
        )
    }

    pub fn from_parts(loader: CatalogLoader, favorites: FavoritesStore, transport: Transport) -> Self {
        Self {
            loader,
            favorites,
            transport,
        }
    }

    // Library

    pub fn request_permission(&mut self) -> bool {
        self.loader.request_permission()
    }

    pub fn has_permission(&self) -> bool {
        self.loader.has_permission()
    }

    /// Ready to play once media access is granted.
    pub fn is_player_ready(&self) -> bool {
        self.loader.has_permission()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn begin_load(&mut self) -> bool {
        self.loader.begin_load()
    }

    pub fn load_catalog(&mut self) -> &Catalog {
        self.loader.load_catalog()
    }

    pub fn catalog(&self) -> &Catalog {
        self.loader.catalog()
    }

    pub fn songs(&self) -> &[Song] {
        self.loader.catalog().songs()
    }

    // Transport

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.transport.current_song()
    }

    pub fn play_song(&mut self, song: &Song) {
        self.transport.play_song(song);
    }

    /// Play the catalog entry at `index`, if there is one.
    pub fn play_index(&mut self, index: usize) {
        if let Some(song) = self.loader.catalog().get(index) {
            self.transport.play_song(song);
        }
    }

    pub fn pause_song(&mut self) {
        self.transport.pause_song();
    }

    pub fn resume_song(&mut self) {
        self.transport.resume_song();
    }

    pub fn toggle_play(&mut self) {
        self.transport.toggle_play();
    }

    pub fn next_song(&mut self) {
        self.transport.next_song(self.loader.catalog());
    }

    pub fn prev_song(&mut self) {
        self.transport.prev_song(self.loader.catalog());
    }

    pub fn seek_to(&mut self, position: Duration) {
        self.transport.seek_to(position);
    }

    /// Scrub relative to the current position, clamped to the track.
    pub fn seek_by(&mut self, delta_secs: i64) {
        if self.transport.current_song().is_none() {
            return;
        }
        let progress = self.transport.progress();
        let step = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs < 0 {
            progress.saturating_sub(step)
        } else {
            (progress + step).min(self.transport.duration())
        };
        self.transport.seek_to(target);
    }

    pub fn toggle_shuffle(&mut self) {
        self.transport.toggle_shuffle();
    }

    pub fn toggle_repeat_mode(&mut self) {
        self.transport.toggle_repeat_mode();
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.transport.set_shuffle(on);
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.transport.set_repeat_mode(mode);
    }

    /// Observe the output and advance synthetic progress. Call once per
    /// control-loop iteration.
    pub fn pump(&mut self, now: Instant) {
        self.transport.pump(now, self.loader.catalog());
    }

    // Favorites

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn toggle_favorite(&mut self, id: &str) {
        self.favorites.toggle_favorite(id);
    }

    pub fn favorite_songs(&self) -> Vec<Song> {
        self.favorites.favorite_songs(self.loader.catalog())
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    /// Stop playback and release the output handle.
    pub fn shutdown(&mut self) {
        info!("shutting down playback session");
        self.transport.stop();
    }
}
