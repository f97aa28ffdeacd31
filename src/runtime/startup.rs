use std::path::PathBuf;

use log::{info, warn};

use crate::audio::{AudioOutput, NullOutput, RepeatMode, RodioOutput};
use crate::config::{self, RepeatModeSetting};
use crate::favorites::{KeyValueStore, MemoryStore, TomlFileStore};
use crate::library::DirectoryIndexer;
use crate::session::PlaybackSession;

impl From<RepeatModeSetting> for RepeatMode {
    fn from(setting: RepeatModeSetting) -> Self {
        match setting {
            RepeatModeSetting::Off => RepeatMode::Off,
            RepeatModeSetting::Track => RepeatMode::Track,
            RepeatModeSetting::Queue => RepeatMode::Queue,
        }
    }
}

/// Install the `colog` logger at the configured level. `off` installs nothing.
pub fn init_logging(logging: &config::LoggingSettings) {
    let level = logging.level_filter().unwrap_or(log::LevelFilter::Off);
    if level == log::LevelFilter::Off {
        return;
    }
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();
}

/// Wire the desktop collaborators into a session: the directory indexer,
/// a rodio output (or a null one without a device) and the favorites file.
pub fn build_session(settings: &config::Settings, root: PathBuf) -> PlaybackSession {
    let indexer = DirectoryIndexer::new(root, settings.library.clone());
    info!("indexing {}", indexer.root().display());

    let output: Box<dyn AudioOutput> = match RodioOutput::open() {
        Ok(output) => Box::new(output),
        Err(e) => {
            warn!("no audio output, songs will play as demos: {e}");
            Box::new(NullOutput::new(e.to_string()))
        }
    };

    let store: Box<dyn KeyValueStore> = match config::resolve_store_path(settings) {
        Some(path) => {
            let store = TomlFileStore::new(path);
            info!("favorites stored in {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!("no data directory, favorites will not be saved");
            Box::new(MemoryStore::default())
        }
    };

    PlaybackSession::new(
        Box::new(indexer),
        settings.library.max_assets,
        output,
        store,
    )
}

pub fn apply_playback_defaults(session: &mut PlaybackSession, settings: &config::Settings) {
    session.set_shuffle(settings.playback.shuffle);
    session.set_repeat_mode(settings.playback.repeat_mode.into());
}

/// Ask for media access and, when granted, load the catalog.
/// Request access and queue the first catalog load for the event loop.
pub fn load_library(session: &mut PlaybackSession) {
    if session.request_permission() {
        session.begin_load();
    } else {
        warn!("media access denied");
    }
}
