use std::path::PathBuf;

use serde::Deserialize;

use crate::library::MAX_ASSETS;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Repeat mode at startup.
    pub repeat_mode: RepeatModeSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat_mode: RepeatModeSetting::Off,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "none", alias = "no-repeat", alias = "no_repeat")]
    Off,
    #[serde(alias = "one", alias = "repeat-one", alias = "loop-one", alias = "loop_one")]
    Track,
    #[serde(alias = "all", alias = "repeat-all", alias = "loop-all", alias = "loop_all")]
    Queue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory to index. Defaults to the working directory.
    pub root: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during indexing.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Cap on the number of assets pulled in one load.
    pub max_assets: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_assets: MAX_ASSETS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Start in the dark theme.
    pub dark_mode: bool,
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            header_text: " ~ encore ~ ".to_string(),
            scrub_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Key-value store file used for favorites.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    ///
    /// Logs go to stderr, which shares the terminal with the UI, so this
    /// stays `off` unless stderr is redirected.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "off".to_string(),
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        self.level.trim().parse().ok()
    }
}
