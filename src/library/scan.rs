use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use log::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::indexer::{AssetDetail, AudioAsset, IndexerError, MediaIndexer};

/// Desktop media indexer: walks a directory tree for audio files.
///
/// Asset ids are the file paths, and the uri handed to the audio output is
/// the same path. Each file is parsed once per query; the tags read then are
/// served by [`MediaIndexer::asset_detail`].
pub struct DirectoryIndexer {
    root: PathBuf,
    settings: LibrarySettings,
    details: HashMap<String, AssetDetail>,
}

impl DirectoryIndexer {
    pub fn new(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        Self {
            root: root.into(),
            settings,
            details: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Duration and artist/album tags. Untagged or undecodable files get a zero
/// duration and an empty detail.
fn read_tags(path: &Path) -> (Duration, AssetDetail) {
    let Ok(tagged) = lofty::read_from_path(path) else {
        return (Duration::ZERO, AssetDetail::default());
    };
    let duration = tagged.properties().duration();
    let detail = match tagged.primary_tag().or_else(|| tagged.first_tag()) {
        Some(tag) => AssetDetail {
            artist: non_blank(tag.artist()),
            album: non_blank(tag.album()),
        },
        None => AssetDetail::default(),
    };
    (duration, detail)
}

/// Path as an id. Non-UTF-8 paths are converted lossily, so a `#n` suffix
/// keeps colliding ids apart.
fn unique_id(path: &Path, taken: &HashMap<String, AssetDetail>) -> String {
    let base = path.to_string_lossy().into_owned();
    if !taken.contains_key(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let id = format!("{base}#{n}");
        if !taken.contains_key(&id) {
            return id;
        }
        n += 1;
    }
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl MediaIndexer for DirectoryIndexer {
    fn request_permission(&mut self) -> Result<bool, IndexerError> {
        match fs::read_dir(&self.root) {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.kind(), io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound) => {
                debug!("no access to {}: {e}", self.root.display());
                Ok(false)
            }
            Err(source) => Err(IndexerError::Unreadable {
                path: self.root.clone(),
                source,
            }),
        }
    }

    fn query_audio_assets(&mut self, limit: usize) -> Result<Vec<AudioAsset>, IndexerError> {
        if !self.root.is_dir() {
            return Err(IndexerError::PermissionDenied);
        }

        let settings = &self.settings;
        let mut walker = WalkDir::new(&self.root)
            .follow_links(settings.follow_links)
            .sort_by_file_name();
        if !settings.recursive {
            walker = walker.max_depth(1);
        }

        self.details.clear();
        let mut assets = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        {
            if assets.len() >= limit {
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(IndexerError::Other(e.to_string())),
                Err(e) => {
                    debug!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || !is_audio_file(path, settings) {
                continue;
            }

            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();
            let id = unique_id(path, &self.details);
            let (duration, detail) = read_tags(path);

            assets.push(AudioAsset {
                uri: path.to_string_lossy().into_owned(),
                duration,
                filename,
                id: id.clone(),
            });
            self.details.insert(id, detail);
        }

        debug!("indexed {} audio files under {}", assets.len(), self.root.display());
        Ok(assets)
    }

    fn asset_detail(&mut self, id: &str) -> Result<AssetDetail, IndexerError> {
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| IndexerError::AssetNotFound(id.to_string()))
    }
}
