use std::time::Duration;

use log::{debug, info, warn};

use super::indexer::{IndexerError, MediaIndexer};
use super::model::{Catalog, Song, UNKNOWN_ALBUM, UNKNOWN_ARTIST};

/// Upper bound on assets pulled from the indexer in one load.
pub const MAX_ASSETS: usize = 500;

/// Loads the song catalog from a [`MediaIndexer`].
///
/// `load_catalog` is soft: without permission it keeps the previous catalog,
/// and an empty or failed query yields [`fallback_catalog`].
pub struct CatalogLoader {
    indexer: Box<dyn MediaIndexer>,
    max_assets: usize,
    permission: bool,
    loading: bool,
    catalog: Catalog,
}

impl CatalogLoader {
    pub fn new(indexer: Box<dyn MediaIndexer>) -> Self {
        Self::with_limit(indexer, MAX_ASSETS)
    }

    pub fn with_limit(indexer: Box<dyn MediaIndexer>, max_assets: usize) -> Self {
        Self {
            indexer,
            max_assets: max_assets.max(1),
            permission: false,
            loading: false,
            catalog: Catalog::default(),
        }
    }

    /// Request media access. An indexer error counts as a denial.
    pub fn request_permission(&mut self) -> bool {
        self.permission = match self.indexer.request_permission() {
            Ok(granted) => granted,
            Err(e) => {
                warn!("permission request failed: {e}");
                false
            }
        };
        if !self.permission {
            info!("media library access not granted");
        }
        self.permission
    }

    pub fn has_permission(&self) -> bool {
        self.permission
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Mark a load as pending so it can be shown before `load_catalog` runs.
    /// Returns `false` without permission.
    pub fn begin_load(&mut self) -> bool {
        self.loading = self.permission;
        self.loading
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reload the catalog, replacing the previous one.
    pub fn load_catalog(&mut self) -> &Catalog {
        if !self.permission {
            debug!("catalog load skipped: no permission");
            self.loading = false;
            return &self.catalog;
        }

        self.loading = true;
        let songs = match self.fetch_songs() {
            Ok(songs) if songs.is_empty() => {
                info!("indexer returned no audio assets, using demo catalog");
                fallback_catalog()
            }
            Ok(songs) => {
                info!("loaded {} songs from media library", songs.len());
                Catalog::new(songs)
            }
            Err(e) => {
                warn!("catalog load failed, using demo catalog: {e}");
                fallback_catalog()
            }
        };
        self.catalog = songs;
        self.loading = false;
        &self.catalog
    }

    fn fetch_songs(&mut self) -> Result<Vec<Song>, IndexerError> {
        let assets = self.indexer.query_audio_assets(self.max_assets)?;

        let mut songs = Vec::with_capacity(assets.len().min(self.max_assets));
        for asset in assets.into_iter().take(self.max_assets) {
            let detail = self.indexer.asset_detail(&asset.id)?;
            songs.push(Song {
                title: strip_extension(&asset.filename).to_string(),
                artist: detail.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                album: detail.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
                duration: asset.duration,
                filename: Some(asset.filename),
                id: asset.id,
                uri: asset.uri,
            });
        }
        Ok(songs)
    }
}

/// Drop a trailing `.ext` from a filename. A dot at the very end is kept.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() && !name[i + 1..].contains('/') => &name[..i],
        _ => name,
    }
}

/// The fixed ten-song demo catalog. Every entry is synthetic.
pub fn fallback_catalog() -> Catalog {
    const DEMO: [(&str, &str, &str, u64); 10] = [
        ("Feel Good Inc", "Gorillaz", "Demon Days", 222),
        ("Blinding Lights", "The Weeknd", "After Hours", 200),
        (
            "Bad Guy",
            "Billie Eilish",
            "WHEN WE ALL FALL ASLEEP, WHERE DO WE GO?",
            194,
        ),
        ("Uptown Funk", "Mark Ronson ft. Bruno Mars", "Uptown Special", 270),
        ("Shape of You", "Ed Sheeran", "÷ (Divide)", 234),
        ("Levitating", "Dua Lipa", "Future Nostalgia", 203),
        ("Savage Love", "Jason Derulo", "Savage Love - Single", 174),
        ("Watermelon Sugar", "Harry Styles", "Fine Line", 174),
        ("Dance Monkey", "Tones and I", "The Kids Are Coming", 210),
        ("Mood", "24kGoldn ft. iann dior", "El Dorado", 140),
    ];

    Catalog::new(
        DEMO.iter()
            .enumerate()
            .map(|(i, &(title, artist, album, secs))| Song {
                id: (i + 1).to_string(),
                uri: String::new(),
                title: title.to_string(),
                artist: artist.to_string(),
                album: album.to_string(),
                duration: Duration::from_secs(secs),
                filename: None,
            })
            .collect(),
    )
}
