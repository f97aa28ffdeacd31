use std::time::Duration;

use super::*;

struct FakeIndexer {
    granted: bool,
    assets: Result<Vec<AudioAsset>, String>,
    detail_fails: bool,
}

impl FakeIndexer {
    fn with_assets(assets: Vec<AudioAsset>) -> Self {
        Self {
            granted: true,
            assets: Ok(assets),
            detail_fails: false,
        }
    }
}

impl MediaIndexer for FakeIndexer {
    fn request_permission(&mut self) -> Result<bool, IndexerError> {
        Ok(self.granted)
    }

    fn query_audio_assets(&mut self, limit: usize) -> Result<Vec<AudioAsset>, IndexerError> {
        match &self.assets {
            Ok(a) => Ok(a.iter().take(limit).cloned().collect()),
            Err(msg) => Err(IndexerError::Other(msg.clone())),
        }
    }

    fn asset_detail(&mut self, id: &str) -> Result<AssetDetail, IndexerError> {
        if self.detail_fails {
            return Err(IndexerError::AssetNotFound(id.to_string()));
        }
        Ok(AssetDetail {
            artist: (id == "a1").then(|| "Tagged Artist".to_string()),
            album: None,
        })
    }
}

fn asset(id: &str, filename: &str, secs: u64) -> AudioAsset {
    AudioAsset {
        id: id.into(),
        uri: format!("/music/{filename}"),
        filename: filename.into(),
        duration: Duration::from_secs(secs),
    }
}

fn song(id: &str, title: &str, artist: &str, album: &str) -> Song {
    Song {
        id: id.into(),
        uri: String::new(),
        title: title.into(),
        artist: artist.into(),
        album: album.into(),
        duration: Duration::from_secs(100),
        filename: None,
    }
}

#[test]
fn load_without_permission_keeps_previous_catalog() {
    let mut indexer = FakeIndexer::with_assets(vec![asset("a1", "x.mp3", 10)]);
    indexer.granted = false;
    let mut loader = CatalogLoader::new(Box::new(indexer));

    assert!(!loader.request_permission());
    assert!(loader.load_catalog().is_empty());
    assert!(!loader.has_permission());
}

#[test]
fn load_with_zero_assets_yields_the_fallback_catalog_in_order() {
    let mut loader = CatalogLoader::new(Box::new(FakeIndexer::with_assets(vec![])));
    assert!(loader.request_permission());

    let catalog = loader.load_catalog();
    assert_eq!(catalog.len(), 10);
    let ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
    assert_eq!(catalog.get(0).unwrap().title, "Feel Good Inc");
    assert_eq!(catalog.get(9).unwrap().title, "Mood");
    assert!(catalog.iter().all(|s| s.is_synthetic()));
    assert_eq!(catalog.get(3).unwrap().duration, Duration::from_secs(270));
}

#[test]
fn begin_load_marks_pending_until_load_runs() {
    let mut loader = CatalogLoader::new(Box::new(FakeIndexer::with_assets(vec![])));
    assert!(!loader.begin_load());
    assert!(!loader.is_loading());

    loader.request_permission();
    assert!(loader.begin_load());
    assert!(loader.is_loading());
    loader.load_catalog();
    assert!(!loader.is_loading());
}

#[test]
fn query_failure_falls_back_to_demo_catalog() {
    let mut indexer = FakeIndexer::with_assets(vec![]);
    indexer.assets = Err("boom".into());
    let mut loader = CatalogLoader::new(Box::new(indexer));
    loader.request_permission();
    assert_eq!(loader.load_catalog().len(), 10);
    assert!(!loader.is_loading());
}

#[test]
fn detail_failure_falls_back_to_demo_catalog() {
    let mut indexer = FakeIndexer::with_assets(vec![asset("a1", "x.mp3", 10)]);
    indexer.detail_fails = true;
    let mut loader = CatalogLoader::new(Box::new(indexer));
    loader.request_permission();
    assert_eq!(loader.load_catalog().get(0).unwrap().id, "1");
}

#[test]
fn real_assets_become_songs_with_placeholders() {
    let mut loader = CatalogLoader::new(Box::new(FakeIndexer::with_assets(vec![
        asset("a1", "01 - Intro.mp3", 61),
        asset("a2", "Outro.flac", 90),
    ])));
    loader.request_permission();
    let catalog = loader.load_catalog().clone();

    assert_eq!(catalog.len(), 2);
    let first = catalog.get(0).unwrap();
    assert_eq!(first.title, "01 - Intro");
    assert_eq!(first.artist, "Tagged Artist");
    assert_eq!(first.album, UNKNOWN_ALBUM);
    assert_eq!(first.filename.as_deref(), Some("01 - Intro.mp3"));
    assert!(!first.is_synthetic());

    let second = catalog.get(1).unwrap();
    assert_eq!(second.artist, UNKNOWN_ARTIST);
    assert_eq!(second.duration, Duration::from_secs(90));
}

#[test]
fn load_caps_assets_at_the_limit() {
    let assets = (0..5).map(|i| asset(&format!("id{i}"), "s.mp3", 1)).collect();
    let mut loader = CatalogLoader::with_limit(Box::new(FakeIndexer::with_assets(assets)), 3);
    loader.request_permission();
    assert_eq!(loader.load_catalog().len(), 3);
}

#[test]
fn reload_replaces_catalog_wholesale() {
    let mut loader =
        CatalogLoader::new(Box::new(FakeIndexer::with_assets(vec![asset("a2", "b.mp3", 5)])));
    loader.request_permission();
    loader.load_catalog();
    loader.load_catalog();
    assert_eq!(loader.catalog().len(), 1);
}

#[test]
fn strip_extension_only_removes_the_last_suffix() {
    assert_eq!(strip_extension("song.mp3"), "song");
    assert_eq!(strip_extension("a.b.flac"), "a.b");
    assert_eq!(strip_extension("noext"), "noext");
    assert_eq!(strip_extension("trailing."), "trailing.");
}

#[test]
fn display_title_cleans_file_titles() {
    let mut s = song("x", "01 - My Song.mp3", "A", "B");
    s.filename = Some("01 - My Song.mp3".into());
    assert_eq!(display_title(&s), "My Song");

    s.title = "[Live] Encore.ogg".into();
    assert_eq!(display_title(&s), "Encore");

    s.title = "07.Track.mp3".into();
    assert_eq!(display_title(&s), "Track");

    s.title = "1999".into();
    assert_eq!(display_title(&s), "1999");

    s.title = "01 - .mp3".into();
    assert_eq!(display_title(&s), UNKNOWN_TITLE);
}

#[test]
fn display_title_keeps_non_file_titles() {
    let s = song("x", "01 - Demo.mp3", "A", "B");
    assert_eq!(display_title(&s), "01 - Demo.mp3");
    let empty = song("y", "", "A", "B");
    assert_eq!(display_title(&empty), UNKNOWN_TITLE);
}

#[test]
fn format_duration_is_minutes_and_padded_seconds() {
    assert_eq!(format_duration(65), "1:05");
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(600), "10:00");
}

#[test]
fn subtitle_joins_artist_and_album() {
    assert_eq!(subtitle_text(&song("1", "t", "Gorillaz", "Demon Days")), "Gorillaz • Demon Days");
    assert_eq!(subtitle_text(&song("1", "t", "Gorillaz", "")), "Gorillaz");
    assert_eq!(subtitle_text(&song("1", "t", "", "")), UNKNOWN_ARTIST);
}

#[test]
fn filter_matches_title_artist_or_album_ignoring_case() {
    let songs = fallback_catalog().songs().to_vec();
    assert_eq!(filter_songs(&songs, "  ").len(), 10);

    let hits: Vec<&str> = filter_songs(&songs, "LOVE").iter().map(|s| s.id.as_str()).collect();
    assert_eq!(hits, vec!["7"]);

    let by_album = filter_songs(&songs, "fine line");
    assert_eq!(by_album.len(), 1);
    assert_eq!(by_album[0].title, "Watermelon Sugar");

    assert!(filter_songs(&songs, "zzz").is_empty());
}

#[test]
fn grouping_keeps_first_seen_order_and_counts() {
    let songs = vec![
        song("1", "a", "X", "One"),
        song("2", "b", "Y", "Two"),
        song("3", "c", "X", "Two"),
        song("4", "d", "", ""),
    ];

    let artists = group_by_artist(&songs);
    let names: Vec<&str> = artists.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["X", "Y", UNKNOWN_ARTIST]);
    assert_eq!(artists[0].count(), 2);

    let albums = group_by_album(&songs);
    assert_eq!(albums[1].name, "Two");
    assert_eq!(albums[1].subtitle.as_deref(), Some("Y, X"));
    assert_eq!(albums[2].name, UNKNOWN_ALBUM);
}
