//! Search and category views over a catalog.

use super::model::{Song, UNKNOWN_ALBUM, UNKNOWN_ARTIST};

/// Songs whose title, artist or album contains `query`, ignoring case.
/// A blank query matches everything.
pub fn filter_songs<'a>(songs: &'a [Song], query: &str) -> Vec<&'a Song> {
    let query = query.trim();
    if query.is_empty() {
        return songs.iter().collect();
    }
    let query = query.to_lowercase();
    songs
        .iter()
        .filter(|s| {
            s.title.to_lowercase().contains(&query)
                || s.artist.to_lowercase().contains(&query)
                || s.album.to_lowercase().contains(&query)
        })
        .collect()
}

/// Top-level entries of the library tab.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LibraryCategory {
    Artists,
    Albums,
    Favorites,
}

impl LibraryCategory {
    pub const ALL: [LibraryCategory; 3] = [Self::Artists, Self::Albums, Self::Favorites];

    pub fn title(self) -> &'static str {
        match self {
            Self::Artists => "Artists",
            Self::Albums => "Albums",
            Self::Favorites => "Favorites",
        }
    }
}

/// A named bucket of songs, e.g. one artist or one album.
#[derive(Debug, Clone)]
pub struct SongGroup {
    pub name: String,
    pub subtitle: Option<String>,
    pub songs: Vec<Song>,
}

impl SongGroup {
    pub fn count(&self) -> usize {
        self.songs.len()
    }
}

fn group_by<F>(songs: &[Song], key: F) -> Vec<SongGroup>
where
    F: Fn(&Song) -> String,
{
    let mut groups: Vec<SongGroup> = Vec::new();
    for song in songs {
        let name = key(song);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(g) => g.songs.push(song.clone()),
            None => groups.push(SongGroup {
                name,
                subtitle: None,
                songs: vec![song.clone()],
            }),
        }
    }
    groups
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Group songs by artist, in first-seen order.
pub fn group_by_artist(songs: &[Song]) -> Vec<SongGroup> {
    group_by(songs, |s| or_default(&s.artist, UNKNOWN_ARTIST))
}

/// Group songs by album, in first-seen order. The subtitle lists the album's
/// distinct artists.
pub fn group_by_album(songs: &[Song]) -> Vec<SongGroup> {
    let mut groups = group_by(songs, |s| or_default(&s.album, UNKNOWN_ALBUM));
    for g in &mut groups {
        let mut artists: Vec<&str> = Vec::new();
        for s in &g.songs {
            if !artists.contains(&s.artist.as_str()) {
                artists.push(&s.artist);
            }
        }
        g.subtitle = Some(artists.join(", "));
    }
    groups
}
