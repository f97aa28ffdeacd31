use std::time::Duration;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One playable track.
///
/// Two songs are equal when their ids are equal; the remaining fields are
/// display metadata.
#[derive(Debug, Clone)]
pub struct Song {
    pub id: String,
    /// Handle understood by the audio output. Empty for synthetic tracks.
    pub uri: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Expected length. A real stream's own duration wins once reported.
    pub duration: Duration,
    /// Source filename, only used to derive a cleaned display title.
    pub filename: Option<String>,
}

impl Song {
    /// A track without a decodable stream, played by the synthetic ticker.
    pub fn is_synthetic(&self) -> bool {
        self.uri.trim().is_empty()
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Song {}

/// Ordered song list. Replaced wholesale on reload, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
}

impl Catalog {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Index of the song with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.songs.iter().position(|s| s.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }
}
