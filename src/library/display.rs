//! Display helpers shared by the song lists, the mini-player and the player popup.

use super::catalog::strip_extension;
use super::model::{Song, UNKNOWN_ARTIST};

pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Title to show for `song`.
///
/// Songs that came from a file get their title cleaned up: the extension,
/// a leading track number ("01 - ", "01.", "01 ") and a leading bracketed
/// tag are removed.
pub fn display_title(song: &Song) -> String {
    if song.title.is_empty() {
        return UNKNOWN_TITLE.to_string();
    }
    if song.filename.is_none() {
        return song.title.clone();
    }

    let clean = strip_extension(&song.title);
    let clean = strip_track_number(clean);
    let clean = strip_bracket_tag(clean).trim();

    if clean.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        clean.to_string()
    }
}

fn strip_track_number(s: &str) -> &str {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return s;
    }
    let rest = &s[digits..];
    let stripped = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '.' || c == '-');
    if stripped.len() == rest.len() {
        s
    } else {
        stripped
    }
}

fn strip_bracket_tag(s: &str) -> &str {
    if !s.starts_with('[') {
        return s;
    }
    match s.find(']') {
        Some(end) => &s[end + 1..],
        None => s,
    }
}

/// "Artist • Album", or just the artist when there is no album.
pub fn subtitle_text(song: &Song) -> String {
    let artist = if song.artist.trim().is_empty() {
        UNKNOWN_ARTIST
    } else {
        song.artist.as_str()
    };
    if song.album.trim().is_empty() {
        artist.to_string()
    } else {
        format!("{} • {}", artist, song.album)
    }
}

/// Format whole seconds as `m:ss`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
