//! Application model types: `App`, `Tab`, `LibraryView` and `Entry`.
//!
//! The `App` struct holds what the screen shows (tab, cursor, filter,
//! library drill-in, theme, popup). Playback itself lives in the
//! `PlaybackSession`; the model only reads from it and forwards actions.

use crate::config::UiSettings;
use crate::library::{LibraryCategory, Song, SongGroup, filter_songs, group_by_album, group_by_artist};
use crate::session::PlaybackSession;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tab {
    Songs,
    Library,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Self::Songs, Self::Library, Self::Settings];

    pub fn title(self) -> &'static str {
        match self {
            Self::Songs => "Songs",
            Self::Library => "Library",
            Self::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Songs => 0,
            Self::Library => 1,
            Self::Settings => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Where the library tab currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LibraryView {
    Categories,
    /// The artists or albums of a category.
    Groups(LibraryCategory),
    /// Songs of one group, or of the favorites category (`group == None`).
    Songs {
        category: LibraryCategory,
        group: Option<usize>,
    },
}

/// One row of the list in the current view.
#[derive(Debug, Clone)]
pub enum Entry {
    Song(Song),
    Category { category: LibraryCategory, count: usize },
    Group(SongGroup),
    DarkMode(bool),
}

impl Entry {
    pub fn song(&self) -> Option<&Song> {
        match self {
            Self::Song(song) => Some(song),
            _ => None,
        }
    }
}

/// The main application model.
pub struct App {
    pub tab: Tab,
    pub selected: usize,
    pub filter_mode: bool,
    pub filter_query: String,
    pub library_view: LibraryView,
    pub dark_mode: bool,
    pub player_open: bool,
    pub header_text: String,
}

impl App {
    pub fn new(ui: &UiSettings) -> Self {
        Self {
            tab: Tab::Songs,
            selected: 0,
            filter_mode: false,
            filter_query: String::new(),
            library_view: LibraryView::Categories,
            dark_mode: ui.dark_mode,
            player_open: false,
            header_text: ui.header_text.clone(),
        }
    }

    /// Switch tabs. The cursor goes back to the top and filter typing ends.
    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
        self.filter_mode = false;
    }

    pub fn next_tab(&mut self) {
        self.set_tab(self.tab.next());
    }

    pub fn toggle_player(&mut self) {
        self.player_open = !self.player_open;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Rows of the current view, in display order.
    pub fn entries(&self, session: &PlaybackSession) -> Vec<Entry> {
        match self.tab {
            Tab::Songs => filter_songs(session.songs(), &self.filter_query)
                .into_iter()
                .cloned()
                .map(Entry::Song)
                .collect(),
            Tab::Library => self.library_entries(session),
            Tab::Settings => vec![Entry::DarkMode(self.dark_mode)],
        }
    }

    fn library_entries(&self, session: &PlaybackSession) -> Vec<Entry> {
        match self.library_view {
            LibraryView::Categories => LibraryCategory::ALL
                .iter()
                .map(|&category| Entry::Category {
                    category,
                    count: category_count(session, category),
                })
                .collect(),
            LibraryView::Groups(category) => groups(session, category)
                .into_iter()
                .map(Entry::Group)
                .collect(),
            LibraryView::Songs { category, group } => {
                let songs = match group {
                    Some(i) => groups(session, category)
                        .into_iter()
                        .nth(i)
                        .map(|g| g.songs)
                        .unwrap_or_default(),
                    None => session.favorite_songs(),
                };
                songs.into_iter().map(Entry::Song).collect()
            }
        }
    }

    pub fn selected_entry(&self, session: &PlaybackSession) -> Option<Entry> {
        self.entries(session).into_iter().nth(self.selected)
    }

    /// Title of the list block for the current view.
    pub fn view_title(&self, session: &PlaybackSession) -> String {
        match (self.tab, self.library_view) {
            (Tab::Library, LibraryView::Groups(category)) => category.title().to_string(),
            (Tab::Library, LibraryView::Songs { category, group: Some(i) }) => {
                groups(session, category)
                    .into_iter()
                    .nth(i)
                    .map(|g| g.name)
                    .unwrap_or_else(|| category.title().to_string())
            }
            (Tab::Library, LibraryView::Songs { category, group: None }) => {
                category.title().to_string()
            }
            (tab, _) => tab.title().to_string(),
        }
    }

    /// Act on the selected row: play a song, drill into a category or
    /// group, or flip a setting.
    pub fn activate(&mut self, session: &mut PlaybackSession) {
        let Some(entry) = self.selected_entry(session) else {
            return;
        };
        match entry {
            Entry::Song(song) => {
                self.filter_mode = false;
                session.play_song(&song);
            }
            Entry::Category { category, .. } => {
                self.library_view = match category {
                    LibraryCategory::Favorites => LibraryView::Songs {
                        category,
                        group: None,
                    },
                    _ => LibraryView::Groups(category),
                };
                self.selected = 0;
            }
            Entry::Group(_) => {
                if let LibraryView::Groups(category) = self.library_view {
                    self.library_view = LibraryView::Songs {
                        category,
                        group: Some(self.selected),
                    };
                    self.selected = 0;
                }
            }
            Entry::DarkMode(_) => self.toggle_dark_mode(),
        }
    }

    /// Step out of the innermost thing: the popup, filter typing, the
    /// active filter, or one library level.
    pub fn back(&mut self) {
        if self.player_open {
            self.player_open = false;
            return;
        }
        match self.tab {
            Tab::Songs => self.clear_filter(),
            Tab::Library => {
                let (view, selected) = match self.library_view {
                    LibraryView::Categories => return,
                    LibraryView::Groups(category) => {
                        (LibraryView::Categories, category_position(category))
                    }
                    LibraryView::Songs {
                        category,
                        group: Some(i),
                    } => (LibraryView::Groups(category), i),
                    LibraryView::Songs {
                        category,
                        group: None,
                    } => (LibraryView::Categories, category_position(category)),
                };
                self.library_view = view;
                self.selected = selected;
            }
            Tab::Settings => {}
        }
    }

    pub fn enter_filter_mode(&mut self) {
        if self.tab == Tab::Songs {
            self.filter_mode = true;
        }
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.selected = 0;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.selected = 0;
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.selected = 0;
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor inside a list that may have shrunk (reload, unfavorite).
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// The song `f` acts on: the current song while the player is open,
    /// otherwise the selected row if it is a song.
    pub fn favorite_target(&self, session: &PlaybackSession) -> Option<Song> {
        if self.player_open {
            return session.current_song().cloned();
        }
        self.selected_entry(session)
            .and_then(|e| e.song().cloned())
    }
}

fn groups(session: &PlaybackSession, category: LibraryCategory) -> Vec<SongGroup> {
    match category {
        LibraryCategory::Artists => group_by_artist(session.songs()),
        LibraryCategory::Albums => group_by_album(session.songs()),
        LibraryCategory::Favorites => Vec::new(),
    }
}

fn category_count(session: &PlaybackSession, category: LibraryCategory) -> usize {
    match category {
        LibraryCategory::Favorites => session.favorite_songs().len(),
        _ => groups(session, category).len(),
    }
}

fn category_position(category: LibraryCategory) -> usize {
    LibraryCategory::ALL
        .iter()
        .position(|&c| c == category)
        .unwrap_or(0)
}
