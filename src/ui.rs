//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It
//! only reads from the `App` model and the `PlaybackSession`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, Entry, Tab};
use crate::audio::TransportState;
use crate::config::UiSettings;
use crate::library::{Song, display_title, format_duration, subtitle_text};
use crate::session::PlaybackSession;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "open/play".to_string());
    map.insert("esc".to_string(), "back".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L is filled dynamically from config.
    map.insert("tab".to_string(), "switch tab".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("f".to_string(), "favorite".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("o".to_string(), "player".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "esc", "space/p", "gg/G", "tab", "/", "f", "s", "r",
        "o", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

struct Theme {
    base: Style,
    accent: Color,
    dim: Style,
}

impl Theme {
    fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                base: Style::default().fg(Color::White).bg(Color::Black),
                accent: Color::Cyan,
                dim: Style::default().fg(Color::DarkGray),
            }
        } else {
            Self {
                base: Style::default().fg(Color::Black).bg(Color::White),
                accent: Color::Blue,
                dim: Style::default().fg(Color::Gray),
            }
        }
    }
}

/// `m:ss / m:ss` for the current position.
fn position_text(state: &TransportState) -> String {
    format!(
        "{} / {}",
        format_duration(state.progress.as_secs()),
        format_duration(state.duration.as_secs())
    )
}

fn progress_ratio(progress: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (progress.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

fn play_symbol(state: &TransportState) -> &'static str {
    if state.is_playing { "▶" } else { "⏸" }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn song_item<'a>(song: &Song, session: &PlaybackSession, theme: &Theme) -> ListItem<'a> {
    let current = session
        .current_song()
        .map(|c| c.id == song.id)
        .unwrap_or(false);
    let marker = if current { "♪ " } else { "  " };
    let heart = if session.is_favorite(&song.id) { " ♥" } else { "" };

    let mut title = Style::default();
    if current {
        title = title.fg(theme.accent).add_modifier(Modifier::BOLD);
    }

    ListItem::new(Line::from(vec![
        Span::raw(marker),
        Span::styled(display_title(song), title),
        Span::styled(heart, Style::default().fg(Color::Red)),
        Span::styled(format!("  {}", subtitle_text(song)), theme.dim),
        Span::styled(
            format!("  {}", format_duration(song.duration.as_secs())),
            theme.dim,
        ),
    ]))
}

fn entry_item<'a>(entry: &Entry, session: &PlaybackSession, theme: &Theme) -> ListItem<'a> {
    match entry {
        Entry::Song(song) => song_item(song, session, theme),
        Entry::Category { category, count } => ListItem::new(Line::from(vec![
            Span::raw(category.title()),
            Span::styled(format!("  ({count})"), theme.dim),
        ])),
        Entry::Group(group) => {
            let mut spans = vec![
                Span::raw(group.name.clone()),
                Span::styled(format!("  ({})", group.count()), theme.dim),
            ];
            if let Some(sub) = group.subtitle.as_deref().filter(|s| !s.is_empty()) {
                spans.push(Span::styled(format!("  {sub}"), theme.dim));
            }
            ListItem::new(Line::from(spans))
        }
        Entry::DarkMode(on) => ListItem::new(format!(
            "Dark mode: {}",
            if *on { "on" } else { "off" }
        )),
    }
}

fn draw_list(frame: &mut Frame, app: &App, session: &PlaybackSession, theme: &Theme, area: Rect) {
    let title = if app.tab == Tab::Songs && (app.filter_mode || !app.filter_query.is_empty()) {
        let cursor = if app.filter_mode { "_" } else { "" };
        format!(" {} /{}{} ", app.view_title(session), app.filter_query, cursor)
    } else if app.tab == Tab::Settings {
        format!(" Settings · {} favorites saved ", session.favorite_count())
    } else {
        format!(" {} ", app.view_title(session))
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.tab != Tab::Settings && !session.has_permission() {
        let msg = Paragraph::new(
            "No access to your music.\n\nPress R to grant access and reload the library.",
        )
        .alignment(Alignment::Center)
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(msg, area);
        return;
    }

    if session.is_loading() {
        let msg = Paragraph::new("Loading your library...")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let entries = app.entries(session);
    if entries.is_empty() {
        let empty = if app.tab == Tab::Songs && !app.filter_query.trim().is_empty() {
            "No songs match your search."
        } else {
            "Nothing here yet."
        };
        let msg = Paragraph::new(empty)
            .style(theme.dim)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    // Center the selected item when possible; only build items for the window.
    let total = entries.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.selected.min(total - 1);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let items: Vec<ListItem> = entries[start..end]
        .iter()
        .map(|e| entry_item(e, session, theme))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected_pos_in_visible));
    frame.render_stateful_widget(list, area, &mut state);
}

fn mini_player_text(state: &TransportState) -> String {
    let mut parts: Vec<String> = Vec::new();
    match &state.current_song {
        Some(song) => {
            parts.push(format!("{} {}", play_symbol(state), display_title(song)));
            parts.push(subtitle_text(song));
            parts.push(position_text(state));
        }
        None => parts.push("Nothing playing".to_string()),
    }
    parts.push(format!(
        "Shuffle: {}",
        if state.is_shuffle { "ON" } else { "OFF" }
    ));
    parts.push(state.repeat_mode.label().to_string());
    parts.join(" • ")
}

fn draw_player(frame: &mut Frame, session: &PlaybackSession, theme: &Theme, area: Rect) {
    let popup = centered_rect_sized(64, 12, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" now playing (o closes) ")
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
        .style(theme.base);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let state = session.state();
    let Some(song) = state.current_song.as_ref() else {
        let msg = Paragraph::new("Nothing playing. Pick a song and press enter.")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1), Constraint::Length(2)])
        .split(inner);

    let favorite = if session.is_favorite(&song.id) {
        "♥ favorite"
    } else {
        "♡ not a favorite"
    };
    let mut lines = vec![
        Line::from(Span::styled(
            display_title(song),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Artist: {}", song.artist)),
        Line::from(format!("Album: {}", song.album)),
        Line::from(Span::styled(favorite, Style::default().fg(Color::Red))),
    ];
    if state.is_synthetic {
        lines.push(Line::from(Span::styled("demo playback", theme.dim)));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent))
        .ratio(progress_ratio(state.progress, state.duration))
        .label(position_text(&state));
    frame.render_widget(gauge, rows[1]);

    let status = format!(
        "{} {} • Shuffle: {} • {}",
        play_symbol(&state),
        if state.is_playing { "Playing" } else { "Paused" },
        if state.is_shuffle { "ON" } else { "OFF" },
        state.repeat_mode.label()
    );
    frame.render_widget(
        Paragraph::new(status).alignment(Alignment::Center),
        rows[2],
    );
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, session: &PlaybackSession, ui_settings: &UiSettings) {
    let theme = Theme::new(app.dark_mode);
    frame.render_widget(Block::default().style(theme.base), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(app.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(app.tab.index())
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, chunks[1]);

    draw_list(frame, app, session, &theme, chunks[2]);

    let mini_text = if session.is_player_ready() {
        mini_player_text(&session.state())
    } else {
        "Player not ready: no access to your music".to_string()
    };
    let mini = Paragraph::new(mini_text)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" player "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(mini, chunks[3]);

    if app.player_open {
        draw_player(frame, session, &theme, chunks[2]);
    }

    let footer = Paragraph::new(controls_text(ui_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
