use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Tab};
use crate::config;
use crate::session::PlaybackSession;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: drives the session, draws the UI and handles
/// input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlaybackSession,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Stream status, synthetic ticks and any completion they trigger.
        session.pump(Instant::now());

        let len = app.entries(session).len();
        app.clamp_selection(len);

        terminal.draw(|f| ui::draw(f, app, session, &settings.ui))?;

        // A pending load runs after its loading frame is on screen.
        if session.is_loading() {
            let count = session.load_catalog().len();
            info!("catalog loaded with {count} songs");
            continue;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, session, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn scrub_seconds(settings: &config::Settings) -> i64 {
    i64::try_from(settings.ui.scrub_seconds).unwrap_or(i64::MAX)
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlaybackSession,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        handle_filter_key(key, app, session);
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => {
            return true;
        }
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('1') => app.set_tab(Tab::Songs),
        KeyCode::Char('2') => app.set_tab(Tab::Library),
        KeyCode::Char('3') => app.set_tab(Tab::Settings),
        KeyCode::Char('/') => {
            app.set_tab(Tab::Songs);
            app.enter_filter_mode();
        }
        KeyCode::Esc => app.back(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            let len = app.entries(session).len();
            app.select_last(len);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.entries(session).len();
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let len = app.entries(session).len();
            app.prev(len);
        }
        KeyCode::Enter => app.activate(session),
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            if session.current_song().is_some() {
                session.toggle_play();
            } else if let Some(song) = app.selected_entry(session).and_then(|e| e.song().cloned()) {
                session.play_song(&song);
            }
        }
        KeyCode::Char('l') => session.next_song(),
        KeyCode::Char('h') => session.prev_song(),
        KeyCode::Char('L') => session.seek_by(scrub_seconds(settings)),
        KeyCode::Char('H') => session.seek_by(-scrub_seconds(settings)),
        KeyCode::Char('0') => session.seek_to(Duration::ZERO),
        KeyCode::Char('s') => session.toggle_shuffle(),
        KeyCode::Char('r') => session.toggle_repeat_mode(),
        KeyCode::Char('f') => {
            if let Some(song) = app.favorite_target(session) {
                session.toggle_favorite(&song.id);
            }
        }
        KeyCode::Char('o') => app.toggle_player(),
        KeyCode::Char('d') => app.toggle_dark_mode(),
        KeyCode::Char('R') => {
            if session.request_permission() {
                session.begin_load();
            }
        }
        _ => {}
    }

    false
}

fn handle_filter_key(key: KeyEvent, app: &mut App, session: &mut PlaybackSession) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Down => {
            let len = app.entries(session).len();
            app.next(len);
        }
        KeyCode::Up => {
            let len = app.entries(session).len();
            app.prev(len);
        }
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => {
            let len = app.entries(session).len();
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => {
            let len = app.entries(session).len();
            app.prev(len);
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.push_filter_char(c);
            }
        }
        KeyCode::Enter => {
            if app.entries(session).is_empty() {
                return;
            }
            app.exit_filter_mode();
            app.activate(session);
        }
        _ => {}
    }
}
