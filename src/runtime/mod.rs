use std::env;
use std::path::PathBuf;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;

mod event_loop;
mod settings;
mod startup;

/// Library root: the first CLI argument, then `[library] root`, then the
/// working directory.
fn library_root(settings: &crate::config::Settings) -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    startup::init_logging(&settings.logging);

    let mut session = startup::build_session(&settings, library_root(&settings));
    startup::apply_playback_defaults(&mut session, &settings);
    startup::load_library(&mut session);

    let mut app = App::new(&settings.ui);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &mut session, &mut state)
    })();

    session.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
