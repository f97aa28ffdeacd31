mod app;
mod audio;
mod config;
mod favorites;
mod library;
mod runtime;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
