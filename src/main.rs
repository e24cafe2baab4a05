mod shared;
mod error;
mod tui;
mod audio_api;
mod audio;
mod loader;
mod middle;
mod pipeline;
mod demo;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use anyhow::Context;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::CpalBackend;
use loader::FileDecoder;
use middle::Middle;
use pipeline::settings;
use shared::{InputEvent, TrackId, NUM_TRACKS};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

enum Command {
    Demo(PathBuf),
    Play(Vec<PathBuf>),
}

fn parse_args(args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let args: Vec<String> = args.collect();
    if args.first().map(String::as_str) == Some("--demo") {
        let dir = args.get(1).context("usage: duotrack --demo <DIR>")?;
        return Ok(Command::Demo(PathBuf::from(dir)));
    }
    if args.len() > NUM_TRACKS {
        anyhow::bail!("usage: duotrack [TRACK1] [TRACK2]");
    }
    Ok(Command::Play(args.into_iter().map(PathBuf::from).collect()))
}

fn init_logging(dir: &Path) -> anyhow::Result<()> {
    let path = settings::log_file_path(dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    // the tui owns the terminal, so logs go to the file only
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let tracks = match parse_args(std::env::args().skip(1))? {
        Command::Demo(dir) => {
            for path in demo::write_demo_tracks(&dir)? {
                println!("wrote {}", path.display());
            }
            return Ok(());
        }
        Command::Play(tracks) => tracks,
    };

    let work_dir = std::env::current_dir()?;
    init_logging(&work_dir)?;
    let settings = settings::load_or_seed(&work_dir);
    log::info!("starting with {:?}", settings);

    let mut middle = Middle::new(Arc::new(CpalBackend), Arc::new(FileDecoder), &settings);
    for (track, path) in TrackId::ALL.into_iter().zip(tracks) {
        middle.handle_input(InputEvent::Load(track, path));
    }

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = settings.ui_tick();
    let mut tui_state = tui::mode::TuiState::new(settings.volume_step);

    loop {
        let ds = middle.display_state().clone();
        tui_state.sync(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state);
        })?;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                // release both devices before the terminal comes back
                middle.shutdown();
                drop(term);
                return Ok(());
            }
            middle.handle_input(event);
        }

        middle.tick(Instant::now());
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
