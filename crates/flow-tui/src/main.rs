mod app;
mod render;
mod store;
mod theme;

use app::App;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use store::{BoardFile, LocalSessionStore};
use tracing_subscriber::EnvFilter;

/// Connect matching dots until every cell is filled
#[derive(Debug, Parser)]
#[command(name = "flow", version, about)]
struct Cli {
    /// Board definition (JSON); the built-in starter board when omitted
    #[arg(long, value_name = "FILE")]
    board: Option<PathBuf>,

    /// Ignore any saved progress for this board
    #[arg(long)]
    fresh: bool,

    /// Where sessions are saved
    #[arg(long, value_name = "DIR", env = "FLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Write logs here (filtered by RUST_LOG, default info)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let board = match &cli.board {
        Some(path) => BoardFile::read(path)?,
        None => BoardFile::demo(),
    };
    let store = LocalSessionStore::new(cli.data_dir.clone(), board);
    if cli.fresh {
        store.discard()?;
    }
    tracing::info!(board = store.board_id(), path = %store.path().display(), "starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Run the app
    let result = run_app(&mut stdout, store);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(stdout: &mut io::Stdout, store: LocalSessionStore) -> io::Result<()> {
    let started = Instant::now();
    let now_ms = || started.elapsed().as_secs_f64() * 1000.0;
    let tick_rate = Duration::from_millis(100);

    let mut app = App::new(store, terminal::size()?)?;
    let mut last_tick = Instant::now();

    loop {
        render::render(stdout, &app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Handle Ctrl+C
                    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                        break;
                    }

                    match app.handle_key(key) {
                        app::AppAction::Continue => {}
                        app::AppAction::Quit => break,
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(width, height) => app.on_resize(width, height, now_ms()),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick(now_ms());
            last_tick = Instant::now();
        }
    }

    Ok(())
}
