mod app;
mod config;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use app::App;
use config::ShellConfig;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use marmalade::{JsonFileStore, Session, SnapshotStore, SystemClock, Ticker};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::ui::draw;

#[derive(Clone)]
enum Event<I> {
    Input(I),
    Tick,
}

fn main() -> Result<()> {
    let config = ShellConfig::from_env();
    init_logging(&config)?;
    for warning in &config.warnings {
        warn!("{}", warning);
    }
    info!(
        "starting with save {:?}, tick every {:?}",
        config.save_path, config.tick_rate
    );

    let session = Session::open(JsonFileStore::new(&config.save_path), SystemClock);
    let mut app = App::new(session);
    let mut terminal = setup_terminal()?;
    let res = run_app(&mut terminal, &mut app, config.tick_rate);
    restore_terminal(&mut terminal)?;

    if let Err(e) = app.shutdown() {
        warn!("final save failed: {}", e);
        eprintln!("warning: could not save progress: {}", e);
    }
    res
}

fn init_logging(config: &ShellConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("opening log file {:?}", config.log_path))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app<S: SnapshotStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S, SystemClock>,
    tick_rate: Duration,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    let input_tx = tx.clone();
    thread::spawn(move || {
        loop {
            if !event::poll(Duration::from_millis(250)).unwrap_or(false) {
                continue;
            }
            match event::read() {
                Ok(CEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if input_tx.send(Event::Input(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => {}
            }
        }
    });

    let mut ticker = Ticker::spawn(tick_rate, tx, Event::Tick);
    app.on_tick();

    loop {
        terminal.draw(|f| draw(f, app))?;

        match rx.recv()? {
            Event::Input(key) => {
                app.on_key(key);
            }
            Event::Tick => {
                app.on_tick();
            }
        }

        if app.should_quit {
            break;
        }
    }

    ticker.cancel();
    Ok(())
}
