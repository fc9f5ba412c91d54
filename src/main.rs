use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, event, execute, terminal};
use flappy_loop::config::Tuning;
use flappy_loop::game::Game;
use flappy_loop::input::{self, Command};
use flappy_loop::render::{self, PixelBuf};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{self, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(33); // ~30 fps

/// Flappy Bird in the terminal. Space, Up, Enter or a left click to flap,
/// R to restart after a crash, Q or Esc to quit.
#[derive(Debug, Parser)]
#[command(name = "flappy-loop", version, about)]
struct Args {
    /// RON file overriding any of the tuning constants
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for the pipe gap sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Write diagnostics here; filter with RUST_LOG
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let tuning = match &args.config {
        Some(path) => Tuning::load(path).context("could not load tuning")?,
        None => Tuning::default(),
    };
    let rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut game = Game::new(tuning, rng);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    let result = enter(&mut out)
        .context("failed to set up the terminal")
        .and_then(|()| run(&mut out, &mut game));
    cleanup(&mut out)?;
    result
}

fn enter(out: &mut Stdout) -> io::Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        event::EnableMouseCapture,
    )
}

fn cleanup(out: &mut Stdout) -> io::Result<()> {
    execute!(
        out,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

fn run(out: &mut Stdout, game: &mut Game) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::for_terminal(cols, rows);
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match input::command_for(&event::read()?) {
                Some(Command::Jump) => game.jump(),
                Some(Command::Restart) => game.restart(),
                Some(Command::Quit) => {
                    tracing::info!(score = game.score(), "quit");
                    return Ok(());
                }
                Some(Command::Resize(c, r)) => buf.resize(c as usize, r as usize * 2),
                None => {}
            }
        }

        let now = Instant::now();
        game.advance(now - last);
        last = now;

        render::draw(game, &mut buf);
        buf.render(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

/// The terminal is the game's display, so logs only go to a file.
fn init_tracing(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
    Ok(())
}
