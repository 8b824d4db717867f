/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::level::{load_levels, SymbolTable};
use sim::session::Session;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_tracing(&config);
    for w in &config.warnings {
        warn!("{w}");
    }

    let levels = load_levels(&config);
    let mut session = match Session::new(levels, config.start_level, SymbolTable::default()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    if session.finished {
        println!("Meepo cleared all {} levels. Thanks for playing!", session.level_count());
    } else {
        println!(
            "Thanks for playing Meepo Is You! Reached level {}: {}",
            session.level_index + 1,
            session.level_name(),
        );
    }
}

/// RUST_LOG wins over `[log] level`. Logs go to `[log] file` when set,
/// otherwise stderr.
fn init_tracing(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    let file = config.log.file.as_ref().and_then(|path| match File::create(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", path.display());
            None
        }
    });

    match file {
        Some(f) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(f))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        input.drain_events();

        if input.quit_pressed() {
            info!(level = session.level_index, "quit");
            break;
        }
        if input.restart_pressed() {
            input.clear();
            session.restart()?;
        }

        if last_tick.elapsed() >= tick_rate {
            let level = session.level_index;
            session.tick(input.next_controls())?;
            if session.level_index != level {
                input.clear();
            }
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
