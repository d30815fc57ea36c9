use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use desk_logging::{desk_info, desk_warn};
use ragdesk_core::{update, AppState, Msg};

use super::config::{self, AppConfig};
use super::effects::EffectRunner;
use super::logging;
use super::ui::input::{parse_command, Command, HELP_TEXT};
use super::ui::render::render;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = config::resolve_config_path(
        std::env::args().nth(1),
        std::env::var(config::CONFIG_ENV).ok(),
    );
    let (config, config_error) = match config::load_config(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination, config.log_level());
    if let Some(err) = config_error {
        desk_warn!("{err}; using defaults");
        eprintln!("Warning: {err}; using defaults");
    }
    desk_info!(
        "Starting against {} (push channel {})",
        config.server_url,
        config.websocket_url()
    );

    let runner =
        EffectRunner::new(config.engine_config()).context("failed to start the engine")?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

    spawn_stdin_reader(cmd_tx.clone())?;

    // Background tick to pick up engine events and coalesce rendering.
    thread::Builder::new()
        .name("ragdesk-tick".to_string())
        .spawn(move || {
            while cmd_tx.send(Command::Dispatch(Msg::Tick)).is_ok() {
                thread::sleep(TICK_INTERVAL);
            }
        })
        .context("failed to spawn the tick thread")?;

    println!("{HELP_TEXT}");
    let mut state = AppState::new();
    dispatch(&mut state, &runner, Msg::RefreshRequested);

    while let Ok(command) = cmd_rx.recv() {
        match command {
            Command::Dispatch(msg) => {
                dispatch(&mut state, &runner, msg);
                for msg in runner.drain() {
                    dispatch(&mut state, &runner, msg);
                }
                if state.consume_dirty() {
                    print!("{}", render(&state.view()));
                    io::stdout().flush().context("failed to write to stdout")?;
                }
            }
            Command::Help => println!("{HELP_TEXT}"),
            Command::Invalid(message) => println!("{message}"),
            Command::Quit => break,
        }
    }

    desk_info!("Shutting down with {} active job(s)", state.jobs().len());
    Ok(())
}

fn dispatch(state: &mut AppState, runner: &EffectRunner, msg: Msg) {
    let (next, effects) = update(std::mem::take(state), msg);
    *state = next;
    runner.enqueue(effects);
}

fn spawn_stdin_reader(cmd_tx: mpsc::Sender<Command>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("ragdesk-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        desk_warn!("Failed to read stdin: {err}");
                        break;
                    }
                };
                if let Some(command) = parse_command(&line) {
                    if cmd_tx.send(command).is_err() {
                        return;
                    }
                }
            }
            let _ = cmd_tx.send(Command::Quit);
        })
        .context("failed to spawn the stdin reader")?;
    Ok(())
}
