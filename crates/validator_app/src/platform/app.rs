use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_debug, engine_info, engine_warn};
use validator_core::{update, AppState, Msg};

use super::cli::Cli;
use super::commands::{parse_line, Input, HELP};
use super::config::{self, API_URL_ENV};
use super::effects::EffectRunner;
use super::{logging, render};

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let resolved = config::resolve(&cli, std::env::var(API_URL_ENV).ok());
    let config = resolved.config;
    logging::initialize(config.log_destination, &config.log_file);
    for warning in &resolved.warnings {
        engine_warn!("{}", warning);
        eprintln!("Warning: {warning}");
    }
    engine_info!(
        "Starting validator_app api_url={} page_limit={} output_dir={}",
        config.api_url,
        config.page_limit,
        config.output_dir.display()
    );

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let effects = EffectRunner::new(config.engine_config(), input_tx.clone())
        .with_context(|| format!("connecting to {}", config.api_url))?;

    println!("Validation Service: {}", config.api_url);
    println!("{HELP}");
    spawn_prompt_reader(input_tx.clone());
    let _ = input_tx.send(Input::Msg(Msg::Refresh));

    let mut state = AppState::with_page_limit(config.page_limit);
    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(msg) => state = dispatch_msg(state, msg, &effects),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
        }
    }

    engine_info!("validator_app exiting");
    Ok(())
}

/// Runs one message through `update`, hands the effects to the engine and
/// prints notices plus a fresh view when anything visible changed.
fn dispatch_msg(state: AppState, msg: Msg, effects: &EffectRunner) -> AppState {
    if let Msg::PageLoaded { request_id, .. } | Msg::PageLoadFailed { request_id, .. } = &msg {
        if state.pagination().accepts(*request_id) {
            engine_debug!("Applying page response request_id={}", request_id);
        } else {
            engine_info!("Discarding stale page response request_id={}", request_id);
        }
    }
    let (mut state, pending) = update(state, msg);
    effects.enqueue(pending);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for notice in state.take_notices() {
        let _ = writeln!(out, "{}", render::notice_line(&notice));
    }
    if state.consume_dirty() {
        let _ = write!(out, "{}", render::render(&state.view()));
    }
    let _ = out.flush();
    state
}

fn spawn_prompt_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    engine_warn!("Failed to read from stdin: {}", err);
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(input)) => {
                    if input_tx.send(input).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{err:#}"),
            }
        }
        let _ = input_tx.send(Input::Quit);
    });
}
