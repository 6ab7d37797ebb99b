//! smickel-playground - a terminal playground for the SmickelScript compiler
//!
//! Edit SmickelScript source, send it to the compile service and read back
//! the assembly or the compiler's error message.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod cli;
mod component;
mod components;
mod config;
mod error;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::cli::Cli;
use crate::component::Component;
use crate::config::Config;
use crate::tui::Tui;
use anyhow::Result;
use clap::Parser;
use crossterm::event::Event;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load_or_default();
    cli.apply(&mut config);

    if let Some(command) = cli.command {
        match cli::run(command, &config) {
            Ok(code) => std::process::exit(code),
            Err(err) => {
                tracing::error!(error = ?err, "command failed");
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }

    let mut app = App::new(config)?;

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        tracing::error!(error = ?err, "playground exited with an error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Log to `~/.smickel-playground/playground.log`; stdout belongs to the TUI
/// or to command output.
///
/// Filtered by `RUST_LOG`, `info` when unset. Failing to set up logging
/// leaves the playground running without it.
fn init_logging() {
    let Some(dir) = Config::config_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("playground.log"))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Paste(text) => {
                    app.paste(&text);
                    None
                }
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        }

        // Tick even while keys keep arriving so responses land during typing
        app.update(Action::Tick)?;
    }

    Ok(())
}
