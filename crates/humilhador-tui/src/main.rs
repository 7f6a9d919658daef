mod api;
mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};
use anyhow::Result;
use tokio::sync::watch;

use humilhador_core::{action_for, Config, RevealState};

use crate::api::RoastApiClient;
use crate::app::App;
use crate::tui::EventHandler;

/// Log to a file; stderr belongs to the terminal UI.
fn init_logging() {
    let Some(dir) = dirs::data_local_dir().map(|d| d.join("humilhador")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }

    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("humilhador-tui.log"))
    {
        Ok(file) => file,
        Err(_) => return,
    };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Resolves when the reveal publishes a new step. Never resolves once the run is over.
async fn reveal_changed(rx: Option<watch::Receiver<RevealState>>) {
    match rx {
        Some(mut rx) => {
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {:#}", e);
        Config::new()
    });
    tracing::info!(
        "Starting TUI against {} with card variant {}",
        config.server_url,
        config.card_variant.as_str()
    );

    let api = RoastApiClient::new(&config.server_url);
    let action = Arc::from(action_for(config.card_variant, &config));
    let mut app = App::new(api, action);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = async {
        loop {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            let reveal_rx = app.reveal_rx.clone();
            tokio::select! {
                event = events.next() => match event {
                    Some(event) => handler::handle_event(&mut app, event).await?,
                    None => break,
                },
                _ = reveal_changed(reveal_rx) => {}
            }

            app.poll_tasks().await;

            if app.should_quit {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
