//! Drawesome Player - headless terminal client.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drawesome_player::infrastructure::http_client::UploadClient;
use drawesome_player::infrastructure::terminal::{parse_line, TerminalInput, TracingPresenter};
use drawesome_player::infrastructure::websocket::create_connection;
use drawesome_player::{spawn_session, PlayerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drawesome_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Drawesome Player");

    let config = PlayerConfig::from_env().context("invalid player configuration")?;
    tracing::info!(
        game_id = %config.game_id,
        socket = %config.socket_url,
        "Joining game"
    );

    let uploads = Arc::new(
        UploadClient::new(
            &config.origin,
            config.cookies.as_deref(),
            config.upload_timeout,
        )
        .context("failed to create upload client")?,
    );

    let connection = create_connection(config.socket_url.clone(), config.reconnect);
    let input = TerminalInput::default();
    let session = spawn_session(
        TracingPresenter,
        input.clone(),
        connection.command_bus,
        connection.events,
        uploads,
        config.session_settings(),
    );

    let intents = session.intents();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_done = std::pin::pin!(session.join());
    loop {
        tokio::select! {
            finished = &mut session_done => {
                let session = finished.context("session task panicked")?;
                tracing::info!(
                    screen = ?session.active_screen(),
                    cancelled = session.is_cancelled(),
                    "Session ended"
                );
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    tracing::info!("Stdin closed, disconnecting");
                    connection.handle.disconnect();
                    break;
                };
                match parse_line(&line) {
                    Some(command) => {
                        if let Some(intent) = input.apply(command) {
                            intents.send(intent);
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => tracing::warn!(line = %line, "Unrecognized command"),
                }
            }
        }
    }

    Ok(())
}
