use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod classifier;
mod config;
mod discord;
mod error;
mod models;
mod payload;
mod render;
mod webhook;

use config::Config;
use discord::DiscordClient;
use webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let state = AppState {
        sink: Arc::new(DiscordClient::new(
            config.discord_token,
            config.discord_api_url,
        )),
        channel: config.channel_id,
    };

    let app = webhook::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(
        "Webhook relay listening on {} (channel {})",
        config.bind_address,
        config.channel_id
    );

    axum::serve(listener, app).await?;

    Ok(())
}
