//! Health endpoint for the hosting platform's process supervisor.
//!
//! Deliberately independent of the bot: it answers as soon as the listener
//! is up, whatever state the dialogue engine or tokens are in.

use std::net::SocketAddr;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tracing::info;

pub fn router() -> Router {
    Router::new().route("/", get(health))
}

async fn health() -> &'static str {
    "OK"
}

pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Health endpoint listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
