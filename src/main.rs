//! Chemboard · Chemistry Board Game Server
//!
//! - Axum HTTP + WebSocket API (one game per socket)
//! - Templated question banks (quiz + lab) with a small expression language
//! - Optional remote question proxy
//! - Static board client fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   GAME_CONFIG_PATH : path to TOML config (board, dice, timing, question sources)
//!   PROXY_URL        : enables the remote question proxy if present
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod chem;
mod config;
mod error;
mod game;
mod protocol;
mod proxy;
mod routes;
mod state;
mod telemetry;
mod template;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Config, template banks and proxy client; bad banks or dice abort startup.
  let state = Arc::new(AppState::new()?);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "chemboard", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "chemboard", "shutdown signal received");
    })
    .await?;
  Ok(())
}
