use axum::{
  extract::{Query, State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod game;
mod protocol;
mod transport;

use app::config::ServerConfig;
use app::room_id::{parse_room_id, ROOM_ID_PARAM};
use game::registry::RoomRegistry;
use transport::ws_session::handle_socket;

#[derive(Debug, Serialize)]
struct HealthResponse {
  ok: bool,
  rooms: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::from_env();
  tracing::info!(
    grid_size = config.room.grid_size,
    tick_ms = config.room.tick_interval.as_millis() as u64,
    winning_score = config.room.winning_score,
    "room settings"
  );

  let registry = Arc::new(RoomRegistry::new(config.room));

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/", get(ws_handler))
    .route("/ws", get(ws_handler))
    .route("/api/health", get(health))
    .layer(cors)
    .with_state(registry);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn health(State(registry): State<Arc<RoomRegistry>>) -> impl IntoResponse {
  Json(HealthResponse {
    ok: true,
    rooms: registry.len(),
  })
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Query(params): Query<HashMap<String, String>>,
  State(registry): State<Arc<RoomRegistry>>,
) -> impl IntoResponse {
  let room_id = parse_room_id(params.get(ROOM_ID_PARAM).map(String::as_str));
  ws.on_upgrade(move |socket| handle_socket(socket, registry, room_id))
}
