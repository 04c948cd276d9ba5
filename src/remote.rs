use axum::{
  Json, Router,
  extract::State,
  routing::{get, post},
};
use log::error;
use std::{
  net::SocketAddr,
  sync::{Arc, Mutex, mpsc::Sender},
};
use tower_http::trace::{self, TraceLayer};

use crate::map::{controller::ControllerSnapshot, map_event::MapEvent};

pub const DEFAULT_PORT: u16 = 12346;

pub async fn influmap_remote_handler(
  State(remote): State<Remote>,
  Json(event): Json<MapEvent>,
) -> String {
  remote.handle_map_event(event);
  42.to_string()
}

async fn healthcheck() {}

async fn state(State(remote): State<Remote>) -> Json<Option<ControllerSnapshot>> {
  Json(remote.snapshot())
}

pub fn spawn_remote_runner(runtime: tokio::runtime::Runtime, remote: Remote, port: u16) {
  std::thread::spawn(move || {
    runtime.block_on(async {
      if let Err(e) = remote_runner(remote, port).await {
        error!("Remote on port {port} stopped: {e}");
      }
    });
  });
}

pub fn router(remote: Remote) -> Router {
  Router::new()
    .route("/", post(influmap_remote_handler))
    .route("/healthcheck", get(healthcheck))
    .route("/state", get(state))
    .with_state(remote)
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(trace::DefaultOnResponse::new().level(tracing::Level::INFO)),
    )
}

pub async fn remote_runner(remote: Remote, port: u16) -> std::io::Result<()> {
  let addr = SocketAddr::from(([127, 0, 0, 1], port));
  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, router(remote)).await
}

/// Forwards events to the controller thread and serves its latest snapshot.
#[derive(Clone)]
pub struct Remote {
  events: Sender<MapEvent>,
  state: Arc<Mutex<Option<ControllerSnapshot>>>,
}

impl Remote {
  #[must_use]
  pub fn new(events: Sender<MapEvent>) -> Self {
    Self {
      events,
      state: Arc::default(),
    }
  }

  pub fn handle_map_event(&self, event: MapEvent) {
    if self.events.send(event).is_err() {
      error!("Map controller is gone, dropping event");
    }
  }

  /// Replaces the snapshot served on `/state`.
  pub fn publish(&self, snapshot: ControllerSnapshot) {
    let mut state = self.state.lock().unwrap_or_else(|poisoned| {
      error!("Snapshot lock was poisoned, recovering");
      poisoned.into_inner()
    });
    *state = Some(snapshot);
  }

  #[must_use]
  pub fn snapshot(&self) -> Option<ControllerSnapshot> {
    self
      .state
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .clone()
  }
}
