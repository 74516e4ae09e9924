//! WebSocket upgrade + message loop. Each connection owns one `Trainer`.
//!
//! The loop multiplexes client frames with pacing tickets from the trainer's
//! scheduled tasks, so all session mutation happens on this one task.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::trainer::Trainer;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "quadrant_trainer", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let (advance_tx, mut advance_rx) = mpsc::unbounded_channel();
  let mut trainer = Trainer::new(state, advance_tx);
  info!(target: "quadrant_trainer", session = %trainer.id(), "WebSocket connected");

  let mut alive = true;
  for msg in trainer.open().await {
    if !send(&mut socket, &msg).await {
      alive = false;
      break;
    }
  }

  while alive {
    tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => {
          let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(msg) => {
              debug!(target: "quadrant_trainer", "WS received: {:?}", &msg);
              trainer.handle(msg).await
            }
            Err(e) => {
              debug!(target: "quadrant_trainer", raw = %trunc_for_log(&txt, 200), "WS invalid message");
              Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) })
            }
          };
          if let Some(reply) = reply {
            alive = send(&mut socket, &reply).await;
          }
        }
        Some(Ok(Message::Ping(payload))) => { let _ = socket.send(Message::Pong(payload)).await; }
        Some(Ok(Message::Close(_))) | None => alive = false,
        Some(Err(e)) => {
          error!(target: "quadrant_trainer", error = %e, "WS receive error");
          alive = false;
        }
        _ => {}
      },
      Some(ticket) = advance_rx.recv() => {
        if let Some(update) = trainer.on_advance(ticket).await {
          alive = send(&mut socket, &update).await;
        }
      }
    }
  }

  trainer.close().await;
  info!(target: "quadrant_trainer", "WebSocket disconnected");
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  if let Err(e) = socket.send(Message::Text(out)).await {
    error!(target: "quadrant_trainer", error = %e, "WS send error");
    return false;
  }
  true
}
