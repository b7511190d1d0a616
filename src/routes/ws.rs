//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "polyglot_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "polyglot_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "polyglot_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "polyglot_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "polyglot_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession { language, mode, difficulty } => {
      match logic::start_session(state, language, mode, difficulty).await {
        Ok(snapshot) => {
          tracing::info!(target: "quiz", total = snapshot.total, "WS session started");
          ServerWsMessage::Session { snapshot }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::Snapshot => {
      ServerWsMessage::Session { snapshot: logic::snapshot(state).await }
    }

    ClientWsMessage::CurrentItem => match logic::current_item(state).await {
      Ok(item) => ServerWsMessage::Item { item },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SubmitAnswer { answer } => match logic::submit_answer(state, &answer).await {
      Ok(result) => {
        tracing::info!(target: "quiz", outcome = ?result.outcome, "WS submit_answer evaluated");
        ServerWsMessage::AnswerResult { result }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Advance => match logic::advance(state).await {
      Ok((snapshot, report)) => ServerWsMessage::Advanced { snapshot, report },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::EndSession => match logic::end_session(state).await {
      Ok(summary) => ServerWsMessage::SessionEnded { summary },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Stats => ServerWsMessage::Stats { stats: logic::stats(state).await },

    ClientWsMessage::SpeechToTextInput { audio_base64, mime, language } => {
      match logic::speech_to_text(state, &audio_base64, &mime, language).await {
        Ok(text) => ServerWsMessage::SpeechToText { text },
        Err(e) => ServerWsMessage::SpeechToTextError { message: e.message() },
      }
    }
  }
}
