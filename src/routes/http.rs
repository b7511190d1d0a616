//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; engine errors map to status codes here and
//! nowhere else.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::engine::EngineError;
use crate::logic::{self, SpeechFailure};
use crate::protocol::*;
use crate::speech::DEFAULT_RECORD_SECONDS;
use crate::state::AppState;

fn engine_error(e: EngineError) -> (StatusCode, Json<ErrorOut>) {
  let status = match e {
    EngineError::InvalidSelection => StatusCode::UNPROCESSABLE_ENTITY,
    EngineError::OutOfRange | EngineError::AlreadyTerminal | EngineError::NoActiveSession => {
      StatusCode::CONFLICT
    }
  };
  (status, Json(ErrorOut { message: e.to_string() }))
}

fn speech_error(e: SpeechFailure) -> (StatusCode, Json<ErrorOut>) {
  let status = match &e {
    SpeechFailure::Disabled => StatusCode::SERVICE_UNAVAILABLE,
    SpeechFailure::Capture(_) => StatusCode::BAD_REQUEST,
    SpeechFailure::Recognition(crate::speech::RecognitionError::ServiceUnavailable(_)) => {
      StatusCode::BAD_GATEWAY
    }
    SpeechFailure::Recognition(_) => StatusCode::UNPROCESSABLE_ENTITY,
  };
  (status, Json(ErrorOut { message: e.message() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(language = ?body.language, mode = ?body.mode, difficulty = ?body.difficulty))]
pub async fn http_start_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSessionIn>,
) -> impl IntoResponse {
  match logic::start_session(&state, body.language, body.mode, body.difficulty).await {
    Ok(snapshot) => {
      info!(target: "quiz", total = snapshot.total, "HTTP session started");
      Json(snapshot).into_response()
    }
    Err(e) => engine_error(e).into_response(),
  }
}

#[instrument(level = "debug", skip(state))]
pub async fn http_get_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::snapshot(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_item(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match logic::current_item(&state).await {
    Ok(item) => Json(item).into_response(),
    Err(e) => engine_error(e).into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  match logic::submit_answer(&state, &body.answer).await {
    Ok(result) => {
      info!(target: "quiz", outcome = ?result.outcome, score = result.score, "HTTP submit_answer evaluated");
      Json(result).into_response()
    }
    Err(e) => engine_error(e).into_response(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_advance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match logic::advance(&state).await {
    Ok((snapshot, report)) => Json(AdvanceOut { snapshot, report }).into_response(),
    Err(e) => engine_error(e).into_response(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_end_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match logic::end_session(&state).await {
    Ok(summary) => Json(summary).into_response(),
    Err(e) => engine_error(e).into_response(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::stats(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_speech_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (enabled, record_seconds) = match &state.speech {
    Some(stt) => (true, stt.record_seconds),
    None => (false, DEFAULT_RECORD_SECONDS),
  };
  Json(SpeechInfoOut { enabled, record_seconds })
}

#[instrument(level = "info", skip(state, body), fields(payload_len = body.audio_base64.len(), mime = %body.mime))]
pub async fn http_post_speech(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SpeechIn>,
) -> impl IntoResponse {
  match logic::speech_to_text(&state, &body.audio_base64, &body.mime, body.language).await {
    Ok(text) => Json(SpeechOut { text }).into_response(),
    Err(e) => speech_error(e).into_response(),
  }
}
