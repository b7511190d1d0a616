//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Each function takes the shared state, drives exactly one engine
//! operation under the engine lock, and returns a DTO. The lock is held
//! for the whole operation so score, lives, and the latch always change
//! together.

use tracing::{info, instrument, warn};

use crate::domain::{Difficulty, Language, Mode, SessionSummary};
use crate::engine::{EngineError, RoundProgress, RoundReport, Snapshot};
use crate::protocol::{item_out, AnswerResultOut, ItemOut, StatsOut};
use crate::speech::{AudioClip, CaptureError, RecognitionError};
use crate::state::AppState;

/// Start a new session. Any unarchived previous session is ended into
/// history first so the history interface stays total.
#[instrument(level = "info", skip(state))]
pub async fn start_session(
  state: &AppState,
  language: Language,
  mode: Mode,
  difficulty: Difficulty,
) -> Result<Snapshot, EngineError> {
  let mut engine = state.engine.write().await;
  if let Ok(summary) = engine.end_session() {
    warn!(target: "quiz", score = summary.score, "Previous session auto-archived on restart");
    state.history.write().await.append(summary);
  }
  engine.start_session(&state.content, language, mode, difficulty)?;
  Ok(engine.snapshot())
}

#[instrument(level = "debug", skip(state))]
pub async fn snapshot(state: &AppState) -> Snapshot {
  state.engine.read().await.snapshot()
}

#[instrument(level = "info", skip(state))]
pub async fn current_item(state: &AppState) -> Result<ItemOut, EngineError> {
  let engine = state.engine.read().await;
  let snapshot = engine.snapshot();
  let item = engine.current_item()?;
  let mode = snapshot.mode.ok_or(EngineError::NoActiveSession)?;
  Ok(item_out(item, mode, snapshot.index, snapshot.total))
}

#[instrument(level = "info", skip(state, answer), fields(answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, answer: &str) -> Result<AnswerResultOut, EngineError> {
  let mut engine = state.engine.write().await;
  let verdict = engine.submit_answer(answer)?;
  let snapshot = engine.snapshot();
  Ok(AnswerResultOut {
    outcome: verdict.outcome,
    points: verdict.points,
    expected: verdict.expected,
    score: snapshot.score,
    lives: snapshot.lives,
    game_over: verdict.game_over,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn advance(state: &AppState) -> Result<(Snapshot, Option<RoundReport>), EngineError> {
  let mut engine = state.engine.write().await;
  let progress = engine.advance()?;
  let snapshot = engine.snapshot();
  let report = match progress {
    RoundProgress::Next => None,
    RoundProgress::RoundComplete(r) | RoundProgress::GameOver(r) => Some(r),
  };
  Ok((snapshot, report))
}

/// Archive the session into history and return the summary.
#[instrument(level = "info", skip(state))]
pub async fn end_session(state: &AppState) -> Result<SessionSummary, EngineError> {
  let summary = { state.engine.write().await.end_session()? };
  state.history.write().await.append(summary.clone());
  info!(
    target: "quiz",
    score = summary.score,
    max_score = summary.max_score,
    "Session summary appended to history"
  );
  Ok(summary)
}

#[instrument(level = "info", skip(state))]
pub async fn stats(state: &AppState) -> StatsOut {
  crate::protocol::stats_out(state.history.read().await.report())
}

/// User-facing failure of the speech pipeline. Never touches the engine:
/// the current item stays un-scored and re-attemptable.
#[derive(Debug)]
pub enum SpeechFailure {
  Disabled,
  Capture(CaptureError),
  Recognition(RecognitionError),
}

impl SpeechFailure {
  pub fn message(&self) -> String {
    match self {
      SpeechFailure::Disabled => "speech recognition is not configured".into(),
      SpeechFailure::Capture(e) => e.to_string(),
      SpeechFailure::Recognition(e) => e.to_string(),
    }
  }
}

/// Decode the clip and transcribe it. The language hint comes from the
/// request when given, otherwise from the active session (English when
/// idle). Returns the transcript only; submitting it is a separate,
/// explicit step.
#[instrument(level = "info", skip(state, audio_base64), fields(payload_len = audio_base64.len(), %mime, ?language))]
pub async fn speech_to_text(
  state: &AppState,
  audio_base64: &str,
  mime: &str,
  language: Option<Language>,
) -> Result<String, SpeechFailure> {
  let stt = state.speech.as_ref().ok_or(SpeechFailure::Disabled)?;
  let clip = AudioClip::from_base64(mime, audio_base64).map_err(SpeechFailure::Capture)?;

  let locale = match language {
    Some(language) => language,
    None => state
      .engine
      .read()
      .await
      .snapshot()
      .language
      .unwrap_or(Language::English),
  }
  .speech_locale();

  let text = stt
    .transcribe(&clip, &locale)
    .await
    .map_err(SpeechFailure::Recognition)?;
  info!(target: "quiz", transcript_len = text.len(), "Speech transcribed");
  Ok(text)
}
