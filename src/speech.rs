//! Speech boundary: audio clip decoding and the transcription client.
//!
//! The capture side lives in the browser/client; the backend receives a
//! short base64-encoded clip (`AudioClip`) and forwards it to an
//! OpenAI-compatible `/audio/transcriptions` endpoint. Any provider
//! honoring that contract is substitutable.
//!
//! Recognition failures are typed: "could not recognize speech" vs
//! "service unavailable" vs anything else. None of them ever reaches the
//! quiz engine; a failed transcription simply means no submission.
//!
//! NOTE: We never log the API key and we never log audio payloads.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

/// Fixed capture duration advertised to clients, seconds.
pub const DEFAULT_RECORD_SECONDS: u64 = 3;

/// Clips above this are rejected before any upload.
const MAX_CLIP_BYTES: usize = 10 * 1024 * 1024;

/// Failure while turning the uploaded payload into a usable clip.
#[derive(Debug, Error)]
pub enum CaptureError {
  #[error("audio payload is not valid base64: {0}")]
  BadEncoding(String),
  #[error("audio clip is empty")]
  Empty,
  #[error("audio clip too large ({0} bytes)")]
  TooLarge(usize),
  #[error("unsupported audio mime type '{0}'")]
  UnsupportedMime(String),
}

/// Failure while recognizing speech from a clip.
#[derive(Debug, Error)]
pub enum RecognitionError {
  #[error("could not recognize speech")]
  NoSpeech,
  #[error("speech service unavailable: {0}")]
  ServiceUnavailable(String),
  #[error("speech service error: {0}")]
  Other(String),
}

/// A decoded, validated audio clip ready for upload.
pub struct AudioClip {
  bytes: Vec<u8>,
  mime: String,
  file_name: &'static str,
}

impl AudioClip {
  /// Decode a client upload. Accepts both raw base64 and data-URL form
  /// ("data:audio/webm;base64,...").
  pub fn from_base64(mime: &str, payload: &str) -> Result<Self, CaptureError> {
    let file_name = file_name_for_mime(mime)
      .ok_or_else(|| CaptureError::UnsupportedMime(mime.to_string()))?;

    let raw = payload
      .rsplit_once("base64,")
      .map(|(_, tail)| tail)
      .unwrap_or(payload)
      .trim();
    let bytes = BASE64
      .decode(raw)
      .map_err(|e| CaptureError::BadEncoding(e.to_string()))?;

    if bytes.is_empty() {
      return Err(CaptureError::Empty);
    }
    if bytes.len() > MAX_CLIP_BYTES {
      return Err(CaptureError::TooLarge(bytes.len()));
    }
    Ok(Self { bytes, mime: mime.to_string(), file_name })
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }
}

fn file_name_for_mime(mime: &str) -> Option<&'static str> {
  // Container type only; parameters like ";codecs=opus" are ignored.
  let base = mime.split(';').next().unwrap_or(mime).trim();
  match base {
    "audio/wav" | "audio/x-wav" | "audio/wave" => Some("clip.wav"),
    "audio/webm" | "video/webm" => Some("clip.webm"),
    "audio/ogg" => Some("clip.ogg"),
    "audio/mpeg" | "audio/mp3" => Some("clip.mp3"),
    "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("clip.m4a"),
    "audio/flac" => Some("clip.flac"),
    _ => None,
  }
}

/// Transcription client. Built only when OPENAI_API_KEY is present;
/// without it the spoken mode degrades to typed input on the client.
#[derive(Clone)]
pub struct SpeechToText {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
  /// Capture-duration hint relayed to clients; carries no engine semantics.
  pub record_seconds: u64,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
  text: String,
}

impl SpeechToText {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model =
      std::env::var("OPENAI_TRANSCRIBE_MODEL").unwrap_or_else(|_| "whisper-1".into());
    let record_seconds = std::env::var("RECORD_SECONDS")
      .ok()
      .and_then(|v| v.parse::<u64>().ok())
      .unwrap_or(DEFAULT_RECORD_SECONDS);

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model, record_seconds })
  }

  /// Recognize speech from one clip. `locale` is a hint like "en-EN";
  /// only its language part is forwarded.
  #[instrument(level = "info", skip(self, clip), fields(model = %self.model, clip_bytes = clip.len(), %locale))]
  pub async fn transcribe(&self, clip: &AudioClip, locale: &str) -> Result<String, RecognitionError> {
    let url = format!("{}/audio/transcriptions", self.base_url);
    let language = locale.split('-').next().unwrap_or(locale).to_string();

    let part = reqwest::multipart::Part::bytes(clip.bytes.clone())
      .file_name(clip.file_name)
      .mime_str(&clip.mime)
      .map_err(|e| RecognitionError::Other(e.to_string()))?;
    let form = reqwest::multipart::Form::new()
      .part("file", part)
      .text("model", self.model.clone())
      .text("language", language)
      .text("response_format", "json");

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "polyglot-backend/0.1")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .multipart(form)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() || e.is_connect() {
          RecognitionError::ServiceUnavailable(e.to_string())
        } else {
          RecognitionError::Other(e.to_string())
        }
      })?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      if status.is_server_error() || status.as_u16() == 429 {
        return Err(RecognitionError::ServiceUnavailable(format!("HTTP {}: {}", status, msg)));
      }
      return Err(RecognitionError::Other(format!("HTTP {}: {}", status, msg)));
    }

    let body: TranscriptionResponse =
      res.json().await.map_err(|e| RecognitionError::Other(e.to_string()))?;
    let text = body.text.trim().to_string();
    if text.is_empty() {
      return Err(RecognitionError::NoSpeech);
    }
    info!(target: "polyglot_backend", transcript_len = text.len(), "Transcription received");
    Ok(text)
  }
}

/// Try to extract a clean error message from the provider's error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
