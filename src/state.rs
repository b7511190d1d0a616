//! Application state: the quiz engine, the session history, the content
//! store, and the optional speech client.
//!
//! One engine, one active session: the engine lock serializes
//! submissions, so a duplicate submission racing a phase transition is
//! rejected inside the engine rather than corrupting it.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::load_content_config_from_env;
use crate::content::ContentStore;
use crate::engine::Engine;
use crate::history::History;
use crate::speech::SpeechToText;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Engine>>,
    pub history: Arc<RwLock<History>>,
    pub content: Arc<ContentStore>,
    pub speech: Option<SpeechToText>,
}

impl AppState {
    /// Build state from env: load the optional TOML content config,
    /// build the content store, init the speech client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_content_config_from_env();
        let content = ContentStore::new(cfg.as_ref());

        let speech = SpeechToText::from_env();
        if let Some(stt) = &speech {
            info!(
                target: "polyglot_backend",
                base_url = %stt.base_url,
                model = %stt.model,
                record_seconds = stt.record_seconds,
                "Speech recognition enabled."
            );
        } else {
            info!(
                target: "polyglot_backend",
                "Speech recognition disabled (no OPENAI_API_KEY). Spoken answers must be typed client-side."
            );
        }

        Self {
            engine: Arc::new(RwLock::new(Engine::new())),
            history: Arc::new(RwLock::new(History::new())),
            content: Arc::new(content),
            speech,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
