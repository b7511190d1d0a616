//! Loading optional content configuration (extra word banks) from TOML.
//!
//! Schema:
//!
//! ```toml
//! [[words]]
//! language = "english"
//! difficulty = "easy"
//! pairs = [
//!   { source = "вода", target = "water" },
//! ]
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Difficulty, Language};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContentConfig {
  #[serde(default)]
  pub words: Vec<WordBankCfg>,
}

/// One extra word bank. Pairs are appended after the built-in bank for
/// the same (language, difficulty); built-ins are never replaced.
#[derive(Clone, Debug, Deserialize)]
pub struct WordBankCfg {
  pub language: Language,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub pairs: Vec<PairCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PairCfg {
  pub source: String,
  pub target: String,
}

/// Attempt to load `ContentConfig` from CONTENT_CONFIG_PATH. On any
/// parsing/IO error, returns None.
pub fn load_content_config_from_env() -> Option<ContentConfig> {
  let path = std::env::var("CONTENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ContentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "polyglot_backend", %path, banks = cfg.words.len(), "Loaded content config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "polyglot_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "polyglot_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn word_bank_toml_parses() {
    let cfg: ContentConfig = toml::from_str(
      r#"
        [[words]]
        language = "french"
        difficulty = "medium"
        pairs = [
          { source = "сыр", target = "fromage" },
          { source = "хлеб", target = "pain" },
        ]
      "#,
    )
    .unwrap();
    assert_eq!(cfg.words.len(), 1);
    assert_eq!(cfg.words[0].language, Language::French);
    assert_eq!(cfg.words[0].difficulty, Difficulty::Medium);
    assert_eq!(cfg.words[0].pairs[1].target, "pain");
  }
}
