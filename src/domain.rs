//! Domain models: languages, play modes, difficulty tiers, quiz items,
//! verdicts, and the per-session summary archived into history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points awarded for a fully correct answer.
pub const FULL_CREDIT: u32 = 10;
/// Points awarded for a near-miss spoken answer (substring match).
pub const PARTIAL_CREDIT: u32 = 5;
/// Lives at round start.
pub const STARTING_LIVES: u8 = 3;

/// Studied language. Prompts are shown in Russian; answers are expected in
/// the studied language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
  English,
  Italian,
  Spanish,
  French,
  Portuguese,
}

impl Language {
  pub fn code(&self) -> &'static str {
    match self {
      Language::English => "en",
      Language::Italian => "it",
      Language::Spanish => "es",
      Language::French => "fr",
      Language::Portuguese => "pt",
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Language::English => "English",
      Language::Italian => "Italian",
      Language::Spanish => "Spanish",
      Language::French => "French",
      Language::Portuguese => "Portuguese",
    }
  }

  /// Locale tag passed to the speech recognizer, e.g. "en-EN".
  pub fn speech_locale(&self) -> String {
    format!("{}-{}", self.code(), self.code().to_uppercase())
  }
}

/// How the user answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
  /// Speak the word; the transcript goes through the fuzzy policy.
  Spoken,
  /// Type the translation; exact match after case-fold + trim.
  Written,
  /// Pick one of four options; literal match.
  Test,
  /// Fill the blank in a sentence; exact match after case-fold + trim.
  Sentence,
}

impl Mode {
  pub fn name(&self) -> &'static str {
    match self {
      Mode::Spoken => "Spoken",
      Mode::Written => "Written",
      Mode::Test => "Test",
      Mode::Sentence => "Sentence",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn name(&self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }
}

/// A translation pair. `source` is the prompt (Russian), `target` is the
/// expected answer in the studied language.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordPair {
  pub source: String,
  pub target: String,
}

/// A four-option multiple-choice question. `answer` is always one of
/// `options`, verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub answer: String,
}

/// A sentence with one `_____` blank and the word that fills it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentenceItem {
  pub sentence: String,
  pub answer: String,
}

/// One element of a word set. Homogeneous per session: pairs for
/// spoken/written, questions for test mode, cloze items for sentence mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizItem {
  Pair(WordPair),
  Question(TestQuestion),
  Cloze(SentenceItem),
}

impl QuizItem {
  /// Text shown to the user.
  pub fn prompt(&self) -> &str {
    match self {
      QuizItem::Pair(p) => &p.source,
      QuizItem::Question(q) => &q.question,
      QuizItem::Cloze(s) => &s.sentence,
    }
  }

  /// Expected answer text.
  pub fn expected(&self) -> &str {
    match self {
      QuizItem::Pair(p) => &p.target,
      QuizItem::Question(q) => &q.answer,
      QuizItem::Cloze(s) => &s.answer,
    }
  }

  /// Answer options (test mode only).
  pub fn options(&self) -> Option<&[String]> {
    match self {
      QuizItem::Question(q) => Some(&q.options),
      _ => None,
    }
  }
}

/// Outcome of one scored submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
  CorrectFull,
  CorrectPartial,
  Incorrect,
}

/// What the engine returns from `submit_answer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verdict {
  pub outcome: AnswerOutcome,
  pub points: u32,
  /// Correct answer text, present on partial/incorrect for display.
  pub expected: Option<String>,
  /// True once lives hit zero; the next `advance` lands on GameOver.
  pub game_over: bool,
}

/// Qualitative end-of-round banding by score percentage. Display only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  Excellent,
  Good,
  Fair,
  NeedsPractice,
}

impl Tier {
  pub fn from_percent(percent: f32) -> Self {
    if percent >= 80.0 {
      Tier::Excellent
    } else if percent >= 60.0 {
      Tier::Good
    } else if percent >= 40.0 {
      Tier::Fair
    } else {
      Tier::NeedsPractice
    }
  }
}

/// Archived once per session end (win or loss). Process lifetime only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
  pub finished_at: DateTime<Utc>,
  pub language: String,
  pub mode: String,
  pub score: u32,
  pub max_score: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tier_bands_match_cutoffs() {
    assert_eq!(Tier::from_percent(100.0), Tier::Excellent);
    assert_eq!(Tier::from_percent(80.0), Tier::Excellent);
    assert_eq!(Tier::from_percent(79.9), Tier::Good);
    assert_eq!(Tier::from_percent(60.0), Tier::Good);
    assert_eq!(Tier::from_percent(50.0), Tier::Fair);
    assert_eq!(Tier::from_percent(40.0), Tier::Fair);
    assert_eq!(Tier::from_percent(39.9), Tier::NeedsPractice);
    assert_eq!(Tier::from_percent(0.0), Tier::NeedsPractice);
  }

  #[test]
  fn speech_locale_follows_language_code() {
    assert_eq!(Language::English.speech_locale(), "en-EN");
    assert_eq!(Language::Portuguese.speech_locale(), "pt-PT");
  }
}
