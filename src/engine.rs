//! Quiz session engine: word-set selection, scoring, lives, per-mode
//! answer validation, and round/game termination.
//!
//! Phase machine: Idle → InRound → {RoundComplete, GameOver} → Idle.
//! `submit_answer` scores exactly once per item and latches until
//! `advance` moves the cursor; the latch doubles as the guard against a
//! duplicate submission racing a phase transition.

use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::content::ContentStore;
use crate::domain::{
  AnswerOutcome, Difficulty, Language, Mode, QuizItem, SessionSummary, Tier, Verdict, FULL_CREDIT,
  PARTIAL_CREDIT, STARTING_LIVES,
};
use crate::util::fold_answer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Idle,
  InRound,
  RoundComplete,
  GameOver,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
  #[error("no content for the selected language/mode/difficulty")]
  InvalidSelection,
  #[error("no quiz item at the current position")]
  OutOfRange,
  #[error("round already settled; submission ignored")]
  AlreadyTerminal,
  #[error("no active session")]
  NoActiveSession,
}

/// Read-only projection of the engine for rendering.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
  pub phase: Phase,
  pub session_id: Option<String>,
  pub language: Option<Language>,
  pub mode: Option<Mode>,
  pub difficulty: Option<Difficulty>,
  pub score: u32,
  pub lives: u8,
  pub index: usize,
  pub total: usize,
}

/// End-of-round figures. `tier` is presentational banding only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundReport {
  pub score: u32,
  pub max_score: u32,
  pub percent: f32,
  pub tier: Tier,
}

/// What `advance` produced.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundProgress {
  Next,
  RoundComplete(RoundReport),
  GameOver(RoundReport),
}

struct SessionState {
  id: String,
  language: Language,
  mode: Mode,
  difficulty: Difficulty,
  items: Vec<QuizItem>,
  index: usize,
  score: u32,
  lives: u8,
  awaiting_advance: bool,
  phase: Phase,
}

impl SessionState {
  fn report(&self) -> RoundReport {
    let max_score = (self.items.len() as u32) * FULL_CREDIT;
    // 0/0 rounds are defined as 0%.
    let percent = if max_score == 0 { 0.0 } else { (self.score as f32) / (max_score as f32) * 100.0 };
    RoundReport { score: self.score, max_score, percent, tier: Tier::from_percent(percent) }
  }
}

/// Owns the single active session. All mutation goes through the
/// operations below; score, lives, and the latch change together.
#[derive(Default)]
pub struct Engine {
  session: Option<SessionState>,
}

impl Engine {
  pub fn new() -> Self {
    Self { session: None }
  }

  pub fn phase(&self) -> Phase {
    self.session.as_ref().map(|s| s.phase).unwrap_or(Phase::Idle)
  }

  /// Build a shuffled word set and enter InRound. An empty word set
  /// settles as RoundComplete right away (score 0/0). Replaces any
  /// previous session without archiving it; callers that want the old
  /// run in history must `end_session` first.
  #[instrument(level = "info", skip(self, store))]
  pub fn start_session(
    &mut self,
    store: &ContentStore,
    language: Language,
    mode: Mode,
    difficulty: Difficulty,
  ) -> Result<(), EngineError> {
    let mut items = store
      .lookup(language, mode, difficulty)
      .ok_or(EngineError::InvalidSelection)?;
    items.shuffle(&mut rand::thread_rng());

    let phase = if items.is_empty() { Phase::RoundComplete } else { Phase::InRound };
    let session = SessionState {
      id: Uuid::new_v4().to_string(),
      language,
      mode,
      difficulty,
      items,
      index: 0,
      score: 0,
      lives: STARTING_LIVES,
      awaiting_advance: false,
      phase,
    };
    info!(
      target: "quiz",
      session_id = %session.id,
      language = language.code(),
      mode = mode.name(),
      difficulty = difficulty.name(),
      items = session.items.len(),
      "Session started"
    );
    self.session = Some(session);
    Ok(())
  }

  /// The item under the cursor. Only valid while InRound.
  pub fn current_item(&self) -> Result<&QuizItem, EngineError> {
    let s = self.session.as_ref().ok_or(EngineError::NoActiveSession)?;
    if s.phase != Phase::InRound {
      return Err(EngineError::OutOfRange);
    }
    s.items.get(s.index).ok_or(EngineError::OutOfRange)
  }

  /// Score one answer against the current item. At most one scored
  /// attempt per item; a second call before `advance` is rejected.
  #[instrument(level = "info", skip(self, raw_answer), fields(answer_len = raw_answer.len()))]
  pub fn submit_answer(&mut self, raw_answer: &str) -> Result<Verdict, EngineError> {
    let s = self.session.as_mut().ok_or(EngineError::NoActiveSession)?;
    if s.phase != Phase::InRound || s.awaiting_advance {
      return Err(EngineError::AlreadyTerminal);
    }
    let item = s.items.get(s.index).ok_or(EngineError::OutOfRange)?;

    let outcome = score_answer(s.mode, item, raw_answer);
    let expected = item.expected().to_string();

    let points = match outcome {
      AnswerOutcome::CorrectFull => FULL_CREDIT,
      AnswerOutcome::CorrectPartial => PARTIAL_CREDIT,
      AnswerOutcome::Incorrect => 0,
    };
    s.score += points;
    if outcome == AnswerOutcome::Incorrect {
      s.lives = s.lives.saturating_sub(1);
    }
    s.awaiting_advance = true;

    let verdict = Verdict {
      outcome,
      points,
      expected: match outcome {
        AnswerOutcome::CorrectFull => None,
        _ => Some(expected),
      },
      game_over: s.lives == 0,
    };
    info!(
      target: "quiz",
      session_id = %s.id,
      index = s.index,
      outcome = ?verdict.outcome,
      score = s.score,
      lives = s.lives,
      "Answer scored"
    );
    Ok(verdict)
  }

  /// Move past the scored item. Lives at zero settle as GameOver before
  /// the cursor can move further; reaching the end of the word set
  /// settles as RoundComplete.
  #[instrument(level = "info", skip(self))]
  pub fn advance(&mut self) -> Result<RoundProgress, EngineError> {
    let s = self.session.as_mut().ok_or(EngineError::NoActiveSession)?;
    match s.phase {
      Phase::InRound => {}
      Phase::RoundComplete | Phase::GameOver => return Err(EngineError::AlreadyTerminal),
      Phase::Idle => return Err(EngineError::NoActiveSession),
    }
    if !s.awaiting_advance {
      // Nothing was scored since the last advance.
      return Err(EngineError::OutOfRange);
    }
    s.awaiting_advance = false;

    if s.lives == 0 {
      s.phase = Phase::GameOver;
      let report = s.report();
      info!(target: "quiz", session_id = %s.id, score = s.score, "Game over");
      return Ok(RoundProgress::GameOver(report));
    }

    s.index += 1;
    if s.index >= s.items.len() {
      s.phase = Phase::RoundComplete;
      let report = s.report();
      info!(
        target: "quiz",
        session_id = %s.id,
        score = report.score,
        max_score = report.max_score,
        tier = ?report.tier,
        "Round complete"
      );
      return Ok(RoundProgress::RoundComplete(report));
    }
    Ok(RoundProgress::Next)
  }

  /// Archive figures and return to Idle. Valid from any non-Idle phase;
  /// abandoning mid-round archives the partial score.
  #[instrument(level = "info", skip(self))]
  pub fn end_session(&mut self) -> Result<SessionSummary, EngineError> {
    let s = self.session.take().ok_or(EngineError::NoActiveSession)?;
    let summary = SessionSummary {
      finished_at: chrono::Utc::now(),
      language: s.language.name().to_string(),
      mode: s.mode.name().to_string(),
      score: s.score,
      max_score: (s.items.len() as u32) * FULL_CREDIT,
    };
    info!(
      target: "quiz",
      session_id = %s.id,
      score = summary.score,
      max_score = summary.max_score,
      "Session archived"
    );
    Ok(summary)
  }

  /// Report for the finished (or abandoned) round, if a session exists.
  pub fn round_report(&self) -> Option<RoundReport> {
    self.session.as_ref().map(|s| s.report())
  }

  pub fn snapshot(&self) -> Snapshot {
    match &self.session {
      None => Snapshot {
        phase: Phase::Idle,
        session_id: None,
        language: None,
        mode: None,
        difficulty: None,
        score: 0,
        lives: 0,
        index: 0,
        total: 0,
      },
      Some(s) => Snapshot {
        phase: s.phase,
        session_id: Some(s.id.clone()),
        language: Some(s.language),
        mode: Some(s.mode),
        difficulty: Some(s.difficulty),
        score: s.score,
        lives: s.lives,
        index: s.index,
        total: s.items.len(),
      },
    }
  }

  #[cfg(test)]
  pub(crate) fn start_with_items(
    &mut self,
    language: Language,
    mode: Mode,
    difficulty: Difficulty,
    items: Vec<QuizItem>,
  ) {
    let phase = if items.is_empty() { Phase::RoundComplete } else { Phase::InRound };
    self.session = Some(SessionState {
      id: Uuid::new_v4().to_string(),
      language,
      mode,
      difficulty,
      items,
      index: 0,
      score: 0,
      lives: STARTING_LIVES,
      awaiting_advance: false,
      phase,
    });
  }
}

/// Per-mode answer policy.
///
/// Spoken mode keeps the permissive substring rule from the reference
/// behavior: a transcript that contains the expected term, or is contained
/// by it, earns partial credit. "catalog" vs "cat" therefore earns partial
/// credit; that ambiguity is preserved on purpose.
pub(crate) fn score_answer(mode: Mode, item: &QuizItem, raw: &str) -> AnswerOutcome {
  match mode {
    Mode::Written | Mode::Sentence => {
      if fold_answer(raw) == fold_answer(item.expected()) {
        AnswerOutcome::CorrectFull
      } else {
        AnswerOutcome::Incorrect
      }
    }
    // Options come from a fixed list, never typed; compare literally.
    Mode::Test => {
      if raw == item.expected() {
        AnswerOutcome::CorrectFull
      } else {
        AnswerOutcome::Incorrect
      }
    }
    Mode::Spoken => {
      let said = fold_answer(raw);
      let expected = fold_answer(item.expected());
      if said == expected {
        AnswerOutcome::CorrectFull
      } else if said.is_empty() {
        // An empty transcript must not win substring credit.
        AnswerOutcome::Incorrect
      } else if said.contains(&expected) || expected.contains(&said) {
        AnswerOutcome::CorrectPartial
      } else {
        AnswerOutcome::Incorrect
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::WordPair;

  fn pair(source: &str, target: &str) -> QuizItem {
    QuizItem::Pair(WordPair { source: source.into(), target: target.into() })
  }

  fn written_engine(pairs: &[(&str, &str)]) -> Engine {
    let mut engine = Engine::new();
    engine.start_with_items(
      Language::English,
      Mode::Written,
      Difficulty::Easy,
      pairs.iter().map(|(s, t)| pair(s, t)).collect(),
    );
    engine
  }

  #[test]
  fn spoken_fuzzy_policy_has_three_tiers() {
    let item = pair("кот", "cat");
    assert_eq!(score_answer(Mode::Spoken, &item, "cat"), AnswerOutcome::CorrectFull);
    assert_eq!(score_answer(Mode::Spoken, &item, "Cat"), AnswerOutcome::CorrectFull);
    assert_eq!(score_answer(Mode::Spoken, &item, "a cats"), AnswerOutcome::CorrectPartial);
    assert_eq!(score_answer(Mode::Spoken, &item, "ca"), AnswerOutcome::CorrectPartial);
    assert_eq!(score_answer(Mode::Spoken, &item, "catalog"), AnswerOutcome::CorrectPartial);
    assert_eq!(score_answer(Mode::Spoken, &item, "dog"), AnswerOutcome::Incorrect);
    assert_eq!(score_answer(Mode::Spoken, &item, ""), AnswerOutcome::Incorrect);
    assert_eq!(score_answer(Mode::Spoken, &item, "   "), AnswerOutcome::Incorrect);
  }

  #[test]
  fn written_mode_folds_case_and_surrounding_whitespace_only() {
    let item = pair("книга", "book");
    assert_eq!(score_answer(Mode::Written, &item, " Book "), AnswerOutcome::CorrectFull);
    assert_eq!(score_answer(Mode::Written, &item, "BOOK"), AnswerOutcome::CorrectFull);
    assert_eq!(score_answer(Mode::Written, &item, "bo ok"), AnswerOutcome::Incorrect);
    assert_eq!(score_answer(Mode::Written, &item, "bok"), AnswerOutcome::Incorrect);
  }

  #[test]
  fn test_mode_compares_literally() {
    let item = QuizItem::Question(crate::domain::TestQuestion {
      question: "Как будет 'кот' по-итальянски?".into(),
      options: vec!["gato".into(), "gatto".into(), "gatoo".into(), "gattto".into()],
      answer: "gatto".into(),
    });
    assert_eq!(score_answer(Mode::Test, &item, "gatto"), AnswerOutcome::CorrectFull);
    assert_eq!(score_answer(Mode::Test, &item, "Gatto"), AnswerOutcome::Incorrect);
    assert_eq!(score_answer(Mode::Test, &item, "gato"), AnswerOutcome::Incorrect);
  }

  #[test]
  fn full_credit_run_scores_ten_per_item() {
    let mut engine = written_engine(&[("яблоко", "apple"), ("кот", "cat"), ("дом", "house")]);
    for k in 1..=3u32 {
      let expected = engine.current_item().unwrap().expected().to_string();
      let v = engine.submit_answer(&expected).unwrap();
      assert_eq!(v.outcome, AnswerOutcome::CorrectFull);
      assert_eq!(engine.snapshot().score, 10 * k);
      engine.advance().unwrap();
    }
    assert_eq!(engine.phase(), Phase::RoundComplete);
    assert_eq!(engine.snapshot().index, 3);
  }

  #[test]
  fn partial_credit_adds_exactly_five() {
    let mut engine = Engine::new();
    engine.start_with_items(
      Language::English,
      Mode::Spoken,
      Difficulty::Easy,
      vec![pair("кот", "cat")],
    );
    let v = engine.submit_answer("a cats").unwrap();
    assert_eq!(v.outcome, AnswerOutcome::CorrectPartial);
    assert_eq!(v.points, 5);
    assert_eq!(engine.snapshot().score, 5);
    assert_eq!(engine.snapshot().lives, 3);
  }

  #[test]
  fn lives_hit_zero_and_force_game_over_on_advance() {
    let mut engine =
      written_engine(&[("a", "aa"), ("b", "bb"), ("c", "cc"), ("d", "dd"), ("e", "ee")]);
    for expected_lives in [2u8, 1] {
      let v = engine.submit_answer("wrong").unwrap();
      assert!(!v.game_over);
      assert_eq!(engine.snapshot().lives, expected_lives);
      assert!(matches!(engine.advance().unwrap(), RoundProgress::Next));
    }
    let v = engine.submit_answer("wrong").unwrap();
    assert!(v.game_over);
    assert_eq!(engine.snapshot().lives, 0);

    let index_before = engine.snapshot().index;
    match engine.advance().unwrap() {
      RoundProgress::GameOver(report) => assert_eq!(report.score, 0),
      other => panic!("expected GameOver, got {other:?}"),
    }
    assert_eq!(engine.phase(), Phase::GameOver);
    // Lives at zero settle before the cursor moves.
    assert_eq!(engine.snapshot().index, index_before);
    assert_eq!(engine.submit_answer("anything"), Err(EngineError::AlreadyTerminal));
  }

  #[test]
  fn duplicate_submission_before_advance_is_rejected() {
    let mut engine = written_engine(&[("яблоко", "apple"), ("кот", "cat")]);
    engine.submit_answer("apple").ok();
    assert_eq!(engine.submit_answer("apple"), Err(EngineError::AlreadyTerminal));
  }

  #[test]
  fn advance_without_a_scored_submission_is_rejected() {
    let mut engine = written_engine(&[("яблоко", "apple")]);
    assert_eq!(engine.advance(), Err(EngineError::OutOfRange));
  }

  #[test]
  fn current_item_fails_outside_in_round() {
    let engine = Engine::new();
    assert_eq!(engine.current_item().err(), Some(EngineError::NoActiveSession));

    let mut engine = written_engine(&[("яблоко", "apple")]);
    let expected = engine.current_item().unwrap().expected().to_string();
    engine.submit_answer(&expected).unwrap();
    engine.advance().unwrap();
    assert_eq!(engine.phase(), Phase::RoundComplete);
    assert_eq!(engine.current_item().err(), Some(EngineError::OutOfRange));
  }

  #[test]
  fn empty_word_set_settles_immediately_with_zero_percent() {
    let mut engine = Engine::new();
    engine.start_with_items(Language::English, Mode::Written, Difficulty::Easy, vec![]);
    assert_eq!(engine.phase(), Phase::RoundComplete);
    let report = engine.round_report().unwrap();
    assert_eq!(report.score, 0);
    assert_eq!(report.max_score, 0);
    assert_eq!(report.percent, 0.0);
  }

  #[test]
  fn end_session_without_submissions_archives_zero() {
    let mut engine = written_engine(&[("яблоко", "apple"), ("кот", "cat")]);
    let summary = engine.end_session().unwrap();
    assert_eq!(summary.score, 0);
    assert_eq!(summary.max_score, 20);
    assert_eq!(summary.language, "English");
    assert_eq!(summary.mode, "Written");
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.end_session(), Err(EngineError::NoActiveSession));
  }

  #[test]
  fn reference_scenario_half_score_lands_in_fair() {
    // English / easy / written with a two-item set: one hit, one miss.
    let mut engine = written_engine(&[("яблоко", "apple"), ("кот", "cat")]);
    let first = engine.current_item().unwrap().expected().to_string();
    let v = engine.submit_answer(&first).unwrap();
    assert_eq!(v.outcome, AnswerOutcome::CorrectFull);
    assert_eq!(engine.snapshot().score, 10);
    assert!(matches!(engine.advance().unwrap(), RoundProgress::Next));
    assert_eq!(engine.snapshot().index, 1);

    let v = engine.submit_answer("zzz").unwrap();
    assert_eq!(v.outcome, AnswerOutcome::Incorrect);
    assert_eq!(engine.snapshot().lives, 2);
    match engine.advance().unwrap() {
      RoundProgress::RoundComplete(report) => {
        assert_eq!(report.score, 10);
        assert_eq!(report.max_score, 20);
        assert_eq!(report.percent, 50.0);
        assert_eq!(report.tier, Tier::Fair);
      }
      other => panic!("expected RoundComplete, got {other:?}"),
    }
    assert_eq!(engine.snapshot().index, 2);
  }

  #[test]
  fn shuffled_word_set_keeps_full_composition() {
    use crate::content::ContentStore;
    let store = ContentStore::new(None);
    let mut engine = Engine::new();
    engine
      .start_session(&store, Language::English, Mode::Written, Difficulty::Easy)
      .unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.total, 8);

    // Walk the whole set; every expected answer appears exactly once.
    let mut seen = Vec::new();
    while engine.phase() == Phase::InRound {
      let expected = engine.current_item().unwrap().expected().to_string();
      seen.push(expected.clone());
      engine.submit_answer(&expected).unwrap();
      engine.advance().unwrap();
    }
    seen.sort();
    let mut wanted: Vec<String> =
      ["apple", "book", "car", "cat", "dog", "house", "moon", "sun"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    wanted.sort();
    assert_eq!(seen, wanted);
    assert_eq!(engine.snapshot().index, 8);
    assert_eq!(engine.snapshot().score, 80);
  }
}
