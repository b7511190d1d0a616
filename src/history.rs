//! Process-lifetime session history. Append-only, insertion order, never
//! persisted to disk.

use serde::Serialize;

use crate::domain::SessionSummary;

#[derive(Default)]
pub struct History {
  entries: Vec<SessionSummary>,
}

/// Aggregates for the stats view. Only produced for a non-empty history;
/// an empty history is reported as an explicit "no sessions yet".
#[derive(Clone, Debug, Serialize)]
pub struct StatsReport {
  pub games_played: usize,
  pub total_score: u32,
  pub average_score: f32,
  pub sessions: Vec<SessionSummary>,
}

impl History {
  pub fn new() -> Self {
    Self { entries: Vec::new() }
  }

  pub fn append(&mut self, summary: SessionSummary) {
    self.entries.push(summary);
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Oldest first, as archived.
  pub fn list(&self) -> &[SessionSummary] {
    &self.entries
  }

  pub fn report(&self) -> Option<StatsReport> {
    if self.entries.is_empty() {
      return None;
    }
    let games_played = self.entries.len();
    let total_score: u32 = self.entries.iter().map(|s| s.score).sum();
    Some(StatsReport {
      games_played,
      total_score,
      average_score: (total_score as f32) / (games_played as f32),
      sessions: self.entries.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn summary(score: u32, max_score: u32) -> SessionSummary {
    SessionSummary {
      finished_at: chrono::Utc::now(),
      language: "English".into(),
      mode: "Written".into(),
      score,
      max_score,
    }
  }

  #[test]
  fn empty_history_reports_nothing() {
    let history = History::new();
    assert!(history.is_empty());
    assert!(history.report().is_none());
  }

  #[test]
  fn entries_accumulate_in_order_and_average_holds() {
    let mut history = History::new();
    history.append(summary(10, 20));
    history.append(summary(30, 80));
    history.append(summary(20, 20));

    let scores: Vec<u32> = history.list().iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![10, 30, 20]);

    let report = history.report().unwrap();
    assert_eq!(report.games_played, 3);
    assert_eq!(report.total_score, 60);
    assert!((report.average_score - 20.0).abs() < f32::EPSILON);
  }
}
