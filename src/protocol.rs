//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Item DTOs never carry the expected answer; the correct text travels
//! only inside a verdict, after the attempt is scored.

use serde::{Deserialize, Serialize};

use crate::domain::{AnswerOutcome, Difficulty, Language, Mode, QuizItem, SessionSummary};
use crate::engine::{RoundReport, Snapshot};
use crate::history::StatsReport;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        language: Language,
        mode: Mode,
        difficulty: Difficulty,
    },
    Snapshot,
    CurrentItem,
    SubmitAnswer {
        answer: String,
    },
    Advance,
    EndSession,
    Stats,
    SpeechToTextInput {
        #[serde(rename = "audioBase64")]
        audio_base64: String,
        mime: String,
        /// Overrides the active session's language hint.
        #[serde(default)]
        language: Option<Language>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        snapshot: Snapshot,
    },
    Item {
        item: ItemOut,
    },
    AnswerResult {
        #[serde(flatten)]
        result: AnswerResultOut,
    },
    Advanced {
        snapshot: Snapshot,
        /// Present when the advance settled the round.
        report: Option<RoundReport>,
    },
    SessionEnded {
        summary: SessionSummary,
    },
    Stats {
        #[serde(flatten)]
        stats: StatsOut,
    },
    SpeechToText {
        text: String,
    },
    SpeechToTextError {
        message: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for item delivery.
#[derive(Debug, Serialize)]
pub struct ItemOut {
    pub index: usize,
    pub total: usize,
    pub mode: Mode,
    pub prompt: String,
    /// Test mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

pub fn item_out(item: &QuizItem, mode: Mode, index: usize, total: usize) -> ItemOut {
    ItemOut {
        index,
        total,
        mode,
        prompt: item.prompt().to_string(),
        options: item.options().map(|o| o.to_vec()),
    }
}

/// Verdict plus the post-submission counters the client renders.
#[derive(Debug, Serialize)]
pub struct AnswerResultOut {
    pub outcome: AnswerOutcome,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub score: u32,
    pub lives: u8,
    pub game_over: bool,
}

/// Stats view payload; an empty history is an explicit indicator, never
/// an empty list.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsOut {
    Empty { message: String },
    Report { #[serde(flatten)] report: StatsReport },
}

pub fn stats_out(report: Option<StatsReport>) -> StatsOut {
    match report {
        Some(report) => StatsOut::Report { report },
        None => StatsOut::Empty { message: "no sessions yet".into() },
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartSessionIn {
    pub language: Language,
    pub mode: Mode,
    pub difficulty: Difficulty,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Serialize)]
pub struct AdvanceOut {
    pub snapshot: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RoundReport>,
}

#[derive(Debug, Deserialize)]
pub struct SpeechIn {
    #[serde(rename = "audioBase64")]
    pub audio_base64: String,
    pub mime: String,
    /// Overrides the active session's language hint.
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Serialize)]
pub struct SpeechOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct SpeechInfoOut {
    pub enabled: bool,
    /// Fixed capture duration the client should record for, seconds.
    pub record_seconds: u64,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"start_session","language":"english","mode":"written","difficulty":"easy"}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientWsMessage::StartSession {
                language: Language::English,
                mode: Mode::Written,
                difficulty: Difficulty::Easy,
            }
        ));

        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type":"submit_answer","answer":"apple"}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::SubmitAnswer { answer } if answer == "apple"));

        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"speech_to_text_input","audioBase64":"QUJD","mime":"audio/wav"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientWsMessage::SpeechToTextInput { .. }));
    }

    #[test]
    fn stats_out_tags_empty_and_report() {
        let json = serde_json::to_string(&stats_out(None)).unwrap();
        assert!(json.contains(r#""status":"empty""#));
        assert!(json.contains("no sessions yet"));

        let report = StatsReport {
            games_played: 1,
            total_score: 10,
            average_score: 10.0,
            sessions: vec![],
        };
        let json = serde_json::to_string(&stats_out(Some(report))).unwrap();
        assert!(json.contains(r#""status":"report""#));
        assert!(json.contains(r#""games_played":1"#));
    }

    #[test]
    fn item_out_never_leaks_the_answer() {
        let item = QuizItem::Pair(crate::domain::WordPair {
            source: "яблоко".into(),
            target: "apple".into(),
        });
        let json = serde_json::to_string(&item_out(&item, Mode::Written, 0, 8)).unwrap();
        assert!(json.contains("яблоко"));
        assert!(!json.contains("apple"));
    }
}
