//! Content store: built-in word, sentence, and test banks plus the
//! fallback rules for languages that lack dedicated content.
//!
//! Fallback policy (a content-authoring limitation, kept explicit):
//!   - a language without a medium/hard word bank serves its easy bank
//!     at every difficulty;
//!   - a language without a test or sentence bank serves the English bank.
//!
//! Extra word pairs may be appended (never overriding built-ins) through
//! the TOML config, see `config.rs`.

use std::collections::HashMap;

use tracing::info;

use crate::config::ContentConfig;
use crate::domain::{Difficulty, Language, QuizItem, SentenceItem, TestQuestion, WordPair};

// Pairs are (source = Russian prompt, target = expected answer).
const ENGLISH_EASY: &[(&str, &str)] = &[
  ("яблоко", "apple"),
  ("кот", "cat"),
  ("собака", "dog"),
  ("дом", "house"),
  ("книга", "book"),
  ("машина", "car"),
  ("солнце", "sun"),
  ("луна", "moon"),
];

const ENGLISH_MEDIUM: &[(&str, &str)] = &[
  ("компьютер", "computer"),
  ("сад", "garden"),
  ("библиотека", "library"),
  ("учитель", "teacher"),
  ("ученик", "student"),
  ("красивый", "beautiful"),
  ("гора", "mountain"),
  ("океан", "ocean"),
];

const ENGLISH_HARD: &[(&str, &str)] = &[
  ("окружающая среда", "environment"),
  ("архитектура", "architecture"),
  ("ответственность", "responsibility"),
  ("общение", "communication"),
  ("международный", "international"),
  ("размещение", "accommodation"),
  ("достижение", "accomplishment"),
  ("признание", "acknowledgment"),
];

const ITALIAN_EASY: &[(&str, &str)] = &[
  ("привет", "ciao"),
  ("кот", "gatto"),
  ("собака", "cane"),
  ("дом", "casa"),
  ("книга", "libro"),
  ("солнце", "sole"),
  ("луна", "luna"),
  ("вода", "acqua"),
];

const ITALIAN_MEDIUM: &[(&str, &str)] = &[
  ("мальчик", "ragazzo"),
  ("девочка", "ragazza"),
  ("школа", "scuola"),
  ("друг", "amico"),
  ("семья", "famiglia"),
  ("путешествие", "viaggio"),
  ("город", "città"),
  ("гора", "montagna"),
];

const ITALIAN_HARD: &[(&str, &str)] = &[
  ("невероятный", "incredibile"),
  ("ответственность", "responsabilità"),
  ("общение", "comunicazione"),
  ("международный", "internazionale"),
  ("размещение", "accomodamento"),
  ("достижение", "realizzazione"),
  ("признание", "riconoscimento"),
];

const SPANISH_EASY: &[(&str, &str)] = &[
  ("привет", "hola"),
  ("кот", "gato"),
  ("собака", "perro"),
  ("дом", "casa"),
  ("книга", "libro"),
  ("солнце", "sol"),
  ("луна", "luna"),
  ("вода", "agua"),
];

const FRENCH_EASY: &[(&str, &str)] = &[
  ("привет", "bonjour"),
  ("кот", "chat"),
  ("собака", "chien"),
  ("дом", "maison"),
  ("книга", "livre"),
  ("солнце", "soleil"),
  ("луна", "lune"),
  ("вода", "eau"),
];

const PORTUGUESE_EASY: &[(&str, &str)] = &[
  ("привет", "olá"),
  ("кот", "gato"),
  ("собака", "cachorro"),
  ("дом", "casa"),
  ("книга", "livro"),
  ("солнце", "sol"),
  ("луна", "lua"),
  ("вода", "água"),
];

const ENGLISH_SENTENCES: &[(&str, &str)] = &[
  ("I like to read a _____", "book"),
  ("The sky is _____", "blue"),
  ("My name _____ John", "is"),
  ("I have two _____", "cats"),
];

const ITALIAN_SENTENCES: &[(&str, &str)] = &[
  ("Mi piace leggere un _____", "libro"),
  ("Il cielo è _____", "blu"),
  ("Mi _____ Mario", "chiamo"),
  ("Ho due _____", "gatti"),
];

struct TestDef {
  question: &'static str,
  options: [&'static str; 4],
  answer: &'static str,
}

const ENGLISH_TESTS: &[TestDef] = &[
  TestDef {
    question: "Как будет 'яблоко' по-английски?",
    options: ["apple", "aple", "appple", "apel"],
    answer: "apple",
  },
  TestDef {
    question: "Как будет 'книга' по-английски?",
    options: ["buk", "book", "boook", "boke"],
    answer: "book",
  },
];

const ITALIAN_TESTS: &[TestDef] = &[TestDef {
  question: "Как будет 'кот' по-итальянски?",
  options: ["gato", "gatto", "gatoo", "gattto"],
  answer: "gatto",
}];

/// Word-pair bank for (language, difficulty), easy reused where a
/// dedicated medium/hard bank does not exist.
fn word_bank(language: Language, difficulty: Difficulty) -> &'static [(&'static str, &'static str)] {
  match (language, difficulty) {
    (Language::English, Difficulty::Easy) => ENGLISH_EASY,
    (Language::English, Difficulty::Medium) => ENGLISH_MEDIUM,
    (Language::English, Difficulty::Hard) => ENGLISH_HARD,
    (Language::Italian, Difficulty::Easy) => ITALIAN_EASY,
    (Language::Italian, Difficulty::Medium) => ITALIAN_MEDIUM,
    (Language::Italian, Difficulty::Hard) => ITALIAN_HARD,
    (Language::Spanish, _) => SPANISH_EASY,
    (Language::French, _) => FRENCH_EASY,
    (Language::Portuguese, _) => PORTUGUESE_EASY,
  }
}

/// Sentence bank per language; English for languages without one.
fn sentence_bank(language: Language) -> &'static [(&'static str, &'static str)] {
  match language {
    Language::English => ENGLISH_SENTENCES,
    Language::Italian => ITALIAN_SENTENCES,
    _ => ENGLISH_SENTENCES,
  }
}

/// Test bank per language; English for languages without one.
fn test_bank(language: Language) -> &'static [TestDef] {
  match language {
    Language::English => ENGLISH_TESTS,
    Language::Italian => ITALIAN_TESTS,
    _ => ENGLISH_TESTS,
  }
}

/// Read-only content lookup. Built once at startup; optionally extended
/// with word pairs from the TOML config.
pub struct ContentStore {
  extra_pairs: HashMap<(Language, Difficulty), Vec<WordPair>>,
}

impl ContentStore {
  pub fn new(cfg: Option<&ContentConfig>) -> Self {
    let mut extra_pairs: HashMap<(Language, Difficulty), Vec<WordPair>> = HashMap::new();

    if let Some(cfg) = cfg {
      for bank in &cfg.words {
        let pairs: Vec<WordPair> = bank
          .pairs
          .iter()
          .map(|p| WordPair { source: p.source.clone(), target: p.target.clone() })
          .collect();
        if pairs.is_empty() {
          continue;
        }
        info!(
          target: "quiz",
          language = bank.language.code(),
          difficulty = bank.difficulty.name(),
          pairs = pairs.len(),
          "Extra word bank loaded from config"
        );
        extra_pairs
          .entry((bank.language, bank.difficulty))
          .or_default()
          .extend(pairs);
      }
    }

    Self { extra_pairs }
  }

  /// Source data for one session, before shuffling. `None` only if the
  /// selection resolves to no bank at all, which the fallback rules make
  /// unreachable for the shipped content.
  pub fn lookup(
    &self,
    language: Language,
    mode: crate::domain::Mode,
    difficulty: Difficulty,
  ) -> Option<Vec<QuizItem>> {
    use crate::domain::Mode;

    let items: Vec<QuizItem> = match mode {
      Mode::Spoken | Mode::Written => {
        let mut items: Vec<QuizItem> = word_bank(language, difficulty)
          .iter()
          .map(|(source, target)| {
            QuizItem::Pair(WordPair { source: (*source).into(), target: (*target).into() })
          })
          .collect();
        if let Some(extra) = self.extra_pairs.get(&(language, difficulty)) {
          items.extend(extra.iter().cloned().map(QuizItem::Pair));
        }
        items
      }
      Mode::Test => test_bank(language)
        .iter()
        .map(|t| {
          QuizItem::Question(TestQuestion {
            question: t.question.into(),
            options: t.options.iter().map(|o| (*o).to_string()).collect(),
            answer: t.answer.into(),
          })
        })
        .collect(),
      Mode::Sentence => sentence_bank(language)
        .iter()
        .map(|(sentence, answer)| {
          QuizItem::Cloze(SentenceItem { sentence: (*sentence).into(), answer: (*answer).into() })
        })
        .collect(),
    };

    Some(items)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{ContentConfig, PairCfg, WordBankCfg};
  use crate::domain::Mode;

  #[test]
  fn languages_without_medium_hard_reuse_easy() {
    for lang in [Language::Spanish, Language::French, Language::Portuguese] {
      assert_eq!(word_bank(lang, Difficulty::Medium), word_bank(lang, Difficulty::Easy));
      assert_eq!(word_bank(lang, Difficulty::Hard), word_bank(lang, Difficulty::Easy));
    }
    assert_ne!(
      word_bank(Language::English, Difficulty::Hard),
      word_bank(Language::English, Difficulty::Easy)
    );
  }

  #[test]
  fn languages_without_test_or_sentence_banks_fall_back_to_english() {
    let store = ContentStore::new(None);
    let french_tests = store.lookup(Language::French, Mode::Test, Difficulty::Easy).unwrap();
    let english_tests = store.lookup(Language::English, Mode::Test, Difficulty::Easy).unwrap();
    assert_eq!(french_tests.len(), english_tests.len());
    assert_eq!(french_tests[0].prompt(), english_tests[0].prompt());

    let italian = store.lookup(Language::Italian, Mode::Sentence, Difficulty::Easy).unwrap();
    assert_eq!(italian[0].prompt(), "Mi piace leggere un _____");
  }

  #[test]
  fn test_questions_contain_their_answer() {
    let store = ContentStore::new(None);
    for lang in [Language::English, Language::Italian] {
      for item in store.lookup(lang, Mode::Test, Difficulty::Easy).unwrap() {
        let options = item.options().expect("test items carry options");
        assert_eq!(options.len(), 4);
        assert!(options.iter().any(|o| o == item.expected()));
      }
    }
  }

  #[test]
  fn config_pairs_append_without_replacing_builtins() {
    let cfg = ContentConfig {
      words: vec![WordBankCfg {
        language: Language::English,
        difficulty: Difficulty::Easy,
        pairs: vec![PairCfg { source: "вода".into(), target: "water".into() }],
      }],
    };
    let store = ContentStore::new(Some(&cfg));
    let items = store.lookup(Language::English, Mode::Written, Difficulty::Easy).unwrap();
    assert_eq!(items.len(), ENGLISH_EASY.len() + 1);
    assert!(items.iter().any(|i| i.expected() == "water"));
    assert!(items.iter().any(|i| i.expected() == "apple"));
  }
}
