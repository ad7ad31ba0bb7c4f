/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to the vocabulary tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language row to create when a label is first seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLanguage {
    pub name: String,
    pub code: String,
    pub script: String,
}

/// Category row to create when a label is first seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub language_id: i64,
    pub name: String,
    pub description: String,
    /// 1 (easiest) to 5
    pub difficulty: u8,
}

/// Id returned by a find-or-create call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: i64,
    /// Whether this call inserted the row
    pub created: bool,
}

/// Canonical word produced by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewWord {
    pub word: String,
    pub transliteration: String,
    pub us_phonetic: String,
    pub uk_phonetic: String,
    pub meaning: String,
    pub example: String,
}

/// Result of a conditional insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row written
    Inserted,
    /// `(language_id, category_id, word)` already present
    Duplicate,
    /// The statement failed; the message is the store's error
    Failed(String),
}

/// Which words still need a short gloss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingSelector {
    /// Words with a full meaning but no short gloss
    HasMeaning,
    /// Every word without a short gloss
    AnyMissing,
}

impl fmt::Display for PendingSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingSelector::HasMeaning => write!(f, "has_meaning"),
            PendingSelector::AnyMissing => write!(f, "any_missing"),
        }
    }
}

/// A word awaiting a short gloss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWord {
    pub id: i64,
    pub word: String,
    pub meaning: String,
    /// Code of the word's language
    pub language_code: String,
}

/// Existing row used to preview gloss quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossSample {
    pub word: String,
    pub meaning: String,
    pub meaning_short: Option<String>,
}

/// Gloss coverage counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlossStats {
    /// Number of words
    pub total: i64,
    /// Words with a non-empty meaning
    pub with_meaning: i64,
    /// Words with a non-empty short gloss
    pub with_short: i64,
}

impl GlossStats {
    /// Words still to be processed for the given selector
    pub fn pending(&self, selector: PendingSelector) -> i64 {
        let base = self.denominator(selector);
        (base - self.with_short).max(0)
    }

    /// Completion percentage, or `None` when nothing is eligible
    pub fn completion(&self, selector: PendingSelector) -> Option<f64> {
        let base = self.denominator(selector);
        if base <= 0 {
            return None;
        }
        let ratio = self.with_short as f64 / base as f64 * 100.0;
        Some((ratio * 100.0).round() / 100.0)
    }

    fn denominator(&self, selector: PendingSelector) -> i64 {
        match selector {
            PendingSelector::HasMeaning => self.with_meaning,
            PendingSelector::AnyMissing => self.total,
        }
    }
}

impl fmt::Display for GlossStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Words: {}, With meaning: {}, With short gloss: {}",
            self.total, self.with_meaning, self.with_short
        )
    }
}
