/*!
 * Conversion of raw word-list entries into canonical words.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use crate::database::models::NewWord;

static EXAMPLE_SENTENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][^.!?]*[.!?]").unwrap()
});

/// Longest meaning copied verbatim into `example`
const EXAMPLE_MAX_CHARS: usize = 100;

/// Why an entry produced no word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The entry is not a JSON object
    NotAnObject,
    /// `name` is missing or blank
    EmptyHeadword,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAnObject => write!(f, "entry is not an object"),
            Rejection::EmptyHeadword => write!(f, "empty headword"),
        }
    }
}

/// Normalize one raw entry
///
/// Recognized keys: `name` (headword), `trans` (list or scalar),
/// `usphone`/`phonetic`, `ukphone` and `notation`.
pub fn normalize_entry(entry: &Value) -> Result<NewWord, Rejection> {
    let fields = entry.as_object().ok_or(Rejection::NotAnObject)?;

    let word = fields
        .get("name")
        .map(value_to_text)
        .unwrap_or_default()
        .trim()
        .to_string();
    if word.is_empty() {
        return Err(Rejection::EmptyHeadword);
    }

    let meaning = match fields.get("trans") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Array(_)) | Some(Value::Null) | None => String::new(),
        Some(scalar) => value_to_text(scalar),
    };

    let us_phonetic = match text_field(fields, "usphone") {
        us if !us.is_empty() => us,
        _ => text_field(fields, "phonetic"),
    };

    Ok(NewWord {
        example: derive_example(&meaning),
        transliteration: text_field(fields, "notation"),
        uk_phonetic: text_field(fields, "ukphone"),
        us_phonetic,
        meaning,
        word,
    })
}

/// First sentence-like span of `meaning`, else the meaning capped at 100 characters
pub fn derive_example(meaning: &str) -> String {
    if meaning.is_empty() {
        return String::new();
    }

    if let Some(found) = EXAMPLE_SENTENCE_REGEX.find(meaning) {
        return found.as_str().to_string();
    }

    if meaning.chars().count() > EXAMPLE_MAX_CHARS {
        let head: String = meaning.chars().take(EXAMPLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        meaning.to_string()
    }
}

fn text_field(fields: &serde_json::Map<String, Value>, key: &str) -> String {
    fields.get(key).map(value_to_text).unwrap_or_default()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
