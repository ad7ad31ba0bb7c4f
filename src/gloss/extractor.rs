/*!
 * Short gloss extraction.
 *
 * Turns a full dictionary meaning such as `"n. 重要，要紧；物质"` into a
 * short gloss (`"重要"`). With a segmenter the first core term (noun, verb
 * or adjective) is used. Otherwise, or when that term is too short, the
 * meaning is cut at its separators and bounded in length.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::segmenter::{NoSegmenter, Segmenter, TaggedToken};

static POS_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]+\.\s*").unwrap()
});

static PARENTHETICAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^)]*\)").unwrap()
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

/// Sense separators, highest priority first
pub const SEPARATORS: &[char] = &['；', ';', '，', ',', '。', '.', '、', '：', ':'];

/// Tokens never taken as a core term
const STOPWORDS: &[&str] = &["，", "；", "。", "、", "的", "了", "是", "在", "有", "和"];

/// Tag prefixes of nouns, verbs and adjectives
const CORE_TAG_PREFIXES: &[char] = &['n', 'v', 'a'];

/// Longest core term kept from segmentation
const CORE_TERM_MAX_CHARS: usize = 8;

/// Shorter core terms fall through to the punctuation path
const CORE_TERM_MIN_CHARS: usize = 2;

/// Fallback results longer than this are shortened
const FALLBACK_MAX_CHARS: usize = 12;

/// Length a shortened fallback result fits in
const SHORTENED_MAX_CHARS: usize = 10;

/// Derives short glosses from full meanings
pub struct ShortGlossExtractor {
    segmenter: Box<dyn Segmenter>,
}

impl ShortGlossExtractor {
    pub fn new(segmenter: Box<dyn Segmenter>) -> Self {
        Self { segmenter }
    }

    /// Extractor that only uses the punctuation path
    pub fn basic() -> Self {
        Self::new(Box::new(NoSegmenter))
    }

    /// Name of the segmenter in use
    pub fn segmenter_name(&self) -> &'static str {
        self.segmenter.name()
    }

    /// Short gloss for `full_meaning`, or `None` when nothing usable remains
    pub fn extract_short(&self, full_meaning: &str) -> Option<String> {
        let cleaned = clean_meaning(full_meaning)?;

        if let Some(term) = self.core_term(&cleaned) {
            if term.chars().count() >= CORE_TERM_MIN_CHARS {
                return Some(term);
            }
        }

        fallback_gloss(&cleaned)
    }

    fn core_term(&self, cleaned: &str) -> Option<String> {
        if !self.segmenter.is_available() {
            return None;
        }

        self.segmenter
            .segment(cleaned)
            .iter()
            .find_map(core_word)
            .map(|word| truncate_chars(word, CORE_TERM_MAX_CHARS))
    }
}

impl Default for ShortGlossExtractor {
    fn default() -> Self {
        Self::basic()
    }
}

/// Trim, then drop a leading part-of-speech tag and parenthesized asides
///
/// Returns `None` for blank input.
pub fn clean_meaning(full_meaning: &str) -> Option<String> {
    let trimmed = full_meaning.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_tag = POS_TAG_REGEX.replace(trimmed, "");
    let without_asides = PARENTHETICAL_REGEX.replace_all(&without_tag, "");
    Some(without_asides.into_owned())
}

/// Punctuation and length based gloss of an already cleaned meaning
///
/// The text is cut before each separator it contains, in priority order,
/// so only the leading sense survives. Whitespace runs collapse to one
/// space. Results over 12 characters are shortened to at most 10, keeping
/// whole words when the text has several.
pub fn fallback_gloss(cleaned: &str) -> Option<String> {
    let mut head = cleaned.trim();
    for separator in SEPARATORS {
        if let Some((before, _)) = head.split_once(*separator) {
            head = before.trim();
        }
    }

    let collapsed = WHITESPACE_REGEX.replace_all(head, " ").trim().to_string();

    let gloss = if collapsed.chars().count() > FALLBACK_MAX_CHARS {
        shorten(&collapsed)
    } else {
        collapsed
    };

    if gloss.is_empty() {
        None
    } else {
        Some(gloss)
    }
}

fn core_word(token: &TaggedToken) -> Option<&str> {
    let word = token.word.trim();
    let is_core = token.tag.starts_with(CORE_TAG_PREFIXES);

    (is_core && !word.is_empty() && !STOPWORDS.contains(&word)).then_some(word)
}

fn shorten(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').collect();

    if words.len() > 1 {
        let mut kept = String::new();
        let mut kept_chars = 0;

        for word in words {
            let extra = word.chars().count() + usize::from(kept_chars > 0);
            if kept_chars + extra > SHORTENED_MAX_CHARS {
                break;
            }
            if kept_chars > 0 {
                kept.push(' ');
            }
            kept.push_str(word);
            kept_chars += extra;
        }

        if !kept.is_empty() {
            return kept;
        }
    }

    truncate_chars(text, SHORTENED_MAX_CHARS).trim_end().to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
