use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for vocabulary source labels
///
/// Source files name their language with a free-form label (`英语`, `en`,
/// `German`, `编程`). This module turns such labels into the stable code and
/// script stored on the `languages` row, and maps stored codes onto the codes
/// the translation service understands.

/// Code and writing system recorded for a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    /// Canonical short tag
    pub code: String,
    /// Writing system name
    pub script: String,
}

/// Labels used by the bundled word lists
const KNOWN_LABELS: &[(&str, &str, &str)] = &[
    ("中文", "zh", "Han"),
    ("英语", "en", "Latin"),
    ("日语", "ja", "Hiragana"),
    ("德语", "de", "Latin"),
    ("印尼语", "id", "Latin"),
    ("编程", "prog", "Latin"),
];

/// Longest code synthesized from an unknown label
const MAX_CODE_CHARS: usize = 10;

/// Resolve a language label into its code and script
pub fn profile_for_label(label: &str) -> LanguageProfile {
    let label = label.trim();

    if let Some((_, code, script)) = KNOWN_LABELS.iter().find(|(name, _, _)| *name == label) {
        return LanguageProfile {
            code: (*code).to_string(),
            script: (*script).to_string(),
        };
    }

    let lowered = label.to_lowercase();
    if lowered.len() == 2 && Language::from_639_1(&lowered).is_some() {
        return LanguageProfile {
            script: script_for_code(&lowered).to_string(),
            code: lowered,
        };
    }

    if let Some(code) = Language::from_name(label).and_then(|lang| lang.to_639_1()) {
        return LanguageProfile {
            code: code.to_string(),
            script: script_for_code(code).to_string(),
        };
    }

    LanguageProfile {
        code: lowered.chars().take(MAX_CODE_CHARS).collect(),
        script: "Latin".to_string(),
    }
}

/// Best-effort writing system for an ISO 639-1 code
pub fn script_for_code(code: &str) -> &'static str {
    match code {
        "zh" => "Han",
        "ja" => "Hiragana",
        "ko" => "Hangul",
        "ru" | "uk" | "be" | "bg" | "mk" | "sr" | "kk" | "ky" | "tg" | "mn" => "Cyrillic",
        "ar" | "fa" | "ur" => "Arabic",
        "he" => "Hebrew",
        "el" => "Greek",
        "hi" | "ne" => "Devanagari",
        "th" => "Thai",
        "ka" => "Georgian",
        "hy" => "Armenian",
        _ => "Latin",
    }
}

/// Check whether a stored language code denotes a Chinese variant
pub fn is_chinese_variant(code: &str) -> bool {
    matches!(
        code.trim().to_lowercase().as_str(),
        "zh" | "zh-cn" | "zh-tw" | "zh-hans" | "zh-hant"
    )
}

/// Map a stored language code onto the code expected by the translation service
pub fn api_language_code(code: &str) -> String {
    let code = code.trim();
    if code.eq_ignore_ascii_case("zh") {
        "zh-CN".to_string()
    } else {
        code.to_string()
    }
}

/// Get the English name of an ISO 639-1 code, for log output
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    let primary = normalized.split('-').next().unwrap_or_default();

    Language::from_639_1(primary)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Display label for a code, falling back to the raw code for custom languages
pub fn display_name(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}
