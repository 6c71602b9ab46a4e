use std::collections::BTreeMap;

use isolang::Language;
use once_cell::sync::Lazy;

/// Language utilities for translation language handling
///
/// This module provides the reference table of languages the service
/// officially supports, display-name resolution for prompting, and
/// language-pair validation used as a precondition before translation.
/// Reference table of supported ISO 639-1 codes and their English names.
///
/// The table is intentionally small and explicit: these are the pairs the
/// translation prompt has been tuned for. Codes outside this table can still
/// be resolved to a display name via `display_name`, but `validate_pair`
/// rejects them.
static SUPPORTED_LANGUAGES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("en", "English"),
        ("es", "Spanish"),
        ("fr", "French"),
        ("de", "German"),
        ("it", "Italian"),
        ("pt", "Portuguese"),
        ("nl", "Dutch"),
        ("pl", "Polish"),
        ("ru", "Russian"),
        ("ja", "Japanese"),
        ("zh", "Chinese"),
        ("ko", "Korean"),
    ])
});

/// Get the table of supported language codes and their display names
pub fn supported_languages() -> &'static BTreeMap<&'static str, &'static str> {
    &SUPPORTED_LANGUAGES
}

/// Check whether a single language code is in the supported set
pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains_key(code.trim().to_lowercase().as_str())
}

/// Resolve a language code to a human-readable name for prompting
///
/// Resolution order: the supported-language table, then the full ISO 639-1
/// registry, then the raw code verbatim. Prompts always get *something*
/// readable, even for codes the service does not officially support.
pub fn display_name(code: &str) -> String {
    let normalized = code.trim().to_lowercase();

    if let Some(name) = SUPPORTED_LANGUAGES.get(normalized.as_str()) {
        return (*name).to_string();
    }

    if let Some(lang) = Language::from_639_1(&normalized) {
        return lang.to_name().to_string();
    }

    code.to_string()
}

/// Validate a (source, target) language pair
///
/// A pair is valid iff both codes are in the supported table and they are
/// not the same language. This is a caller-side precondition: the translation
/// client itself does not re-check it.
pub fn validate_pair(source: &str, target: &str) -> bool {
    let source = source.trim().to_lowercase();
    let target = target.trim().to_lowercase();

    SUPPORTED_LANGUAGES.contains_key(source.as_str())
        && SUPPORTED_LANGUAGES.contains_key(target.as_str())
        && source != target
}
