//! Language code helpers
//!
//! Catalogs, dictionaries and translation APIs spell the same language in
//! different ways (`zh-Hans`, `zh_hans`, `简体中文`). These helpers bring them
//! to one canonical BCP 47 form so lookups can compare them.

use icu_locale::Locale;

/// Pseudo-language Xcode uses for base internationalization
pub const BASE_LANGUAGE: &str = "Base";

/// Native names used as column headers in dictionary spreadsheets
const NATIVE_NAMES: &[(&str, &str)] = &[
    ("zh-Hans", "简体中文"),
    ("zh-Hant", "繁體中文"),
    ("ja", "日本語"),
    ("it", "Italiano"),
    ("ko", "한국어"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("es", "Español"),
    ("pt", "Português"),
    ("ru", "Русский"),
];

/// Canonicalize a language code to BCP 47 form
///
/// Underscores become hyphens and subtag casing is normalized through ICU, so
/// `zh_hans` and `ZH-Hans` both become `zh-Hans`. Codes ICU cannot parse are
/// returned trimmed with underscores replaced.
///
/// # Example
///
/// ```ignore
/// use strings_catalog::locale::canonical_code;
/// assert_eq!(canonical_code("zh_hans"), "zh-Hans");
/// assert_eq!(canonical_code("pt-br"), "pt-BR");
/// ```
pub fn canonical_code(code: &str) -> String {
    let hyphenated = code.trim().replace('_', "-");
    match hyphenated.parse::<Locale>() {
        Ok(locale) => locale.to_string(),
        Err(_) => hyphenated,
    }
}

/// Whether two codes name the same language variant
pub fn same_language(a: &str, b: &str) -> bool {
    a == b || canonical_code(a).eq_ignore_ascii_case(&canonical_code(b))
}

/// Map a native language name (dictionary header) to its language code
pub fn code_for_native_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    NATIVE_NAMES
        .iter()
        .find(|(_, native)| *native == name)
        .map(|(code, _)| *code)
}

/// Resolve a dictionary column header to a language code
///
/// Headers may be codes (`ja`, `zh-Hans`) or native names (`日本語`).
pub fn header_language(header: &str) -> String {
    match code_for_native_name(header) {
        Some(code) => code.to_string(),
        None => canonical_code(header),
    }
}
