// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition language tables: Tesseract codes, display names, and the
// matching Calibre e-book language codes.

/// Tesseract language code and human-readable name for the common languages.
const LANG_NAMES: &[(&str, &str)] = &[
    ("por", "Portuguese"),
    ("eng", "English"),
    ("spa", "Spanish"),
    ("fra", "French"),
    ("deu", "German"),
    ("ita", "Italian"),
    ("nld", "Dutch"),
    ("rus", "Russian"),
    ("tur", "Turkish"),
    ("jpn", "Japanese"),
    ("chi_sim", "Chinese (Simplified)"),
    ("chi_tra", "Chinese (Traditional)"),
    ("chi_sim_vert", "Chinese (Simplified, vertical)"),
    ("chi_tra_vert", "Chinese (Traditional, vertical)"),
    ("heb", "Hebrew"),
];

/// Tesseract code to Calibre `--language` code.
const CALIBRE_LANGS: &[(&str, &str)] = &[
    ("por", "pt"),
    ("eng", "en"),
    ("spa", "es"),
    ("fra", "fr"),
    ("deu", "de"),
    ("ita", "it"),
    ("nld", "nl"),
    ("rus", "ru"),
    ("tur", "tr"),
    ("jpn", "ja"),
    ("heb", "he"),
];

/// Human-readable name for a Tesseract language code, or the code itself.
pub fn language_name(code: &str) -> &str {
    LANG_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Calibre language code for a Tesseract code, if one is known.
pub fn calibre_language(code: &str) -> Option<&'static str> {
    if code.starts_with("chi_") {
        return Some("zh");
    }
    CALIBRE_LANGS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, calibre)| *calibre)
}
