// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text helpers shared by the output writers: paragraph reflow, skipping
// leading blank pages, and post-recognition cleanup.

/// Split recognized text into clean paragraphs.
///
/// Line endings are normalised, paragraphs are separated by a blank line, the
/// lines inside a paragraph are trimmed and joined with single spaces, and
/// empty paragraphs are dropped.
pub fn process_paragraphs(text: &str) -> Vec<String> {
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");

    normalised
        .split("\n\n")
        .filter_map(|raw| {
            let joined = raw
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        })
        .collect()
}

/// Paragraphs of a whole document, pages joined by a blank line.
pub fn document_paragraphs(pages: &[String]) -> Vec<String> {
    process_paragraphs(&pages.join("\n\n"))
}

/// The pages starting at the first page with visible text.
pub fn skip_leading_blank_pages(pages: &[String]) -> &[String] {
    let offset = pages
        .iter()
        .position(|page| !page.trim().is_empty())
        .unwrap_or(pages.len());
    &pages[offset..]
}

/// Title derived from an output path: the file stem with `_` shown as spaces.
pub fn title_from_path(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// Drop characters outside the Portuguese alphabet and basic punctuation.
pub fn clean_portuguese(text: &str) -> String {
    const ACCENTED: &str = "áéíóúàãõâêôçÁÉÍÓÚÀÃÕÂÊÔÇ";
    const PUNCTUATION: &str = ".,;:?!()[]{}-\"'";

    text.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || ACCENTED.contains(*c)
                || PUNCTUATION.contains(*c)
        })
        .collect()
}

/// Escape text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
