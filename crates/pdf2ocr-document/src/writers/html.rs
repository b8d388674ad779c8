// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTML writer — one standalone HTML5 document with a styled block per page.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use pdf2ocr_core::OutputFormat;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::timer::Stopwatch;
use tracing::{debug, instrument};

use crate::text::{escape_html, process_paragraphs, skip_leading_blank_pages, title_from_path};
use crate::traits::FormatWriter;

const STYLE: &str = r#"        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }
        .page {
            margin-bottom: 40px;
            padding: 20px;
            border: 1px solid #eee;
            border-radius: 5px;
            background-color: white;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .page-header {
            color: #666;
            font-size: 0.9em;
            margin-bottom: 20px;
            padding-bottom: 10px;
            border-bottom: 1px solid #eee;
        }
        p {
            margin: 0 0 1em;
            text-align: justify;
        }
        @media (prefers-color-scheme: dark) {
            body { background-color: #1a1a1a; color: #e0e0e0; }
            .page { background-color: #2d2d2d; border-color: #404040; }
            .page-header { color: #b0b0b0; border-bottom-color: #404040; }
        }
        @media print {
            .page { border: none; box-shadow: none; margin-bottom: 20px; page-break-after: always; }
            body { max-width: none; padding: 0; }
        }
"#;

/// Renders recognized pages as a single HTML5 document.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlWriter;

impl HtmlWriter {
    pub fn new() -> Self {
        Self
    }

    /// Build the HTML document for `pages`.
    ///
    /// Leading pages without text are skipped; numbering starts at the first
    /// page with text.
    pub fn render(&self, pages: &[String], title: &str) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
             <title>{}</title>\n    <style>\n{}    </style>\n</head>\n<body>\n",
            escape_html(title),
            STYLE
        );

        for (index, page_text) in skip_leading_blank_pages(pages).iter().enumerate() {
            html.push_str("<div class=\"page\">\n");
            let _ = writeln!(
                html,
                "<div class=\"page-header\">pdf2ocr - Page {}</div>",
                index + 1
            );
            for paragraph in process_paragraphs(page_text) {
                let _ = writeln!(html, "<p>{}</p>", escape_html(&paragraph));
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl FormatWriter for HtmlWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    #[instrument(skip_all, fields(output = %output.display(), pages = pages.len()))]
    fn write(&self, pages: &[String], output: &Path) -> Result<Duration> {
        let mut watch = Stopwatch::start();
        let html = self.render(pages, &title_from_path(output));
        std::fs::write(output, html).map_err(|err| {
            Pdf2OcrError::HtmlWrite(format!("cannot write {}: {}", output.display(), err))
        })?;
        debug!("HTML written");
        Ok(watch.stop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pages_after_leading_blanks() {
        let pages = vec![
            "   ".to_string(),
            "Intro line\nwraps here".to_string(),
            "Second".to_string(),
        ];
        let html = HtmlWriter::new().render(&pages, "My Doc");
        assert!(html.contains("<title>My Doc</title>"));
        assert!(html.contains("pdf2ocr - Page 1</div>\n<p>Intro line wraps here</p>"));
        assert!(html.contains("pdf2ocr - Page 2</div>\n<p>Second</p>"));
        assert!(!html.contains("Page 3"));
    }

    #[test]
    fn escapes_recognized_text() {
        let html = HtmlWriter::new().render(&["1 < 2".to_string()], "t");
        assert!(html.contains("<p>1 &lt; 2</p>"));
    }

    #[test]
    fn write_reports_missing_directory_as_html_error() {
        let err = HtmlWriter::new()
            .write(&["x".to_string()], Path::new("/no/such/dir/out.html"))
            .expect_err("should fail");
        assert_eq!(err.origin(), "HtmlWrite");
    }
}
