// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document job — page-batch recognition followed by the requested output
// writers, behind a failure boundary that always yields a `JobResult`.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::timer::{Stopwatch, format_seconds};
use pdf2ocr_core::types::{JobResult, JobSpec, LogRecord, OutputFormat};
use pdf2ocr_document::{
    CalibreConverter, DocxWriter, EbookConverter, FormatWriter, HtmlWriter, LayoutAssembler,
    LopdfPageCounter, PageCounter, PageRenderer, PdfWriter, PdftoppmRenderer, RecognitionEngine,
    SearchablePageEngine, TesseractEngine,
};
use tracing::{debug, instrument};

use crate::batch::BatchProcessor;

/// The collaborators a job runs against. Shared read-only by all workers.
pub struct Toolkit {
    pub counter: Arc<dyn PageCounter>,
    pub renderer: Arc<dyn PageRenderer>,
    pub recognizer: Arc<dyn RecognitionEngine>,
    pub searchable: Arc<dyn SearchablePageEngine>,
    pub writers: Vec<Arc<dyn FormatWriter>>,
    pub ebook: Arc<dyn EbookConverter>,
    pub layout: LayoutAssembler,
}

impl Toolkit {
    /// Native-tool collaborators: lopdf, pdftoppm, tesseract, Calibre, and
    /// the built-in writers.
    pub fn production() -> Self {
        let tesseract = Arc::new(TesseractEngine::new());
        Self {
            counter: Arc::new(LopdfPageCounter),
            renderer: Arc::new(PdftoppmRenderer::new()),
            recognizer: tesseract.clone(),
            searchable: tesseract,
            writers: vec![
                Arc::new(PdfWriter::new()),
                Arc::new(DocxWriter::new()),
                Arc::new(HtmlWriter::new()),
            ],
            ebook: Arc::new(CalibreConverter::new()),
            layout: LayoutAssembler::new(),
        }
    }

    fn writer_for(&self, format: OutputFormat) -> Option<&Arc<dyn FormatWriter>> {
        self.writers.iter().find(|writer| writer.format() == format)
    }
}

/// Run one document end to end. Never fails: every error is folded into the
/// returned [`JobResult`] along with the stage log records gathered so far.
#[instrument(skip_all, fields(document = %spec.document_id))]
pub fn run_job(spec: JobSpec, toolkit: &Toolkit) -> JobResult {
    let mut watch = Stopwatch::start();
    let mut records = Vec::new();

    let outcome = if spec.settings.preserve_layout {
        run_layout(&spec, toolkit, &mut records)
    } else {
        run_text(&spec, toolkit, &mut records)
    };

    match outcome {
        Ok(()) => JobResult::succeeded(watch.stop(), records),
        Err(err) => {
            let message = format!(
                "Error in {} during {}: {}",
                spec.document_id,
                err.origin(),
                err
            );
            records.push(LogRecord::error(message.clone()));
            JobResult::failed(watch.stop(), message, records)
        }
    }
}

/// Formats to produce, with DOCX added when EPUB needs it.
fn effective_formats(spec: &JobSpec) -> BTreeSet<OutputFormat> {
    let mut formats = spec.settings.formats.clone();
    if formats.contains(&OutputFormat::Epub) {
        formats.insert(OutputFormat::Docx);
    }
    formats
}

fn output_path(spec: &JobSpec, format: OutputFormat) -> Result<PathBuf> {
    spec.output_path(format).ok_or_else(|| {
        Pdf2OcrError::Config(format!("no output directory for {}", format.label()))
    })
}

fn run_text(spec: &JobSpec, toolkit: &Toolkit, records: &mut Vec<LogRecord>) -> Result<()> {
    let settings = &spec.settings;
    let processor = BatchProcessor::new(toolkit.counter.as_ref(), toolkit.renderer.as_ref());

    let mut watch = Stopwatch::start();
    let document = processor.recognize(
        &spec.source_path,
        toolkit.recognizer.as_ref(),
        &spec.lang,
        &settings.engine_args,
        settings.batch_size,
        settings.dpi,
    )?;
    records.push(LogRecord::info(format!(
        "    Text extracted in {} seconds",
        format_seconds(watch.stop())
    )));
    debug!(
        pages = document.pages.len(),
        batches = document.batches.len(),
        "Recognition complete"
    );

    for format in effective_formats(spec) {
        if format == OutputFormat::Epub {
            let docx = output_path(spec, OutputFormat::Docx)?;
            let epub = output_path(spec, OutputFormat::Epub)?;
            let mut watch = Stopwatch::start();
            let converted = toolkit.ebook.convert(&docx, &epub, &spec.lang)?;
            if !converted.tool_output.is_empty() {
                records.push(LogRecord::debug(format!(
                    "ebook-convert output for {}:\n{}",
                    spec.document_id, converted.tool_output
                )));
            }
            if !converted.success {
                return Err(Pdf2OcrError::EbookConvert(format!(
                    "Failed to convert {} to EPUB: {}",
                    spec.stem(),
                    converted.tool_output
                )));
            }
            records.push(LogRecord::info(format!(
                "    EPUB created in {} seconds",
                format_seconds(watch.stop())
            )));
            continue;
        }

        let writer = toolkit.writer_for(format).ok_or_else(|| {
            Pdf2OcrError::Config(format!("no writer registered for {}", format.label()))
        })?;
        let elapsed = writer.write(&document.pages, &output_path(spec, format)?)?;
        records.push(LogRecord::info(format!(
            "    {} created in {} seconds",
            format.label(),
            format_seconds(elapsed)
        )));
    }

    Ok(())
}

fn run_layout(spec: &JobSpec, toolkit: &Toolkit, records: &mut Vec<LogRecord>) -> Result<()> {
    let settings = &spec.settings;
    let processor = BatchProcessor::new(toolkit.counter.as_ref(), toolkit.renderer.as_ref());
    let output = output_path(spec, OutputFormat::Pdf)?;

    let mut watch = Stopwatch::start();
    let outcome = processor.process(
        &spec.source_path,
        settings.batch_size,
        settings.dpi,
        |_, image| {
            toolkit
                .searchable
                .page_pdf(image, &spec.lang, &settings.engine_args)
        },
    )?;
    records.push(LogRecord::info(format!(
        "  OCR processing took {}s",
        format_seconds(watch.stop())
    )));

    let elapsed = toolkit
        .layout
        .assemble(&outcome.pages.into_pages(), &output)?;
    records.push(LogRecord::info(format!(
        "  Layout-preserving PDF created and compressed in {}s",
        format_seconds(elapsed)
    )));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use pdf2ocr_core::types::{LogLevel, RunSettings};

    use crate::testing::{
        FakeEbook, FakeSearchablePages, PageNumberRecognizer, PageSizedRenderer,
        RecordingWriter, StaticPageCounter,
    };

    struct Fakes {
        pdf: Arc<RecordingWriter>,
        docx: Arc<RecordingWriter>,
        html: Arc<RecordingWriter>,
        ebook: Arc<FakeEbook>,
    }

    fn toolkit_with(recognizer: PageNumberRecognizer, ebook: FakeEbook) -> (Toolkit, Fakes) {
        let fakes = Fakes {
            pdf: Arc::new(RecordingWriter::new(OutputFormat::Pdf)),
            docx: Arc::new(RecordingWriter::new(OutputFormat::Docx)),
            html: Arc::new(RecordingWriter::new(OutputFormat::Html)),
            ebook: Arc::new(ebook),
        };
        let toolkit = Toolkit {
            counter: Arc::new(StaticPageCounter::uniform(3)),
            renderer: Arc::new(PageSizedRenderer::default()),
            recognizer: Arc::new(recognizer),
            searchable: Arc::new(FakeSearchablePages),
            writers: vec![fakes.pdf.clone(), fakes.docx.clone(), fakes.html.clone()],
            ebook: fakes.ebook.clone(),
            layout: LayoutAssembler::without_compression(),
        };
        (toolkit, fakes)
    }

    fn spec(formats: &[OutputFormat], out: &std::path::Path) -> JobSpec {
        let output_dirs: BTreeMap<_, _> = OutputFormat::ALL
            .iter()
            .map(|f| (*f, out.join(f.extension())))
            .collect();
        JobSpec {
            document_id: "report.pdf".into(),
            source_path: PathBuf::from("/in/report.pdf"),
            output_dirs,
            lang: "eng".into(),
            settings: RunSettings {
                batch_size: Some(2),
                workers: 1,
                formats: formats.iter().copied().collect(),
                dpi: 300,
                preserve_layout: false,
                engine_args: Vec::new(),
            },
        }
    }

    fn messages(result: &JobResult) -> Vec<&str> {
        result.records.iter().map(|r| r.message.as_str()).collect()
    }

    #[test]
    fn writes_each_requested_format_in_order() {
        let (toolkit, fakes) = toolkit_with(PageNumberRecognizer::default(), FakeEbook::succeeding());
        let result = run_job(
            spec(&[OutputFormat::Html, OutputFormat::Pdf], std::path::Path::new("/out")),
            &toolkit,
        );

        assert!(result.success, "{:?}", result.error);
        let msgs = messages(&result);
        assert!(msgs[0].starts_with("    Text extracted in "));
        assert!(msgs[1].starts_with("    PDF created in "));
        assert!(msgs[2].starts_with("    HTML created in "));

        let pdf_writes = fakes.pdf.writes();
        assert_eq!(pdf_writes.len(), 1);
        assert_eq!(pdf_writes[0].0, PathBuf::from("/out/pdf/report_ocr.pdf"));
        assert_eq!(pdf_writes[0].1, vec!["page 1", "page 2", "page 3"]);
        assert!(fakes.docx.writes().is_empty());
    }

    #[test]
    fn epub_without_docx_enables_docx_first() {
        let (toolkit, fakes) = toolkit_with(PageNumberRecognizer::default(), FakeEbook::succeeding());
        let result = run_job(spec(&[OutputFormat::Epub], std::path::Path::new("/out")), &toolkit);

        assert!(result.success);
        assert_eq!(fakes.docx.writes().len(), 1);
        assert_eq!(
            fakes.ebook.calls(),
            vec![(
                PathBuf::from("/out/docx/report.docx"),
                PathBuf::from("/out/epub/report.epub")
            )]
        );
        let msgs = messages(&result);
        assert!(msgs.iter().any(|m| m.starts_with("    DOCX created in ")));
        assert!(msgs.last().is_some_and(|m| m.starts_with("    EPUB created in ")));
        assert!(!result.records.iter().any(|r| r.level == LogLevel::Warning));
    }

    #[test]
    fn recognition_failure_is_captured_with_origin() {
        let (toolkit, fakes) = toolkit_with(PageNumberRecognizer::failing_on(2), FakeEbook::succeeding());
        let result = run_job(spec(&[OutputFormat::Pdf], std::path::Path::new("/out")), &toolkit);

        assert!(!result.success);
        let error = result.error.as_deref().expect("error message");
        assert!(error.starts_with("Error in report.pdf during Recognition:"), "{error}");
        let last = result.records.last().expect("records");
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.message, error);
        assert!(fakes.pdf.writes().is_empty());
    }

    #[test]
    fn failed_ebook_conversion_fails_the_job() {
        let (toolkit, _fakes) = toolkit_with(PageNumberRecognizer::default(), FakeEbook::failing());
        let result = run_job(
            spec(&[OutputFormat::Docx, OutputFormat::Epub], std::path::Path::new("/out")),
            &toolkit,
        );
        assert!(!result.success);
        let error = result.error.expect("error");
        assert!(error.contains("during EbookConvert"));
        assert!(error.contains("Failed to convert report to EPUB"));
        assert!(result.records.iter().any(|r| r.level == LogLevel::Debug));
    }

    #[test]
    fn writer_failure_keeps_earlier_stage_records() {
        let (mut toolkit, _fakes) = toolkit_with(PageNumberRecognizer::default(), FakeEbook::succeeding());
        toolkit.writers = vec![Arc::new(RecordingWriter::failing(OutputFormat::Html))];
        let result = run_job(spec(&[OutputFormat::Html], std::path::Path::new("/out")), &toolkit);
        assert!(!result.success);
        assert!(messages(&result)[0].starts_with("    Text extracted in "));
        assert!(result.error.expect("error").contains("during HtmlWrite"));
    }

    #[test]
    fn layout_mode_assembles_searchable_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out_dir = dir.path().join("pdf");
        std::fs::create_dir_all(&out_dir).expect("mkdir");
        let (mut toolkit, _fakes) = toolkit_with(PageNumberRecognizer::default(), FakeEbook::succeeding());
        toolkit.counter = Arc::new(StaticPageCounter::uniform(0));

        let mut layout_spec = spec(&[OutputFormat::Pdf], dir.path());
        layout_spec.settings.preserve_layout = true;
        let result = run_job(layout_spec, &toolkit);

        assert!(result.success, "{:?}", result.error);
        let msgs = messages(&result);
        assert!(msgs[0].starts_with("  OCR processing took "));
        assert!(msgs[1].starts_with("  Layout-preserving PDF created and compressed in "));
        assert!(out_dir.join("report_ocr.pdf").exists());
    }

    #[test]
    fn layout_mode_reports_bad_page_pdfs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (toolkit, _fakes) = toolkit_with(PageNumberRecognizer::default(), FakeEbook::succeeding());
        let mut layout_spec = spec(&[OutputFormat::Pdf], dir.path());
        layout_spec.settings.preserve_layout = true;
        let result = run_job(layout_spec, &toolkit);
        assert!(!result.success);
        assert!(result.error.as_deref().expect("error").contains("during Layout"));
        assert!(messages(&result)[0].starts_with("  OCR processing took "));
    }
}
