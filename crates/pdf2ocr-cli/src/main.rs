// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdf2ocr — apply OCR to every PDF in a directory and export the recognized
// text as PDF, DOCX, HTML, or EPUB.
//
// Entry point. Parses arguments, sets up logging, checks the external tools,
// and hands the document list to the engine's dispatcher.

mod interrupts;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use pdf2ocr_core::lang::language_name;
use pdf2ocr_core::types::{JobSpec, LogLevel, OutputFormat, OutputPolicy, RunSummary};
use pdf2ocr_core::ProcessingConfig;
use pdf2ocr_document::tools::{
    EBOOK_CONVERT, PDFTOPPM, TESSERACT, check_language, installed_languages, require_tools,
};
use pdf2ocr_engine::aggregator::{Aggregator, LogSink, TracingSink};
use pdf2ocr_engine::dispatcher::{Dispatcher, discover_documents};
use pdf2ocr_engine::job::Toolkit;
use pdf2ocr_engine::shutdown::ShutdownSignal;
use tracing::{error, info};

use crate::interrupts::{CtrlC, spawn_watcher};

/// Exit status after an interrupted or forcibly stopped run.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "pdf2ocr", version)]
#[command(about = "Apply OCR to PDF files and export them to multiple formats", long_about = None)]
struct Cli {
    /// Source folder with PDF files
    #[arg(required_unless_present = "config")]
    source_dir: Option<PathBuf>,

    /// Destination folder (defaults to the source folder)
    #[arg(long)]
    dest_dir: Option<PathBuf>,

    /// Generate OCR-processed PDF files
    #[arg(long)]
    pdf: bool,

    /// Generate DOCX files
    #[arg(long)]
    docx: bool,

    /// Generate HTML files
    #[arg(long)]
    html: bool,

    /// Generate EPUB files (enables --docx if needed)
    #[arg(long)]
    epub: bool,

    /// Keep the original page layout in the PDF output (PDF only)
    #[arg(long)]
    preserve_layout: bool,

    /// OCR language code, e.g. `por` or `eng+deu`
    #[arg(long)]
    lang: Option<String>,

    /// Rasterization resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Documents processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Pages rendered per batch (whole document when unset)
    #[arg(long)]
    batch_size: Option<u32>,

    /// Show errors only
    #[arg(long, conflicts_with = "summary_output")]
    quiet: bool,

    /// Show only the final summary
    #[arg(long, visible_alias = "short-output")]
    summary_output: bool,

    /// Write the full log to this file
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// JSON configuration file; command-line options override it
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Merge the arguments over the configuration file, if any.
    fn into_config(self) -> Result<ProcessingConfig> {
        let mut config = match &self.config {
            Some(path) => ProcessingConfig::from_json_file(path)?,
            None => ProcessingConfig::default(),
        };

        if let Some(dir) = self.source_dir {
            config.source_dir = dir;
        }
        if self.dest_dir.is_some() {
            config.dest_dir = self.dest_dir;
        }
        if let Some(lang) = self.lang {
            config.lang = lang;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.batch_size.is_some() {
            config.batch_size = self.batch_size;
        }
        if self.logfile.is_some() {
            config.log_path = self.logfile;
        }
        config.preserve_layout |= self.preserve_layout;

        let flags = [
            (self.pdf, OutputFormat::Pdf),
            (self.docx, OutputFormat::Docx),
            (self.html, OutputFormat::Html),
            (self.epub, OutputFormat::Epub),
        ];
        config
            .formats
            .extend(flags.into_iter().filter(|(on, _)| *on).map(|(_, f)| f));

        if self.quiet {
            config.output_policy = OutputPolicy::Quiet;
        } else if self.summary_output {
            config.output_policy = OutputPolicy::SummaryOnly;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    let log_path = config.as_ref().ok().and_then(|c| c.log_path.clone());
    let log_file = match logging::init(log_path.as_deref()) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open log file: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match config {
        Ok(config) => run(config).await,
        Err(err) => Err(err),
    };

    let code = match outcome {
        Ok(summary) if summary.interrupted => ExitCode::from(EXIT_INTERRUPTED),
        Ok(summary) if summary.failed > 0 => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(Pdf2OcrError::ForcedExit) => ExitCode::from(EXIT_INTERRUPTED),
        Err(err) => {
            TracingSink.emit(LogLevel::Error, &err.to_string(), true);
            ExitCode::FAILURE
        }
    };

    if let Some(file) = log_file
        && let Err(err) = file.close()
    {
        error!(%err, "Failed to finalize log file");
    }
    code
}

/// Validate, prepare the output directories, and dispatch every document.
async fn run(mut config: ProcessingConfig) -> Result<RunSummary> {
    let policy = config.output_policy;
    let mut console = TracingSink;
    console.emit(
        LogLevel::Info,
        &format!("PDF2OCR v{}", env!("CARGO_PKG_VERSION")),
        policy.shows_summary(),
    );

    for warning in config.validate()? {
        console.emit(LogLevel::Warning, &warning, policy.shows_summary());
    }

    let mut tools = vec![TESSERACT, PDFTOPPM];
    if config.formats.contains(&OutputFormat::Epub) {
        tools.push(EBOOK_CONVERT);
    }
    require_tools(&tools)?;
    check_language(&config.lang, &installed_languages()?)?;
    console.emit(
        LogLevel::Info,
        &format!(
            "Using Tesseract language model: {} ({})",
            config.lang,
            language_name(&config.lang)
        ),
        policy.shows_summary(),
    );

    for dir in config.output_dirs().values() {
        std::fs::create_dir_all(dir)?;
    }

    let specs = job_specs(&config)?;
    info!(documents = specs.len(), source = %config.source_dir.display(), "Documents discovered");

    // First Ctrl-C asks for a cooperative stop, the second one exits at once.
    spawn_watcher(ShutdownSignal::global(), CtrlC, || {
        TracingSink.emit(LogLevel::Error, "Forced exit requested.", true);
        std::process::exit(i32::from(EXIT_INTERRUPTED));
    })?;

    let settings = config.run_settings();
    let dispatcher = Dispatcher::new(Arc::new(Toolkit::production()), settings.workers);
    let mut aggregator = Aggregator::new(policy, TracingSink);
    dispatcher.run(specs, &mut aggregator).await
}

/// One job per PDF in the source directory.
fn job_specs(config: &ProcessingConfig) -> Result<Vec<JobSpec>> {
    let settings = config.run_settings();
    let output_dirs = config.output_dirs();
    Ok(discover_documents(&config.source_dir)?
        .into_iter()
        .map(|path| JobSpec {
            document_id: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source_path: path,
            output_dirs: output_dirs.clone(),
            lang: config.lang.clone(),
            settings: settings.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn parse(args: &[&str]) -> ProcessingConfig {
        let argv = std::iter::once("pdf2ocr").chain(args.iter().copied());
        Cli::try_parse_from(argv)
            .expect("parse")
            .into_config()
            .expect("config")
    }

    #[test]
    fn defaults_apply_without_flags() {
        let config = parse(&["scans", "--pdf"]);
        assert_eq!(config.source_dir, PathBuf::from("scans"));
        assert_eq!(config.lang, "por");
        assert_eq!(config.dpi, 400);
        assert_eq!(config.workers, 2);
        assert_eq!(config.formats, BTreeSet::from([OutputFormat::Pdf]));
        assert_eq!(config.output_policy, OutputPolicy::Normal);
    }

    #[test]
    fn flags_override_everything() {
        let config = parse(&[
            "scans",
            "--dest-dir",
            "out",
            "--html",
            "--epub",
            "--lang",
            "eng",
            "--dpi",
            "300",
            "--workers",
            "4",
            "--batch-size",
            "8",
            "--short-output",
            "--logfile",
            "run.log",
        ]);
        assert_eq!(config.dest_dir, Some(PathBuf::from("out")));
        assert_eq!(
            config.formats,
            BTreeSet::from([OutputFormat::Html, OutputFormat::Epub])
        );
        assert_eq!((config.dpi, config.workers, config.batch_size), (300, 4, Some(8)));
        assert_eq!(config.output_policy, OutputPolicy::SummaryOnly);
        assert_eq!(config.log_path, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn quiet_conflicts_with_summary() {
        let argv = ["pdf2ocr", "scans", "--quiet", "--summary-output"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn source_dir_required_without_config() {
        assert!(Cli::try_parse_from(["pdf2ocr", "--pdf"]).is_err());
    }

    #[test]
    fn config_file_is_the_base_layer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pdf2ocr.json");
        std::fs::write(
            &path,
            r#"{ "source_dir": "/data/in", "lang": "deu", "formats": ["docx"], "workers": 3 }"#,
        )
        .expect("write");

        let config = parse(&["--config", path.to_str().expect("utf-8"), "--workers", "6"]);
        assert_eq!(config.source_dir, PathBuf::from("/data/in"));
        assert_eq!(config.lang, "deu");
        assert_eq!(config.workers, 6);
        assert_eq!(config.formats, BTreeSet::from([OutputFormat::Docx]));
    }

    #[test]
    fn specs_cover_every_pdf_with_shared_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.pdf", "a.pdf", "readme.md"] {
            std::fs::write(dir.path().join(name), b"x").expect("write");
        }
        let mut config = ProcessingConfig::new(dir.path());
        config.formats.insert(OutputFormat::Pdf);
        config.batch_size = Some(4);

        let specs = job_specs(&config).expect("specs");
        let ids: Vec<_> = specs.iter().map(|s| s.document_id.as_str()).collect();
        assert_eq!(ids, vec!["a.pdf", "b.pdf"]);
        assert!(specs.iter().all(|s| s.settings.batch_size == Some(4)));
        assert_eq!(
            specs[0].output_path(OutputFormat::Pdf),
            Some(dir.path().join("pdf_ocr").join("a_ocr.pdf"))
        );
    }
}
