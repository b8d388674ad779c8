// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subscriber setup for the CLI.
//
// Three layers: the console shows records marked visible by the aggregator
// (errors on stderr, everything else on stdout), a diagnostics layer shows
// ordinary tracing output on stderr filtered by `RUST_LOG`, and an optional
// log file receives every aggregated record.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use pdf2ocr_engine::aggregator::{CONSOLE_TARGET, FILE_TARGET};
use tracing::Level;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// The open run log; writes the closing marker on [`LogFile::close`].
#[derive(Debug)]
pub struct LogFile {
    file: File,
}

impl LogFile {
    pub fn close(mut self) -> io::Result<()> {
        self.file.write_all(b"\n=== Process Completed ===\n")?;
        self.file.flush()
    }
}

fn is_record_target(target: &str) -> bool {
    target == CONSOLE_TARGET || target == FILE_TARGET
}

/// Install the global subscriber, opening `log_path` if given.
///
/// # Errors
///
/// Fails if the log file or its parent directory cannot be created.
pub fn init(log_path: Option<&Path>) -> io::Result<Option<LogFile>> {
    let console = fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_writer(
            io::stderr
                .with_max_level(Level::ERROR)
                .or_else(io::stdout),
        )
        .with_filter(filter_fn(|meta| meta.target() == CONSOLE_TARGET));

    let diagnostics = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter_fn(|meta| !is_record_target(meta.target())))
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        );

    let (file_layer, log_file) = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = File::create(path)?;
            file.write_all(b"=== Process Started ===\n\n")?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file.try_clone()?))
                .with_filter(filter_fn(|meta| is_record_target(meta.target())));
            (Some(layer), Some(LogFile { file }))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(diagnostics)
        .with(file_layer)
        .init();

    Ok(log_file)
}
