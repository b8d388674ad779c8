// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdf2ocr — Core types, run configuration, and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod lang;
pub mod timer;
pub mod types;

pub use config::ProcessingConfig;
pub use error::Pdf2OcrError;
pub use timer::Stopwatch;
pub use types::*;
