// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External tool discovery and invocation helpers.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pdf2ocr_core::error::{Pdf2OcrError, Result};
use tracing::{debug, instrument};

pub const TESSERACT: &str = "tesseract";
pub const PDFTOPPM: &str = "pdftoppm";
pub const EBOOK_CONVERT: &str = "ebook-convert";
pub const GHOSTSCRIPT: &str = "gs";

/// Locate `name` on `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Fail with [`Pdf2OcrError::ToolMissing`] naming every tool not on `PATH`.
pub fn require_tools(names: &[&str]) -> Result<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| find_executable(name).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Pdf2OcrError::ToolMissing(missing.join(", ")))
    }
}

/// Run a prepared command to completion, mapping spawn failures and non-zero
/// exit codes through `to_error`.
pub fn run_checked(command: &mut Command, to_error: fn(String) -> Pdf2OcrError) -> Result<Output> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(%program, args = ?command.get_args().collect::<Vec<_>>(), "Running external tool");

    let output = command
        .output()
        .map_err(|err| to_error(format!("cannot run {program}: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(to_error(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

/// Parse `tesseract --list-langs` output; the first line is a header.
pub fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Languages installed for the recognition engine.
#[instrument]
pub fn installed_languages() -> Result<Vec<String>> {
    let output = run_checked(
        Command::new(TESSERACT).arg("--list-langs"),
        Pdf2OcrError::ToolMissing,
    )?;
    // Some tesseract builds print the list on stderr.
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    Ok(parse_language_list(&text))
}

/// Check that every `+`-joined part of `lang` is in `installed`.
pub fn check_language(lang: &str, installed: &[String]) -> Result<()> {
    let missing: Vec<&str> = lang
        .split('+')
        .filter(|part| !installed.iter().any(|have| have == part))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Pdf2OcrError::Config(format!(
            "language(s) not installed for tesseract: {}",
            missing.join(", ")
        )))
    }
}
