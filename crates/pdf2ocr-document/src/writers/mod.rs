// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word-processor and web-page output writers. The text PDF writer lives in
// `crate::pdf::writer`.

pub mod docx;
pub mod html;
