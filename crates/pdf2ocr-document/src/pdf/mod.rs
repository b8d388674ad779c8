// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading/merging (`lopdf`) and text PDF creation (`printpdf`).

pub mod reader;
pub mod writer;
