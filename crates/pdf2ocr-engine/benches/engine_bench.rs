// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pdf2ocr-engine crate: batch planning and
// positional page storage for large documents.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pdf2ocr_core::types::plan_batches;
use pdf2ocr_engine::PageResults;

fn bench_plan_batches(c: &mut Criterion) {
    c.bench_function("plan_batches (2000 pages, size 8)", |b| {
        b.iter(|| black_box(plan_batches(black_box(2000), black_box(Some(8)))));
    });
}

/// Fill a 2000-page result array back to front.
fn bench_page_results(c: &mut Criterion) {
    c.bench_function("PageResults write (2000 pages, reversed)", |b| {
        b.iter(|| {
            let mut results: PageResults<String> = PageResults::new(2000);
            for page in (1..=2000u32).rev() {
                let _ = results.write(page, String::new());
            }
            black_box(results.is_complete())
        });
    });
}

criterion_group!(benches, bench_plan_batches, bench_page_results);
criterion_main!(benches);
