// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interrupt watcher. Runs on its own thread with its own runtime so that a
// second Ctrl-C still ends the process while the main runtime is blocked
// waiting for in-flight jobs.

use std::io;
use std::thread::JoinHandle;

use pdf2ocr_engine::shutdown::{ShutdownSignal, ShutdownState};
use tracing::error;

/// Where interrupts come from. `next` resolves to `false` once no further
/// interrupt can arrive.
pub(crate) trait InterruptSource: Send + 'static {
    async fn next(&mut self) -> bool;
}

/// The process's Ctrl-C / SIGINT.
pub(crate) struct CtrlC;

impl InterruptSource for CtrlC {
    async fn next(&mut self) -> bool {
        tokio::signal::ctrl_c().await.is_ok()
    }
}

/// Feed interrupts into `signal`. Returns true when one escalated to a
/// forced exit.
async fn watch<S: InterruptSource>(signal: &ShutdownSignal, mut source: S) -> bool {
    while source.next().await {
        if signal.interrupt() == ShutdownState::ForceExit {
            return true;
        }
    }
    false
}

/// Watch `source` for the rest of the process and call `on_force_exit` on the
/// second interrupt.
pub(crate) fn spawn_watcher<S, F>(
    signal: &'static ShutdownSignal,
    source: S,
    on_force_exit: F,
) -> io::Result<JoinHandle<()>>
where
    S: InterruptSource,
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name("pdf2ocr-interrupts".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(%err, "Failed to start the interrupt watcher");
                    return;
                }
            };
            if runtime.block_on(watch(signal, source)) {
                on_force_exit();
            }
        })
}
