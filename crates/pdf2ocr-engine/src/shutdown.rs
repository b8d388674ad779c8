// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide cooperative shutdown flag.
//
// Running -> ShutdownRequested -> ForceExit, never backwards. The signal
// handler is the only writer; workers and the dispatcher read it.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::warn;

/// Observable shutdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ShutdownState {
    Running = 0,
    ShutdownRequested = 1,
    ForceExit = 2,
}

impl ShutdownState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::ShutdownRequested,
            _ => Self::ForceExit,
        }
    }
}

/// Atomic tri-state shutdown signal.
#[derive(Debug)]
pub struct ShutdownSignal {
    state: AtomicU8,
}

static GLOBAL: ShutdownSignal = ShutdownSignal::new();

impl ShutdownSignal {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ShutdownState::Running as u8),
        }
    }

    /// The process-wide signal used by the CLI.
    pub fn global() -> &'static ShutdownSignal {
        &GLOBAL
    }

    pub fn state(&self) -> ShutdownState {
        ShutdownState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Ask for a graceful stop. No effect once a force exit is pending.
    pub fn request(&self) -> ShutdownState {
        self.advance_to(ShutdownState::ShutdownRequested)
    }

    /// Ask for immediate termination.
    pub fn force_exit(&self) -> ShutdownState {
        self.advance_to(ShutdownState::ForceExit)
    }

    /// Handle one interrupt: the first requests shutdown, the second forces
    /// exit. Returns the state after the transition.
    pub fn interrupt(&self) -> ShutdownState {
        let result = self.state.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
            Some(match ShutdownState::from_u8(raw) {
                ShutdownState::Running => ShutdownState::ShutdownRequested as u8,
                _ => ShutdownState::ForceExit as u8,
            })
        });
        let previous = match result {
            Ok(raw) | Err(raw) => ShutdownState::from_u8(raw),
        };
        match previous {
            ShutdownState::Running => {
                warn!("Shutdown requested, finishing documents already in progress");
                ShutdownState::ShutdownRequested
            }
            ShutdownState::ShutdownRequested => {
                warn!("Second interrupt, forcing exit");
                ShutdownState::ForceExit
            }
            ShutdownState::ForceExit => ShutdownState::ForceExit,
        }
    }

    /// True once any stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.state() != ShutdownState::Running
    }

    pub fn is_force_exit(&self) -> bool {
        self.state() == ShutdownState::ForceExit
    }

    /// Clear the flag back to `Running`. Tests only; production code has no
    /// path back.
    #[doc(hidden)]
    pub fn reset_for_tests(&self) {
        self.state
            .store(ShutdownState::Running as u8, Ordering::SeqCst);
    }

    fn advance_to(&self, target: ShutdownState) -> ShutdownState {
        let previous = self.state.fetch_max(target as u8, Ordering::SeqCst);
        ShutdownState::from_u8(previous.max(target as u8))
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
