//! Resend cooldown: a whole-seconds countdown plus the ticker task that
//! drives it.
//!
//! The countdown is purely presentational; it only disables the client
//! resend action, never the server-side throttle. A throttled request
//! re-arms it from the server's remaining seconds so the client clock
//! resynchronizes instead of drifting.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Whole-seconds countdown owned by the login flow state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cooldown {
    remaining: u64,
}

impl Cooldown {
    pub fn arm(&mut self, seconds: u64) {
        self.remaining = seconds;
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

/// A one-second ticker task. Calls the closure once per second until it
/// returns `false` (countdown exhausted) or the ticker is cancelled.
/// Dropping the handle stops the task, so no timer outlives its flow.
pub struct ResendTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ResendTicker {
    pub fn spawn<F>(mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if !tick() {
                            break;
                        }
                    }
                }
            }
        });
        Self { cancel, handle }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the task has exited (cancelled or countdown exhausted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ResendTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
