//! Table version counter with bounded long-poll waiters.
//!
//! Every table mutation bumps the version. Waiters subscribe to a `watch`
//! channel instead of sleeping in a loop, so a bump wakes them at once; the
//! timeout still bounds each wait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::errors::domain::{DomainError, ResourceKind};

const RETRY_AFTER_SECS: u64 = 1;

#[derive(Debug)]
pub struct LongPollNotifier {
    tx: watch::Sender<u64>,
    waiters: AtomicUsize,
    max_waiters: usize,
    wait_timeout: Duration,
}

/// Releases a waiter slot on every exit path.
struct WaiterGuard<'a>(&'a AtomicUsize);

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl LongPollNotifier {
    pub fn new(max_waiters: usize, wait_timeout: Duration) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            tx,
            waiters: AtomicUsize::new(0),
            max_waiters,
            wait_timeout,
        }
    }

    pub fn version(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Advance the version and wake every waiter. Returns the new version.
    pub fn bump(&self) -> u64 {
        let mut next = 0;
        self.tx.send_modify(|v| {
            *v += 1;
            next = *v;
        });
        next
    }

    pub fn waiters(&self) -> usize {
        self.waiters.load(Ordering::Acquire)
    }

    /// Wait until the version differs from `client_version` or the timeout
    /// elapses, then return the current version.
    pub async fn wait_for_change(&self, client_version: u64) -> Result<u64, DomainError> {
        let mut rx = self.tx.subscribe();
        if *rx.borrow_and_update() != client_version {
            return Ok(self.version());
        }

        let in_flight = self.waiters.fetch_add(1, Ordering::AcqRel) + 1;
        let _guard = WaiterGuard(&self.waiters);
        if in_flight > self.max_waiters {
            warn!(in_flight, max = self.max_waiters, "long-poll waiter limit reached");
            return Err(DomainError::resource(
                ResourceKind::TooManyWaiters {
                    retry_after_secs: RETRY_AFTER_SECS,
                },
                "too many clients are waiting for table updates",
            ));
        }

        let seen = match timeout(self.wait_timeout, rx.wait_for(|v| *v != client_version)).await
        {
            Ok(Ok(version)) => *version,
            // sender lives as long as `self`; a closed channel just ends the wait
            Ok(Err(_)) => self.version(),
            Err(_) => {
                debug!(client_version, "long-poll timed out");
                self.version()
            }
        };
        Ok(seen)
    }
}
