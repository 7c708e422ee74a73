//! Shared close state for one stream half.
//!
//! Either endpoint may close a half, possibly at the same time. The guard makes
//! the check-and-set of the closed flag and the wake-up of blocked callers a
//! single step under one mutex, so the close action runs exactly once.

use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// Closed flag plus the signal that ends a half.
#[derive(Debug)]
pub struct StreamGuard {
    closed: Mutex<bool>,
    signal: watch::Sender<bool>,
}

impl StreamGuard {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            closed: Mutex::new(false),
            signal,
        }
    }

    /// Returns true once [`close`](Self::close) has run. Never blocks on I/O.
    pub fn is_closed(&self) -> bool {
        *self.lock()
    }

    /// Close the half. Returns true for the single call that performed the close;
    /// every later call is a no-op returning false.
    pub fn close(&self) -> bool {
        let mut closed = self.lock();
        if *closed {
            return false;
        }
        *closed = true;
        self.signal.send_replace(true);
        true
    }

    /// Resolves once the half is closed.
    pub async fn closed(&self) {
        let mut rx = self.signal.subscribe();
        // The sender lives in `self`, so `wait_for` can only return once the flag flips.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    // The flag is a plain bool, so a poisoned lock still holds a valid value.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.closed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StreamGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_close_is_idempotent() {
        let guard = StreamGuard::new();
        assert!(!guard.is_closed());

        assert!(guard.close());
        assert!(guard.is_closed());

        assert!(!guard.close());
        assert!(!guard.close());
        assert!(guard.is_closed());
    }

    #[test]
    fn test_concurrent_close_runs_once() {
        let guard = Arc::new(StreamGuard::new());
        let performed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let performed = Arc::clone(&performed);
                std::thread::spawn(move || {
                    if guard.close() {
                        performed.fetch_add(1, Ordering::SeqCst);
                    }
                    assert!(guard.is_closed());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(performed.load(Ordering::SeqCst), 1);
        assert!(guard.is_closed());
    }

    #[tokio::test]
    async fn test_closed_wakes_waiter() {
        let guard = Arc::new(StreamGuard::new());

        let waiter = {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.closed().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        guard.close();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake on close")
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_resolves_when_already_closed() {
        let guard = StreamGuard::new();
        guard.close();
        tokio::time::timeout(Duration::from_millis(100), guard.closed())
            .await
            .unwrap();
    }
}
