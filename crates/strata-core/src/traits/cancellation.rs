//! Stopping an indexing run from another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Something a long-running phase polls to learn it should stop.
///
/// The indexer polls between phases and before each file it parses. A run
/// that observes the flag returns `Cancelled` and its staged writes are
/// rolled back.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    /// Raise the flag. Idempotent.
    fn cancel(&self);
}

/// Shared stop flag. Every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token whose flag is already raised.
    pub fn cancelled() -> Self {
        let token = Self::new();
        token.cancel();
        token
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let seen_by_worker = token.clone();
        assert!(!seen_by_worker.is_cancelled());
        token.cancel();
        assert!(seen_by_worker.is_cancelled());
        assert!(CancellationToken::cancelled().is_cancelled());
    }
}
