use std::sync::atomic::{AtomicU64, Ordering};

/// Monotone sequence numbers for one kind of asynchronous operation.
///
/// Backend calls of the same kind may complete out of order; a fast second
/// call can finish before a slow first one. Each outbound call is tagged
/// with a token from [`issue`](Self::issue), and every write into shared
/// state is preceded by [`is_current`](Self::is_current). A response whose
/// token is no longer current was superseded, not failed, and is discarded
/// silently.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

/// Opaque label for one outstanding request. Compares stale the moment a
/// later token is issued by the same sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a sequence number strictly greater than all previously
    /// issued for this kind.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True iff no later `issue` has occurred since `token` was allocated.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Orphans every outstanding token without starting a new request.
    ///
    /// Used when the state a pending response would apply to no longer
    /// exists (e.g. the image set was cleared while a decode was in flight).
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
