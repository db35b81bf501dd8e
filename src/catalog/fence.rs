//! Generation tokens for discarding out-of-order responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Token attached to one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FenceToken(u64);

impl FenceToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out monotonically increasing tokens; only the newest is current.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestFence {
    latest: Arc<AtomicU64>,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token, invalidating every earlier one.
    pub fn issue(&self) -> FenceToken {
        FenceToken(self.latest.fetch_add(1, Ordering::SeqCst).wrapping_add(1))
    }

    pub fn is_latest(&self, token: FenceToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn latest(&self) -> Option<FenceToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            value => Some(FenceToken(value)),
        }
    }
}
