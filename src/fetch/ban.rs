//! Run-wide stop signal raised when a remote host bans us

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked before any new network attempt.
///
/// Cloning yields a handle to the same flag. Raising is one-way for the
/// lifetime of the signal.
#[derive(Debug, Clone, Default)]
pub struct BanSignal {
    raised: Arc<AtomicBool>,
}

impl BanSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Returns true if this call raised it.
    pub fn raise(&self) -> bool {
        !self.raised.swap(true, Ordering::SeqCst)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
