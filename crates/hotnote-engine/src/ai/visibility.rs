use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared view of whether the hosting page is hidden.
///
/// The host flips it from its visibility/unload handlers; the queue reads
/// it when a request fails so teardown noise is not reported as an error.
#[derive(Debug, Clone, Default)]
pub struct PageVisibility {
    hidden: Arc<AtomicBool>,
}

impl PageVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::Release);
    }
}
