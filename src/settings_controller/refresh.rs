use std::sync::atomic::{AtomicBool, Ordering};

/// Allows a single list refresh in flight at a time
#[derive(Debug, Default)]
pub struct RefreshGuard {
    busy: AtomicBool,
}

impl RefreshGuard {
    /// Take the permit, or `None` if a refresh is already running
    pub fn try_acquire(&self) -> Option<RefreshPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshPermit { guard: self })
    }
}

/// Released on drop
#[derive(Debug)]
pub struct RefreshPermit<'a> {
    guard: &'a RefreshGuard,
}

impl Drop for RefreshPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}
