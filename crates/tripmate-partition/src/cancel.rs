//! Cooperative cancellation of a running partition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked between clustering iterations and refinement steps.
///
/// # Example
///
/// ```
/// use tripmate_partition::CancelFlag;
///
/// let flag = CancelFlag::new();
/// let observer = flag.clone();
/// flag.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Guard that cancels the flag when dropped.
    ///
    /// Hold it in the future awaiting a blocking partition so that dropping
    /// the future stops the work.
    pub fn cancel_on_drop(&self) -> CancelGuard {
        CancelGuard(self.clone())
    }
}

/// Cancels its [`CancelFlag`] on drop.
#[derive(Debug)]
pub struct CancelGuard(CancelFlag);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
