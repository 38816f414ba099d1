use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag. Clones share the same flag, so one clone can be handed to
/// whatever decides to stop a search while the planner polls another.
///
/// The planner polls the flag once before every open-set pop; setting it never interrupts an
/// expansion in progress.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}
