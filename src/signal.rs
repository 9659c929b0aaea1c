use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Flag {
    cancelled: Mutex<bool>,
    changed: Condvar,
}

/// Cancellation signal shared between the generator and the placer.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<Flag>,
}

impl CancelToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        *self
            .flag
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;

        self.flag.changed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .flag
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for `duration` or until cancelled, whichever comes first.
    ///
    /// Returns `true` if the sleep was cut short by cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        let cancelled = self
            .flag
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (cancelled, _) = self
            .flag
            .changed
            .wait_timeout_while(cancelled, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);

        *cancelled
    }
}
