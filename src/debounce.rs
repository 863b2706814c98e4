/// Trailing-edge debounce.
///
/// Each `trigger` replaces whatever is pending and restarts the window. The
/// value fires from `poll` once the window has elapsed with no newer trigger.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    window_ms: u64,
    pending: Option<(u64, T)>,
}

impl<T> Debounce<T> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    /// Schedules `value` to fire at `now_ms + window`. Returns `true` if an
    /// earlier pending value was cancelled.
    pub fn trigger(&mut self, value: T, now_ms: u64) -> bool {
        let deadline = now_ms.saturating_add(self.window_ms);
        self.pending.replace((deadline, value)).is_some()
    }

    /// Takes the pending value if its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now_ms >= deadline) {
            self.cancel()
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Drops the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }
}
