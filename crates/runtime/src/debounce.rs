use crate::clock::Millis;

/// Per-source debounce timer with cancel-and-restart semantics.
///
/// Every qualifying event calls `restart`, replacing the previous deadline
/// (events are never queued). `fire` disarms the timer, so each arming fires
/// at most once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DebounceTimer {
    delay_ms: u64,
    deadline: Option<Millis>,
}

impl DebounceTimer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arms (or re-arms) the timer at `now + delay`.
    pub fn restart(&mut self, now: Millis) {
        self.deadline = Some(now.plus(self.delay_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true exactly once per arming, when the deadline has passed.
    pub fn fire(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebounceTimer;
    use crate::clock::Millis;

    #[test]
    fn fires_once_after_delay() {
        let mut t = DebounceTimer::new(800);
        t.restart(Millis(0));
        assert!(!t.fire(Millis(799)));
        assert!(t.fire(Millis(800)));
        assert!(!t.fire(Millis(801)));
        assert!(!t.is_armed());
    }

    #[test]
    fn restart_replaces_the_deadline() {
        let mut t = DebounceTimer::new(800);
        t.restart(Millis(0));
        t.restart(Millis(500));
        // The original deadline must not fire.
        assert!(!t.fire(Millis(800)));
        assert!(t.fire(Millis(1300)));
    }

    #[test]
    fn cancel_disarms() {
        let mut t = DebounceTimer::new(100);
        t.restart(Millis(0));
        t.cancel();
        assert!(!t.fire(Millis(1_000)));
    }
}
