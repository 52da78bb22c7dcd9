/// Millisecond timestamp on the orchestrator's monotonic timebase.
///
/// Time is always passed explicitly; nothing in the library crates reads an
/// ambient clock, which keeps every scheduling decision replayable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(pub u64);

impl Millis {
    pub fn plus(self, delta_ms: u64) -> Self {
        Millis(self.0.saturating_add(delta_ms))
    }

    /// Elapsed time since `earlier`, clamped to zero.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Millis;

    #[test]
    fn plus_and_since_round_trip() {
        let t0 = Millis(100);
        let t1 = t0.plus(800);
        assert_eq!(t1, Millis(900));
        assert_eq!(t1.since(t0), 800);
        assert_eq!(t0.since(t1), 0);
    }
}
