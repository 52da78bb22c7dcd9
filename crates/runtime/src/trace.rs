use crate::clock::Millis;

/// One orchestrator event, kept for UI-visible diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub at: Millis,
    pub kind: &'static str,
    pub message: String,
}

/// Bounded in-memory event log.
///
/// Oldest events are dropped once `capacity` is reached; ordering within the
/// log is insertion order.
#[derive(Debug)]
pub struct TraceLog {
    capacity: usize,
    events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, at: Millis, kind: &'static str, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.remove(0);
        }
        self.events.push(TraceEvent {
            at,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn latest(&self, kind: &str) -> Option<&TraceEvent> {
        self.events.iter().rev().find(|e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::TraceLog;
    use crate::clock::Millis;

    #[test]
    fn records_in_order() {
        let mut log = TraceLog::new(8);
        log.record(Millis(1), "fetch", "issued");
        log.record(Millis(2), "fetch", "applied");
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.latest("fetch").unwrap().message, "applied");
    }

    #[test]
    fn drops_oldest_at_capacity() {
        let mut log = TraceLog::new(2);
        log.record(Millis(1), "a", "1");
        log.record(Millis(2), "b", "2");
        log.record(Millis(3), "c", "3");
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.events()[0].kind, "b");
    }
}
