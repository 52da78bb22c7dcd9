use geo::Viewport;
use runtime::{DebounceTimer, Millis};
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::filters::{Unsuitable, check_suitable, significant_change};
use crate::task::{FetchTask, Seq, SourceId, TaskStatus};

/// The most recently applied load for a source.
///
/// Updated only when a successful completion's sequence number is still
/// current, so slow responses for old viewports can never become the memo.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadedMemo {
    pub viewport: Viewport,
    pub loaded_at: Millis,
}

/// Authorization to issue one fetch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FetchTicket {
    pub source: SourceId,
    pub seq: Seq,
    pub viewport: Viewport,
}

/// Outcome of a debounce firing.
#[derive(Debug, Clone, PartialEq)]
pub enum Poll {
    /// Filters passed; the caller should build and dispatch the request.
    Issue(FetchTicket),
    /// Precondition rejection to surface to the UI; nothing was attempted.
    Rejected(Unsuitable),
    /// Not significantly different from the last loaded viewport.
    Unchanged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The completion matched the current task and was applied.
    Applied,
    /// Superseded result; silently discarded.
    Discarded,
}

/// Per-source fetch scheduler.
///
/// Owns the source's debounce timer, monotonic sequence counter, current
/// task and last-loaded memo, as plain state that is unit-testable without a
/// UI framework.
///
/// Invariants:
/// - At most one Pending/InFlight task exists at any time.
/// - Filters are re-checked when the timer fires, not when it is armed.
/// - "Last request wins": completions for superseded sequences are discarded.
#[derive(Debug)]
pub struct SourceScheduler {
    source: SourceId,
    config: SchedulerConfig,
    timer: DebounceTimer,
    next_seq: u64,
    task: Option<FetchTask>,
    memo: Option<LoadedMemo>,
    candidate: Option<Viewport>,
}

impl SourceScheduler {
    pub fn new(source: SourceId) -> Self {
        Self::with_config(source, SchedulerConfig::for_source(source))
    }

    pub fn with_config(source: SourceId, config: SchedulerConfig) -> Self {
        Self {
            source,
            config,
            timer: DebounceTimer::new(config.debounce_ms),
            next_seq: 1,
            task: None,
            memo: None,
            candidate: None,
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn memo(&self) -> Option<&LoadedMemo> {
        self.memo.as_ref()
    }

    pub fn task(&self) -> Option<&FetchTask> {
        self.task.as_ref()
    }

    /// True while a task is Pending or InFlight.
    pub fn is_loading(&self) -> bool {
        self.task.is_some_and(|t| !t.status.is_terminal())
    }

    /// Records a qualifying viewport event and restarts the debounce.
    pub fn note_viewport(&mut self, viewport: Viewport, now: Millis) {
        self.candidate = Some(viewport);
        self.timer.restart(now);
    }

    /// Advances the scheduler clock; fires the debounce if due.
    ///
    /// Suitability and significance are evaluated here, at fire time: the
    /// viewport may have changed during the delay.
    pub fn poll(&mut self, now: Millis) -> Option<Poll> {
        if !self.timer.fire(now) {
            return None;
        }
        let viewport = self.candidate.take()?;

        if let Err(reason) = check_suitable(&viewport, &self.config.filter) {
            debug!(source = self.source.as_str(), %reason, "fetch gated");
            return Some(Poll::Rejected(reason));
        }
        if let Some(memo) = &self.memo {
            if !significant_change(&viewport, &memo.viewport, &self.config.filter) {
                return Some(Poll::Unchanged);
            }
        }

        Some(Poll::Issue(self.issue(viewport, now)))
    }

    /// Issues immediately, bypassing the debounce and the significance check
    /// (used for layer activation and AOI commits). Suitability is still the
    /// caller's responsibility for viewport-scoped sources.
    pub fn issue_now(&mut self, viewport: Viewport, now: Millis) -> FetchTicket {
        self.timer.cancel();
        self.candidate = None;
        self.issue(viewport, now)
    }

    fn issue(&mut self, viewport: Viewport, now: Millis) -> FetchTicket {
        if let Some(task) = self.task.as_mut() {
            if !task.status.is_terminal() {
                debug!(
                    source = self.source.as_str(),
                    seq = task.seq.0,
                    "superseding unfinished task"
                );
                task.status = TaskStatus::Stale;
            }
        }

        let seq = Seq(self.next_seq);
        self.next_seq += 1;
        self.task = Some(FetchTask {
            source: self.source,
            seq,
            status: TaskStatus::Pending,
            viewport,
            issued_at: now,
        });
        debug!(source = self.source.as_str(), seq = seq.0, "fetch issued");

        FetchTicket {
            source: self.source,
            seq,
            viewport,
        }
    }

    /// Marks the task as handed to the transport.
    pub fn mark_in_flight(&mut self, seq: Seq) {
        if let Some(task) = self.task.as_mut() {
            if task.seq == seq && task.status == TaskStatus::Pending {
                task.status = TaskStatus::InFlight;
            }
        }
    }

    /// Applies a successful completion if its sequence is still current.
    pub fn complete_success(&mut self, seq: Seq, now: Millis) -> Completion {
        match self.current_if_matches(seq) {
            Some(task) => {
                task.status = TaskStatus::Done;
                self.memo = Some(LoadedMemo {
                    viewport: task.viewport,
                    loaded_at: now,
                });
                Completion::Applied
            }
            None => {
                debug!(
                    source = self.source.as_str(),
                    seq = seq.0,
                    "stale success discarded"
                );
                Completion::Discarded
            }
        }
    }

    /// Records a failed completion. The memo is untouched (prior data stays
    /// visible); there is no automatic retry — the next qualifying viewport
    /// event is the only retry trigger.
    pub fn complete_failure(&mut self, seq: Seq) -> Completion {
        match self.current_if_matches(seq) {
            Some(task) => {
                task.status = TaskStatus::Done;
                Completion::Applied
            }
            None => {
                debug!(
                    source = self.source.as_str(),
                    seq = seq.0,
                    "stale failure discarded"
                );
                Completion::Discarded
            }
        }
    }

    /// Invalidates any outstanding work; an in-flight result will be
    /// discarded on arrival via the usual staleness check. Used when the AOI
    /// is cleared or the layer is deactivated.
    pub fn invalidate(&mut self) {
        self.timer.cancel();
        self.candidate = None;
        self.memo = None;
        if let Some(task) = self.task.as_mut() {
            if !task.status.is_terminal() {
                task.status = TaskStatus::Stale;
            }
        }
    }

    fn current_if_matches(&mut self, seq: Seq) -> Option<&mut FetchTask> {
        self.task
            .as_mut()
            .filter(|t| t.seq == seq && t.status != TaskStatus::Stale)
    }
}
