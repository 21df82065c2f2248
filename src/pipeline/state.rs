use serde::Serialize;
use std::fmt;

use crate::progress::{ProgressEvent, ProgressSink};

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Searching,
    Filtering,
    Downloading,
    Archiving,
    Ready,
    Failed,
}

impl RunState {
    /// Filtering loops back to Searching for the next page and Archiving
    /// loops back to Downloading for the next item.
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;

        matches!(
            (self, next),
            (Idle, Searching)
                | (Searching, Filtering)
                | (Searching, Failed)
                | (Filtering, Searching)
                | (Filtering, Downloading)
                | (Filtering, Ready)
                | (Filtering, Failed)
                | (Downloading, Archiving)
                | (Archiving, Downloading)
                | (Archiving, Ready)
                | (Archiving, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Searching => "searching",
            RunState::Filtering => "filtering",
            RunState::Downloading => "downloading",
            RunState::Archiving => "archiving",
            RunState::Ready => "ready",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state plus the sink every transition and event is reported to
pub(crate) struct RunTracker<'a> {
    state: RunState,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> RunTracker<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            state: RunState::Idle,
            sink,
        }
    }

    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    /// Repeated transitions into the current state are ignored
    pub(crate) fn advance(&mut self, next: RunState) {
        if next == self.state {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid run transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.sink.emit(ProgressEvent::State(next));
    }

    pub(crate) fn emit(&mut self, event: ProgressEvent) {
        self.sink.emit(event);
    }
}
