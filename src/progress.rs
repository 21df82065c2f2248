//! Run progress events and sinks

use tracing::{info, warn};

use crate::fetch::DownloadProgress;
use crate::pipeline::RunState;

/// Something that happened during a run, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    State(RunState),
    PageReceived {
        page: u32,
        hits: usize,
    },
    Selected {
        count: usize,
    },
    DownloadStarted {
        index: usize,
        total: usize,
        file_name: String,
    },
    Download {
        index: usize,
        file_name: String,
        progress: DownloadProgress,
    },
    Archived {
        file_name: String,
        bytes: usize,
    },
    ItemFailed {
        file_name: String,
        message: String,
    },
    Warning(String),
}

/// Receives progress from one run
pub trait ProgressSink: Send {
    fn emit(&mut self, event: ProgressEvent);
}

/// Logs every event through `tracing`.
///
/// Byte updates are logged at most once per 10% step.
#[derive(Debug, Default)]
pub struct TracingProgress {
    last_step: Option<(usize, u8)>,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for TracingProgress {
    fn emit(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::State(state) => info!(%state, "Run state changed"),
            ProgressEvent::PageReceived { page, hits } => info!(page, hits, "Search page received"),
            ProgressEvent::Selected { count } => info!(count, "Videos matching criteria"),
            ProgressEvent::DownloadStarted {
                index,
                total,
                file_name,
            } => info!(item = index + 1, total, %file_name, "Downloading"),
            ProgressEvent::Download {
                index,
                file_name,
                progress,
            } => {
                let step = progress.percent() / 10;
                if self.last_step != Some((index, step)) {
                    self.last_step = Some((index, step));
                    info!(
                        %file_name,
                        received = progress.received,
                        total = ?progress.total,
                        percent = progress.percent(),
                        "Download progress"
                    );
                }
            }
            ProgressEvent::Archived { file_name, bytes } => info!(%file_name, bytes, "Archived"),
            ProgressEvent::ItemFailed { file_name, message } => {
                warn!(%file_name, error = %message, "Download failed, skipping")
            }
            ProgressEvent::Warning(message) => warn!(%message, "Run warning"),
        }
    }
}

/// Keeps every event except per-chunk byte updates, in order
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
    pub byte_updates: usize,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<RunState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::State(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Download { .. } => self.byte_updates += 1,
            other => self.events.push(other),
        }
    }
}
