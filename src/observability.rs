//! In-process run counters, exposed on the health endpoint

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::pipeline::RunReport;

#[derive(Debug, Default)]
pub struct Metrics {
    runs_started: AtomicU64,
    runs_ready: AtomicU64,
    runs_failed: AtomicU64,
    videos_archived: AtomicU64,
    downloads_failed: AtomicU64,
    archives_delivered: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "runs_started", "Metric incremented");
    }

    pub fn run_finished(&self, report: &RunReport) {
        self.runs_ready.fetch_add(1, Ordering::Relaxed);
        self.videos_archived
            .fetch_add(report.entries.len() as u64, Ordering::Relaxed);
        self.downloads_failed
            .fetch_add(report.failures.len() as u64, Ordering::Relaxed);
        tracing::debug!(counter = "runs_ready", "Metric incremented");
    }

    pub fn run_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "runs_failed", "Metric incremented");
    }

    pub fn archive_delivered(&self) {
        self.archives_delivered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "archives_delivered", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_ready: self.runs_ready.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            videos_archived: self.videos_archived.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            archives_delivered: self.archives_delivered.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_ready: u64,
    pub runs_failed: u64,
    pub videos_archived: u64,
    pub downloads_failed: u64,
    pub archives_delivered: u64,
}
