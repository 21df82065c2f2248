//! Run pipeline: search → filter → fetch → archive
//!
//! [`Pipeline::run`] is a plain sequential async function. It keeps no state
//! between calls; everything a run produces is returned in its
//! [`RunOutcome`]. Each page request and each download is awaited before the
//! next one starts.
//!
//! Failure policy:
//! - search-phase errors (transport, HTTP status, decoding) abort the run
//!   with [`RunError::Search`], no archive is produced
//! - a failed download is recorded as an [`ItemFailure`] and skipped
//! - no eligible hits, or no successful downloads, end the run in
//!   [`RunState::Ready`] with a [`RunWarning`] and no archive

mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::archive::{ArchiveBuilder, ArchiveBundle, ArchiveError};
use crate::config::{Config, ConfigError};
use crate::fetch::{AssetNaming, FetchError, HttpClient, HttpConfig};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::search::{
    PageSource, Quality, SearchCriteria, SearchError, SearchLimits, SearchPhase, VideoApiClient,
    select_hits,
};

pub use state::RunState;
use state::RunTracker;

/// Fatal run failure
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("archive could not be written: {0}")]
    Archive(#[from] ArchiveError),
}

/// Pipeline construction failure, reported at startup
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] FetchError),
}

/// Non-fatal end of a run with nothing to offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunWarning {
    NoEligibleHits,
    NothingDownloaded,
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RunWarning::NoEligibleHits => "No videos found matching your criteria.",
            RunWarning::NothingDownloaded => "No videos were successfully downloaded.",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub file_name: String,
    pub message: String,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub state: RunState,
    pub keyword: String,
    pub quality: Quality,
    pub requested: u32,
    pub pages_requested: u32,
    pub hits_received: usize,
    pub selected: usize,
    pub entries: Vec<String>,
    pub failures: Vec<ItemFailure>,
    pub warning: Option<RunWarning>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Present only when at least one video was archived
    pub archive: Option<ArchiveBundle>,
}

/// Per-deployment knobs the pipeline needs
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub limits: SearchLimits,
    pub naming: AssetNaming,
    pub archive_file_name: String,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            limits: SearchLimits::from(&config.api),
            naming: AssetNaming::from(&config.archive),
            archive_file_name: config.archive.file_name.clone(),
        }
    }
}

pub struct Pipeline {
    source: Arc<dyn PageSource>,
    fetcher: HttpClient,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(source: Arc<dyn PageSource>, fetcher: HttpClient, settings: PipelineSettings) -> Self {
        Self {
            source,
            fetcher,
            settings,
        }
    }

    /// Wire the real API client and downloader from configuration.
    ///
    /// Fails when the API key is missing.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let api_key = config.api_key()?.clone();
        let fetcher = HttpClient::new(HttpConfig::from(&config.http))?;
        let source = VideoApiClient::new(fetcher.inner().clone(), &config.api.endpoint, api_key);

        Ok(Self::new(Arc::new(source), fetcher, PipelineSettings::from(config)))
    }

    /// Execute one run for already-validated criteria
    pub async fn run(
        &self,
        criteria: &SearchCriteria,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, RunError> {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let mut tracker = RunTracker::new(progress);

        info!(
            %run_id,
            keyword = criteria.keyword(),
            min = criteria.min_duration(),
            max = criteria.max_duration(),
            quality = %criteria.quality(),
            count = criteria.count(),
            "Starting run"
        );

        let searched = select_hits(
            self.source.as_ref(),
            criteria,
            self.settings.limits,
            |phase| match phase {
                SearchPhase::Requesting { .. } => tracker.advance(RunState::Searching),
                SearchPhase::Filtering { page, hits } => {
                    tracker.advance(RunState::Filtering);
                    tracker.emit(ProgressEvent::PageReceived { page, hits });
                }
            },
        )
        .await;

        let selection = match searched {
            Ok(selection) => selection,
            Err(err) => {
                error!(%run_id, error = %err, "Search failed, aborting run");
                tracker.advance(RunState::Failed);
                return Err(err.into());
            }
        };

        let mut report = RunReport {
            run_id,
            state: RunState::Filtering,
            keyword: criteria.keyword().to_string(),
            quality: criteria.quality(),
            requested: criteria.count(),
            pages_requested: selection.pages_requested,
            hits_received: selection.hits_received,
            selected: selection.hits.len(),
            entries: Vec::new(),
            failures: Vec::new(),
            warning: None,
            started_at,
            finished_at: started_at,
        };

        tracker.emit(ProgressEvent::Selected {
            count: selection.hits.len(),
        });

        if selection.hits.is_empty() {
            return Ok(finish(report, None, Some(RunWarning::NoEligibleHits), &mut tracker));
        }

        let wanted = criteria.count() as usize;
        let total = selection.hits.len();
        let mut builder = ArchiveBuilder::new();

        for (index, hit) in selection.hits.iter().enumerate() {
            if builder.entries().len() >= wanted {
                break;
            }

            tracker.advance(RunState::Downloading);
            let file_name = self.settings.naming.file_name(&hit.id);
            tracker.emit(ProgressEvent::DownloadStarted {
                index,
                total,
                file_name: file_name.clone(),
            });

            let fetched = self
                .fetcher
                .fetch(hit, criteria.quality(), &self.settings.naming, |progress| {
                    tracker.emit(ProgressEvent::Download {
                        index,
                        file_name: file_name.clone(),
                        progress,
                    })
                })
                .await;

            let asset = match fetched {
                Ok(asset) => asset,
                Err(err) => {
                    record_failure(&mut report, &mut tracker, file_name, err.to_string());
                    continue;
                }
            };

            tracker.advance(RunState::Archiving);
            let bytes = asset.len();
            match builder.append(asset) {
                Ok(()) => tracker.emit(ProgressEvent::Archived { file_name, bytes }),
                Err(err @ ArchiveError::DuplicateEntry(_)) => {
                    record_failure(&mut report, &mut tracker, file_name, err.to_string());
                }
                Err(err) => {
                    error!(%run_id, error = %err, "Archive write failed, aborting run");
                    tracker.advance(RunState::Failed);
                    return Err(err.into());
                }
            }
        }

        tracker.advance(RunState::Archiving);
        let bundle = match builder.seal(&self.settings.archive_file_name) {
            Ok(bundle) => bundle,
            Err(err) => {
                error!(%run_id, error = %err, "Archive could not be sealed");
                tracker.advance(RunState::Failed);
                return Err(err.into());
            }
        };

        report.entries = bundle.entries.clone();
        let outcome = if bundle.is_empty() {
            finish(report, None, Some(RunWarning::NothingDownloaded), &mut tracker)
        } else {
            finish(report, Some(bundle), None, &mut tracker)
        };

        Ok(outcome)
    }
}

fn record_failure(
    report: &mut RunReport,
    tracker: &mut RunTracker<'_>,
    file_name: String,
    message: String,
) {
    tracker.emit(ProgressEvent::ItemFailed {
        file_name: file_name.clone(),
        message: message.clone(),
    });
    report.failures.push(ItemFailure { file_name, message });
}

fn finish(
    mut report: RunReport,
    archive: Option<ArchiveBundle>,
    warning: Option<RunWarning>,
    tracker: &mut RunTracker<'_>,
) -> RunOutcome {
    if let Some(warning) = warning {
        tracker.emit(ProgressEvent::Warning(warning.to_string()));
    }
    tracker.advance(RunState::Ready);

    report.state = tracker.state();
    report.warning = warning;
    report.finished_at = Utc::now();

    info!(
        run_id = %report.run_id,
        entries = report.entries.len(),
        failures = report.failures.len(),
        archive_bytes = archive.as_ref().map(ArchiveBundle::len).unwrap_or(0),
        "Run finished"
    );

    RunOutcome { report, archive }
}
