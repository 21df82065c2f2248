//! Result filter: walks search pages lazily and keeps eligible hits in order

use std::collections::HashSet;

use tracing::debug;

use super::client::{PageSource, SearchError};
use super::models::{RawHit, SearchCriteria, VideoHit};
use super::query::SearchQuery;
use crate::config::VideoApiConfig;

/// Paging bounds for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub per_page: u32,
    /// Safety bound, consulted even when fewer hits than requested were found
    pub max_pages: u32,
}

impl From<&VideoApiConfig> for SearchLimits {
    fn from(api: &VideoApiConfig) -> Self {
        Self {
            per_page: api.per_page,
            max_pages: api.max_pages,
        }
    }
}

/// Where the filter is, reported before each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Requesting { page: u32 },
    Filtering { page: u32, hits: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub hits: Vec<VideoHit>,
    pub pages_requested: u32,
    /// Raw records received across all pages
    pub hits_received: usize,
}

/// A record is eligible iff it reports a duration inside the criteria's
/// inclusive range and offers a non-empty URL for the requested quality.
pub fn eligible(raw: &RawHit, criteria: &SearchCriteria, fallback_index: usize) -> Option<VideoHit> {
    let duration = raw.duration?;
    if !criteria.accepts_duration(duration) {
        return None;
    }
    raw.url_for(criteria.quality())?;

    Some(VideoHit::from_raw(raw, duration, fallback_index))
}

/// Collect up to `criteria.count()` eligible hits, in the order the API returns them.
///
/// Stops requesting pages as soon as enough hits are selected, after an empty
/// page, or after `limits.max_pages`. A page fetch error aborts the whole
/// selection. A hit whose identifier was already selected is skipped so entry
/// names stay unique.
pub async fn select_hits(
    source: &dyn PageSource,
    criteria: &SearchCriteria,
    limits: SearchLimits,
    mut on_phase: impl FnMut(SearchPhase),
) -> Result<Selection, SearchError> {
    let wanted = criteria.count() as usize;
    let mut selection = Selection::default();
    let mut selected_ids = HashSet::new();

    for page in 1..=limits.max_pages {
        on_phase(SearchPhase::Requesting { page });
        let query = SearchQuery::for_page(criteria, page, limits.per_page);
        let result = source.fetch_page(&query).await?;
        selection.pages_requested = page;

        on_phase(SearchPhase::Filtering {
            page,
            hits: result.hits.len(),
        });

        if result.hits.is_empty() {
            debug!(page, "Empty search page, no more results");
            break;
        }

        selection.hits_received += result.hits.len();

        for raw in &result.hits {
            // Hits without an id are named by their position among the selected
            let Some(hit) = eligible(raw, criteria, selection.hits.len()) else {
                continue;
            };

            if !selected_ids.insert(hit.id.clone()) {
                debug!(id = %hit.id, "Skipping repeated hit");
                continue;
            }

            selection.hits.push(hit);
            if selection.hits.len() >= wanted {
                break;
            }
        }

        debug!(
            page,
            selected = selection.hits.len(),
            wanted,
            "Search page filtered"
        );

        if selection.hits.len() >= wanted {
            break;
        }
    }

    Ok(selection)
}
