//! Video search: query building, the API page source and result filtering

mod client;
mod filter;
mod models;
mod query;

pub use client::{PageSource, SearchError, VideoApiClient};
pub use filter::{SearchLimits, SearchPhase, Selection, eligible, select_hits};
pub use models::{
    CriteriaError, HitId, Quality, RawHit, Rendition, SearchCriteria, SearchPage, UnknownQuality,
    VideoHit,
};
pub use query::SearchQuery;
