//! Search criteria, the raw API payload and the filtered hit

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rendition tag offered by the video API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Medium, Quality::Small, Quality::Tiny, Quality::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Tiny => "tiny",
            Quality::Small => "small",
            Quality::Medium => "medium",
            Quality::Large => "large",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown quality '{0}', expected one of tiny, small, medium, large")]
pub struct UnknownQuality(pub String);

impl FromStr for Quality {
    type Err = UnknownQuality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quality::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownQuality(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("keyword must not be empty")]
    EmptyKeyword,
    #[error("minimum duration must be positive")]
    ZeroMinDuration,
    #[error("minimum duration ({min}s) must be less than maximum duration ({max}s)")]
    InvertedDurationRange { min: u32, max: u32 },
    #[error("number of videos must be at least 1")]
    ZeroCount,
}

/// What one run searches for. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    keyword: String,
    min_duration: u32,
    max_duration: u32,
    quality: Quality,
    count: u32,
}

#[bon::bon]
impl SearchCriteria {
    #[builder]
    pub fn new(
        #[builder(into)] keyword: String,
        min_duration: u32,
        max_duration: u32,
        #[builder(default)] quality: Quality,
        count: u32,
    ) -> Result<Self, CriteriaError> {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            return Err(CriteriaError::EmptyKeyword);
        }
        if min_duration == 0 {
            return Err(CriteriaError::ZeroMinDuration);
        }
        if min_duration >= max_duration {
            return Err(CriteriaError::InvertedDurationRange {
                min: min_duration,
                max: max_duration,
            });
        }
        if count == 0 {
            return Err(CriteriaError::ZeroCount);
        }

        Ok(Self {
            keyword,
            min_duration,
            max_duration,
            quality,
            count,
        })
    }
}

impl SearchCriteria {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn min_duration(&self) -> u32 {
        self.min_duration
    }

    pub fn max_duration(&self) -> u32 {
        self.max_duration
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Inclusive on both ends
    pub fn accepts_duration(&self, seconds: f64) -> bool {
        f64::from(self.min_duration) <= seconds && seconds <= f64::from(self.max_duration)
    }
}

/// Identifier as reported by the API: numeric today, but treated as opaque
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HitId {
    Number(u64),
    Text(String),
}

impl fmt::Display for HitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitId::Number(n) => write!(f, "{n}"),
            HitId::Text(s) => f.write_str(s),
        }
    }
}

/// One rendition of a video
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendition {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// One search result record, as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHit {
    #[serde(default)]
    pub id: Option<HitId>,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Keyed by rendition tag; tags this crate does not know are kept but never selected
    #[serde(default)]
    pub videos: HashMap<String, Rendition>,
}

impl RawHit {
    /// Non-empty download URL for `quality`, if the hit offers one
    pub fn url_for(&self, quality: Quality) -> Option<&str> {
        self.videos
            .get(quality.as_str())
            .map(|r| r.url.trim())
            .filter(|url| !url.is_empty())
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// A hit that passed the filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoHit {
    pub id: String,
    pub duration: f64,
    pub urls: BTreeMap<Quality, String>,
}

impl VideoHit {
    /// Keeps every known rendition with a non-empty URL.
    ///
    /// `fallback_index` names hits the API returned without an identifier.
    pub fn from_raw(raw: &RawHit, duration: f64, fallback_index: usize) -> Self {
        let id = raw
            .id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("unknown_id_{fallback_index}"));

        let urls = Quality::ALL
            .into_iter()
            .filter_map(|q| raw.url_for(q).map(|url| (q, url.to_string())))
            .collect();

        Self { id, duration, urls }
    }

    pub fn url(&self, quality: Quality) -> Option<&str> {
        self.urls.get(&quality).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parse_and_display() {
        assert_eq!("Medium".parse::<Quality>().unwrap(), Quality::Medium);
        assert_eq!(" large ".parse::<Quality>().unwrap(), Quality::Large);
        assert_eq!(Quality::Tiny.to_string(), "tiny");
        assert!("huge".parse::<Quality>().is_err());
        assert_eq!(Quality::default(), Quality::Medium);
    }

    #[test]
    fn test_criteria_builder_validates() {
        let criteria = SearchCriteria::builder()
            .keyword("  nature ")
            .min_duration(10)
            .max_duration(30)
            .count(5)
            .build()
            .unwrap();

        assert_eq!(criteria.keyword(), "nature");
        assert_eq!(criteria.quality(), Quality::Medium);
        assert!(criteria.accepts_duration(10.0));
        assert!(criteria.accepts_duration(30.0));
        assert!(!criteria.accepts_duration(30.5));
        assert!(!criteria.accepts_duration(9.0));
    }

    #[test]
    fn test_criteria_rejects_inverted_range() {
        let err = SearchCriteria::builder()
            .keyword("nature")
            .min_duration(30)
            .max_duration(10)
            .count(5)
            .build()
            .unwrap_err();

        assert_eq!(err, CriteriaError::InvertedDurationRange { min: 30, max: 10 });
    }

    #[test]
    fn test_criteria_rejects_equal_bounds_and_zero_values() {
        let build = |min, max, count, keyword: &str| {
            SearchCriteria::builder()
                .keyword(keyword)
                .min_duration(min)
                .max_duration(max)
                .count(count)
                .build()
        };

        assert!(matches!(
            build(10, 10, 5, "x"),
            Err(CriteriaError::InvertedDurationRange { .. })
        ));
        assert_eq!(build(0, 10, 5, "x"), Err(CriteriaError::ZeroMinDuration));
        assert_eq!(build(1, 10, 0, "x"), Err(CriteriaError::ZeroCount));
        assert_eq!(build(1, 10, 1, "   "), Err(CriteriaError::EmptyKeyword));
    }

    #[test]
    fn test_decode_pixabay_page() {
        let body = r#"{
            "total": 2, "totalHits": 2,
            "hits": [
                {"id": 125, "duration": 12, "tags": "river",
                 "videos": {
                    "large": {"url": "", "width": 0, "height": 0, "size": 0},
                    "medium": {"url": "https://cdn.example/125_medium.mp4", "width": 1280, "height": 720, "size": 120}
                 }},
                {"id": "abc", "videos": {}}
            ]
        }"#;

        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_hits, 2);
        assert_eq!(page.hits.len(), 2);

        let first = &page.hits[0];
        assert_eq!(first.id, Some(HitId::Number(125)));
        assert_eq!(first.duration, Some(12.0));
        assert_eq!(first.url_for(Quality::Medium), Some("https://cdn.example/125_medium.mp4"));
        assert_eq!(first.url_for(Quality::Large), None);
        assert_eq!(first.url_for(Quality::Small), None);

        let second = &page.hits[1];
        assert_eq!(second.id, Some(HitId::Text("abc".to_string())));
        assert!(second.duration.is_none());
    }

    #[test]
    fn test_missing_hits_decodes_as_empty() {
        let page: SearchPage = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(page.hits.is_empty());
    }

    #[test]
    fn test_video_hit_from_raw() {
        let mut raw = RawHit {
            id: None,
            duration: Some(15.0),
            videos: HashMap::new(),
        };
        raw.videos.insert(
            "small".to_string(),
            Rendition {
                url: "https://cdn.example/s.mp4".to_string(),
                ..Default::default()
            },
        );
        raw.videos.insert("hd".to_string(), Rendition::default());

        let hit = VideoHit::from_raw(&raw, 15.0, 3);
        assert_eq!(hit.id, "unknown_id_3");
        assert_eq!(hit.url(Quality::Small), Some("https://cdn.example/s.mp4"));
        assert_eq!(hit.urls.len(), 1);
    }
}
