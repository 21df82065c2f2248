use thiserror::Error;

use super::models::RunForm;
use crate::config::FormDefaults;
use crate::search::{CriteriaError, Quality, SearchCriteria, UnknownQuality};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{field} must be a positive whole number of seconds")]
    InvalidDuration { field: &'static str },
    #[error("Select how many videos to download")]
    MissingCount,
    #[error("Number of videos must be between 1 and {max}")]
    CountOutOfRange { max: u32 },
    #[error(transparent)]
    Quality(#[from] UnknownQuality),
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}

/// Turn a submitted search form into criteria. Runs before any network call.
pub fn criteria_from_form(
    form: &RunForm,
    defaults: &FormDefaults,
) -> Result<SearchCriteria, FormError> {
    let min_duration = parse_duration(&form.min_duration, "Minimum duration")?;
    let max_duration = parse_duration(&form.max_duration, "Maximum duration")?;

    let count = match form.count.trim() {
        "" => return Err(FormError::MissingCount),
        raw => raw
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=defaults.max_count).contains(n))
            .ok_or(FormError::CountOutOfRange {
                max: defaults.max_count,
            })?,
    };

    let quality = match form.quality.trim() {
        "" => defaults.quality,
        raw => raw.parse::<Quality>()?,
    };

    let criteria = SearchCriteria::builder()
        .keyword(form.keyword.as_str())
        .min_duration(min_duration)
        .max_duration(max_duration)
        .quality(quality)
        .count(count)
        .build()?;

    Ok(criteria)
}

fn parse_duration(raw: &str, field: &'static str) -> Result<u32, FormError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(FormError::InvalidDuration { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(min: &str, max: &str, quality: &str, count: &str) -> RunForm {
        RunForm {
            keyword: "nature".to_string(),
            min_duration: min.to_string(),
            max_duration: max.to_string(),
            quality: quality.to_string(),
            count: count.to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let criteria = criteria_from_form(&form("10", "30", "large", "5"), &FormDefaults::default())
            .unwrap();

        assert_eq!(criteria.keyword(), "nature");
        assert_eq!(criteria.quality(), Quality::Large);
        assert_eq!(criteria.count(), 5);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = criteria_from_form(&form("30", "10", "medium", "5"), &FormDefaults::default())
            .unwrap_err();

        assert_eq!(
            err,
            FormError::Criteria(CriteriaError::InvertedDurationRange { min: 30, max: 10 })
        );
    }

    #[test]
    fn test_missing_count_rejected() {
        let err = criteria_from_form(&form("10", "30", "medium", " "), &FormDefaults::default())
            .unwrap_err();
        assert_eq!(err, FormError::MissingCount);
    }

    #[test]
    fn test_count_bounds() {
        let defaults = FormDefaults::default();
        assert_eq!(
            criteria_from_form(&form("10", "30", "medium", "21"), &defaults).unwrap_err(),
            FormError::CountOutOfRange { max: 20 }
        );
        assert_eq!(
            criteria_from_form(&form("10", "30", "medium", "0"), &defaults).unwrap_err(),
            FormError::CountOutOfRange { max: 20 }
        );
    }

    #[test]
    fn test_bad_numbers_and_quality() {
        let defaults = FormDefaults::default();
        assert!(matches!(
            criteria_from_form(&form("ten", "30", "medium", "5"), &defaults),
            Err(FormError::InvalidDuration { field: "Minimum duration" })
        ));
        assert!(matches!(
            criteria_from_form(&form("0", "30", "medium", "5"), &defaults),
            Err(FormError::InvalidDuration { .. })
        ));
        assert!(matches!(
            criteria_from_form(&form("10", "30", "4k", "5"), &defaults),
            Err(FormError::Quality(_))
        ));
    }

    #[test]
    fn test_blank_quality_uses_default() {
        let criteria =
            criteria_from_form(&form("10", "30", "", "2"), &FormDefaults::default()).unwrap();
        assert_eq!(criteria.quality(), Quality::Medium);
    }
}
