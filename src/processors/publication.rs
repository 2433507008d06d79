use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

use crate::error::Result;
use crate::models::{DatasetAttributes, Profile};

/// Whether a dataset may go out on the GTS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    Publishable,
    NotPublic,
    MissingWigosId,
    MissingPublicationDate,
    /// First measurement before the start of the publication date
    BeforePublicationDate {
        first_measurement: NaiveDateTime,
        publication_date: NaiveDate,
    },
}

impl Publication {
    pub fn is_publishable(&self) -> bool {
        matches!(self, Publication::Publishable)
    }
}

impl fmt::Display for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Publication::Publishable => f.write_str("publishable"),
            Publication::NotPublic => f.write_str("dataset is not public"),
            Publication::MissingWigosId => f.write_str("dataset has no WIGOS identifier"),
            Publication::MissingPublicationDate => f.write_str("dataset has no publication date"),
            Publication::BeforePublicationDate {
                first_measurement,
                publication_date,
            } => write!(
                f,
                "first measurement {} is before publication date {}",
                first_measurement, publication_date
            ),
        }
    }
}

/// Decide whether `profile` with `attributes` is cleared for publication
///
/// A present but malformed WIGOS identifier or publication date is an error,
/// not a skip. A dataset without a publication date is held back. The date
/// opens at midnight, so a measurement taken that day is publishable.
pub fn check_publication(attributes: &DatasetAttributes, profile: &Profile) -> Result<Publication> {
    if !attributes.public {
        return Ok(Publication::NotPublic);
    }

    if attributes.parsed_wigos_id()?.is_none() {
        return Ok(Publication::MissingWigosId);
    }

    let Some(publication_date) = attributes.parsed_publication_date()? else {
        return Ok(Publication::MissingPublicationDate);
    };

    let Some(first_measurement) = profile.first_timestamp() else {
        return Ok(Publication::Publishable);
    };

    if first_measurement >= publication_date.and_time(NaiveTime::MIN) {
        Ok(Publication::Publishable)
    } else {
        Ok(Publication::BeforePublicationDate {
            first_measurement,
            publication_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::models::Observation;

    fn profile_on(day: u32) -> Profile {
        let timestamp = NaiveDate::from_ymd_opt(2023, 2, day)
            .unwrap()
            .and_hms_opt(8, 19, 12)
            .unwrap();
        Profile::new(vec![Observation::new(timestamp, -41.2, 174.8, 5.0, 15.0, 1)])
    }

    fn attributes(json: &str) -> DatasetAttributes {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_public_dataset_after_publication_date() {
        let attrs = attributes(
            r#"{"public": "True", "wigos_id": "0-554-0-1234567", "publication_date": "01/02/2023"}"#,
        );
        assert_eq!(
            check_publication(&attrs, &profile_on(28)).unwrap(),
            Publication::Publishable
        );
    }

    #[test]
    fn test_measurement_on_publication_day_is_publishable() {
        let attrs = attributes(
            r#"{"public": true, "wigos_id": "0-554-0-1234567", "publication_date": "28/02/2023"}"#,
        );
        let outcome = check_publication(&attrs, &profile_on(28)).unwrap();
        assert_eq!(outcome, Publication::Publishable);
        assert!(outcome.is_publishable());
    }

    #[test]
    fn test_measurement_before_publication_day_is_held_back() {
        let attrs = attributes(
            r#"{"public": true, "wigos_id": "0-554-0-1234567", "publication_date": "28/02/2023"}"#,
        );
        let outcome = check_publication(&attrs, &profile_on(27)).unwrap();
        assert!(matches!(
            outcome,
            Publication::BeforePublicationDate {
                publication_date,
                ..
            } if publication_date == NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        ));
        assert!(!outcome.is_publishable());
    }

    #[test]
    fn test_missing_publication_date_is_held_back() {
        let attrs = attributes(r#"{"public": "True", "wigos_id": "0-554-0-1234567"}"#);
        let outcome = check_publication(&attrs, &profile_on(28)).unwrap();
        assert_eq!(outcome, Publication::MissingPublicationDate);
        assert!(!outcome.is_publishable());

        let blank = attributes(
            r#"{"public": "True", "wigos_id": "0-554-0-1234567", "publication_date": "nan"}"#,
        );
        assert_eq!(
            check_publication(&blank, &profile_on(28)).unwrap(),
            Publication::MissingPublicationDate
        );
    }

    #[test]
    fn test_private_and_unidentified_datasets() {
        let private = attributes(r#"{"public": "False", "wigos_id": "0-554-0-1234567"}"#);
        assert_eq!(
            check_publication(&private, &profile_on(28)).unwrap(),
            Publication::NotPublic
        );

        let unidentified = attributes(r#"{"public": "True", "wigos_id": "nan"}"#);
        assert_eq!(
            check_publication(&unidentified, &profile_on(28)).unwrap(),
            Publication::MissingWigosId
        );
    }

    #[test]
    fn test_malformed_wigos_id_is_an_error() {
        let attrs = attributes(r#"{"public": "True", "wigos_id": "0-554"}"#);
        assert!(matches!(
            check_publication(&attrs, &profile_on(28)),
            Err(ProcessingError::InvalidWigosId(_))
        ));
    }
}
