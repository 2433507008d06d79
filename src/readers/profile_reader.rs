use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{Observation, Profile};
use crate::utils::constants::{
    COLUMN_DATETIME, COLUMN_DEPTH, COLUMN_LATITUDE, COLUMN_LONGITUDE, COLUMN_QC_FLAG,
    COLUMN_TEMPERATURE,
};

const REQUIRED_COLUMNS: [&str; 6] = [
    COLUMN_DATETIME,
    COLUMN_LATITUDE,
    COLUMN_LONGITUDE,
    COLUMN_DEPTH,
    COLUMN_TEMPERATURE,
    COLUMN_QC_FLAG,
];

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(rename = "DATETIME")]
    datetime: String,
    #[serde(rename = "LATITUDE")]
    latitude: f64,
    #[serde(rename = "LONGITUDE")]
    longitude: f64,
    #[serde(rename = "DEPTH")]
    depth: f64,
    #[serde(rename = "TEMPERATURE")]
    temperature: f64,
    #[serde(rename = "QC_FLAG")]
    quality_flag: u8,
}

/// Reads a quality-controlled profile exported as CSV
///
/// Rows are parsed as they are; range checks happen after quality-control
/// selection, so a flagged out-of-range sample never rejects a file.
#[derive(Debug, Default)]
pub struct ProfileReader;

impl ProfileReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_profile(&self, path: &Path) -> Result<Profile> {
        let file = File::open(path)?;
        let profile = self.read_from(file)?;
        debug!("Read {} levels from {}", profile.len(), path.display());
        Ok(profile)
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<Profile> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(ProcessingError::InvalidFormat(format!(
                "Profile is missing column '{}'",
                missing
            )));
        }

        let mut levels = Vec::new();
        for row in reader.deserialize() {
            let row: ProfileRow = row?;
            levels.push(Observation::new(
                parse_timestamp(&row.datetime)?,
                row.latitude,
                row.longitude,
                row.depth,
                row.temperature,
                row.quality_flag,
            ));
        }

        Ok(Profile::new(levels))
    }
}

/// ISO-8601 timestamp, optional fractional seconds and trailing `Z`
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('Z');
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
DATETIME,LATITUDE,LONGITUDE,DEPTH,TEMPERATURE,QC_FLAG
2023-02-28T08:19:14Z,-41.2,174.8,20.0,14.1,1
2023-02-28T08:19:12Z,-41.2,174.8,10.0,15.2,1
2023-02-28T08:19:16.500Z,-41.2,174.8,30.0,13.0,4
";

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 28)
            .unwrap()
            .and_hms_opt(8, 19, 12)
            .unwrap();
        assert_eq!(parse_timestamp("2023-02-28T08:19:12").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-02-28T08:19:12Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-02-28 08:19:12").unwrap(), expected);

        let fractional = parse_timestamp("2023-02-28T08:19:12.250Z").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);

        assert!(parse_timestamp("28/02/2023").is_err());
    }

    #[test]
    fn test_read_profile_sorts_by_time() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let profile = ProfileReader::new().read_profile(file.path()).unwrap();
        assert_eq!(profile.len(), 3);
        assert_eq!(profile.depths(), vec![10.0, 20.0, 30.0]);
        assert_eq!(profile.levels()[2].quality_flag, 4);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let csv = "DATETIME,LATITUDE,LONGITUDE,DEPTH,QC_FLAG\n2023-02-28T08:19:12,-41.2,174.8,10.0,1\n";
        let result = ProfileReader::new().read_from(csv.as_bytes());
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(ref m)) if m.contains("TEMPERATURE")));
    }

    #[test]
    fn test_flagged_out_of_range_level_is_read() {
        let csv = "\
DATETIME,LATITUDE,LONGITUDE,DEPTH,TEMPERATURE,QC_FLAG
2023-02-28T08:19:12,-41.2,174.8,-0.3,16.0,4
2023-02-28T08:19:14,-41.2,174.8,10.0,15.2,1
2023-02-28T08:19:16,-41.2,174.8,20.0,14.1,1
2023-02-28T08:19:18,-41.2,174.8,30.0,13.0,1
";
        let profile = ProfileReader::new().read_from(csv.as_bytes()).unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(profile.depths()[0], -0.3);
    }
}
