use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// One sensor sample of a towed or subsurface temperature profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    pub timestamp: NaiveDateTime,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Metres below the surface
    #[validate(range(min = 0.0))]
    pub depth: f64,

    /// Degrees Celsius
    pub temperature: f64,

    pub quality_flag: u8,
}

impl Observation {
    pub fn new(
        timestamp: NaiveDateTime,
        latitude: f64,
        longitude: f64,
        depth: f64,
        temperature: f64,
        quality_flag: u8,
    ) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            depth,
            temperature,
            quality_flag,
        }
    }

    /// Position and depth range check
    pub fn check_range(&self) -> Result<()> {
        self.validate().map_err(|e| {
            ProcessingError::InvalidFormat(format!("Level at {}: {}", self.timestamp, e))
        })
    }
}

/// Observations of a single cast, ordered by timestamp
///
/// Depth is not monotonic: a cast usually holds both the descent and the
/// ascent of the sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    levels: Vec<Observation>,
}

impl Profile {
    pub fn new(mut levels: Vec<Observation>) -> Self {
        levels.sort_by_key(|level| level.timestamp);
        Self { levels }
    }

    pub fn levels(&self) -> &[Observation] {
        &self.levels
    }

    pub fn into_levels(self) -> Vec<Observation> {
        self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn depths(&self) -> Vec<f64> {
        self.levels.iter().map(|level| level.depth).collect()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.levels.first().map(|level| level.timestamp)
    }

}
