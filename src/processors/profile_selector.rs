use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{Observation, Profile, SelectedLevel, SelectedProfile};
use crate::processors::upcast::{extract_cast, CastDirection};
use crate::utils::constants::DEFAULT_QC_FLAG;

/// Which quality-control flags a level must carry to be encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcPolicy {
    Exact(u8),
    AnyOf(u8, u8),
}

impl QcPolicy {
    pub fn accepts(&self, flag: u8) -> bool {
        match *self {
            QcPolicy::Exact(expected) => flag == expected,
            QcPolicy::AnyOf(a, b) => flag == a || flag == b,
        }
    }
}

impl Default for QcPolicy {
    fn default() -> Self {
        QcPolicy::Exact(DEFAULT_QC_FLAG)
    }
}

impl fmt::Display for QcPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QcPolicy::Exact(flag) => write!(f, "flag == {}", flag),
            QcPolicy::AnyOf(a, b) => write!(f, "flag in ({}, {})", a, b),
        }
    }
}

/// Configuration form of [`QcPolicy`]: `{ flag = 1 }` or `{ flags = [1, 2] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcPolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<u8>>,
}

impl QcPolicyConfig {
    pub fn single(flag: u8) -> Self {
        Self {
            flag: Some(flag),
            flags: None,
        }
    }
}

impl TryFrom<&QcPolicyConfig> for QcPolicy {
    type Error = ProcessingError;

    fn try_from(config: &QcPolicyConfig) -> Result<Self> {
        match (config.flag, config.flags.as_deref()) {
            (Some(flag), None) => Ok(QcPolicy::Exact(flag)),
            (None, Some(&[a, b])) => Ok(QcPolicy::AnyOf(a, b)),
            (None, Some(flags)) => Err(ProcessingError::InvalidQcPolicy(format!(
                "'flags' needs exactly two values, got {}",
                flags.len()
            ))),
            (Some(_), Some(_)) => Err(ProcessingError::InvalidQcPolicy(
                "set either 'flag' or 'flags', not both".to_string(),
            )),
            (None, None) => Err(ProcessingError::InvalidQcPolicy(
                "neither 'flag' nor 'flags' is set".to_string(),
            )),
        }
    }
}

/// Filters a raw profile down to the levels that get encoded
#[derive(Debug, Clone, Default)]
pub struct ProfileSelector {
    policy: QcPolicy,
    upcast_only: bool,
}

impl ProfileSelector {
    pub fn new(policy: QcPolicy) -> Self {
        Self {
            policy,
            upcast_only: false,
        }
    }

    pub fn with_upcast_only(mut self, upcast_only: bool) -> Self {
        self.upcast_only = upcast_only;
        self
    }

    pub fn policy(&self) -> QcPolicy {
        self.policy
    }

    /// QC filter, range check, optional upcast restriction, then derived fields
    ///
    /// Only levels that pass the QC policy are range checked; a rejected
    /// sample may sit above the surface or off the globe.
    pub fn select(&self, profile: &Profile) -> Result<SelectedProfile> {
        let mut retained: Vec<Observation> = profile
            .levels()
            .iter()
            .filter(|level| self.policy.accepts(level.quality_flag))
            .cloned()
            .collect();

        if retained.is_empty() {
            return Err(ProcessingError::NoQualifyingLevels {
                policy: self.policy.to_string(),
            });
        }

        for level in &retained {
            level.check_range()?;
        }

        debug!(
            "Retained {} of {} levels with {}",
            retained.len(),
            profile.len(),
            self.policy
        );

        if self.upcast_only {
            let depths: Vec<f64> = retained.iter().map(|level| level.depth).collect();
            let range = extract_cast(&depths, CastDirection::Upcast)?;
            debug!("Upcast spans levels {}..{}", range.start, range.end);

            retained.truncate(range.end);
            retained.drain(..range.start);
        }

        let levels = retained
            .into_iter()
            .map(SelectedLevel::from_observation)
            .collect();

        Ok(SelectedProfile {
            levels,
            upcast_applied: self.upcast_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::conversions::pressure_dbar;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 28)
            .unwrap()
            .and_hms_opt(8, 19, second)
            .unwrap()
    }

    fn profile(depths: &[f64], flags: &[u8]) -> Profile {
        Profile::new(
            depths
                .iter()
                .zip(flags)
                .enumerate()
                .map(|(i, (&depth, &flag))| {
                    Observation::new(at(i as u32), -41.2, 174.8, depth, 15.0 - depth / 10.0, flag)
                })
                .collect(),
        )
    }

    #[test]
    fn test_qc_policy_accepts() {
        assert!(QcPolicy::Exact(1).accepts(1));
        assert!(!QcPolicy::Exact(1).accepts(2));
        assert!(QcPolicy::AnyOf(1, 2).accepts(2));
        assert!(!QcPolicy::AnyOf(1, 2).accepts(4));
    }

    #[test]
    fn test_qc_policy_from_config() {
        assert_eq!(
            QcPolicy::try_from(&QcPolicyConfig::single(1)).unwrap(),
            QcPolicy::Exact(1)
        );

        let pair = QcPolicyConfig {
            flag: None,
            flags: Some(vec![1, 2]),
        };
        assert_eq!(QcPolicy::try_from(&pair).unwrap(), QcPolicy::AnyOf(1, 2));

        let triple = QcPolicyConfig {
            flag: None,
            flags: Some(vec![1, 2, 3]),
        };
        assert!(matches!(
            QcPolicy::try_from(&triple),
            Err(ProcessingError::InvalidQcPolicy(_))
        ));

        let both = QcPolicyConfig {
            flag: Some(1),
            flags: Some(vec![1, 2]),
        };
        assert!(QcPolicy::try_from(&both).is_err());
        assert!(QcPolicy::try_from(&QcPolicyConfig::default()).is_err());
    }

    #[test]
    fn test_filter_keeps_matching_levels_in_order() {
        let raw = profile(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            &[1, 4, 1, 2, 1, 1, 3],
        );

        let selected = ProfileSelector::new(QcPolicy::Exact(1)).select(&raw).unwrap();
        assert_eq!(selected.len(), 4);
        assert_eq!(selected.depths(), vec![1.0, 3.0, 5.0, 6.0]);
        assert!(!selected.upcast_applied);

        let selected = ProfileSelector::new(QcPolicy::AnyOf(1, 2)).select(&raw).unwrap();
        assert_eq!(selected.depths(), vec![1.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_no_qualifying_levels() {
        let raw = profile(&[1.0, 2.0, 3.0], &[4, 4, 3]);
        let result = ProfileSelector::new(QcPolicy::Exact(1)).select(&raw);
        assert!(matches!(
            result,
            Err(ProcessingError::NoQualifyingLevels { .. })
        ));
    }

    #[test]
    fn test_upcast_selection_with_pressure() {
        let raw = profile(&[10.0, 20.0, 30.0, 20.0, 10.0], &[1, 1, 1, 1, 1]);

        let selected = ProfileSelector::new(QcPolicy::Exact(1))
            .with_upcast_only(true)
            .select(&raw)
            .unwrap();

        assert_eq!(selected.depths(), vec![30.0, 20.0, 10.0]);
        assert!(selected.upcast_applied);

        for level in &selected.levels {
            let expected = (pressure_dbar(level.depth(), -41.2) * 100.0).round() / 100.0;
            assert_eq!(level.pressure_dbar, expected);
            assert!((level.temperature_kelvin - (level.observation.temperature + 273.15)).abs() < 1e-9);
        }
        assert_eq!(selected.levels[0].timestamp(), at(2));
    }

    #[test]
    fn test_upcast_is_taken_after_qc_filter() {
        // The rejected spike at index 3 must not create a turning point
        let raw = profile(
            &[10.0, 20.0, 30.0, 5.0, 40.0, 30.0, 20.0, 10.0],
            &[1, 1, 1, 4, 1, 1, 1, 1],
        );

        let selected = ProfileSelector::new(QcPolicy::Exact(1))
            .with_upcast_only(true)
            .select(&raw)
            .unwrap();

        assert_eq!(selected.depths(), vec![40.0, 30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_range_check_applies_to_retained_levels_only() {
        let raw = profile(&[-0.3, 10.0, 20.0, 30.0], &[4, 1, 1, 1]);
        let selected = ProfileSelector::new(QcPolicy::Exact(1)).select(&raw).unwrap();
        assert_eq!(selected.depths(), vec![10.0, 20.0, 30.0]);

        let result = ProfileSelector::new(QcPolicy::AnyOf(1, 4)).select(&raw);
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_short_profile_cannot_be_segmented() {
        let raw = profile(&[10.0, 5.0, 1.0], &[1, 1, 4]);
        let result = ProfileSelector::new(QcPolicy::Exact(1))
            .with_upcast_only(true)
            .select(&raw);

        assert!(matches!(
            result,
            Err(ProcessingError::InsufficientData { .. })
        ));
    }
}
