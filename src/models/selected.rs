use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::Observation;
use crate::utils::constants::PRESSURE_DECIMALS;
use crate::utils::conversions::{kelvin, pressure_dbar, round_to};

/// A retained level with its derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedLevel {
    pub observation: Observation,

    /// Decibars, rounded to two decimals
    pub pressure_dbar: f64,

    pub temperature_kelvin: f64,
}

impl SelectedLevel {
    pub fn from_observation(observation: Observation) -> Self {
        let pressure = round_to(
            pressure_dbar(observation.depth, observation.latitude),
            PRESSURE_DECIMALS,
        );
        let temperature_kelvin = kelvin(observation.temperature);

        Self {
            observation,
            pressure_dbar: pressure,
            temperature_kelvin,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.observation.timestamp
    }

    pub fn depth(&self) -> f64 {
        self.observation.depth
    }
}

/// Profile ready for encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedProfile {
    pub levels: Vec<SelectedLevel>,

    /// Whether the levels were restricted to the upcast
    pub upcast_applied: bool,
}

impl SelectedProfile {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn first(&self) -> Option<&SelectedLevel> {
        self.levels.first()
    }

    pub fn last(&self) -> Option<&SelectedLevel> {
        self.levels.last()
    }

    pub fn depths(&self) -> Vec<f64> {
        self.levels.iter().map(SelectedLevel::depth).collect()
    }

    pub fn max_depth(&self) -> Option<f64> {
        self.levels
            .iter()
            .map(SelectedLevel::depth)
            .fold(None, |max, depth| Some(max.map_or(depth, |m: f64| m.max(depth))))
    }
}
