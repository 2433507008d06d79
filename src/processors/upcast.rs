//! Cast segmentation of a depth time series.
//!
//! A towed or dropped sensor records its descent and its ascent in one
//! series. The turning points between the two are found from sign changes of
//! the first difference. Turning points closer together than
//! [`MIN_TURNING_SEPARATION`] samples are noise: a cluster of them is one turn
//! when the series travels the other way afterwards, and is ignored when it
//! keeps travelling the same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{MIN_SEGMENT_SAMPLES, MIN_TURNING_SEPARATION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastDirection {
    /// Sensor rising towards the surface, depth decreasing
    Upcast,
    /// Sensor sinking, depth increasing
    Downcast,
}

impl CastDirection {
    fn matches(&self, depth_change: f64) -> bool {
        match self {
            CastDirection::Upcast => depth_change < 0.0,
            CastDirection::Downcast => depth_change > 0.0,
        }
    }
}

impl fmt::Display for CastDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastDirection::Upcast => f.write_str("upcast"),
            CastDirection::Downcast => f.write_str("downcast"),
        }
    }
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Indices where the depth series changes direction
///
/// Index `i + 1` is an inflection point when the sign of `depth[i+1] -
/// depth[i]` differs from the sign of `depth[i+2] - depth[i+1]`. A flat step
/// has its own sign, so entering or leaving a plateau counts.
pub fn inflection_points(depths: &[f64]) -> Vec<usize> {
    let signs: Vec<i8> = depths.windows(2).map(|w| sign(w[1] - w[0])).collect();

    signs
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] != pair[1])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Group inflection points that sit closer than the minimum separation
fn clusters(points: &[usize]) -> Vec<Range<usize>> {
    let mut clusters: Vec<Range<usize>> = Vec::new();

    for &point in points {
        match clusters.last_mut() {
            Some(cluster) if point - (cluster.end - 1) < MIN_TURNING_SEPARATION => {
                cluster.end = point + 1;
            }
            _ => clusters.push(point..point + 1),
        }
    }

    clusters
}

/// Clusters across which the series actually changes direction
///
/// A cluster with the same direction of travel on both sides is a wobble
/// inside one run and is discarded.
fn turning_regions(depths: &[f64]) -> Vec<Range<usize>> {
    let points = inflection_points(depths);

    clusters(&points)
        .into_iter()
        .filter(|cluster| {
            let before = sign(depths[cluster.start] - depths[cluster.start - 1]);
            let after = sign(depths[cluster.end] - depths[cluster.end - 1]);
            before != after
        })
        .collect()
}

/// Monotonic runs between turning regions, as inclusive `(start, end)` pairs
fn monotonic_runs(depths: &[f64]) -> Vec<(usize, usize)> {
    let last = depths.len() - 1;
    let regions = turning_regions(depths);

    let mut runs = Vec::with_capacity(regions.len() + 1);
    let mut start = 0;
    for region in &regions {
        runs.push((start, region.start));
        start = region.end - 1;
    }
    runs.push((start, last));

    runs
}

/// Index range of the cast travelling in `direction`
///
/// The upcast is the last run with decreasing depth, the downcast the first
/// run with increasing depth. The turning sample belongs to both. A series
/// without any reversal is returned whole when it already travels in
/// `direction`; otherwise there is no such cast and
/// [`ProcessingError::NoCastSegment`] is returned.
pub fn extract_cast(depths: &[f64], direction: CastDirection) -> Result<Range<usize>> {
    if depths.len() < MIN_SEGMENT_SAMPLES {
        return Err(ProcessingError::InsufficientData {
            required: MIN_SEGMENT_SAMPLES,
            actual: depths.len(),
        });
    }

    let runs = monotonic_runs(depths);
    let is_cast = |&&(start, end): &&(usize, usize)| direction.matches(depths[end] - depths[start]);

    let run = match direction {
        CastDirection::Upcast => runs.iter().rev().find(is_cast),
        CastDirection::Downcast => runs.iter().find(is_cast),
    };

    run.map(|&(start, end)| start..end + 1)
        .ok_or(ProcessingError::NoCastSegment(direction))
}

/// Index at which the upcast begins
pub fn upcast_start(depths: &[f64]) -> Result<usize> {
    extract_cast(depths, CastDirection::Upcast).map(|range| range.start)
}
