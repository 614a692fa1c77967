//! Team compactness metrics
//!
//! Geometric summary of a windowed player set: mean pairwise distance plus
//! the axis-aligned bounding-box area. A proxy for how tight a team's shape
//! is, defensively or in possession.

use serde::{Deserialize, Serialize};

use super::window::PositionSample;
use crate::pitch;

/// Compactness summary for one qualifying sample set.
///
/// `(0, 0)` is the sentinel for "not enough players", a valid outcome and
/// not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Compactness {
    /// Mean pairwise Euclidean distance between player mean positions.
    pub mean_distance_m: f32,
    /// Area of the axis-aligned bounding rectangle.
    pub bounding_area_m2: f32,
}

/// Compute compactness over the qualifying sample set used for formation
/// classification. Fewer than 2 samples, or any non-finite coordinate,
/// yields the `(0, 0)` sentinel.
pub fn compactness(samples: &[PositionSample]) -> Compactness {
    if samples.len() < 2
        || samples
            .iter()
            .any(|s| !s.mean_x.is_finite() || !s.mean_y.is_finite())
    {
        return Compactness::default();
    }

    let mut total = 0.0f32;
    let mut pairs = 0u32;
    for (i, a) in samples.iter().enumerate() {
        for b in &samples[i + 1..] {
            total += pitch::distance((a.mean_x, a.mean_y), (b.mean_x, b.mean_y));
            pairs += 1;
        }
    }

    let min_x = samples.iter().map(|s| s.mean_x).fold(f32::INFINITY, f32::min);
    let max_x = samples.iter().map(|s| s.mean_x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = samples.iter().map(|s| s.mean_y).fold(f32::INFINITY, f32::min);
    let max_y = samples.iter().map(|s| s.mean_y).fold(f32::NEG_INFINITY, f32::max);

    Compactness {
        mean_distance_m: total / pairs as f32,
        bounding_area_m2: (max_x - min_x) * (max_y - min_y),
    }
}
