//! Pitch geometry and coordinate helpers
//!
//! All analytics run in meter coordinates on a 105x68 m pitch:
//!
//! - X: 0 = own goal line, 105 = opponent goal line (length direction)
//! - Y: 0 = touchline, 68 = touchline (width direction)
//!
//! Provider feeds use a normalized 100x100 space in which the acting team
//! always attacks toward x=100, so after rescaling the opponent goal is
//! (105, 34) for every event regardless of team.

/// Position in meters.
/// - .0 = length (x-axis, 0-105m, own goal to opponent goal)
/// - .1 = width (y-axis, 0-68m, touchline to touchline)
pub type MeterPos = (f32, f32);

/// Pitch length in meters (goal line to goal line).
pub const LENGTH_M: f32 = 105.0;

/// Pitch width in meters (touchline to touchline).
pub const WIDTH_M: f32 = 68.0;

/// Halfway line x-position in meters.
pub const HALFWAY_X_M: f32 = LENGTH_M / 2.0;

/// Opponent goal center in meters.
pub const OPPONENT_GOAL_M: MeterPos = (LENGTH_M, WIDTH_M / 2.0);

/// Provider-space scale factor for x (100 units -> 105m).
pub const PROVIDER_SCALE_X: f32 = LENGTH_M / 100.0;

/// Provider-space scale factor for y (100 units -> 68m).
pub const PROVIDER_SCALE_Y: f32 = WIDTH_M / 100.0;

/// Rescale a provider-space coordinate (0-100 on both axes) into meters.
pub fn from_provider(x: f32, y: f32) -> MeterPos {
    (x * PROVIDER_SCALE_X, y * PROVIDER_SCALE_Y)
}

/// Euclidean distance between two meter positions.
pub fn distance(a: MeterPos, b: MeterPos) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from a position to the opponent goal center.
pub fn distance_to_opponent_goal(pos: MeterPos) -> f32 {
    distance(pos, OPPONENT_GOAL_M)
}

/// Whether a meter position lies on the pitch (inclusive bounds).
pub fn in_bounds(pos: MeterPos) -> bool {
    pos.0.is_finite()
        && pos.1.is_finite()
        && (0.0..=LENGTH_M).contains(&pos.0)
        && (0.0..=WIDTH_M).contains(&pos.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_rescale_maps_corners() {
        assert_eq!(from_provider(0.0, 0.0), (0.0, 0.0));
        let far = from_provider(100.0, 100.0);
        assert!((far.0 - 105.0).abs() < 1e-4);
        assert!((far.1 - 68.0).abs() < 1e-4);
    }

    #[test]
    fn distance_is_euclidean() {
        assert!((distance((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn goal_distance_at_goal_mouth_is_zero() {
        assert_eq!(distance_to_opponent_goal(OPPONENT_GOAL_M), 0.0);
    }

    #[test]
    fn bounds_reject_off_pitch_and_non_finite() {
        assert!(in_bounds((52.5, 34.0)));
        assert!(in_bounds((0.0, 68.0)));
        assert!(!in_bounds((-0.1, 34.0)));
        assert!(!in_bounds((52.5, 68.1)));
        assert!(!in_bounds((f32::NAN, 34.0)));
    }
}
