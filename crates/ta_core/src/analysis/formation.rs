//! Formation detection
//!
//! Classifies a team's outfield shape from windowed mean positions.
//!
//! ## Algorithm
//! 1. Aggregate in-window events into qualifying [`PositionSample`]s
//!    (threshold + top-11 selection, see [`super::window`]).
//! 2. Exclude the goalkeeper (roster position label) from classification.
//! 3. Split outfield mean-x values at the 30th/70th percentiles into
//!    defender / midfielder / attacker bands.
//! 4. Reconcile band counts to a sum of exactly 10 with a fixed rule
//!    order, so equal inputs always produce the same label.
//!
//! This is a documented heuristic for an action-stream dashboard, not a
//! certified tactic classifier: it cannot see off-ball positioning.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::shape::{compactness, Compactness};
use super::window::{position_samples, window_around, PositionSample};
use crate::config::AnalysisConfig;
use crate::models::MatchDataset;

/// Outfield players required for a classifiable shape.
pub const REQUIRED_OUTFIELD: usize = 10;

/// A classified outfield shape, or the explicit insufficient-data sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationShape {
    Shape {
        defenders: u8,
        midfielders: u8,
        attackers: u8,
    },
    Incomplete,
}

impl FormationShape {
    /// Render as the conventional "D-M-A" label, or "Incomplete".
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FormationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationShape::Shape {
                defenders,
                midfielders,
                attackers,
            } => write!(f, "{defenders}-{midfielders}-{attackers}"),
            FormationShape::Incomplete => write!(f, "Incomplete"),
        }
    }
}

/// Per-team, per-minute formation and compactness snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationSnapshot {
    pub team_id: u32,
    pub minute: u32,
    pub shape: FormationShape,
    pub compactness: Compactness,
    /// The qualifying sample set behind the classification (at most 11,
    /// goalkeeper included when they qualified).
    pub samples: Vec<PositionSample>,
}

/// Classify one team's shape at one minute using the configured window.
pub fn detect_formation(
    dataset: &MatchDataset,
    team_id: u32,
    minute: u32,
    config: &AnalysisConfig,
) -> FormationSnapshot {
    let samples = match dataset.minute_bounds() {
        Some(bounds) => {
            let window = window_around(bounds, minute, config.half_window());
            position_samples(dataset, team_id, window, config.min_window_actions)
        }
        None => Vec::new(),
    };

    let outfield: Vec<PositionSample> = samples
        .iter()
        .filter(|sample| {
            dataset
                .player(sample.player_id)
                .map(|player| !player.is_goalkeeper())
                .unwrap_or(true)
        })
        .cloned()
        .collect();

    let outfield_x: Vec<f32> = outfield.iter().map(|s| s.mean_x).collect();
    let shape = classify_outfield(&outfield_x, config);

    FormationSnapshot {
        team_id,
        minute,
        shape,
        compactness: compactness(&outfield),
        samples,
    }
}

/// Band-classify outfield mean-x values.
///
/// Returns [`FormationShape::Incomplete`] when fewer than
/// [`REQUIRED_OUTFIELD`] values are present before reconciliation.
pub fn classify_outfield(outfield_x: &[f32], config: &AnalysisConfig) -> FormationShape {
    if outfield_x.len() < REQUIRED_OUTFIELD {
        return FormationShape::Incomplete;
    }

    let mut sorted = outfield_x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let defender_cut = percentile(&sorted, config.defender_percentile);
    let attacker_cut = percentile(&sorted, config.attacker_percentile);

    let defenders = outfield_x.iter().filter(|&&x| x <= defender_cut).count();
    let attackers = outfield_x.iter().filter(|&&x| x > attacker_cut).count();
    let midfielders = outfield_x.len() - defenders - attackers;

    let (defenders, midfielders, attackers) = reconcile(defenders, midfielders, attackers);
    FormationShape::Shape {
        defenders,
        midfielders,
        attackers,
    }
}

/// Percentile by linear interpolation between order statistics.
/// `sorted` must be ascending and non-empty.
fn percentile(sorted: &[f32], p: f32) -> f32 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let fraction = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}

/// Force band counts to sum to exactly 10, in a fixed rule order: excess
/// comes out of midfielders first, then defenders, then attackers as the
/// last resort; any shortfall goes to midfielders.
fn reconcile(
    mut defenders: usize,
    mut midfielders: usize,
    mut attackers: usize,
) -> (u8, u8, u8) {
    let total = defenders + midfielders + attackers;
    if total > REQUIRED_OUTFIELD {
        let mut excess = total - REQUIRED_OUTFIELD;
        let take = excess.min(midfielders);
        midfielders -= take;
        excess -= take;
        let take = excess.min(defenders);
        defenders -= take;
        excess -= take;
        attackers -= excess;
    } else {
        midfielders += REQUIRED_OUTFIELD - total;
    }
    (defenders as u8, midfielders as u8, attackers as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventKind, Outcome, Player, Side, Team};
    use fxhash::FxHashMap;

    #[test]
    fn percentile_banding_classifies_3_5_2() {
        let xs = [10.0, 20.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];
        let shape = classify_outfield(&xs, &AnalysisConfig::default());
        assert_eq!(
            shape,
            FormationShape::Shape {
                defenders: 3,
                midfielders: 5,
                attackers: 2
            }
        );
        assert_eq!(shape.label(), "3-5-2");
    }

    #[test]
    fn nine_outfield_players_are_incomplete() {
        let xs = [10.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0];
        assert_eq!(
            classify_outfield(&xs, &AnalysisConfig::default()),
            FormationShape::Incomplete
        );
        assert_eq!(FormationShape::Incomplete.label(), "Incomplete");
    }

    #[test]
    fn eleven_outfield_players_reconcile_to_ten() {
        let xs = [
            10.0, 20.0, 20.0, 30.0, 40.0, 45.0, 50.0, 60.0, 70.0, 80.0, 90.0,
        ];
        match classify_outfield(&xs, &AnalysisConfig::default()) {
            FormationShape::Shape {
                defenders,
                midfielders,
                attackers,
            } => {
                assert_eq!(defenders as u32 + midfielders as u32 + attackers as u32, 10);
            }
            FormationShape::Incomplete => panic!("11 players must classify"),
        }
    }

    #[test]
    fn reconcile_rule_order() {
        // Excess: midfielders drain first, then defenders.
        assert_eq!(reconcile(4, 4, 3), (4, 3, 3));
        assert_eq!(reconcile(5, 0, 6), (4, 0, 6));
        assert_eq!(reconcile(0, 0, 11), (0, 0, 10));
        // Shortfall: midfielders absorb it.
        assert_eq!(reconcile(3, 2, 4), (3, 3, 4));
        // Already balanced.
        assert_eq!(reconcile(4, 4, 2), (4, 4, 2));
    }

    #[test]
    fn identical_positions_collapse_to_defenders_then_reconcile() {
        let xs = [40.0; 11];
        assert_eq!(
            classify_outfield(&xs, &AnalysisConfig::default()),
            FormationShape::Shape {
                defenders: 10,
                midfielders: 0,
                attackers: 0
            }
        );
    }

    fn player(id: u32, position: &str) -> Player {
        Player {
            id,
            name: format!("Player {id}"),
            short_name: format!("P. {id}"),
            team_id: 1,
            shirt_number: None,
            is_starter: true,
            position: position.to_string(),
        }
    }

    fn event(minute: u32, player_id: u32, x: f32) -> Event {
        Event {
            minute,
            second: 0,
            kind: EventKind::Pass,
            outcome: Outcome::Successful,
            team_id: 1,
            player_id: Some(player_id),
            start_m: (x, 34.0),
            end_m: None,
            qualifiers: vec![],
            xt: None,
            progressive_distance_m: 0.0,
        }
    }

    /// Eleven players (one GK) acting three times each around minute 10.
    fn full_squad_dataset() -> MatchDataset {
        let mut players = FxHashMap::default();
        players.insert(1, player(1, "GK"));
        let outfield_x = [10.0, 20.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];
        let mut events = Vec::new();
        for minute in [9, 10, 11] {
            events.push(event(minute, 1, 5.0));
        }
        for (offset, &x) in outfield_x.iter().enumerate() {
            let id = offset as u32 + 2;
            players.insert(id, player(id, "CM"));
            for minute in [9, 10, 11] {
                events.push(event(minute, id, x));
            }
        }
        MatchDataset {
            match_id: "m1".to_string(),
            teams: [
                Team {
                    id: 1,
                    name: "Home".to_string(),
                    side: Side::Home,
                },
                Team {
                    id: 2,
                    name: "Away".to_string(),
                    side: Side::Away,
                },
            ],
            players,
            events,
        }
    }

    #[test]
    fn goalkeeper_is_excluded_from_classification() {
        let dataset = full_squad_dataset();
        let snapshot = detect_formation(&dataset, 1, 10, &AnalysisConfig::default());
        // GK at x=5 would otherwise tilt the defender band.
        assert_eq!(snapshot.shape.label(), "3-5-2");
        // The GK still appears in the qualifying sample set.
        assert_eq!(snapshot.samples.len(), 11);
        assert!(snapshot.compactness.mean_distance_m > 0.0);
    }

    #[test]
    fn empty_team_snapshot_is_incomplete_with_zero_compactness() {
        let dataset = full_squad_dataset();
        let snapshot = detect_formation(&dataset, 2, 10, &AnalysisConfig::default());
        assert_eq!(snapshot.shape, FormationShape::Incomplete);
        assert_eq!(snapshot.compactness, Compactness::default());
        assert!(snapshot.samples.is_empty());
    }
}
