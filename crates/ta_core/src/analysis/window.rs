//! Sliding-window position sampling
//!
//! Aggregates a team's in-window events into per-player mean positions.
//! The window smooths instantaneous position noise; a player qualifies only
//! with enough in-window actions, and at most the 11 busiest players are
//! kept as a proxy for the on-pitch shape (substitutions cannot be observed
//! directly from an action stream).

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::MatchDataset;

/// Most samples kept per window; mirrors the 11 players a side fields.
pub const MAX_SAMPLES: usize = 11;

/// Inclusive minute interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteWindow {
    pub start: u32,
    pub end: u32,
}

impl MinuteWindow {
    pub fn contains(&self, minute: u32) -> bool {
        (self.start..=self.end).contains(&minute)
    }
}

/// Window of half-width `half` centered on `minute`, clamped to the
/// observed minute bounds.
pub fn window_around(bounds: (u32, u32), minute: u32, half: u32) -> MinuteWindow {
    let (min_minute, max_minute) = bounds;
    MinuteWindow {
        start: minute.saturating_sub(half).max(min_minute),
        end: (minute + half).min(max_minute),
    }
}

/// Per-player windowed position aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub player_id: u32,
    pub mean_x: f32,
    pub mean_y: f32,
    pub actions: u32,
}

/// Aggregate one team's in-window events into qualifying samples.
///
/// Players below `min_actions` are discarded; when more than
/// [`MAX_SAMPLES`] qualify, the highest action counts win, with player id
/// as the tie-break so equal-count sets select identically across runs.
pub fn position_samples(
    dataset: &MatchDataset,
    team_id: u32,
    window: MinuteWindow,
    min_actions: u32,
) -> Vec<PositionSample> {
    let mut sums: FxHashMap<u32, (f32, f32, u32)> = FxHashMap::default();
    for event in dataset.team_events(team_id) {
        if !window.contains(event.minute) {
            continue;
        }
        let Some(player_id) = event.player_id else {
            continue;
        };
        let entry = sums.entry(player_id).or_insert((0.0, 0.0, 0));
        entry.0 += event.start_m.0;
        entry.1 += event.start_m.1;
        entry.2 += 1;
    }

    let mut samples: Vec<PositionSample> = sums
        .into_iter()
        .filter(|&(_, (_, _, actions))| actions >= min_actions)
        .map(|(player_id, (sum_x, sum_y, actions))| PositionSample {
            player_id,
            mean_x: sum_x / actions as f32,
            mean_y: sum_y / actions as f32,
            actions,
        })
        .collect();

    samples.sort_by(|a, b| {
        b.actions
            .cmp(&a.actions)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    samples.truncate(MAX_SAMPLES);
    samples
}
