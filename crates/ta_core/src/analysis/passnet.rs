//! Pass network aggregation
//!
//! Builds a weighted undirected player graph from one team's full
//! chronological event sequence (match-wide, not windowed).
//!
//! ## Receiver heuristic
//! The receiver of a completed pass is the player attributed to the *next*
//! event in the team's sequence, regardless of that event's type or
//! outcome. This is a sequential-adjacency heuristic, kept exactly as the
//! dashboard defines it: across an intervening turnover it will credit the
//! wrong receiver. A stricter "next same-team pass" rule was considered and
//! deliberately not substituted.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::MatchDataset;
use crate::pitch::MeterPos;

/// Undirected pass edge between two players.
///
/// The pair key is symmetric: the smaller id is always `player_a`, so
/// (A,B) and (B,A) aggregate into one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassEdge {
    pub player_a: u32,
    pub player_b: u32,
    pub passes: u32,
    /// Match-wide mean location of `player_a`.
    pub a_location_m: MeterPos,
    /// Match-wide mean location of `player_b`.
    pub b_location_m: MeterPos,
}

/// Match-wide per-player aggregate used for node placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerNode {
    pub player_id: u32,
    /// Mean location over every located action.
    pub location_m: MeterPos,
    pub actions: u32,
    pub is_starter: bool,
}

/// Weighted undirected pass graph for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassNetwork {
    pub team_id: u32,
    /// Sorted by pass count descending, then pair key, for stable output.
    pub edges: Vec<PassEdge>,
    /// Sorted by player id.
    pub players: Vec<PlayerNode>,
}

/// Build the pass network and per-player aggregate table for one team.
pub fn build_pass_network(dataset: &MatchDataset, team_id: u32) -> PassNetwork {
    let sequence: Vec<_> = dataset.team_events(team_id).collect();

    // Per-player mean positions and action counts over the whole match.
    let mut totals: FxHashMap<u32, (f32, f32, u32)> = FxHashMap::default();
    for event in &sequence {
        let Some(player_id) = event.player_id else {
            continue;
        };
        let entry = totals.entry(player_id).or_insert((0.0, 0.0, 0));
        entry.0 += event.start_m.0;
        entry.1 += event.start_m.1;
        entry.2 += 1;
    }

    let mut players: Vec<PlayerNode> = totals
        .iter()
        .map(|(&player_id, &(sum_x, sum_y, actions))| PlayerNode {
            player_id,
            location_m: (sum_x / actions as f32, sum_y / actions as f32),
            actions,
            is_starter: dataset
                .player(player_id)
                .map(|p| p.is_starter)
                .unwrap_or(false),
        })
        .collect();
    players.sort_by_key(|node| node.player_id);

    // Sequential-adjacency receiver assignment (see module docs).
    let mut counts: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    for pair in sequence.windows(2) {
        let (event, next) = (pair[0], pair[1]);
        if !event.is_successful_pass() {
            continue;
        }
        let (Some(passer), Some(receiver)) = (event.player_id, next.player_id) else {
            continue;
        };
        if passer == receiver {
            continue;
        }
        let key = (passer.min(receiver), passer.max(receiver));
        *counts.entry(key).or_insert(0) += 1;
    }

    let location_of = |player_id: u32| {
        players
            .iter()
            .find(|node| node.player_id == player_id)
            .map(|node| node.location_m)
            .unwrap_or((0.0, 0.0))
    };

    let mut edges: Vec<PassEdge> = counts
        .into_iter()
        .map(|((player_a, player_b), passes)| PassEdge {
            player_a,
            player_b,
            passes,
            a_location_m: location_of(player_a),
            b_location_m: location_of(player_b),
        })
        .collect();
    edges.sort_by(|a, b| {
        b.passes
            .cmp(&a.passes)
            .then_with(|| (a.player_a, a.player_b).cmp(&(b.player_a, b.player_b)))
    });

    PassNetwork {
        team_id,
        edges,
        players,
    }
}
