//! The immutable per-match input shared by every analysis

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::event::Event;
use super::roster::{Player, Side, Team};

/// Canonical events plus resolved roster metadata for one match.
///
/// Built once by ingestion and treated as read-only by every downstream
/// computation, which is what makes the per-minute timeline work safe to
/// parallelize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDataset {
    pub match_id: String,
    /// Home first, away second.
    pub teams: [Team; 2],
    pub players: FxHashMap<u32, Player>,
    /// Chronological (minute, second) order.
    pub events: Vec<Event>,
}

impl MatchDataset {
    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.teams[0],
            Side::Away => &self.teams[1],
        }
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Observed minute range over all events, None when there are none.
    pub fn minute_bounds(&self) -> Option<(u32, u32)> {
        let mut minutes = self.events.iter().map(|e| e.minute);
        let first = minutes.next()?;
        let (mut lo, mut hi) = (first, first);
        for minute in minutes {
            lo = lo.min(minute);
            hi = hi.max(minute);
        }
        Some((lo, hi))
    }

    /// Chronological event view for one team.
    pub fn team_events(&self, team_id: u32) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.team_id == team_id)
    }
}
