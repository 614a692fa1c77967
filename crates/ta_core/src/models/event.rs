//! Canonical match events
//!
//! Events are created once by ingestion and never mutated afterwards; the
//! expected-threat annotation is a single enrichment pass over the whole
//! vector before any analysis runs.

use serde::{Deserialize, Serialize};

use crate::pitch::MeterPos;

/// Action type of a canonical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Pass,
    Shot,
    Goal,
    Carry,
    Tackle,
    Interception,
    Clearance,
    BallRecovery,
    TakeOn,
    Foul,
    Save,
    /// Any provider action type the analytics do not distinguish.
    Other,
}

impl EventKind {
    /// Map a provider action label onto a canonical kind.
    ///
    /// Unknown labels become `Other` rather than an error; they still count
    /// toward windowed position samples.
    pub fn from_provider(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "pass" => EventKind::Pass,
            "shot" | "missedshots" | "savedshot" | "shotonpost" => EventKind::Shot,
            "goal" => EventKind::Goal,
            "carry" => EventKind::Carry,
            "tackle" => EventKind::Tackle,
            "interception" => EventKind::Interception,
            "clearance" => EventKind::Clearance,
            "ballrecovery" | "ball_recovery" => EventKind::BallRecovery,
            "takeon" | "take_on" | "dribble" => EventKind::TakeOn,
            "foul" => EventKind::Foul,
            "save" | "keeperpickup" => EventKind::Save,
            _ => EventKind::Other,
        }
    }
}

/// Whether the recorded action achieved its intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Successful,
    Unsuccessful,
}

impl Outcome {
    pub fn from_provider(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "successful" | "success" | "1" | "true" => Outcome::Successful,
            _ => Outcome::Unsuccessful,
        }
    }
}

/// Provider qualifier flags the analytics care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    Corner,
    ThrowIn,
    FreeKick,
    Cross,
    KeyPass,
    Assist,
    OwnGoal,
}

impl Qualifier {
    /// Map a provider qualifier label; unrecognized labels are ignored.
    pub fn from_provider(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "corner" | "cornertaken" => Some(Qualifier::Corner),
            "throwin" | "throw_in" => Some(Qualifier::ThrowIn),
            "freekick" | "freekicktaken" => Some(Qualifier::FreeKick),
            "cross" => Some(Qualifier::Cross),
            "keypass" | "key_pass" => Some(Qualifier::KeyPass),
            "assist" => Some(Qualifier::Assist),
            "owngoal" | "own_goal" => Some(Qualifier::OwnGoal),
            _ => None,
        }
    }
}

/// A single canonical spatio-temporal match action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub minute: u32,
    pub second: u32,
    pub kind: EventKind,
    pub outcome: Outcome,
    pub team_id: u32,
    /// None when the provider's player reference could not be resolved
    /// against the roster; the event still attributes to its team.
    pub player_id: Option<u32>,
    /// Start location in meters.
    pub start_m: MeterPos,
    /// End location in meters (passes and carries).
    pub end_m: Option<MeterPos>,
    pub qualifiers: Vec<Qualifier>,
    /// Possession-value delta, set once by the threat-grid annotation pass.
    pub xt: Option<f32>,
    /// Reduction in distance-to-goal for progressive passes, 0 otherwise.
    pub progressive_distance_m: f32,
}

impl Event {
    pub fn has_qualifier(&self, qualifier: Qualifier) -> bool {
        self.qualifiers.contains(&qualifier)
    }

    pub fn is_successful_pass(&self) -> bool {
        self.kind == EventKind::Pass && self.outcome == Outcome::Successful
    }

    /// A successful pass that is neither a corner nor a throw-in; the only
    /// events the threat grid values.
    pub fn is_open_play_pass(&self) -> bool {
        self.is_successful_pass()
            && !self.has_qualifier(Qualifier::Corner)
            && !self.has_qualifier(Qualifier::ThrowIn)
    }
}
