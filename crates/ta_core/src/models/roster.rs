//! Teams, players, and the raw team sheets supplied by the roster collaborator

use serde::{Deserialize, Serialize};

/// Which bench a team occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub side: Side,
}

/// A roster player with resolved display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    /// Abbreviated display name, derived from `name` (see [`short_name`]).
    pub short_name: String,
    pub team_id: u32,
    pub shirt_number: Option<u8>,
    pub is_starter: bool,
    /// Roster position label (e.g. "GK", "CB", "ST").
    pub position: String,
}

impl Player {
    pub fn is_goalkeeper(&self) -> bool {
        self.position.eq_ignore_ascii_case("GK")
    }
}

/// Derive an abbreviated display name.
///
/// Two-part names keep the first initial plus the last name ("Jude
/// Bellingham" -> "J. Bellingham"). Names with three or more parts keep the
/// first two initials plus the remaining tokens ("Kevin De Bruyne" ->
/// "K. D. Bruyne"). Single-token names pass through unchanged.
pub fn short_name(full: &str) -> String {
    let tokens: Vec<&str> = full.split_whitespace().collect();
    match tokens.len() {
        0 => String::new(),
        1 => tokens[0].to_string(),
        2 => format!("{}. {}", initial(tokens[0]), tokens[1]),
        _ => {
            let rest = tokens[2..].join(" ");
            format!("{}. {}. {}", initial(tokens[0]), initial(tokens[1]), rest)
        }
    }
}

fn initial(token: &str) -> String {
    token.chars().next().map(|c| c.to_string()).unwrap_or_default()
}

/// Raw team sheet as supplied by the roster collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamSheet {
    pub team_id: u32,
    pub name: String,
    pub players: Vec<SheetPlayer>,
}

/// Raw roster row within a [`TeamSheet`].
#[derive(Debug, Clone, Deserialize)]
pub struct SheetPlayer {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub shirt_number: Option<u8>,
    #[serde(default)]
    pub is_starter: bool,
    #[serde(default)]
    pub position: String,
}

impl SheetPlayer {
    /// Resolve a sheet row into a canonical [`Player`].
    pub fn resolve(&self, team_id: u32) -> Player {
        Player {
            id: self.id,
            name: self.name.clone(),
            short_name: short_name(&self.name),
            team_id,
            shirt_number: self.shirt_number,
            is_starter: self.is_starter,
            position: self.position.clone(),
        }
    }
}
