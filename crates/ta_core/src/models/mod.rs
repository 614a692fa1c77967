pub mod dataset;
pub mod event;
pub mod roster;

pub use dataset::MatchDataset;
pub use event::{Event, EventKind, Outcome, Qualifier};
pub use roster::{short_name, Player, SheetPlayer, Side, Team, TeamSheet};
