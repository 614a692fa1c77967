//! Event ingestion and normalization
//!
//! Turns a raw delimiter-separated action table plus two team sheets into a
//! canonical [`MatchDataset`].
//!
//! Provider exports arrive in more than one text encoding and with more than
//! one field delimiter, so parsing tries an ordered candidate list of
//! (encoding, delimiter) pairs and accepts the first one whose header yields
//! more than [`MIN_COLUMNS`] columns.
//!
//! Per-row failures are never fatal: rows missing a location or any player
//! reference, attributing to an unknown team, or carrying off-pitch
//! coordinates are dropped and counted in the [`IngestReport`]. A player id
//! absent from the roster keeps its team attribution with null player
//! fields.

use std::borrow::Cow;

use fxhash::FxHashMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::IngestError;
use crate::models::{
    Event, EventKind, MatchDataset, Outcome, Player, Qualifier, Side, Team, TeamSheet,
};
use crate::pitch::{self, MeterPos};

/// A candidate is accepted when its header has more columns than this.
pub const MIN_COLUMNS: usize = 8;

/// Separator between qualifier labels inside the qualifier column.
const QUALIFIER_SEPARATOR: char = '|';

/// Text encodings tried while decoding the raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

/// Ordered (encoding, delimiter) candidates; first acceptable parse wins.
const PARSE_CANDIDATES: &[(TextEncoding, u8)] = &[
    (TextEncoding::Utf8, b','),
    (TextEncoding::Utf8, b';'),
    (TextEncoding::Utf8, b'\t'),
    (TextEncoding::Latin1, b','),
    (TextEncoding::Latin1, b';'),
    (TextEncoding::Latin1, b'\t'),
];

/// Row accounting for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub rows_seen: usize,
    pub events_kept: usize,
    pub dropped_malformed: usize,
    pub dropped_no_location: usize,
    pub dropped_out_of_bounds: usize,
    pub dropped_unknown_team: usize,
    /// Rows with no player reference at all (no actor to attribute).
    pub dropped_no_player: usize,
    /// Rows kept with team attribution but null player fields.
    pub unresolved_players: usize,
    pub encoding: Option<TextEncoding>,
    pub delimiter: Option<char>,
}

/// Ingest one match: decode, parse, and normalize the raw action table.
///
/// Events come out sorted by (minute, second); coordinates are rescaled from
/// the provider's 100x100 space into meters.
pub fn ingest_match(
    match_id: &str,
    raw_table: &[u8],
    home: &TeamSheet,
    away: &TeamSheet,
) -> Result<(MatchDataset, IngestReport), IngestError> {
    let teams = resolve_teams(home, away)?;
    let mut players = FxHashMap::default();
    for sheet_player in &home.players {
        players.insert(sheet_player.id, sheet_player.resolve(home.team_id));
    }
    for sheet_player in &away.players {
        players.insert(sheet_player.id, sheet_player.resolve(away.team_id));
    }

    let (text, encoding, delimiter) = select_candidate(raw_table)?;
    let mut report = IngestReport {
        encoding: Some(encoding),
        delimiter: Some(delimiter as char),
        ..IngestReport::default()
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| IngestError::NoParsableFormat {
            min_columns: MIN_COLUMNS,
        })?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut events = Vec::new();
    for row in reader.records() {
        report.rows_seen += 1;
        let record = match row {
            Ok(record) => record,
            Err(_) => {
                report.dropped_malformed += 1;
                continue;
            }
        };
        match normalize_row(&record, &columns, &teams, &players, &mut report) {
            Some(event) => {
                events.push(event);
                report.events_kept += 1;
            }
            None => {
                trace!(row = report.rows_seen, "dropped raw event row");
            }
        }
    }

    if report.rows_seen == 0 {
        return Err(IngestError::EmptyTable);
    }

    events.sort_by_key(|e| (e.minute, e.second));

    debug!(
        rows = report.rows_seen,
        kept = report.events_kept,
        encoding = ?encoding,
        delimiter = %(delimiter as char),
        "event table normalized"
    );

    let dataset = MatchDataset {
        match_id: match_id.to_string(),
        teams,
        players,
        events,
    };
    Ok((dataset, report))
}

fn resolve_teams(home: &TeamSheet, away: &TeamSheet) -> Result<[Team; 2], IngestError> {
    for sheet in [home, away] {
        if sheet.players.is_empty() {
            return Err(IngestError::EmptyTeamSheet {
                team: sheet.name.clone(),
            });
        }
    }
    if home.team_id == away.team_id {
        return Err(IngestError::DuplicateTeamId { id: home.team_id });
    }
    Ok([
        Team {
            id: home.team_id,
            name: home.name.clone(),
            side: Side::Home,
        },
        Team {
            id: away.team_id,
            name: away.name.clone(),
            side: Side::Away,
        },
    ])
}

/// Try each (encoding, delimiter) pair in order; accept the first whose
/// header row yields more than [`MIN_COLUMNS`] columns.
fn select_candidate(raw: &[u8]) -> Result<(Cow<'_, str>, TextEncoding, u8), IngestError> {
    for &(encoding, delimiter) in PARSE_CANDIDATES {
        let Some(text) = decode(raw, encoding) else {
            continue;
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());
        let width = match reader.headers() {
            Ok(headers) => headers.len(),
            Err(_) => continue,
        };
        if width > MIN_COLUMNS {
            return Ok((text, encoding, delimiter));
        }
    }
    Err(IngestError::NoParsableFormat {
        min_columns: MIN_COLUMNS,
    })
}

fn decode(raw: &[u8], encoding: TextEncoding) -> Option<Cow<'_, str>> {
    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(raw).ok().map(Cow::Borrowed),
        // Latin-1 is a 1:1 byte-to-scalar mapping; it cannot fail.
        TextEncoding::Latin1 => Some(Cow::Owned(raw.iter().map(|&b| b as char).collect())),
    }
}

/// Header indices for the columns normalization reads.
struct Columns {
    minute: usize,
    second: Option<usize>,
    team_id: usize,
    player_id: Option<usize>,
    kind: usize,
    outcome: Option<usize>,
    x: usize,
    y: usize,
    end_x: Option<usize>,
    end_y: Option<usize>,
    qualifiers: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| find(name).ok_or(IngestError::MissingColumn { name });
        Ok(Self {
            minute: require("minute")?,
            second: find("second"),
            team_id: require("team_id")?,
            player_id: find("player_id"),
            kind: require("type")?,
            outcome: find("outcome"),
            x: require("x")?,
            y: require("y")?,
            end_x: find("end_x"),
            end_y: find("end_y"),
            qualifiers: find("qualifiers"),
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize) -> Option<&'r str> {
    record.get(index).map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_row(
    record: &csv::StringRecord,
    columns: &Columns,
    teams: &[Team; 2],
    players: &FxHashMap<u32, Player>,
    report: &mut IngestReport,
) -> Option<Event> {
    let minute = match field(record, columns.minute).and_then(|s| s.parse::<u32>().ok()) {
        Some(minute) => minute,
        None => {
            report.dropped_malformed += 1;
            return None;
        }
    };
    let second = columns
        .second
        .and_then(|i| field(record, i))
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0);

    let team_id = match field(record, columns.team_id).and_then(|s| s.parse::<u32>().ok()) {
        Some(id) => id,
        None => {
            report.dropped_malformed += 1;
            return None;
        }
    };
    if !teams.iter().any(|t| t.id == team_id) {
        report.dropped_unknown_team += 1;
        return None;
    }

    // A row with no player reference has no actor and is dropped; a row
    // whose reference is absent from the roster keeps team attribution
    // with null player fields.
    let player_id = match columns.player_id.and_then(|i| field(record, i)) {
        None => {
            report.dropped_no_player += 1;
            return None;
        }
        Some(raw) => match raw.parse::<u32>() {
            Ok(id) if players.contains_key(&id) => Some(id),
            _ => {
                report.unresolved_players += 1;
                None
            }
        },
    };

    let provider_x = field(record, columns.x).and_then(|s| s.parse::<f32>().ok());
    let provider_y = field(record, columns.y).and_then(|s| s.parse::<f32>().ok());
    let (provider_x, provider_y) = match (provider_x, provider_y) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            report.dropped_no_location += 1;
            return None;
        }
    };
    let start_m = pitch::from_provider(provider_x, provider_y);
    if !pitch::in_bounds(start_m) {
        report.dropped_out_of_bounds += 1;
        return None;
    }

    let end_m = match end_location(record, columns) {
        EndLocation::Present(pos) if !pitch::in_bounds(pos) => {
            report.dropped_out_of_bounds += 1;
            return None;
        }
        EndLocation::Present(pos) => Some(pos),
        EndLocation::Absent => None,
    };

    let kind = field(record, columns.kind)
        .map(EventKind::from_provider)
        .unwrap_or(EventKind::Other);
    let outcome = columns
        .outcome
        .and_then(|i| field(record, i))
        .map(Outcome::from_provider)
        .unwrap_or(Outcome::Unsuccessful);
    let qualifiers = columns
        .qualifiers
        .and_then(|i| field(record, i))
        .map(|raw| {
            raw.split(QUALIFIER_SEPARATOR)
                .filter_map(Qualifier::from_provider)
                .collect()
        })
        .unwrap_or_default();

    let mut event = Event {
        minute,
        second,
        kind,
        outcome,
        team_id,
        player_id,
        start_m,
        end_m,
        qualifiers,
        xt: None,
        progressive_distance_m: 0.0,
    };
    event.progressive_distance_m = progressive_distance(&event);
    Some(event)
}

enum EndLocation {
    Present(MeterPos),
    Absent,
}

fn end_location(record: &csv::StringRecord, columns: &Columns) -> EndLocation {
    let end_x = columns
        .end_x
        .and_then(|i| field(record, i))
        .and_then(|s| s.parse::<f32>().ok());
    let end_y = columns
        .end_y
        .and_then(|i| field(record, i))
        .and_then(|s| s.parse::<f32>().ok());
    match (end_x, end_y) {
        (Some(x), Some(y)) => EndLocation::Present(pitch::from_provider(x, y)),
        _ => EndLocation::Absent,
    }
}

/// Progressive-pass distance: for successful passes starting beyond the
/// halfway line, the reduction in distance to the opponent goal; zero for
/// everything else (including backward passes).
fn progressive_distance(event: &Event) -> f32 {
    if !event.is_successful_pass() || event.start_m.0 <= pitch::HALFWAY_X_M {
        return 0.0;
    }
    let Some(end_m) = event.end_m else {
        return 0.0;
    };
    let gained =
        pitch::distance_to_opponent_goal(event.start_m) - pitch::distance_to_opponent_goal(end_m);
    gained.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SheetPlayer;

    fn sheet(team_id: u32, name: &str, player_ids: &[u32]) -> TeamSheet {
        TeamSheet {
            team_id,
            name: name.to_string(),
            players: player_ids
                .iter()
                .map(|&id| SheetPlayer {
                    id,
                    name: format!("Player {id}"),
                    shirt_number: None,
                    is_starter: true,
                    position: "CM".to_string(),
                })
                .collect(),
        }
    }

    const HEADER: &str = "id,minute,second,team_id,player_id,type,outcome,x,y,end_x,end_y,qualifiers";

    fn ingest(rows: &[&str]) -> (MatchDataset, IngestReport) {
        let table = format!("{HEADER}\n{}", rows.join("\n"));
        ingest_match(
            "m1",
            table.as_bytes(),
            &sheet(10, "Home", &[1, 2, 3]),
            &sheet(20, "Away", &[4, 5, 6]),
        )
        .expect("table should ingest")
    }

    #[test]
    fn parses_comma_utf8_table() {
        let (dataset, report) = ingest(&[
            "1,4,30,10,1,Pass,Successful,60,50,80,50,",
            "2,4,31,20,4,Tackle,Unsuccessful,40,50,,,",
        ]);
        assert_eq!(dataset.events.len(), 2);
        assert_eq!(report.events_kept, 2);
        assert_eq!(report.encoding, Some(TextEncoding::Utf8));
        assert_eq!(report.delimiter, Some(','));
    }

    #[test]
    fn accepts_semicolon_delimiter() {
        let table = format!(
            "{}\n{}",
            HEADER.replace(',', ";"),
            "1;4;30;10;1;Pass;Successful;60;50;80;50;"
        );
        let (dataset, report) = ingest_match(
            "m1",
            table.as_bytes(),
            &sheet(10, "Home", &[1]),
            &sheet(20, "Away", &[4]),
        )
        .expect("semicolon table should ingest");
        assert_eq!(dataset.events.len(), 1);
        assert_eq!(report.delimiter, Some(';'));
    }

    #[test]
    fn falls_back_to_latin1_for_invalid_utf8() {
        let mut table = format!("{HEADER}\n1,4,30,10,1,Pass,Successful,60,50,80,50,").into_bytes();
        table.push(b'\n');
        // 0xE9 is a bare Latin-1 e-acute, invalid as UTF-8.
        table.extend_from_slice(b"caf\xE9,5,0,10,2,Pass,Successful,55,40,70,40,");
        let (dataset, report) = ingest_match(
            "m1",
            &table,
            &sheet(10, "Home", &[1, 2]),
            &sheet(20, "Away", &[4]),
        )
        .expect("latin-1 table should ingest");
        assert_eq!(report.encoding, Some(TextEncoding::Latin1));
        assert_eq!(dataset.events.len(), 2);
    }

    #[test]
    fn rejects_tables_with_too_few_columns() {
        let result = ingest_match(
            "m1",
            b"minute,x,y\n1,50,50",
            &sheet(10, "Home", &[1]),
            &sheet(20, "Away", &[4]),
        );
        assert!(matches!(
            result,
            Err(IngestError::NoParsableFormat { .. })
        ));
    }

    #[test]
    fn drops_rows_without_location() {
        let (dataset, report) = ingest(&[
            "1,4,30,10,1,Pass,Successful,60,50,80,50,",
            "2,5,0,10,2,Tackle,Successful,,,,,",
        ]);
        assert_eq!(dataset.events.len(), 1);
        assert_eq!(report.dropped_no_location, 1);
    }

    #[test]
    fn drops_rows_out_of_bounds() {
        let (dataset, report) = ingest(&["1,4,30,10,1,Pass,Successful,120,50,80,50,"]);
        assert!(dataset.events.is_empty());
        assert_eq!(report.dropped_out_of_bounds, 1);
    }

    #[test]
    fn unknown_player_keeps_team_attribution() {
        let (dataset, report) = ingest(&["1,4,30,10,999,Pass,Successful,60,50,80,50,"]);
        assert_eq!(dataset.events.len(), 1);
        assert_eq!(dataset.events[0].team_id, 10);
        assert_eq!(dataset.events[0].player_id, None);
        assert_eq!(report.unresolved_players, 1);
    }

    #[test]
    fn row_without_any_player_reference_is_dropped() {
        let (dataset, report) = ingest(&["1,4,30,10,,Pass,Successful,60,50,80,50,"]);
        assert!(dataset.events.is_empty());
        assert_eq!(report.dropped_no_player, 1);
    }

    #[test]
    fn unknown_team_is_dropped() {
        let (dataset, report) = ingest(&["1,4,30,77,1,Pass,Successful,60,50,80,50,"]);
        assert!(dataset.events.is_empty());
        assert_eq!(report.dropped_unknown_team, 1);
    }

    #[test]
    fn rescales_provider_coordinates_to_meters() {
        let (dataset, _) = ingest(&["1,4,30,10,1,Pass,Successful,100,100,50,50,"]);
        let event = &dataset.events[0];
        assert!((event.start_m.0 - 105.0).abs() < 1e-3);
        assert!((event.start_m.1 - 68.0).abs() < 1e-3);
    }

    #[test]
    fn progressive_distance_for_forward_pass_past_midfield() {
        // Start (60, 50) provider = (63, 34) m; end (80, 50) = (84, 34) m.
        // Both on the goal axis: gain is exactly 21m.
        let (dataset, _) = ingest(&["1,4,30,10,1,Pass,Successful,60,50,80,50,"]);
        let event = &dataset.events[0];
        assert!((event.progressive_distance_m - 21.0).abs() < 1e-3);
    }

    #[test]
    fn no_progressive_distance_before_midfield_or_backward() {
        let (dataset, _) = ingest(&[
            // Starts in own half.
            "1,4,30,10,1,Pass,Successful,30,50,80,50,",
            // Backward pass past midfield.
            "2,5,0,10,2,Pass,Successful,80,50,60,50,",
            // Unsuccessful forward pass.
            "3,6,0,10,3,Pass,Unsuccessful,60,50,80,50,",
        ]);
        for event in &dataset.events {
            assert_eq!(event.progressive_distance_m, 0.0);
        }
    }

    #[test]
    fn report_counters_account_for_every_row() {
        let (dataset, report) = ingest(&[
            "1,4,30,10,1,Pass,Successful,60,50,80,50,",
            "2,5,0,10,2,Tackle,Successful,,,,,",
            "3,5,10,10,999,Pass,Successful,60,50,80,50,",
            "4,6,0,77,1,Pass,Successful,60,50,80,50,",
            "5,6,10,10,,Pass,Successful,60,50,80,50,",
            "6,7,0,10,3,Pass,Successful,120,50,80,50,",
            "7,oops,10,10,1,Pass,Successful,60,50,80,50,",
        ]);
        let dropped = report.dropped_malformed
            + report.dropped_no_location
            + report.dropped_out_of_bounds
            + report.dropped_unknown_team
            + report.dropped_no_player;
        assert_eq!(report.rows_seen, report.events_kept + dropped);
        assert_eq!(dataset.events.len(), report.events_kept);
        // The unresolved-player row was kept, not dropped.
        assert_eq!(report.unresolved_players, 1);
        assert_eq!(report.events_kept, 2);
        assert_eq!(report.dropped_malformed, 1);
    }

    #[test]
    fn events_sorted_chronologically() {
        let (dataset, _) = ingest(&[
            "1,9,0,10,1,Pass,Successful,60,50,80,50,",
            "2,4,30,10,2,Pass,Successful,60,50,80,50,",
            "3,4,10,10,3,Pass,Successful,60,50,80,50,",
        ]);
        let order: Vec<(u32, u32)> = dataset.events.iter().map(|e| (e.minute, e.second)).collect();
        assert_eq!(order, vec![(4, 10), (4, 30), (9, 0)]);
    }
}
