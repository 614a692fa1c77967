use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fxhash::FxHashMap;

use ta_core::{
    build_pass_network, compute_timeline, AnalysisConfig, CancelToken, Event, EventKind,
    MatchDataset, Outcome, Player, Side, Team, ThreatGrid,
};

/// Synthetic 95-minute match: both squads act every minute, positions
/// spread along the length axis like a settled 4-3-3.
fn synthetic_match() -> MatchDataset {
    let mut players = FxHashMap::default();
    let mut events = Vec::new();
    for team_id in [1u32, 2u32] {
        for offset in 0..11u32 {
            let id = team_id * 100 + offset;
            players.insert(
                id,
                Player {
                    id,
                    name: format!("Player {id}"),
                    short_name: format!("P. {id}"),
                    team_id,
                    shirt_number: Some((offset + 1) as u8),
                    is_starter: true,
                    position: if offset == 0 { "GK" } else { "CM" }.to_string(),
                },
            );
        }
    }
    for minute in 0..95u32 {
        for team_id in [1u32, 2u32] {
            for offset in 0..11u32 {
                let x = 6.0 + offset as f32 * 8.8 + (minute % 7) as f32;
                let y = 6.0 + ((offset * 13 + minute) % 56) as f32;
                events.push(Event {
                    minute,
                    second: (team_id * 11 + offset) % 60,
                    kind: EventKind::Pass,
                    outcome: Outcome::Successful,
                    team_id,
                    player_id: Some(team_id * 100 + offset),
                    start_m: (x, y),
                    end_m: Some(((x + 8.0).min(104.0), y)),
                    qualifiers: vec![],
                    xt: None,
                    progressive_distance_m: 0.0,
                });
            }
        }
    }
    events.sort_by_key(|e| (e.minute, e.second));
    MatchDataset {
        match_id: "bench".to_string(),
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

fn bench_timeline(c: &mut Criterion) {
    let dataset = synthetic_match();
    let config = AnalysisConfig::default();
    c.bench_function("timeline_95_minutes", |b| {
        b.iter(|| {
            let timeline = compute_timeline(
                black_box(&dataset),
                black_box(&config),
                &CancelToken::new(),
                None,
            )
            .unwrap();
            black_box(timeline.entries.len());
        })
    });
}

fn bench_annotation(c: &mut Criterion) {
    let dataset = synthetic_match();
    let grid = ThreatGrid::embedded();
    c.bench_function("xt_annotation", |b| {
        b.iter(|| {
            let mut events = dataset.events.clone();
            grid.annotate(black_box(&mut events));
            black_box(events.len());
        })
    });
}

fn bench_pass_network(c: &mut Criterion) {
    let dataset = synthetic_match();
    c.bench_function("pass_network", |b| {
        b.iter(|| {
            let network = build_pass_network(black_box(&dataset), 1);
            black_box(network.edges.len());
        })
    });
}

criterion_group!(benches, bench_timeline, bench_annotation, bench_pass_network);
criterion_main!(benches);
