//! Match timeline orchestration
//!
//! Recomputes formation and compactness for both teams at every observed
//! minute. Minutes share only the immutable dataset, so they are computed
//! as a data-parallel map over the minute range and merged by minute index;
//! completion order never influences the result.
//!
//! Long computations are cooperatively cancellable (the token is checked
//! once per minute), report progress through a shared atomic counter, and
//! are memoized per (match id, window size) until that key changes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::formation::{detect_formation, FormationSnapshot};
use crate::config::AnalysisConfig;
use crate::error::TimelineError;
use crate::models::{MatchDataset, Side};

/// Both teams' snapshots for one minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub minute: u32,
    pub home: FormationSnapshot,
    pub away: FormationSnapshot,
}

/// Ordered per-minute snapshots spanning the observed minute range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub match_id: String,
    pub window_minutes: u32,
    pub start_minute: u32,
    pub end_minute: u32,
    /// Ascending by minute, one entry per minute in the range.
    pub entries: Vec<TimelineEntry>,
}

/// Cooperative cancellation flag shared with an in-flight computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Shared progress counter for one timeline computation.
///
/// Reading `fraction` from another thread never blocks the computation;
/// it is informational only and does not affect the final result.
#[derive(Debug, Clone, Default)]
pub struct TimelineProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl TimelineProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
    }

    fn complete_one(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of minutes completed, in [0, 1].
    pub fn fraction(&self) -> f32 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let completed = self.completed.load(Ordering::Relaxed);
        (completed as f32 / total as f32).min(1.0)
    }
}

/// Compute a full timeline for one (dataset, config) input.
///
/// Parallel across minutes; deterministic because every minute reads only
/// the immutable dataset and results merge by minute index.
pub fn compute_timeline(
    dataset: &MatchDataset,
    config: &AnalysisConfig,
    token: &CancelToken,
    progress: Option<&TimelineProgress>,
) -> Result<Timeline, TimelineError> {
    config.validate()?;
    let (start_minute, end_minute) = dataset
        .minute_bounds()
        .ok_or(TimelineError::EmptyDataset)?;
    let minutes: Vec<u32> = (start_minute..=end_minute).collect();
    if let Some(progress) = progress {
        progress.begin(minutes.len());
    }

    let home_id = dataset.team(Side::Home).id;
    let away_id = dataset.team(Side::Away).id;

    let entries = minutes
        .par_iter()
        .map(|&minute| {
            if token.is_cancelled() {
                return Err(TimelineError::Cancelled);
            }
            let entry = TimelineEntry {
                minute,
                home: detect_formation(dataset, home_id, minute, config),
                away: detect_formation(dataset, away_id, minute, config),
            };
            if let Some(progress) = progress {
                progress.complete_one();
            }
            Ok(entry)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if token.is_cancelled() {
        return Err(TimelineError::Cancelled);
    }

    debug!(
        match_id = %dataset.match_id,
        window = config.window_minutes,
        minutes = entries.len(),
        "timeline computed"
    );

    Ok(Timeline {
        match_id: dataset.match_id.clone(),
        window_minutes: config.window_minutes,
        start_minute,
        end_minute,
        entries,
    })
}

/// Cache key: a timeline is reusable until either component changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimelineKey {
    pub match_id: String,
    pub window_minutes: u32,
}

/// Owns the memoized timeline and the in-flight cancellation token.
///
/// Replaces ambient memoization: the cache is keyed explicitly by
/// (match id, window size) and populated only here. Starting a computation
/// for a different key first signals cancellation to any in-flight one,
/// whose partial state is then discarded.
#[derive(Debug, Default)]
pub struct TimelineEngine {
    cache: Mutex<Option<(TimelineKey, Arc<Timeline>)>>,
    inflight: Mutex<Option<(TimelineKey, CancelToken)>>,
    progress: TimelineProgress,
}

impl TimelineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress handle for the current (or next) computation; safe to poll
    /// from another thread.
    pub fn progress(&self) -> TimelineProgress {
        self.progress.clone()
    }

    /// Return the memoized timeline for (match id, window size), computing
    /// it when the key is not cached.
    pub fn timeline(
        &self,
        dataset: &MatchDataset,
        config: &AnalysisConfig,
    ) -> Result<Arc<Timeline>, TimelineError> {
        let key = TimelineKey {
            match_id: dataset.match_id.clone(),
            window_minutes: config.window_minutes,
        };

        if let Some((cached_key, cached)) =
            &*self.cache.lock().expect("timeline cache lock poisoned")
        {
            if *cached_key == key {
                return Ok(cached.clone());
            }
        }

        let token = {
            let mut inflight = self.inflight.lock().expect("timeline inflight lock poisoned");
            if let Some((inflight_key, inflight_token)) = &*inflight {
                if *inflight_key != key {
                    inflight_token.cancel();
                }
            }
            let token = CancelToken::new();
            *inflight = Some((key.clone(), token.clone()));
            token
        };

        let timeline = Arc::new(compute_timeline(
            dataset,
            config,
            &token,
            Some(&self.progress),
        )?);

        if !token.is_cancelled() {
            *self.cache.lock().expect("timeline cache lock poisoned") =
                Some((key.clone(), timeline.clone()));
        }
        let mut inflight = self.inflight.lock().expect("timeline inflight lock poisoned");
        if matches!(&*inflight, Some((inflight_key, _)) if *inflight_key == key) {
            *inflight = None;
        }
        Ok(timeline)
    }

    /// Drop the memoized timeline unconditionally.
    pub fn invalidate(&self) {
        *self.cache.lock().expect("timeline cache lock poisoned") = None;
    }
}
