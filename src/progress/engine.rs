//! Progress engine: the single writer of the progress snapshot
//!
//! Each public operation is one logical step: the snapshot is updated on a
//! working copy, committed, then saved. Save failures are logged and dropped;
//! the in-memory snapshot stays authoritative until the next successful save.

use serde::{Deserialize, Serialize};

use super::rewards::{BadgeKind, MilestoneId};
use super::rules::{award_badges, propagate_unlocks, recompute_milestones};
use super::snapshot::ProgressSnapshot;
use crate::clock::{SystemClock, WallClock};
use crate::game::{Difficulty, GameKind, Level};
use crate::persistence::{self, BlobStore};
use crate::round::RoundOutcome;

/// Change notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressEvent {
    LevelCompleted {
        kind: GameKind,
        level_id: u32,
        first_time: bool,
    },
    BestScoreRaised {
        kind: GameKind,
        level_id: u32,
        score: u32,
    },
    StreakReset,
    PathwayUnlocked(GameKind),
    MilestoneReached(MilestoneId),
    BadgeEarned(BadgeKind),
    OnboardingCompleted,
    ProgressReset,
}

/// Owns the snapshot, its store and the clock used to stamp badge awards
#[derive(Debug)]
pub struct ProgressEngine<S: BlobStore, C: WallClock = SystemClock> {
    snapshot: ProgressSnapshot,
    store: S,
    clock: C,
    events: Vec<ProgressEvent>,
}

impl<S: BlobStore> ProgressEngine<S> {
    /// Load saved progress from `store`, stamping awards with the host clock
    pub fn load(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: BlobStore, C: WallClock> ProgressEngine<S, C> {
    /// Load saved progress from `store`; missing or corrupt data starts fresh
    pub fn with_clock(store: S, clock: C) -> Self {
        let snapshot = persistence::load_snapshot(&store);
        Self {
            snapshot,
            store,
            clock,
            events: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn unlocked_pathways(&self) -> Vec<GameKind> {
        self.snapshot.unlocked_pathways().map(|p| p.game_kind).collect()
    }

    pub fn earned_badges(&self) -> Vec<BadgeKind> {
        self.snapshot.earned_badges().map(|b| b.kind).collect()
    }

    pub fn levels_for(&self, kind: GameKind, difficulty: Difficulty) -> Vec<Level> {
        self.snapshot
            .levels_for(kind, difficulty)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record a won level.
    ///
    /// A repeat completion can only raise the best score; streak and totals
    /// move on the first completion only. Unknown level ids are ignored.
    pub fn complete_level(&mut self, kind: GameKind, level_id: u32, score: u32) {
        let mut next = self.snapshot.clone();
        let mut events = Vec::new();

        let Some(level) = next.pathway_mut(kind).and_then(|p| p.level_mut(level_id)) else {
            log::debug!("ignoring completion of unknown level {kind:?}/{level_id}");
            return;
        };
        let first_time = !level.is_completed;
        level.is_completed = true;
        if score > level.best_score {
            level.best_score = score;
            events.push(ProgressEvent::BestScoreRaised {
                kind,
                level_id,
                score,
            });
        }

        if first_time {
            next.total_levels_completed += 1;
            next.current_streak += 1;
            next.best_streak = next.best_streak.max(next.current_streak);
        }
        events.insert(
            0,
            ProgressEvent::LevelCompleted {
                kind,
                level_id,
                first_time,
            },
        );

        for unlocked in propagate_unlocks(&mut next) {
            log::info!("{} unlocked", unlocked.pathway_name());
            events.push(ProgressEvent::PathwayUnlocked(unlocked));
        }
        for reached in recompute_milestones(&mut next) {
            log::info!("Milestone reached: {}", reached.title());
            events.push(ProgressEvent::MilestoneReached(reached));
        }
        for earned in award_badges(&mut next, self.clock.now_ms()) {
            log::info!("Badge earned: {}", earned.title());
            events.push(ProgressEvent::BadgeEarned(earned));
        }

        log::info!(
            "Completed {kind:?} level {level_id} (score {score}, total {}, streak {})",
            next.total_levels_completed,
            next.current_streak
        );
        self.commit(next, events);
    }

    /// Record a lost level: the current streak resets, nothing else changes
    pub fn fail_level(&mut self) {
        let mut next = self.snapshot.clone();
        next.current_streak = 0;
        self.commit(next, vec![ProgressEvent::StreakReset]);
    }

    /// Forward a finished round: won rounds complete the level, lost ones fail it
    pub fn record_outcome(&mut self, kind: GameKind, level_id: u32, outcome: &RoundOutcome) {
        if outcome.won {
            self.complete_level(kind, level_id, outcome.score);
        } else {
            self.fail_level();
        }
    }

    pub fn complete_onboarding(&mut self) {
        let mut next = self.snapshot.clone();
        next.has_onboarded = true;
        self.commit(next, vec![ProgressEvent::OnboardingCompleted]);
    }

    /// Wipe all progress. Onboarding stays marked as done.
    pub fn reset_progress(&mut self) {
        let next = ProgressSnapshot {
            has_onboarded: true,
            ..ProgressSnapshot::default()
        };
        log::info!("Progress reset");
        self.commit(next, vec![ProgressEvent::ProgressReset]);
    }

    fn commit(&mut self, next: ProgressSnapshot, events: Vec<ProgressEvent>) {
        debug_assert_eq!(next.invariant_violation(), None);
        self.snapshot = next;
        self.events.extend(events);
        if let Err(e) = persistence::save_snapshot(&mut self.store, &self.snapshot) {
            log::warn!("Progress could not be saved: {e}");
        }
    }
}
