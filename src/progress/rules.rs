//! Derived-state passes run after every completion
//!
//! Each pass is idempotent: running it again on its own output changes nothing.

use super::rewards::{BadgeKind, MilestoneId, MilestoneMetric};
use super::snapshot::ProgressSnapshot;
use crate::game::{Difficulty, GameKind};

/// Unlock the successor of every completed pathway. Returns the newly unlocked kinds.
pub fn propagate_unlocks(snapshot: &mut ProgressSnapshot) -> Vec<GameKind> {
    let mut unlocked = Vec::new();
    for i in 0..snapshot.pathways.len().saturating_sub(1) {
        if snapshot.pathways[i].is_completed() && !snapshot.pathways[i + 1].is_unlocked {
            snapshot.pathways[i + 1].is_unlocked = true;
            snapshot.pathways_unlocked_count += 1;
            unlocked.push(snapshot.pathways[i + 1].game_kind);
        }
    }
    unlocked
}

/// Recompute every milestone from snapshot totals. Returns milestones that
/// became complete on this pass.
pub fn recompute_milestones(snapshot: &mut ProgressSnapshot) -> Vec<MilestoneId> {
    let levels = snapshot.total_levels_completed;
    let pathways = snapshot.completed_pathways_count();

    let mut reached = Vec::new();
    for milestone in &mut snapshot.milestones {
        let was_completed = milestone.is_completed();
        milestone.current_progress = match milestone.id.metric() {
            MilestoneMetric::LevelsCompleted => levels,
            MilestoneMetric::PathwaysCompleted => pathways,
        };
        if milestone.is_completed() && !was_completed {
            reached.push(milestone.id);
        }
    }
    reached
}

/// Rebuild everything derivable from the levels and the catalogues: the
/// completion and unlock counters, milestone titles, requirements and progress.
/// Returns true if anything changed.
pub fn reconcile_derived(snapshot: &mut ProgressSnapshot) -> bool {
    let before = snapshot.clone();
    snapshot.total_levels_completed = snapshot.counted_levels_completed();
    snapshot.pathways_unlocked_count = snapshot.unlocked_pathways().count() as u32;
    for milestone in &mut snapshot.milestones {
        milestone.title = milestone.id.title().to_string();
        milestone.requirement = milestone.id.requirement();
    }
    recompute_milestones(snapshot);
    *snapshot != before
}

/// Badge conditions currently satisfied by the snapshot (earned or not)
pub fn satisfied_badges(snapshot: &ProgressSnapshot) -> Vec<BadgeKind> {
    let levels = snapshot.total_levels_completed;
    let pathways_done = snapshot.completed_pathways_count();
    let pathway_done = |kind: GameKind| snapshot.pathway(kind).is_some_and(|p| p.is_completed());
    let tier_done = |d: Difficulty| snapshot.pathways.iter().all(|p| p.difficulty_completed(d));

    BadgeKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            BadgeKind::FirstStep => levels >= 1,
            BadgeKind::ReflexMaster => pathway_done(GameKind::Reflex),
            BadgeKind::BalanceExpert => pathway_done(GameKind::Balance),
            BadgeKind::PatternGuru => pathway_done(GameKind::Pattern),
            BadgeKind::FiveLevels => levels >= 5,
            BadgeKind::TenLevels => levels >= 10,
            BadgeKind::AllEasy => tier_done(Difficulty::Easy),
            BadgeKind::AllNormal => tier_done(Difficulty::Normal),
            BadgeKind::AllHard => tier_done(Difficulty::Hard),
            BadgeKind::PathwayComplete => pathways_done >= 1,
            BadgeKind::AllPathways => pathways_done as usize >= GameKind::ALL.len(),
            BadgeKind::StreakFive => snapshot.best_streak >= 5,
            BadgeKind::StreakTen => snapshot.best_streak >= 10,
        })
        .collect()
}

/// Award every satisfied, unearned badge at `now_ms`. Returns the new awards.
pub fn award_badges(snapshot: &mut ProgressSnapshot, now_ms: f64) -> Vec<BadgeKind> {
    let satisfied = satisfied_badges(snapshot);
    snapshot
        .badges
        .iter_mut()
        .filter(|b| satisfied.contains(&b.kind))
        .filter_map(|b| b.award(now_ms).then_some(b.kind))
        .collect()
}
