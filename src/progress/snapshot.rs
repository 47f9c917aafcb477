//! The durable progress aggregate
//!
//! Pure data plus read-only projections. Only `ProgressEngine` mutates it.

use serde::{Deserialize, Serialize};

use super::pathway::Pathway;
use super::rewards::{Badge, BadgeKind, Milestone, MilestoneId};
use crate::game::{Difficulty, GameKind, Level};

/// Everything persisted for the single local profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub has_onboarded: bool,
    /// One per game kind, in `GameKind` order
    pub pathways: Vec<Pathway>,
    /// One per badge kind, in `BadgeKind::ALL` order
    pub badges: Vec<Badge>,
    /// One per milestone, in `MilestoneId::ALL` order
    pub milestones: Vec<Milestone>,
    pub total_levels_completed: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub pathways_unlocked_count: u32,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            has_onboarded: false,
            pathways: GameKind::ALL
                .iter()
                .map(|&kind| Pathway::new(kind, kind.index() == 0))
                .collect(),
            badges: BadgeKind::ALL.iter().map(|&k| Badge::new(k)).collect(),
            milestones: MilestoneId::ALL.iter().map(|&id| Milestone::new(id)).collect(),
            total_levels_completed: 0,
            current_streak: 0,
            best_streak: 0,
            pathways_unlocked_count: 1,
        }
    }
}

impl ProgressSnapshot {
    pub fn pathway(&self, kind: GameKind) -> Option<&Pathway> {
        self.pathways.iter().find(|p| p.game_kind == kind)
    }

    pub(crate) fn pathway_mut(&mut self, kind: GameKind) -> Option<&mut Pathway> {
        self.pathways.iter_mut().find(|p| p.game_kind == kind)
    }

    pub fn level(&self, kind: GameKind, level_id: u32) -> Option<&Level> {
        self.pathway(kind)?.level(level_id)
    }

    /// Levels of one kind and difficulty, in track order
    pub fn levels_for(&self, kind: GameKind, difficulty: Difficulty) -> Vec<&Level> {
        self.pathway(kind)
            .map(|p| p.levels_for(difficulty).collect())
            .unwrap_or_default()
    }

    /// 1-based display number of a level within its difficulty group
    pub fn level_number(&self, kind: GameKind, level_id: u32) -> Option<usize> {
        self.pathway(kind)?.level_number(level_id)
    }

    pub fn unlocked_pathways(&self) -> impl Iterator<Item = &Pathway> {
        self.pathways.iter().filter(|p| p.is_unlocked)
    }

    pub fn completed_pathways_count(&self) -> u32 {
        self.pathways.iter().filter(|p| p.is_completed()).count() as u32
    }

    pub fn badge(&self, kind: BadgeKind) -> Option<&Badge> {
        self.badges.iter().find(|b| b.kind == kind)
    }

    pub fn earned_badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter().filter(|b| b.is_earned)
    }

    pub fn earned_badges_count(&self) -> u32 {
        self.earned_badges().count() as u32
    }

    pub fn milestone(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    /// Completed levels counted directly from the pathways
    pub fn counted_levels_completed(&self) -> u32 {
        self.pathways.iter().map(|p| p.completed_count()).sum()
    }

    /// Check the fixed catalogue layout: kinds, level ids, badges and milestones
    /// all present once and in order.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.pathways.len() != GameKind::ALL.len() {
            return Err(format!(
                "expected {} pathways, found {}",
                GameKind::ALL.len(),
                self.pathways.len()
            ));
        }
        for (pathway, kind) in self.pathways.iter().zip(GameKind::ALL) {
            if !pathway.has_canonical_layout(kind) {
                return Err(format!("pathway for {kind:?} has an unexpected level layout"));
            }
        }
        let badge_kinds: Vec<BadgeKind> = self.badges.iter().map(|b| b.kind).collect();
        if badge_kinds != BadgeKind::ALL {
            return Err("badge list does not match the badge catalogue".to_string());
        }
        let milestone_ids: Vec<MilestoneId> = self.milestones.iter().map(|m| m.id).collect();
        if milestone_ids != MilestoneId::ALL {
            return Err("milestone list does not match the milestone catalogue".to_string());
        }
        Ok(())
    }

    /// First broken invariant, if any
    pub fn invariant_violation(&self) -> Option<String> {
        let unlocked = self.unlocked_pathways().count() as u32;
        if self.pathways_unlocked_count != unlocked {
            return Some(format!(
                "pathwaysUnlockedCount {} but {} pathways unlocked",
                self.pathways_unlocked_count, unlocked
            ));
        }
        if !self.pathways.first().is_some_and(|p| p.is_unlocked) {
            return Some("first pathway is locked".to_string());
        }
        for pair in self.pathways.windows(2) {
            if pair[1].is_unlocked && !pair[0].is_completed() {
                return Some(format!(
                    "{:?} unlocked before {:?} was completed",
                    pair[1].game_kind, pair[0].game_kind
                ));
            }
        }
        if self.total_levels_completed != self.counted_levels_completed() {
            return Some(format!(
                "totalLevelsCompleted {} but {} levels completed",
                self.total_levels_completed,
                self.counted_levels_completed()
            ));
        }
        if self.best_streak < self.current_streak {
            return Some("bestStreak below currentStreak".to_string());
        }
        if let Some(b) = self.badges.iter().find(|b| b.is_earned != b.earned_at.is_some()) {
            return Some(format!("{:?} earned flag and timestamp disagree", b.kind));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let s = ProgressSnapshot::default();
        assert!(!s.has_onboarded);
        assert_eq!(s.pathways.len(), 3);
        assert!(s.pathways[0].is_unlocked);
        assert!(!s.pathways[1].is_unlocked);
        assert!(!s.pathways[2].is_unlocked);
        assert_eq!(s.badges.len(), 13);
        assert_eq!(s.milestones.len(), 5);
        assert_eq!(s.pathways_unlocked_count, 1);
        assert_eq!(s.earned_badges_count(), 0);
        assert!(s.check_shape().is_ok());
        assert_eq!(s.invariant_violation(), None);
    }

    #[test]
    fn test_projections() {
        let s = ProgressSnapshot::default();
        assert_eq!(s.unlocked_pathways().count(), 1);
        assert_eq!(s.levels_for(GameKind::Balance, Difficulty::Hard).len(), 3);
        assert_eq!(s.levels_for(GameKind::Balance, Difficulty::Hard)[0].id, 7);
        assert_eq!(s.level_number(GameKind::Reflex, 4), Some(1));
        assert!(s.level(GameKind::Pattern, 0).is_none());
        assert_eq!(s.milestone(MilestoneId::Pathways1).map(|m| m.requirement), Some(1));
    }

    #[test]
    fn test_check_shape_rejects_reordered_badges() {
        let mut s = ProgressSnapshot::default();
        s.badges.swap(0, 1);
        assert!(s.check_shape().is_err());

        let mut s = ProgressSnapshot::default();
        s.pathways.pop();
        assert!(s.check_shape().is_err());

        let mut s = ProgressSnapshot::default();
        s.pathways[1].levels[4].id = 12;
        assert!(s.check_shape().is_err());
    }

    #[test]
    fn test_invariant_violation_detects_drift() {
        let mut s = ProgressSnapshot::default();
        s.total_levels_completed = 2;
        assert!(s.invariant_violation().is_some());

        let mut s = ProgressSnapshot::default();
        s.pathways[2].is_unlocked = true;
        s.pathways_unlocked_count = 2;
        assert!(s.invariant_violation().is_some());
    }
}
