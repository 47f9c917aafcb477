//! Badges and milestones

use serde::{Deserialize, Serialize};

/// Every badge that can be earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BadgeKind {
    FirstStep,
    ReflexMaster,
    BalanceExpert,
    PatternGuru,
    FiveLevels,
    TenLevels,
    AllEasy,
    AllNormal,
    AllHard,
    PathwayComplete,
    AllPathways,
    StreakFive,
    StreakTen,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 13] = [
        BadgeKind::FirstStep,
        BadgeKind::ReflexMaster,
        BadgeKind::BalanceExpert,
        BadgeKind::PatternGuru,
        BadgeKind::FiveLevels,
        BadgeKind::TenLevels,
        BadgeKind::AllEasy,
        BadgeKind::AllNormal,
        BadgeKind::AllHard,
        BadgeKind::PathwayComplete,
        BadgeKind::AllPathways,
        BadgeKind::StreakFive,
        BadgeKind::StreakTen,
    ];

    pub fn title(self) -> &'static str {
        match self {
            BadgeKind::FirstStep => "First Step",
            BadgeKind::ReflexMaster => "Reflex Master",
            BadgeKind::BalanceExpert => "Balance Expert",
            BadgeKind::PatternGuru => "Pattern Guru",
            BadgeKind::FiveLevels => "Persistent",
            BadgeKind::TenLevels => "Dedicated",
            BadgeKind::AllEasy => "Easy Champion",
            BadgeKind::AllNormal => "Normal Champion",
            BadgeKind::AllHard => "Hard Champion",
            BadgeKind::PathwayComplete => "Pathway Pioneer",
            BadgeKind::AllPathways => "Grand Master",
            BadgeKind::StreakFive => "Hot Streak",
            BadgeKind::StreakTen => "Unstoppable",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BadgeKind::FirstStep => "Complete your first level",
            BadgeKind::ReflexMaster => "Complete all Reflex levels",
            BadgeKind::BalanceExpert => "Complete all Balance levels",
            BadgeKind::PatternGuru => "Complete all Pattern levels",
            BadgeKind::FiveLevels => "Complete 5 levels total",
            BadgeKind::TenLevels => "Complete 10 levels total",
            BadgeKind::AllEasy => "Complete all Easy levels",
            BadgeKind::AllNormal => "Complete all Normal levels",
            BadgeKind::AllHard => "Complete all Hard levels",
            BadgeKind::PathwayComplete => "Complete an entire pathway",
            BadgeKind::AllPathways => "Complete all pathways",
            BadgeKind::StreakFive => "Win 5 levels in a row",
            BadgeKind::StreakTen => "Win 10 levels in a row",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            BadgeKind::FirstStep => "star.fill",
            BadgeKind::ReflexMaster => "bolt.circle.fill",
            BadgeKind::BalanceExpert => "scalemass.fill",
            BadgeKind::PatternGuru => "sparkles",
            BadgeKind::FiveLevels => "5.circle.fill",
            BadgeKind::TenLevels => "10.circle.fill",
            BadgeKind::AllEasy => "leaf.fill",
            BadgeKind::AllNormal => "flame.fill",
            BadgeKind::AllHard => "crown.fill",
            BadgeKind::PathwayComplete => "flag.fill",
            BadgeKind::AllPathways => "trophy.fill",
            BadgeKind::StreakFive => "bolt.heart.fill",
            BadgeKind::StreakTen => "bolt.shield.fill",
        }
    }
}

/// Earned state of one badge. Earning is one-way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub kind: BadgeKind,
    pub is_earned: bool,
    /// Unix timestamp (ms) of the award
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_at: Option<f64>,
}

impl Badge {
    pub fn new(kind: BadgeKind) -> Self {
        Self {
            kind,
            is_earned: false,
            earned_at: None,
        }
    }

    /// Mark earned at `now_ms`. Returns false if it was already earned.
    pub fn award(&mut self, now_ms: f64) -> bool {
        if self.is_earned {
            return false;
        }
        self.is_earned = true;
        self.earned_at = Some(now_ms);
        true
    }
}

/// Snapshot total a milestone tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneMetric {
    LevelsCompleted,
    PathwaysCompleted,
}

/// The fixed milestone set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MilestoneId {
    #[serde(rename = "levels_5")]
    Levels5,
    #[serde(rename = "levels_10")]
    Levels10,
    #[serde(rename = "levels_20")]
    Levels20,
    #[serde(rename = "pathways_1")]
    Pathways1,
    #[serde(rename = "pathways_all")]
    PathwaysAll,
}

impl MilestoneId {
    pub const ALL: [MilestoneId; 5] = [
        MilestoneId::Levels5,
        MilestoneId::Levels10,
        MilestoneId::Levels20,
        MilestoneId::Pathways1,
        MilestoneId::PathwaysAll,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneId::Levels5 => "levels_5",
            MilestoneId::Levels10 => "levels_10",
            MilestoneId::Levels20 => "levels_20",
            MilestoneId::Pathways1 => "pathways_1",
            MilestoneId::PathwaysAll => "pathways_all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        MilestoneId::ALL.into_iter().find(|id| id.as_str() == s)
    }

    pub fn title(self) -> &'static str {
        match self {
            MilestoneId::Levels5 => "Complete 5 Levels",
            MilestoneId::Levels10 => "Complete 10 Levels",
            MilestoneId::Levels20 => "Complete 20 Levels",
            MilestoneId::Pathways1 => "Complete 1 Pathway",
            MilestoneId::PathwaysAll => "Complete All Pathways",
        }
    }

    pub fn requirement(self) -> u32 {
        match self {
            MilestoneId::Levels5 => 5,
            MilestoneId::Levels10 => 10,
            MilestoneId::Levels20 => 20,
            MilestoneId::Pathways1 => 1,
            MilestoneId::PathwaysAll => 3,
        }
    }

    pub fn metric(self) -> MilestoneMetric {
        match self {
            MilestoneId::Levels5 | MilestoneId::Levels10 | MilestoneId::Levels20 => {
                MilestoneMetric::LevelsCompleted
            }
            MilestoneId::Pathways1 | MilestoneId::PathwaysAll => MilestoneMetric::PathwaysCompleted,
        }
    }
}

/// Aggregate goal; progress is always recomputed from snapshot totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: MilestoneId,
    pub title: String,
    pub requirement: u32,
    pub current_progress: u32,
}

impl Milestone {
    pub fn new(id: MilestoneId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            requirement: id.requirement(),
            current_progress: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.current_progress >= self.requirement
    }

    /// Progress toward the requirement, clamped to 0.0..=1.0
    pub fn fraction(&self) -> f64 {
        if self.requirement == 0 {
            return 0.0;
        }
        (self.current_progress as f64 / self.requirement as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_award_is_one_way() {
        let mut badge = Badge::new(BadgeKind::StreakFive);
        assert!(badge.award(100.0));
        assert!(!badge.award(200.0));
        assert!(badge.is_earned);
        assert_eq!(badge.earned_at, Some(100.0));
    }

    #[test]
    fn test_milestone_fraction() {
        let mut m = Milestone::new(MilestoneId::Levels10);
        assert_eq!(m.fraction(), 0.0);
        m.current_progress = 4;
        assert!((m.fraction() - 0.4).abs() < 1e-9);
        assert!(!m.is_completed());
        m.current_progress = 14;
        assert_eq!(m.fraction(), 1.0);
        assert!(m.is_completed());
    }

    #[test]
    fn test_milestone_id_strings() {
        for id in MilestoneId::ALL {
            assert_eq!(MilestoneId::from_str(id.as_str()), Some(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
        assert_eq!(MilestoneId::from_str("levels_50"), None);
    }

    #[test]
    fn test_badge_json_omits_missing_timestamp() {
        let json = serde_json::to_string(&Badge::new(BadgeKind::FirstStep)).unwrap();
        assert_eq!(json, r#"{"kind":"firstStep","isEarned":false}"#);
    }
}
