//! Pathways: one nine-level track per game kind

use serde::{Deserialize, Serialize};

use crate::consts::{LEVELS_PER_DIFFICULTY, LEVELS_PER_PATHWAY};
use crate::game::{Difficulty, GameKind, Level};

/// A game kind's level track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pathway {
    pub game_kind: GameKind,
    /// Three levels per difficulty, in difficulty order, ids 1..=9
    pub levels: Vec<Level>,
    pub is_unlocked: bool,
}

impl Pathway {
    pub fn new(game_kind: GameKind, is_unlocked: bool) -> Self {
        let levels = Difficulty::ALL
            .iter()
            .flat_map(|&d| std::iter::repeat_n(d, LEVELS_PER_DIFFICULTY as usize))
            .enumerate()
            .map(|(i, d)| Level::new(i as u32 + 1, game_kind, d))
            .collect();
        Self {
            game_kind,
            levels,
            is_unlocked,
        }
    }

    pub fn completed_count(&self) -> u32 {
        self.levels.iter().filter(|l| l.is_completed).count() as u32
    }

    /// Completed share, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        if self.levels.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.levels.len() as f64
    }

    pub fn is_completed(&self) -> bool {
        self.levels.iter().all(|l| l.is_completed)
    }

    pub fn level(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn level_mut(&mut self, id: u32) -> Option<&mut Level> {
        self.levels.iter_mut().find(|l| l.id == id)
    }

    /// Levels of one difficulty, in track order
    pub fn levels_for(&self, difficulty: Difficulty) -> impl Iterator<Item = &Level> {
        self.levels.iter().filter(move |l| l.difficulty == difficulty)
    }

    /// Every level of `difficulty` is completed
    pub fn difficulty_completed(&self, difficulty: Difficulty) -> bool {
        self.levels_for(difficulty).all(|l| l.is_completed)
    }

    /// 1-based position of a level within its difficulty group
    pub fn level_number(&self, id: u32) -> Option<usize> {
        let level = self.level(id)?;
        self.levels_for(level.difficulty)
            .position(|l| l.id == id)
            .map(|i| i + 1)
    }

    /// Matches the fixed layout `new` builds (ids, kinds, difficulties)
    pub(crate) fn has_canonical_layout(&self, game_kind: GameKind) -> bool {
        let fresh = Pathway::new(game_kind, false);
        self.game_kind == game_kind
            && self.levels.len() == LEVELS_PER_PATHWAY as usize
            && self.levels.iter().zip(&fresh.levels).all(|(a, b)| {
                a.id == b.id && a.game_kind == b.game_kind && a.difficulty == b.difficulty
            })
    }
}
