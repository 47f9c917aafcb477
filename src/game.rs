//! Game vocabulary shared by rounds and progress
//!
//! The per-difficulty tables here are the only tuning surface; there is no
//! runtime configuration.

use serde::{Deserialize, Serialize};

/// Mini-game kind. Declaration order is the pathway unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Reflex,
    Balance,
    Pattern,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Reflex, GameKind::Balance, GameKind::Pattern];

    /// Position in the unlock chain
    pub fn index(self) -> usize {
        match self {
            GameKind::Reflex => 0,
            GameKind::Balance => 1,
            GameKind::Pattern => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Reflex => "Path of Reflex",
            GameKind::Balance => "Balanced Steps",
            GameKind::Pattern => "Pattern Trails",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameKind::Reflex => "Tap the highlighted shapes before they vanish",
            GameKind::Balance => "Time your taps to build a stable pathway",
            GameKind::Pattern => "Reproduce the light sequence as it grows",
        }
    }

    pub fn pathway_name(self) -> &'static str {
        match self {
            GameKind::Reflex => "Reflex Pathway",
            GameKind::Balance => "Balance Pathway",
            GameKind::Pattern => "Pattern Pathway",
        }
    }

    /// Icon name for the presentation layer
    pub fn icon(self) -> &'static str {
        match self {
            GameKind::Reflex => "bolt.fill",
            GameKind::Balance => "square.stack.3d.up.fill",
            GameKind::Pattern => "sparkles",
        }
    }
}

/// Level difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn score_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 1.5,
            Difficulty::Hard => 2.0,
        }
    }

    pub fn speed_factor(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 0.75,
            Difficulty::Hard => 0.5,
        }
    }

    /// `floor(base * multiplier)`, the difficulty share of a score award
    pub fn scaled_points(self, base: u32) -> u32 {
        (base as f64 * self.score_multiplier()).floor() as u32
    }

    // === Reflex ===

    /// Target lifetime before any per-round speed-up (seconds)
    pub fn reflex_base_time(self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.7,
        }
    }

    /// Nominal gap between targets (seconds); half of it follows a hit
    pub fn reflex_spawn_interval(self) -> f64 {
        match self {
            Difficulty::Easy => 1.8,
            Difficulty::Normal => 1.2,
            Difficulty::Hard => 0.8,
        }
    }

    // === Balance ===

    /// Edge-to-edge sweep time of a tile on an empty stack (seconds)
    pub fn balance_base_speed(self) -> f64 {
        match self {
            Difficulty::Easy => 2.5,
            Difficulty::Normal => 1.8,
            Difficulty::Hard => 1.2,
        }
    }

    /// Allowed horizontal misalignment against the previous tile
    pub fn balance_tolerance(self) -> f32 {
        match self {
            Difficulty::Easy => 30.0,
            Difficulty::Normal => 20.0,
            Difficulty::Hard => 12.0,
        }
    }

    // === Pattern ===

    /// Sequence length in the first round
    pub fn pattern_base_length(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 4,
            Difficulty::Hard => 5,
        }
    }

    /// Playback time per cell, split between shown and hidden (seconds)
    pub fn pattern_display_speed(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 0.6,
            Difficulty::Hard => 0.45,
        }
    }
}

/// One playable slot within a pathway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    /// 1..=9, sequential across difficulties within a pathway
    pub id: u32,
    pub game_kind: GameKind,
    pub difficulty: Difficulty,
    pub is_completed: bool,
    pub best_score: u32,
}

impl Level {
    pub fn new(id: u32, game_kind: GameKind, difficulty: Difficulty) -> Self {
        Self {
            id,
            game_kind,
            difficulty,
            is_completed: false,
            best_score: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_points_floor() {
        assert_eq!(Difficulty::Easy.scaled_points(10), 10);
        assert_eq!(Difficulty::Normal.scaled_points(10), 15);
        assert_eq!(Difficulty::Hard.scaled_points(10), 20);
        // 7.5 and 4.5 truncate
        assert_eq!(Difficulty::Normal.scaled_points(5), 7);
        assert_eq!(Difficulty::Normal.scaled_points(3), 4);
    }

    #[test]
    fn test_kind_order_matches_index() {
        for (i, kind) in GameKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(GameKind::Reflex < GameKind::Balance);
        assert!(GameKind::Balance < GameKind::Pattern);
    }
}
