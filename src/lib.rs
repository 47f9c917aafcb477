//! Pathways - three mini-games and the progress tree that links them
//!
//! Core modules:
//! - `game`: Game kinds, difficulties and levels
//! - `clock`: Virtual round clock and wall clock
//! - `round`: Deterministic round state machines (reflex, balance, pattern)
//! - `progress`: Pathway unlocks, streaks, milestones and badges
//! - `persistence`: Progress blob encoding and storage backends

pub mod clock;
pub mod game;
pub mod persistence;
pub mod progress;
pub mod round;

pub use clock::{FixedClock, Scheduler, SystemClock, WallClock};
pub use game::{Difficulty, GameKind, Level};
pub use persistence::{BlobStore, MemoryStore, PersistError};
pub use progress::{ProgressEngine, ProgressEvent, ProgressSnapshot};
pub use round::{RoundEngine, RoundEvent, RoundInput, RoundOutcome, RoundPhase};

/// Game configuration constants
pub mod consts {
    /// Countdown before a round becomes active (3, 2, 1)
    pub const COUNTDOWN_TICKS: u8 = 3;
    pub const COUNTDOWN_TICK_SECS: f64 = 1.0;

    /// Pathway layout
    pub const LEVELS_PER_DIFFICULTY: u32 = 3;
    pub const LEVELS_PER_PATHWAY: u32 = 9;

    /// Reflex: targets to resolve, misses allowed
    pub const REFLEX_TOTAL_ROUNDS: u32 = 10;
    pub const REFLEX_MAX_MISSES: u32 = 3;
    /// Target lifetime floor and per-round shrink (seconds)
    pub const REFLEX_MIN_DISPLAY_TIME: f64 = 0.4;
    pub const REFLEX_SPEEDUP_PER_ROUND: f64 = 0.05;
    pub const REFLEX_MISS_RESPAWN_DELAY: f64 = 0.3;
    /// Base hit points, also the base of the difficulty bonus
    pub const REFLEX_BASE_POINTS: u32 = 10;
    /// Margin kept clear around the normalized play field
    pub const FIELD_PADDING: f32 = 0.1;

    /// Balance: tile sweeps between -TILE_TRAVEL and +TILE_TRAVEL
    pub const TILE_TRAVEL: f32 = 150.0;
    pub const TILE_WIDTH: f32 = 80.0;
    pub const MIN_TILE_WIDTH: f32 = 20.0;
    /// Sweep time floor and per-level speedup (seconds)
    pub const BALANCE_MIN_SPEED: f64 = 0.6;
    pub const BALANCE_SPEEDUP_PER_TILE: f64 = 0.08;
    pub const BALANCE_BASE_POINTS: u32 = 15;
    pub const BALANCE_DIFFICULTY_POINTS: u32 = 5;
    pub const BALANCE_TARGET_HEIGHT: u32 = 8;
    pub const BALANCE_MAX_FAILURES: u32 = 3;
    pub const BALANCE_SUCCESS_DELAY: f64 = 0.3;
    pub const BALANCE_FAILURE_DELAY: f64 = 0.5;

    /// Pattern: 3x3 grid
    pub const GRID_CELLS: u8 = 9;
    pub const PATTERN_MAX_ROUNDS: u32 = 5;
    pub const PATTERN_MAX_MISTAKES: u32 = 2;
    pub const PATTERN_TAP_POINTS: u32 = 5;
    pub const PATTERN_DIFFICULTY_POINTS: u32 = 3;
    /// Round bonus = base + per_round * round
    pub const PATTERN_BONUS_BASE: u32 = 20;
    pub const PATTERN_BONUS_PER_ROUND: u32 = 5;
    /// Playback timing (seconds); a cell stays lit for SHOW_SHARE of each step
    pub const PATTERN_PLAYBACK_DELAY: f64 = 1.0;
    pub const PATTERN_SHOW_SHARE: f64 = 0.7;
    pub const PATTERN_INPUT_DELAY: f64 = 0.5;
    pub const PATTERN_FEEDBACK_SECS: f64 = 0.15;
    /// A wrong tap stays lit this long
    pub const PATTERN_WRONG_FEEDBACK_SECS: f64 = 0.5;
    pub const PATTERN_ROUND_DELAY: f64 = 1.0;
    pub const PATTERN_LOSS_DELAY: f64 = 0.5;
    pub const PATTERN_RESTART_DELAY: f64 = 1.0;
}
