//! Mini-game rounds
//!
//! A round is one attempt at one level. All three kinds share the lifecycle
//! in `engine` and differ only in their rules:
//! - `reflex`: tap targets before they expire
//! - `balance`: stack sliding tiles within tolerance
//! - `pattern`: repeat a growing light sequence
//!
//! Rounds own their virtual clock and RNG; nothing here touches I/O.

pub mod balance;
pub mod engine;
pub mod pattern;
pub mod reflex;

pub use balance::{BalanceRound, Landing, MovingTile, PlacedTile, judge_drop};
pub use engine::{RoundEngine, RoundEvent, RoundInput, RoundOutcome, RoundPhase};
pub use pattern::{PatternCue, PatternRound};
pub use reflex::{ReflexRound, Target, TargetShape};
