//! Player progress and rewards
//!
//! - `pathway`: per-kind level tracks
//! - `rewards`: badge and milestone catalogues
//! - `snapshot`: the persisted aggregate and its projections
//! - `rules`: unlock, milestone and badge passes
//! - `engine`: the single writer that applies results and saves

pub mod engine;
pub mod pathway;
pub mod rewards;
pub mod rules;
pub mod snapshot;

pub use engine::{ProgressEngine, ProgressEvent};
pub use pathway::Pathway;
pub use rewards::{Badge, BadgeKind, Milestone, MilestoneId, MilestoneMetric};
pub use snapshot::ProgressSnapshot;
