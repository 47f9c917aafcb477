//! Reflex rules: tap short-lived targets before they vanish

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::engine::{RoundCtx, RoundEvent, RoundInput, RoundTimer};
use crate::consts::*;
use crate::game::Difficulty;

/// Target silhouette (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetShape {
    Circle,
    Square,
    Diamond,
    Hexagon,
}

impl TargetShape {
    const ALL: [TargetShape; 4] = [
        TargetShape::Circle,
        TargetShape::Square,
        TargetShape::Diamond,
        TargetShape::Hexagon,
    ];
}

/// A live target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub shape: TargetShape,
    /// Position in the normalized play field
    pub pos: Vec2,
    pub spawned_at: f64,
    pub lifetime: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReflexTimer {
    Spawn,
    Expire { target_id: u32 },
}

/// Reflex round state
#[derive(Debug, Clone, Default)]
pub struct ReflexRound {
    /// Targets resolved so far, hit or missed
    pub rounds_completed: u32,
    pub missed: u32,
    targets: Vec<Target>,
    next_id: u32,
}

impl ReflexRound {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn lives_remaining(&self) -> u32 {
        REFLEX_MAX_MISSES.saturating_sub(self.missed)
    }

    /// Lifetime of the next target; shrinks each round down to a floor
    pub fn display_time(&self, difficulty: Difficulty) -> f64 {
        (difficulty.reflex_base_time() - REFLEX_SPEEDUP_PER_ROUND * self.rounds_completed as f64)
            .max(REFLEX_MIN_DISPLAY_TIME)
    }

    pub fn is_won(&self) -> bool {
        self.rounds_completed >= REFLEX_TOTAL_ROUNDS && self.missed < REFLEX_MAX_MISSES
    }

    pub(crate) fn begin(&mut self, ctx: &mut RoundCtx) {
        self.spawn_next(ctx);
    }

    pub(crate) fn on_timer(&mut self, timer: ReflexTimer, ctx: &mut RoundCtx) {
        match timer {
            ReflexTimer::Spawn => self.spawn_next(ctx),
            ReflexTimer::Expire { target_id } => self.expire(target_id, ctx),
        }
    }

    pub(crate) fn on_input(&mut self, input: RoundInput, ctx: &mut RoundCtx) {
        let RoundInput::Target(id) = input else {
            return;
        };
        let Some(idx) = self.targets.iter().position(|t| t.id == id) else {
            return;
        };
        self.targets.remove(idx);
        ctx.emit(RoundEvent::TargetHit { id });
        ctx.award(REFLEX_BASE_POINTS + ctx.difficulty.scaled_points(REFLEX_BASE_POINTS));
        self.rounds_completed += 1;

        if self.rounds_completed >= REFLEX_TOTAL_ROUNDS {
            ctx.resolve(self.is_won(), 0.0);
        } else {
            let delay = ctx.difficulty.reflex_spawn_interval() * 0.5;
            ctx.schedule(delay, RoundTimer::Reflex(ReflexTimer::Spawn));
        }
    }

    fn spawn_next(&mut self, ctx: &mut RoundCtx) {
        if self.rounds_completed >= REFLEX_TOTAL_ROUNDS {
            ctx.resolve(self.is_won(), 0.0);
            return;
        }

        let id = self.next_id;
        self.next_id += 1;
        let shape = TargetShape::ALL[ctx.rng.random_range(0..TargetShape::ALL.len())];
        let pos = Vec2::new(
            ctx.rng.random_range(FIELD_PADDING..=1.0 - FIELD_PADDING),
            ctx.rng.random_range(FIELD_PADDING..=1.0 - FIELD_PADDING),
        );
        let lifetime = self.display_time(ctx.difficulty);

        self.targets.push(Target {
            id,
            shape,
            pos,
            spawned_at: ctx.now(),
            lifetime,
        });
        ctx.emit(RoundEvent::TargetSpawned { id, shape, pos });
        ctx.schedule(
            lifetime,
            RoundTimer::Reflex(ReflexTimer::Expire { target_id: id }),
        );
    }

    fn expire(&mut self, target_id: u32, ctx: &mut RoundCtx) {
        // Already tapped
        let Some(idx) = self.targets.iter().position(|t| t.id == target_id) else {
            return;
        };
        self.targets.remove(idx);
        self.missed += 1;
        ctx.emit(RoundEvent::TargetMissed { id: target_id });

        if self.missed >= REFLEX_MAX_MISSES {
            ctx.resolve(false, 0.0);
        } else {
            self.rounds_completed += 1;
            ctx.schedule(
                REFLEX_MISS_RESPAWN_DELAY,
                RoundTimer::Reflex(ReflexTimer::Spawn),
            );
        }
    }
}
