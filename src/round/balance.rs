//! Balance rules: drop a sliding tile onto the stack, keep it aligned

use serde::{Deserialize, Serialize};

use super::engine::{RoundCtx, RoundEvent, RoundInput, RoundTimer};
use crate::consts::*;
use crate::game::Difficulty;

/// A tile resting on the stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    /// Horizontal offset from the stack center
    pub x: f32,
    /// 0-based stack level
    pub level: u32,
    pub width: f32,
}

/// The tile currently sweeping back and forth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingTile {
    pub width: f32,
    pub spawned_at: f64,
    /// Seconds per edge-to-edge sweep
    pub sweep: f64,
}

impl MovingTile {
    /// Triangle wave over `-TILE_TRAVEL..=TILE_TRAVEL`, starting at the left edge
    pub fn offset_at(&self, now: f64) -> f32 {
        if self.sweep <= 0.0 {
            return -TILE_TRAVEL;
        }
        let s = (now - self.spawned_at).max(0.0) / self.sweep;
        let leg = s.floor();
        let frac = (s - leg) as f32;
        if (leg as u64).is_multiple_of(2) {
            -TILE_TRAVEL + 2.0 * TILE_TRAVEL * frac
        } else {
            TILE_TRAVEL - 2.0 * TILE_TRAVEL * frac
        }
    }
}

/// Result of an aligned drop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub width: f32,
    pub precision_bonus: u32,
}

/// Judge a drop at `x` against the tile below. `None` means misaligned.
///
/// The first tile always lands at full precision.
pub fn judge_drop(below_x: Option<f32>, x: f32, width: f32, tolerance: f32) -> Option<Landing> {
    let diff = below_x.map(|bx| (x - bx).abs()).unwrap_or(0.0);
    if diff > tolerance {
        return None;
    }
    let reduction = (diff - tolerance / 2.0).max(0.0);
    Some(Landing {
        width: (width - reduction).max(MIN_TILE_WIDTH),
        precision_bonus: (tolerance - diff).max(0.0).floor() as u32,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BalanceTimer {
    SpawnTile,
}

/// Balance round state
#[derive(Debug, Clone, Default)]
pub struct BalanceRound {
    pub current_height: u32,
    pub failed_placements: u32,
    tiles: Vec<PlacedTile>,
    moving: Option<MovingTile>,
}

impl BalanceRound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn moving_tile(&self) -> Option<&MovingTile> {
        self.moving.as_ref()
    }

    pub fn lives_remaining(&self) -> u32 {
        BALANCE_MAX_FAILURES.saturating_sub(self.failed_placements)
    }

    /// Sweep time for the next tile; the stack speeds it up down to a floor
    pub fn tile_speed(&self, difficulty: Difficulty) -> f64 {
        (difficulty.balance_base_speed() - BALANCE_SPEEDUP_PER_TILE * self.current_height as f64)
            .max(BALANCE_MIN_SPEED)
    }

    pub(crate) fn begin(&mut self, ctx: &mut RoundCtx) {
        self.spawn_tile(ctx);
    }

    pub(crate) fn on_timer(&mut self, timer: BalanceTimer, ctx: &mut RoundCtx) {
        match timer {
            BalanceTimer::SpawnTile => self.spawn_tile(ctx),
        }
    }

    pub(crate) fn on_input(&mut self, input: RoundInput, ctx: &mut RoundCtx) {
        if input != RoundInput::Place {
            return;
        }
        let Some(moving) = self.moving.take() else {
            return;
        };

        let x = moving.offset_at(ctx.now());
        let below = self.tiles.last().map(|t| t.x);
        let tolerance = ctx.difficulty.balance_tolerance();

        match judge_drop(below, x, moving.width, tolerance) {
            Some(landing) => {
                self.tiles.push(PlacedTile {
                    x,
                    level: self.current_height,
                    width: landing.width,
                });
                self.current_height += 1;
                ctx.emit(RoundEvent::TilePlaced {
                    x,
                    width: landing.width,
                    height: self.current_height,
                });
                ctx.award(
                    BALANCE_BASE_POINTS
                        + ctx.difficulty.scaled_points(BALANCE_DIFFICULTY_POINTS)
                        + landing.precision_bonus,
                );

                if self.current_height >= BALANCE_TARGET_HEIGHT {
                    ctx.resolve(true, 0.0);
                } else {
                    ctx.schedule(
                        BALANCE_SUCCESS_DELAY,
                        RoundTimer::Balance(BalanceTimer::SpawnTile),
                    );
                }
            }
            None => {
                self.failed_placements += 1;
                ctx.emit(RoundEvent::TileMissed {
                    failures: self.failed_placements,
                });

                if self.failed_placements >= BALANCE_MAX_FAILURES {
                    ctx.resolve(false, 0.0);
                } else {
                    ctx.schedule(
                        BALANCE_FAILURE_DELAY,
                        RoundTimer::Balance(BalanceTimer::SpawnTile),
                    );
                }
            }
        }
    }

    fn spawn_tile(&mut self, ctx: &mut RoundCtx) {
        let width = self.tiles.last().map(|t| t.width).unwrap_or(TILE_WIDTH);
        self.moving = Some(MovingTile {
            width,
            spawned_at: ctx.now(),
            sweep: self.tile_speed(ctx.difficulty),
        });
        ctx.emit(RoundEvent::TileSpawned { width });
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{GameKind, Level};
    use crate::round::{RoundEngine, RoundPhase};

    use super::*;

    fn active_round(difficulty: Difficulty) -> RoundEngine {
        let mut round = RoundEngine::new(&Level::new(4, GameKind::Balance, difficulty), 9);
        round.start();
        round.advance(COUNTDOWN_TICKS as f64 * COUNTDOWN_TICK_SECS);
        assert_eq!(round.phase(), RoundPhase::Active);
        round
    }

    #[test]
    fn test_offset_triangle_wave() {
        let tile = MovingTile {
            width: TILE_WIDTH,
            spawned_at: 10.0,
            sweep: 2.0,
        };
        assert_eq!(tile.offset_at(10.0), -TILE_TRAVEL);
        assert!(tile.offset_at(11.0).abs() < 1e-3);
        assert!((tile.offset_at(12.0) - TILE_TRAVEL).abs() < 1e-3);
        assert!((tile.offset_at(12.5) - TILE_TRAVEL / 2.0).abs() < 1e-3);
        assert!((tile.offset_at(14.0) + TILE_TRAVEL).abs() < 1e-3);
    }

    #[test]
    fn test_judge_drop() {
        // First tile: full precision, no narrowing
        let first = judge_drop(None, 42.0, TILE_WIDTH, 30.0).unwrap();
        assert_eq!(first.width, TILE_WIDTH);
        assert_eq!(first.precision_bonus, 30);

        // Inside half tolerance: no narrowing
        let close = judge_drop(Some(0.0), 10.0, 80.0, 30.0).unwrap();
        assert_eq!(close.width, 80.0);
        assert_eq!(close.precision_bonus, 20);

        // Past half tolerance: narrowed by the excess
        let loose = judge_drop(Some(0.0), -20.0, 80.0, 30.0).unwrap();
        assert_eq!(loose.width, 75.0);
        assert_eq!(loose.precision_bonus, 10);

        // Never narrower than the minimum
        let thin = judge_drop(Some(0.0), 29.0, 22.0, 30.0).unwrap();
        assert_eq!(thin.width, MIN_TILE_WIDTH);

        assert!(judge_drop(Some(0.0), 30.5, 80.0, 30.0).is_none());
    }

    #[test]
    fn test_tile_speed_floor() {
        let mut b = BalanceRound::new();
        assert!((b.tile_speed(Difficulty::Easy) - 2.5).abs() < 1e-9);
        b.current_height = 7;
        assert!((b.tile_speed(Difficulty::Hard) - 0.64).abs() < 1e-9);
        b.current_height = 8;
        assert!((b.tile_speed(Difficulty::Hard) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_second_tile_outside_tolerance_fails() {
        let mut round = active_round(Difficulty::Easy);

        // First tile always lands
        round.input(RoundInput::Place);
        assert_eq!(round.balance().map(|b| b.current_height), Some(1));
        assert_eq!(round.score(), 15 + 5 + 30);

        // Next tile spawns after the success delay, then travels half a sweep
        round.advance(BALANCE_SUCCESS_DELAY);
        let sweep = round.balance().and_then(|b| b.moving_tile()).map(|t| t.sweep).unwrap();
        round.advance(sweep / 2.0);
        assert!(round.tile_offset().unwrap().abs() < 1.0);

        round.input(RoundInput::Place);
        let b = round.balance().unwrap();
        assert_eq!(b.failed_placements, 1);
        assert_eq!(b.current_height, 1);
        assert_eq!(round.lives_remaining(), 2);
        assert_eq!(round.score(), 50);
        assert_eq!(round.phase(), RoundPhase::Active);
    }

    #[test]
    fn test_place_without_moving_tile_ignored() {
        let mut round = active_round(Difficulty::Normal);
        round.input(RoundInput::Place);
        let score = round.score();
        // Still inside the respawn delay
        round.input(RoundInput::Place);
        assert_eq!(round.score(), score);
        assert_eq!(round.balance().map(|b| b.current_height), Some(1));
    }

    #[test]
    fn test_aligned_stack_wins() {
        let mut round = active_round(Difficulty::Hard);
        for _ in 0..BALANCE_TARGET_HEIGHT {
            // Drop each tile at its spawn point, right on top of the last one
            round.input(RoundInput::Place);
            round.advance(BALANCE_SUCCESS_DELAY);
        }
        assert_eq!(round.phase(), RoundPhase::Terminal { won: true });
        let b = round.balance().unwrap();
        assert_eq!(b.current_height, BALANCE_TARGET_HEIGHT);
        assert!(b.tiles().iter().all(|t| t.width == TILE_WIDTH));
        // 15 + 10 + 12 per tile on Hard
        assert_eq!(round.score(), BALANCE_TARGET_HEIGHT * 37);
    }

    #[test]
    fn test_three_failures_lose() {
        let mut round = active_round(Difficulty::Normal);
        round.input(RoundInput::Place);
        for _ in 0..BALANCE_MAX_FAILURES {
            let wait = if round.balance().unwrap().failed_placements == 0 {
                BALANCE_SUCCESS_DELAY
            } else {
                BALANCE_FAILURE_DELAY
            };
            round.advance(wait);
            let sweep = round.balance().and_then(|b| b.moving_tile()).map(|t| t.sweep).unwrap();
            round.advance(sweep);
            round.input(RoundInput::Place);
        }
        assert_eq!(round.phase(), RoundPhase::Terminal { won: false });
        assert_eq!(round.outcome().map(|o| o.won), Some(false));
    }
}
