//! Shared round lifecycle
//!
//! Countdown → Active → Resolving(won) → Terminal, driven by the round's own
//! `Scheduler`. Kind rules plug in through `RoundCtx` and only ever run while
//! the round is Active.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::balance::{BalanceRound, BalanceTimer};
use super::pattern::{PatternCue, PatternRound, PatternTimer};
use super::reflex::{ReflexRound, ReflexTimer, TargetShape};
use crate::clock::Scheduler;
use crate::consts::*;
use crate::game::{Difficulty, GameKind, Level};

/// Lifecycle phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Constructed, `start()` not called yet
    Idle,
    /// Get-ready ticks before play
    Countdown { ticks_remaining: u8 },
    /// Accepting input
    Active,
    /// Result decided, waiting out the kind's resolution delay
    Resolving { won: bool },
    /// Final; the outcome never changes
    Terminal { won: bool },
    /// Dismissed mid-play; no outcome
    Cancelled,
}

impl RoundPhase {
    /// True once nothing else can happen to the round
    pub fn is_finished(&self) -> bool {
        matches!(self, RoundPhase::Terminal { .. } | RoundPhase::Cancelled)
    }
}

/// The single player input type, routed to the kind's handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundInput {
    /// Reflex: a target was tapped
    Target(u32),
    /// Balance: drop the moving tile where it is now
    Place,
    /// Pattern: a grid cell (row-major, 0..9) was tapped
    Cell(u8),
}

/// Final result handed to the progress engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub won: bool,
    pub score: u32,
}

/// Change notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    CountdownTick(u8),
    Activated,
    ScoreChanged { score: u32, delta: u32 },
    TargetSpawned { id: u32, shape: TargetShape, pos: Vec2 },
    TargetHit { id: u32 },
    TargetMissed { id: u32 },
    TileSpawned { width: f32 },
    TilePlaced { x: f32, width: f32, height: u32 },
    TileMissed { failures: u32 },
    PatternStarted { round: u32, length: usize },
    CellShown(u8),
    CellHidden,
    CueChanged(Option<PatternCue>),
    Resolving { won: bool },
    Finished(RoundOutcome),
    Cancelled,
}

/// Every timer a round can schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RoundTimer {
    CountdownTick,
    Settle,
    Reflex(ReflexTimer),
    Balance(BalanceTimer),
    Pattern(PatternTimer),
}

/// Round state shared with the kind rules
#[derive(Debug)]
pub(crate) struct RoundCtx {
    pub difficulty: Difficulty,
    pub score: u32,
    pub timers: Scheduler<RoundTimer>,
    pub rng: Pcg32,
    pub events: Vec<RoundEvent>,
    resolution: Option<(bool, f64)>,
}

impl RoundCtx {
    fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            score: 0,
            timers: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            resolution: None,
        }
    }

    /// Current virtual time (seconds)
    pub fn now(&self) -> f64 {
        self.timers.elapsed()
    }

    pub fn award(&mut self, points: u32) {
        self.score += points;
        self.events.push(RoundEvent::ScoreChanged {
            score: self.score,
            delta: points,
        });
    }

    pub fn schedule(&mut self, delay: f64, timer: RoundTimer) {
        self.timers.schedule_after(delay, timer);
    }

    pub fn emit(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Decide the round. The engine applies it once the current handler returns;
    /// a zero delay skips Resolving.
    pub fn resolve(&mut self, won: bool, delay: f64) {
        if self.resolution.is_none() {
            self.resolution = Some((won, delay));
        }
    }
}

#[derive(Debug)]
enum KindRules {
    Reflex(ReflexRound),
    Balance(BalanceRound),
    Pattern(PatternRound),
}

/// One attempt at one level.
///
/// Not reentrant: every transition happens inside `start`, `advance`,
/// `input` or `cancel`, each of which takes `&mut self`.
#[derive(Debug)]
pub struct RoundEngine {
    level: Level,
    phase: RoundPhase,
    ctx: RoundCtx,
    rules: KindRules,
}

impl RoundEngine {
    /// Build a round for `level`; the seed drives every random choice
    pub fn new(level: &Level, seed: u64) -> Self {
        let rules = match level.game_kind {
            GameKind::Reflex => KindRules::Reflex(ReflexRound::new()),
            GameKind::Balance => KindRules::Balance(BalanceRound::new()),
            GameKind::Pattern => KindRules::Pattern(PatternRound::new()),
        };
        Self {
            level: level.clone(),
            phase: RoundPhase::Idle,
            ctx: RoundCtx::new(level.difficulty, seed),
            rules,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.level.game_kind
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.ctx.score
    }

    /// Seconds of round time elapsed since construction
    pub fn elapsed(&self) -> f64 {
        self.ctx.now()
    }

    /// Ticks left in the countdown, if counting down
    pub fn countdown(&self) -> Option<u8> {
        match self.phase {
            RoundPhase::Countdown { ticks_remaining } => Some(ticks_remaining),
            _ => None,
        }
    }

    /// Misses/failures/mistakes the player can still afford
    pub fn lives_remaining(&self) -> u32 {
        match &self.rules {
            KindRules::Reflex(r) => r.lives_remaining(),
            KindRules::Balance(b) => b.lives_remaining(),
            KindRules::Pattern(p) => p.lives_remaining(),
        }
    }

    /// `Some` once the round is Terminal
    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.phase {
            RoundPhase::Terminal { won } => Some(RoundOutcome {
                won,
                score: self.ctx.score,
            }),
            _ => None,
        }
    }

    pub fn reflex(&self) -> Option<&ReflexRound> {
        match &self.rules {
            KindRules::Reflex(r) => Some(r),
            _ => None,
        }
    }

    pub fn balance(&self) -> Option<&BalanceRound> {
        match &self.rules {
            KindRules::Balance(b) => Some(b),
            _ => None,
        }
    }

    pub fn pattern(&self) -> Option<&PatternRound> {
        match &self.rules {
            KindRules::Pattern(p) => Some(p),
            _ => None,
        }
    }

    /// Live horizontal offset of the balance tile, if one is moving
    pub fn tile_offset(&self) -> Option<f32> {
        self.balance()
            .and_then(|b| b.moving_tile())
            .map(|t| t.offset_at(self.ctx.now()))
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.ctx.events)
    }

    /// Enter the countdown. No-op unless Idle.
    pub fn start(&mut self) {
        if self.phase != RoundPhase::Idle {
            return;
        }
        self.phase = RoundPhase::Countdown {
            ticks_remaining: COUNTDOWN_TICKS,
        };
        self.ctx.emit(RoundEvent::CountdownTick(COUNTDOWN_TICKS));
        self.ctx.schedule(COUNTDOWN_TICK_SECS, RoundTimer::CountdownTick);
    }

    /// Move round time forward by `dt` seconds, firing every timer that falls due
    pub fn advance(&mut self, dt: f64) {
        if matches!(self.phase, RoundPhase::Idle) || self.phase.is_finished() {
            return;
        }
        let until = self.ctx.now() + dt.max(0.0);
        while let Some(timer) = self.ctx.timers.pop_due(until) {
            self.fire(timer);
            if self.phase.is_finished() {
                break;
            }
        }
        self.ctx.timers.settle(until);
    }

    /// Route a player tap to the kind's handler. Ignored unless Active.
    pub fn input(&mut self, input: RoundInput) {
        if self.phase != RoundPhase::Active {
            return;
        }
        match &mut self.rules {
            KindRules::Reflex(r) => r.on_input(input, &mut self.ctx),
            KindRules::Balance(b) => b.on_input(input, &mut self.ctx),
            KindRules::Pattern(p) => p.on_input(input, &mut self.ctx),
        }
        self.apply_resolution();
    }

    /// Dismiss the round: pending timers are dropped and later calls do nothing
    pub fn cancel(&mut self) {
        if self.phase.is_finished() {
            return;
        }
        self.ctx.timers.clear();
        self.phase = RoundPhase::Cancelled;
        self.ctx.emit(RoundEvent::Cancelled);
        log::debug!("{:?} round cancelled", self.level.game_kind);
    }

    fn fire(&mut self, timer: RoundTimer) {
        match (timer, self.phase) {
            (RoundTimer::CountdownTick, RoundPhase::Countdown { ticks_remaining }) => {
                if ticks_remaining > 1 {
                    let left = ticks_remaining - 1;
                    self.phase = RoundPhase::Countdown {
                        ticks_remaining: left,
                    };
                    self.ctx.emit(RoundEvent::CountdownTick(left));
                    self.ctx.schedule(COUNTDOWN_TICK_SECS, RoundTimer::CountdownTick);
                } else {
                    self.phase = RoundPhase::Active;
                    self.ctx.emit(RoundEvent::Activated);
                    match &mut self.rules {
                        KindRules::Reflex(r) => r.begin(&mut self.ctx),
                        KindRules::Balance(b) => b.begin(&mut self.ctx),
                        KindRules::Pattern(p) => p.begin(&mut self.ctx),
                    }
                }
            }
            (RoundTimer::Settle, RoundPhase::Resolving { won }) => self.finish(won),
            (RoundTimer::Reflex(t), RoundPhase::Active) => {
                if let KindRules::Reflex(r) = &mut self.rules {
                    r.on_timer(t, &mut self.ctx);
                }
            }
            (RoundTimer::Balance(t), RoundPhase::Active) => {
                if let KindRules::Balance(b) = &mut self.rules {
                    b.on_timer(t, &mut self.ctx);
                }
            }
            (RoundTimer::Pattern(t), RoundPhase::Active) => {
                if let KindRules::Pattern(p) = &mut self.rules {
                    p.on_timer(t, &mut self.ctx);
                }
            }
            // Stale: the phase moved on since this timer was scheduled
            _ => {}
        }
        self.apply_resolution();
    }

    fn apply_resolution(&mut self) {
        let Some((won, delay)) = self.ctx.resolution.take() else {
            return;
        };
        if self.phase != RoundPhase::Active {
            return;
        }
        self.ctx.timers.clear();
        if delay <= 0.0 {
            self.finish(won);
        } else {
            self.phase = RoundPhase::Resolving { won };
            self.ctx.emit(RoundEvent::Resolving { won });
            self.ctx.schedule(delay, RoundTimer::Settle);
        }
    }

    fn finish(&mut self, won: bool) {
        self.ctx.timers.clear();
        self.phase = RoundPhase::Terminal { won };
        let outcome = RoundOutcome {
            won,
            score: self.ctx.score,
        };
        self.ctx.emit(RoundEvent::Finished(outcome));
        log::info!(
            "{:?} level {} ({}) {} with score {}",
            self.level.game_kind,
            self.level.id,
            self.level.difficulty.label(),
            if won { "won" } else { "lost" },
            outcome.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(kind: GameKind, difficulty: Difficulty) -> Level {
        Level::new(1, kind, difficulty)
    }

    #[test]
    fn test_countdown_then_active() {
        let mut round = RoundEngine::new(&level(GameKind::Reflex, Difficulty::Easy), 7);
        assert_eq!(round.phase(), RoundPhase::Idle);

        round.start();
        assert_eq!(round.countdown(), Some(3));
        round.advance(1.0);
        assert_eq!(round.countdown(), Some(2));
        round.advance(1.0);
        assert_eq!(round.countdown(), Some(1));
        round.advance(1.0);
        assert_eq!(round.phase(), RoundPhase::Active);

        let ticks: Vec<u8> = round
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                RoundEvent::CountdownTick(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![3, 2, 1]);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut round = RoundEngine::new(&level(GameKind::Pattern, Difficulty::Easy), 7);
        round.start();
        round.advance(1.0);
        round.start();
        assert_eq!(round.countdown(), Some(2));
    }

    #[test]
    fn test_input_ignored_during_countdown() {
        let mut round = RoundEngine::new(&level(GameKind::Balance, Difficulty::Easy), 7);
        round.start();
        round.input(RoundInput::Place);
        assert_eq!(round.score(), 0);
        assert_eq!(round.balance().map(|b| b.current_height), Some(0));
    }

    #[test]
    fn test_cancel_drops_pending_timers() {
        let mut round = RoundEngine::new(&level(GameKind::Reflex, Difficulty::Hard), 3);
        round.start();
        round.advance(3.0);
        assert_eq!(round.phase(), RoundPhase::Active);
        let target = round.reflex().map(|r| r.targets()[0].id);

        round.cancel();
        assert_eq!(round.phase(), RoundPhase::Cancelled);

        // Neither stale expiries nor late taps may touch the round
        round.advance(30.0);
        if let Some(id) = target {
            round.input(RoundInput::Target(id));
        }
        assert_eq!(round.score(), 0);
        assert_eq!(round.reflex().map(|r| r.missed), Some(0));
        assert_eq!(round.outcome(), None);
        assert_eq!(round.phase(), RoundPhase::Cancelled);
    }

    #[test]
    fn test_wrong_input_kind_is_ignored() {
        let mut round = RoundEngine::new(&level(GameKind::Reflex, Difficulty::Easy), 11);
        round.start();
        round.advance(3.0);
        round.input(RoundInput::Place);
        round.input(RoundInput::Cell(0));
        assert_eq!(round.score(), 0);
        assert_eq!(round.phase(), RoundPhase::Active);
    }

    #[test]
    fn test_same_seed_same_round() {
        let lvl = level(GameKind::Pattern, Difficulty::Normal);
        let mut a = RoundEngine::new(&lvl, 4242);
        let mut b = RoundEngine::new(&lvl, 4242);
        a.start();
        b.start();
        a.advance(3.0);
        b.advance(3.0);
        assert_eq!(
            a.pattern().map(|p| p.sequence().to_vec()),
            b.pattern().map(|p| p.sequence().to_vec())
        );
    }
}
