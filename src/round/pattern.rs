//! Pattern rules: watch a sequence on a 3×3 grid, then repeat it
//!
//! Each round plays back a fresh sequence one cell longer than the last.
//! A wrong tap costs a life and restarts the same round with a new sequence.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::engine::{RoundCtx, RoundEvent, RoundInput, RoundTimer};
use crate::consts::*;
use crate::game::Difficulty;

/// Prompt shown above the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternCue {
    Watch,
    YourTurn,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternTimer {
    BeginPlayback,
    HideCell,
    ShowNext,
    EnableInput,
    ClearFeedback { cell: u8 },
    NextRound,
    Restart,
}

/// Random sequence over the grid with no cell repeated back-to-back
pub(crate) fn generate_pattern<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut pattern: Vec<u8> = Vec::with_capacity(len);
    for _ in 0..len {
        let cell = match pattern.last() {
            None => rng.random_range(0..GRID_CELLS),
            // Draw from the other eight cells and skip over the previous one
            Some(&last) => {
                let c = rng.random_range(0..GRID_CELLS - 1);
                if c >= last { c + 1 } else { c }
            }
        };
        pattern.push(cell);
    }
    pattern
}

/// Pattern round state
#[derive(Debug, Clone)]
pub struct PatternRound {
    /// 1-based round, 1..=PATTERN_MAX_ROUNDS
    pub current_round: u32,
    pub mistakes: u32,
    pattern: Vec<u8>,
    player_input: Vec<u8>,
    show_index: usize,
    showing: bool,
    highlighted: Option<u8>,
    input_enabled: bool,
    cue: Option<PatternCue>,
}

impl Default for PatternRound {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRound {
    pub fn new() -> Self {
        Self {
            current_round: 1,
            mistakes: 0,
            pattern: Vec::new(),
            player_input: Vec::new(),
            show_index: 0,
            showing: false,
            highlighted: None,
            input_enabled: false,
            cue: None,
        }
    }

    pub fn pattern_length(&self, difficulty: Difficulty) -> usize {
        difficulty.pattern_base_length() + self.current_round as usize - 1
    }

    /// The sequence to repeat this round
    pub fn sequence(&self) -> &[u8] {
        &self.pattern
    }

    pub fn player_input(&self) -> &[u8] {
        &self.player_input
    }

    /// Lit cell, during playback or as tap feedback
    pub fn highlighted(&self) -> Option<u8> {
        self.highlighted
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn cue(&self) -> Option<PatternCue> {
        self.cue
    }

    pub fn lives_remaining(&self) -> u32 {
        PATTERN_MAX_MISTAKES.saturating_sub(self.mistakes)
    }

    pub(crate) fn begin(&mut self, ctx: &mut RoundCtx) {
        self.start_round(ctx);
    }

    pub(crate) fn on_timer(&mut self, timer: PatternTimer, ctx: &mut RoundCtx) {
        match timer {
            PatternTimer::BeginPlayback => {
                self.showing = true;
                self.show_index = 0;
                self.show_next(ctx);
            }
            PatternTimer::HideCell => {
                self.highlighted = None;
                ctx.emit(RoundEvent::CellHidden);
                let gap = ctx.difficulty.pattern_display_speed() * (1.0 - PATTERN_SHOW_SHARE);
                ctx.schedule(gap, RoundTimer::Pattern(PatternTimer::ShowNext));
            }
            PatternTimer::ShowNext => {
                self.show_index += 1;
                self.show_next(ctx);
            }
            PatternTimer::EnableInput => {
                self.input_enabled = true;
                self.set_cue(None, ctx);
            }
            PatternTimer::ClearFeedback { cell } => {
                if !self.showing && self.highlighted == Some(cell) {
                    self.highlighted = None;
                }
            }
            PatternTimer::NextRound => {
                self.current_round += 1;
                self.start_round(ctx);
            }
            PatternTimer::Restart => self.start_round(ctx),
        }
    }

    pub(crate) fn on_input(&mut self, input: RoundInput, ctx: &mut RoundCtx) {
        let RoundInput::Cell(cell) = input else {
            return;
        };
        if !self.input_enabled || cell >= GRID_CELLS {
            return;
        }

        self.player_input.push(cell);
        let idx = self.player_input.len() - 1;
        self.highlighted = Some(cell);

        if self.pattern.get(idx) == Some(&cell) {
            ctx.schedule(
                PATTERN_FEEDBACK_SECS,
                RoundTimer::Pattern(PatternTimer::ClearFeedback { cell }),
            );
            ctx.award(PATTERN_TAP_POINTS + ctx.difficulty.scaled_points(PATTERN_DIFFICULTY_POINTS));

            if self.player_input.len() == self.pattern.len() {
                self.input_enabled = false;
                ctx.award(PATTERN_BONUS_BASE + PATTERN_BONUS_PER_ROUND * self.current_round);
                self.set_cue(Some(PatternCue::Correct), ctx);

                if self.current_round >= PATTERN_MAX_ROUNDS {
                    ctx.resolve(true, PATTERN_ROUND_DELAY);
                } else {
                    ctx.schedule(
                        PATTERN_ROUND_DELAY,
                        RoundTimer::Pattern(PatternTimer::NextRound),
                    );
                }
            }
        } else {
            self.mistakes += 1;
            self.input_enabled = false;
            self.set_cue(Some(PatternCue::Wrong), ctx);

            if self.mistakes >= PATTERN_MAX_MISTAKES {
                ctx.resolve(false, PATTERN_LOSS_DELAY);
            } else {
                ctx.schedule(
                    PATTERN_WRONG_FEEDBACK_SECS,
                    RoundTimer::Pattern(PatternTimer::ClearFeedback { cell }),
                );
                ctx.schedule(
                    PATTERN_RESTART_DELAY,
                    RoundTimer::Pattern(PatternTimer::Restart),
                );
            }
        }
    }

    fn start_round(&mut self, ctx: &mut RoundCtx) {
        self.player_input.clear();
        self.input_enabled = false;
        self.showing = false;
        self.highlighted = None;
        self.pattern = generate_pattern(&mut ctx.rng, self.pattern_length(ctx.difficulty));

        ctx.emit(RoundEvent::PatternStarted {
            round: self.current_round,
            length: self.pattern.len(),
        });
        self.set_cue(Some(PatternCue::Watch), ctx);
        ctx.schedule(
            PATTERN_PLAYBACK_DELAY,
            RoundTimer::Pattern(PatternTimer::BeginPlayback),
        );
    }

    fn show_next(&mut self, ctx: &mut RoundCtx) {
        match self.pattern.get(self.show_index).copied() {
            Some(cell) => {
                self.highlighted = Some(cell);
                ctx.emit(RoundEvent::CellShown(cell));
                let shown = ctx.difficulty.pattern_display_speed() * PATTERN_SHOW_SHARE;
                ctx.schedule(shown, RoundTimer::Pattern(PatternTimer::HideCell));
            }
            None => {
                self.showing = false;
                self.highlighted = None;
                self.set_cue(Some(PatternCue::YourTurn), ctx);
                ctx.schedule(
                    PATTERN_INPUT_DELAY,
                    RoundTimer::Pattern(PatternTimer::EnableInput),
                );
            }
        }
    }

    fn set_cue(&mut self, cue: Option<PatternCue>, ctx: &mut RoundCtx) {
        if self.cue != cue {
            self.cue = cue;
            ctx.emit(RoundEvent::CueChanged(cue));
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use crate::game::{GameKind, Level};
    use crate::round::{RoundEngine, RoundEvent, RoundPhase};

    use super::*;

    fn active_round(difficulty: Difficulty, seed: u64) -> RoundEngine {
        let mut round = RoundEngine::new(&Level::new(7, GameKind::Pattern, difficulty), seed);
        round.start();
        round.advance(COUNTDOWN_TICKS as f64 * COUNTDOWN_TICK_SECS);
        assert_eq!(round.phase(), RoundPhase::Active);
        round
    }

    /// Step time until the grid accepts taps
    fn wait_for_input(round: &mut RoundEngine) {
        let mut guard = 0;
        while !round.pattern().map(|p| p.is_input_enabled()).unwrap_or(false) {
            round.advance(0.05);
            guard += 1;
            assert!(guard < 400, "input never enabled");
        }
    }

    fn play_back(round: &mut RoundEngine) {
        wait_for_input(round);
        let seq = round.pattern().unwrap().sequence().to_vec();
        for cell in seq {
            round.input(RoundInput::Cell(cell));
        }
    }

    fn wrong_tap(round: &mut RoundEngine) {
        wait_for_input(round);
        let expected = round.pattern().unwrap().sequence()[0];
        round.input(RoundInput::Cell((expected + 1) % GRID_CELLS));
    }

    proptest! {
        #[test]
        fn prop_no_adjacent_repeats(seed in any::<u64>(), len in 1usize..16) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let pattern = generate_pattern(&mut rng, len);
            prop_assert_eq!(pattern.len(), len);
            prop_assert!(pattern.iter().all(|&c| c < GRID_CELLS));
            prop_assert!(pattern.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn test_playback_shows_every_cell_in_order() {
        let mut round = active_round(Difficulty::Normal, 21);
        let seq = round.pattern().unwrap().sequence().to_vec();
        assert_eq!(seq.len(), 4);
        assert_eq!(round.pattern().unwrap().cue(), Some(PatternCue::Watch));

        wait_for_input(&mut round);
        let shown: Vec<u8> = round
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                RoundEvent::CellShown(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(shown, seq);
        assert_eq!(round.pattern().unwrap().highlighted(), None);
    }

    #[test]
    fn test_taps_ignored_during_playback() {
        let mut round = active_round(Difficulty::Easy, 22);
        round.advance(PATTERN_PLAYBACK_DELAY);
        assert!(round.pattern().unwrap().is_showing());
        let first = round.pattern().unwrap().sequence()[0];
        round.input(RoundInput::Cell(first));
        assert_eq!(round.score(), 0);
        assert!(round.pattern().unwrap().player_input().is_empty());
    }

    #[test]
    fn test_completed_sequence_scores_and_advances() {
        let mut round = active_round(Difficulty::Easy, 23);
        play_back(&mut round);
        // 3 taps × (5 + 3) + bonus (20 + 5·1)
        assert_eq!(round.score(), 3 * 8 + 25);
        assert_eq!(round.pattern().unwrap().cue(), Some(PatternCue::Correct));

        round.advance(PATTERN_ROUND_DELAY);
        let p = round.pattern().unwrap();
        assert_eq!(p.current_round, 2);
        assert_eq!(p.sequence().len(), 4);
    }

    #[test]
    fn test_wrong_tap_restarts_same_round() {
        let mut round = active_round(Difficulty::Hard, 24);
        play_back(&mut round);
        round.advance(PATTERN_ROUND_DELAY);
        assert_eq!(round.pattern().unwrap().current_round, 2);

        wrong_tap(&mut round);
        assert_eq!(round.pattern().unwrap().mistakes, 1);
        assert_eq!(round.lives_remaining(), 1);
        assert_eq!(round.pattern().unwrap().cue(), Some(PatternCue::Wrong));
        assert!(round.pattern().unwrap().highlighted().is_some());

        // The wrongly tapped cell goes dark before the restart
        round.advance(PATTERN_WRONG_FEEDBACK_SECS);
        assert_eq!(round.pattern().unwrap().highlighted(), None);
        assert_eq!(round.pattern().unwrap().current_round, 2);

        round.advance(PATTERN_RESTART_DELAY - PATTERN_WRONG_FEEDBACK_SECS);
        let p = round.pattern().unwrap();
        assert_eq!(p.current_round, 2);
        assert_eq!(p.sequence().len(), 6);
        assert!(p.player_input().is_empty());
        assert_eq!(round.phase(), RoundPhase::Active);
    }

    #[test]
    fn test_two_mistakes_lose_after_delay() {
        let mut round = active_round(Difficulty::Easy, 25);
        wrong_tap(&mut round);
        round.advance(PATTERN_RESTART_DELAY);
        wrong_tap(&mut round);
        assert_eq!(round.phase(), RoundPhase::Resolving { won: false });
        assert_eq!(round.outcome(), None);

        round.advance(PATTERN_LOSS_DELAY);
        assert_eq!(round.phase(), RoundPhase::Terminal { won: false });
    }

    #[test]
    fn test_five_rounds_win() {
        let mut round = active_round(Difficulty::Easy, 26);
        for r in 1..=PATTERN_MAX_ROUNDS {
            assert_eq!(round.pattern().unwrap().current_round, r);
            play_back(&mut round);
            if r < PATTERN_MAX_ROUNDS {
                round.advance(PATTERN_ROUND_DELAY);
            }
        }
        assert_eq!(round.phase(), RoundPhase::Resolving { won: true });
        round.advance(PATTERN_ROUND_DELAY);

        let outcome = round.outcome().unwrap();
        assert!(outcome.won);
        // Lengths 3..=7 at 8 points per tap, bonuses 25..=45
        assert_eq!(outcome.score, 25 * 8 + 175);
    }
}
