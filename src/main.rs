//! Pathways entry point
//!
//! Native: headless autoplay over every pathway, saving progress to a file.
//! Web: loads saved progress from LocalStorage; the page drives rounds.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    use pathways::ProgressEngine;
    use pathways::persistence::LocalStorageStore;

    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }

    log::info!("Pathways starting...");
    let engine = ProgressEngine::load(LocalStorageStore::new());
    let snapshot = engine.snapshot();
    log::info!(
        "{} levels completed, {} pathways unlocked, {} badges earned",
        snapshot.total_levels_completed,
        snapshot.pathways_unlocked_count,
        snapshot.earned_badges_count()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pathways (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let path = std::env::temp_dir().join("pathways_progress.json");
    log::info!("Progress file: {}", path.display());

    let mut engine = pathways::ProgressEngine::load(pathways::persistence::FileStore::new(path));
    autoplay::run(&mut engine, seed);

    let s = engine.snapshot();
    println!(
        "Levels: {}  Streak: {} (best {})  Pathways: {}/{}  Badges: {}/{}",
        s.total_levels_completed,
        s.current_streak,
        s.best_streak,
        s.completed_pathways_count(),
        s.pathways.len(),
        s.earned_badges_count(),
        s.badges.len()
    );
    for m in &s.milestones {
        println!("  {:<24} {:>3.0}%", m.title, m.fraction() * 100.0);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use pathways::clock::WallClock;
    use pathways::persistence::BlobStore;
    use pathways::progress::ProgressEvent;
    use pathways::{GameKind, Level, ProgressEngine, RoundEngine, RoundInput, RoundOutcome};

    /// Simulated frame step (seconds)
    const FRAME_DT: f64 = 1.0 / 60.0;
    /// Give up on a round after this much round time
    const MAX_ROUND_SECS: f64 = 600.0;
    /// How long the player takes to react to a new target
    const REACTION_SECS: f64 = 0.2;

    /// Play every unlocked level once, in pathway order, until nothing new unlocks
    pub fn run<S: BlobStore, C: WallClock>(engine: &mut ProgressEngine<S, C>, seed: u64) {
        let mut round_seed = seed;
        for kind in GameKind::ALL {
            let unlocked = engine.snapshot().pathway(kind).is_some_and(|p| p.is_unlocked);
            if !unlocked {
                log::info!("{} is locked, stopping", kind.pathway_name());
                break;
            }
            let levels: Vec<Level> = engine
                .snapshot()
                .pathway(kind)
                .map(|p| p.levels.clone())
                .unwrap_or_default();
            for level in levels.iter().filter(|l| !l.is_completed) {
                round_seed = round_seed.wrapping_add(1);
                let Some(outcome) = play_round(level, round_seed) else {
                    log::warn!("{kind:?} level {} did not finish", level.id);
                    continue;
                };
                println!(
                    "{:<16} level {} ({:<6}) {} with {}",
                    kind.title(),
                    level.id,
                    level.difficulty.label(),
                    if outcome.won { "won " } else { "lost" },
                    outcome.score
                );
                engine.record_outcome(kind, level.id, &outcome);
                for event in engine.drain_events() {
                    report(&event);
                }
            }
        }
    }

    fn report(event: &ProgressEvent) {
        match event {
            ProgressEvent::PathwayUnlocked(kind) => {
                println!("  >> {} unlocked", kind.pathway_name())
            }
            ProgressEvent::BadgeEarned(badge) => println!("  >> Badge: {}", badge.title()),
            ProgressEvent::MilestoneReached(id) => println!("  >> Milestone: {}", id.title()),
            _ => {}
        }
    }

    /// Drive one round frame by frame with a well-timed player
    fn play_round(level: &Level, seed: u64) -> Option<RoundOutcome> {
        let mut round = RoundEngine::new(level, seed);
        round.start();
        while round.outcome().is_none() && round.elapsed() < MAX_ROUND_SECS {
            round.advance(FRAME_DT);
            if let Some(input) = next_input(&round) {
                round.input(input);
            }
            round.drain_events();
        }
        round.outcome()
    }

    fn next_input(round: &RoundEngine) -> Option<RoundInput> {
        if let Some(reflex) = round.reflex() {
            let now = round.elapsed();
            return reflex
                .targets()
                .iter()
                .find(|t| now - t.spawned_at >= REACTION_SECS)
                .map(|t| RoundInput::Target(t.id));
        }
        if let Some(balance) = round.balance() {
            let offset = round.tile_offset()?;
            let Some(below) = balance.tiles().last() else {
                return Some(RoundInput::Place);
            };
            let tolerance = round.level().difficulty.balance_tolerance();
            return ((offset - below.x).abs() <= tolerance / 2.0).then_some(RoundInput::Place);
        }
        let pattern = round.pattern()?;
        if !pattern.is_input_enabled() {
            return None;
        }
        pattern
            .sequence()
            .get(pattern.player_input().len())
            .map(|&cell| RoundInput::Cell(cell))
    }
}
