//! Party encounter engine: action collection, auto-battle resolution,
//! contribution math, outcome classification and reward distribution.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod auto;
pub mod checks;
pub mod combat;
pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod loot;
pub mod monster;
pub mod outcome;
pub mod participant;
pub mod registry;
pub mod rewards;

pub use checks::{luck_check, LuckRoll, RollOutcome};
pub use config::EngineConfig;
pub use error::{ActionError, SetupError};
pub use monster::{DamageCategory, Difficulty, Monster, MonsterTier, ResistanceTable};
pub use outcome::{classify, Classification, EncounterOutcome};
pub use participant::{Action, FightPreference, HeroClass, Participant, ParticipantId, Pet, Stats};

/// Milliseconds on the encounter clock.
pub type Timestamp = u64;

/// Source of every random draw the engine makes.
pub trait Roller {
    /// Inclusive integer roll in `lo..=hi`.
    fn roll_range(&mut self, lo: i32, hi: i32) -> i32;

    /// Uniform float in `lo..hi`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// Percentile check: true with probability `chance` (0..=1).
    fn chance(&mut self, chance: f64) -> bool {
        let pct = (chance.clamp(0.0, 1.0) * 100.0).round() as i32;
        self.roll_range(1, 100) <= pct
    }
}

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<i32>, next: usize },
    Steady,
}

/// Seeded, scripted or steady dice. Steady dice always land on the midpoint,
/// which makes a replay fully deterministic without a seed.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    /// Replays `values` in order (wrapping), clamped into the requested range.
    pub fn from_scripted(values: Vec<i32>) -> Self {
        if values.is_empty() {
            return Self::steady();
        }
        Self { source: Source::Scripted { values, next: 0 } }
    }

    pub fn steady() -> Self {
        Self { source: Source::Steady }
    }
}

impl Roller for Dice {
    fn roll_range(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(lo..=hi),
            Source::Scripted { values, next } => {
                let v = values[*next % values.len()];
                *next += 1;
                v.clamp(lo, hi)
            }
            Source::Steady => (lo + hi).div_euclid(2),
        }
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        match &mut self.source {
            Source::Seeded(rng) if hi > lo => rng.gen_range(lo..hi),
            _ => (lo + hi) / 2.0,
        }
    }
}

/// Installs the `fmt` subscriber on stderr, filtered by `RUST_LOG`
/// (default `warn`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
