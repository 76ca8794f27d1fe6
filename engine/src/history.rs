//! Recent raids per guild, used to keep new monsters in reach of the party.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::monster::Monster;
use crate::outcome::EncounterOutcome;
use crate::Roller;

/// Solo raiders count for a quarter more so they can't farm their own average.
pub const SOLO_RAID_SCALE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainAction {
    Attack,
    Talk,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaidRecord {
    pub main_action: MainAction,
    pub amount: f64,
    pub party_size: usize,
    pub success: bool,
}

impl RaidRecord {
    /// The axis that dealt the most decides the main action.
    pub fn from_outcome(outcome: &EncounterOutcome, party_size: usize) -> Self {
        let (main_action, amount) = if outcome.talk_total > outcome.combat_total {
            (MainAction::Talk, outcome.talk_total)
        } else {
            (MainAction::Attack, outcome.combat_total)
        };
        Self { main_action, amount, party_size, success: outcome.classification.is_win() }
    }
}

/// Which threshold the recent raids mostly pushed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Combat,
    Talk,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatRange {
    pub kind: StatKind,
    pub min: f64,
    pub max: f64,
    pub win_percent: f64,
    pub average_attack: f64,
    pub average_talk: f64,
}

impl Default for StatRange {
    fn default() -> Self {
        Self {
            kind: StatKind::Combat,
            min: 200.0,
            max: 600.0,
            win_percent: 0.5,
            average_attack: 0.0,
            average_talk: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaidHistory {
    capacity: usize,
    raids: VecDeque<RaidRecord>,
}

impl RaidHistory {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), raids: VecDeque::new() }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.history_len)
    }

    pub fn record(&mut self, raid: RaidRecord) {
        if self.raids.len() == self.capacity {
            self.raids.pop_front();
        }
        self.raids.push_back(raid);
    }

    pub fn record_outcome(&mut self, outcome: &EncounterOutcome, party_size: usize) {
        self.record(RaidRecord::from_outcome(outcome, party_size));
    }

    pub fn len(&self) -> usize {
        self.raids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raids.is_empty()
    }

    pub fn raids(&self) -> impl Iterator<Item = &RaidRecord> {
        self.raids.iter()
    }

    pub fn stat_range(&self) -> StatRange {
        if self.raids.is_empty() {
            return StatRange::default();
        }
        let (mut n_attack, mut attack) = (0usize, 0.0);
        let (mut n_talk, mut talk) = (0usize, 0.0);
        let mut wins = 0usize;
        for raid in &self.raids {
            let solo = if raid.party_size == 1 { raid.amount * SOLO_RAID_SCALE } else { 0.0 };
            match raid.main_action {
                MainAction::Attack => {
                    n_attack += 1;
                    attack += raid.amount + solo;
                }
                MainAction::Talk => {
                    n_talk += 1;
                    talk += raid.amount + solo;
                }
            }
            if raid.success {
                wins += 1;
            }
        }
        let average_attack = if n_attack > 0 { attack / n_attack as f64 } else { 0.0 };
        let average_talk = if n_talk > 0 { talk / n_talk as f64 } else { 0.0 };
        let (kind, avg) = if attack < talk {
            (StatKind::Talk, average_talk)
        } else {
            (StatKind::Combat, average_attack)
        };
        let win_percent = wins as f64 / self.raids.len() as f64;
        let (min, max) = if win_percent < 0.5 {
            (avg * win_percent, avg * 1.5)
        } else {
            (avg * 0.5, avg * 2.0)
        };
        StatRange { kind, min, max, win_percent, average_attack, average_talk }
    }
}

fn fluctuate(value: f64, bottom: f64, roller: &mut impl Roller) -> f64 {
    roller.uniform(bottom, bottom + 0.4) * value
}

/// Rescale a monster around what recent parties managed. `strength` is the
/// roster multiplier (1.0, or up to 1.3 for a transcended spawn).
pub fn scale_monster(
    monster: &Monster,
    range: &StatRange,
    strength: f64,
    roller: &mut impl Roller,
) -> Monster {
    let w = range.win_percent;
    let pick = |avg: f64, base: f64| if avg == 0.0 { base } else { avg };
    let mut scaled = monster.clone();
    scaled.combat_threshold =
        fluctuate(pick(range.average_attack, monster.combat_threshold) * strength, w, roller);
    scaled.talk_threshold =
        fluctuate(pick(range.average_talk, monster.talk_threshold) * strength, w, roller);
    scaled.resistances.physical = fluctuate(monster.resistances.physical, w, roller);
    scaled.resistances.magic = fluctuate(monster.resistances.magic, w, roller);
    scaled.resistances.diplomacy = fluctuate(monster.resistances.diplomacy, w, roller);
    tracing::debug!(
        monster = %monster.name,
        combat = scaled.combat_threshold,
        talk = scaled.talk_threshold,
        "monster scaled"
    );
    scaled
}
