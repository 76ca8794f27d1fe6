//! XP, currency and loot per participant once an encounter is classified.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::loot::{LootTable, Treasure};
use crate::monster::Difficulty;
use crate::outcome::{Classification, EncounterOutcome};
use crate::participant::{Action, Participant, ParticipantId};
use crate::Roller;

/// Extra share of the pool per participant in the reward tally.
pub const PARTY_SHARE: f64 = 0.25;
pub const HARD_MODE_XP_BONUS: f64 = 1.0;
/// Percent chance (exclusive) for a pet bonus to proc.
pub const PET_PROC: i32 = 45;

/// Where a currency delta is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    Bank,
    Adventure,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardSettings {
    pub day_bonus: f64,
    pub currency: CurrencyKind,
    pub rebirth_cost_pct: f64,
}

impl RewardSettings {
    /// `weekday` is ISO (1 = Monday).
    pub fn from_config(config: &EngineConfig, weekday: u8) -> Self {
        Self {
            day_bonus: config.day_bonus(weekday),
            currency: if config.separate_currency {
                CurrencyKind::Adventure
            } else {
                CurrencyKind::Bank
            },
            rebirth_cost_pct: config.rebirth_cost_pct,
        }
    }
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self { day_bonus: 0.0, currency: CurrencyKind::Bank, rebirth_cost_pct: 100.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    pub before: u32,
    pub after: u32,
    pub max_level: u32,
    pub rebirth_available: bool,
    /// Quoted only when a rebirth is available.
    pub rebirth_cost: Option<i64>,
}

impl LevelReport {
    pub fn leveled_up(&self) -> bool {
        self.after > self.before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardEntry {
    pub participant: ParticipantId,
    pub name: String,
    pub xp: u64,
    /// Negative for defeat repair costs.
    pub currency: i64,
    pub kind: CurrencyKind,
    pub loot: Treasure,
    pub auto: bool,
    pub pet_bonus: bool,
    pub level: LevelReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewardLedger {
    pub entries: IndexMap<ParticipantId, RewardEntry>,
}

impl RewardLedger {
    pub fn get(&self, id: ParticipantId) -> Option<&RewardEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewardEntry> {
        self.entries.values()
    }

    pub fn total_xp(&self) -> u64 {
        self.iter().map(|e| e.xp).sum()
    }

    pub fn total_currency(&self) -> i64 {
        self.iter().map(|e| e.currency).sum()
    }
}

/// Did this action feed an axis the party won?
pub fn feeds_won_axis(action: Action, classification: Classification) -> bool {
    match action {
        Action::Pray => classification.is_win(),
        Action::Attack | Action::Magic => classification.combat_won(),
        Action::Talk => classification.talk_won(),
    }
}

/// Base XP and currency for one participant before multipliers.
pub fn base_rewards(p: &Participant, amount: f64) -> (u64, u64) {
    let a = amount.round().max(1.0);
    let stats = p.stats.total() as f64;
    let xp = a + a * 0.5 * p.rebirths as f64 + (a * 0.1 * (stats / 50.0).min(250.0)).max(0.0);
    let cp = a + (a * 0.1 * (stats / 35.0).min(1000.0)).max(0.0);
    (
        (0.75 * xp.trunc()).round_ties_even() as u64,
        (0.75 * cp.trunc()).round_ties_even() as u64,
    )
}

fn pet_procs(p: &Participant, roller: &mut impl Roller) -> Option<f64> {
    let pet = p.pet.as_ref()?;
    let roll = if pet.always { 1 } else { roller.roll_range(1, 100) };
    (roll < PET_PROC).then(|| pet.bonus_fraction())
}

/// Repair bill for a lost encounter; never more than the balance.
pub fn repair_cost(p: &Participant, roller: &mut impl Roller) -> (i64, i64) {
    if p.balance <= 0 {
        return (0, 0);
    }
    let mut share = if p.rebirths >= 10 { 1.0 / 3.0 } else { 0.01 };
    let dex = p.stats.dex;
    let dex_factor = if dex < 0 {
        (1.0 / dex.unsigned_abs() as f64).min(1.0)
    } else {
        ((dex / 10) as f64).max(1.0)
    };
    share /= dex_factor;
    let loss = (p.balance as f64 * share).round_ties_even() as i64;
    let pet_loss = pet_procs(p, roller)
        .map_or(0, |frac| (loss as f64 * frac / 2.0).round_ties_even() as i64);
    let total = (loss + pet_loss).min(p.balance);
    (total, pet_loss)
}

fn level_report(p: &Participant, xp: u64, settings: &RewardSettings) -> LevelReport {
    let after = p.level_for(p.exp.saturating_add(xp));
    let max_level = p.max_level();
    let rebirth_available = after >= max_level;
    LevelReport {
        before: p.level_for(p.exp),
        after,
        max_level,
        rebirth_available,
        rebirth_cost: rebirth_available
            .then(|| (p.balance.max(0) as f64 * settings.rebirth_cost_pct / 100.0).round() as i64),
    }
}

/// Pay out a classified encounter. Calls `grant_loot` once per rewarded
/// participant; a lost encounter bills repairs instead.
pub fn distribute(
    outcome: &EncounterOutcome,
    party: &[&Participant],
    settings: &RewardSettings,
    roller: &mut impl Roller,
    loot: &mut impl LootTable,
) -> RewardLedger {
    let mut ledger = RewardLedger::default();
    let profile = |id: ParticipantId| party.iter().copied().find(|p| p.id == id);

    if outcome.classification == Classification::Lost {
        for c in &outcome.ledger {
            let Some(p) = profile(c.participant) else { continue };
            if ledger.entries.contains_key(&p.id) {
                continue;
            }
            let (total, pet_loss) = repair_cost(p, roller);
            tracing::debug!(participant = p.id, total, pet_loss, "repair cost");
            ledger.entries.insert(
                p.id,
                RewardEntry {
                    participant: p.id,
                    name: p.name.clone(),
                    xp: 0,
                    currency: -total,
                    kind: settings.currency,
                    loot: Treasure::default(),
                    auto: c.auto,
                    pet_bonus: pet_loss > 0,
                    level: level_report(p, 0, settings),
                },
            );
        }
        return ledger;
    }

    let mut rewarded: IndexMap<ParticipantId, (&Participant, bool)> = IndexMap::new();
    for c in outcome.ledger.iter().filter(|c| !c.fumbled()) {
        if !feeds_won_axis(c.action, outcome.classification) {
            continue;
        }
        if let Some(p) = profile(c.participant) {
            rewarded.entry(p.id).or_insert((p, c.auto));
        }
    }

    let base = outcome.won_amount();
    let people = outcome.reward_tally.total();
    let amount = base + base * PARTY_SHARE * people as f64;
    let hard = if outcome.mode == Difficulty::Hard { HARD_MODE_XP_BONUS } else { 0.0 };
    let xp_mult = 1.0 + settings.day_bonus + hard;
    let cp_mult = 1.0 + settings.day_bonus;

    for (id, (p, auto)) in rewarded {
        let (base_xp, base_cp) = base_rewards(p, amount);
        let mut xp = (base_xp as f64 * xp_mult) as u64;
        let mut cp = (base_cp as f64 * cp_mult) as u64;
        if auto {
            xp /= 2;
            cp /= 2;
        }
        let pet = pet_procs(p, roller);
        if let Some(frac) = pet {
            let mut pet_xp = (base_xp as f64 * frac) as u64;
            let mut pet_cp = (base_cp as f64 * frac) as u64;
            if auto {
                pet_xp /= 2;
                pet_cp /= 2;
            }
            xp += pet_xp;
            cp += pet_cp;
        }
        let chest = loot.grant_loot(p, outcome);
        tracing::debug!(participant = id, xp, cp, auto, chests = chest.total(), "reward");
        ledger.entries.insert(
            id,
            RewardEntry {
                participant: id,
                name: p.name.clone(),
                xp,
                currency: cp as i64,
                kind: settings.currency,
                loot: chest,
                auto,
                pet_bonus: pet.is_some(),
                level: level_report(p, xp, settings),
            },
        );
    }
    ledger
}
