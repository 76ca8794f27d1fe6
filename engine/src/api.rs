use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::auto::{resolve_auto, write_back, AutoUpdate};
use crate::combat::resolve_contributions;
use crate::config::EngineConfig;
use crate::content::{parse_monster, BuiltinThemes};
use crate::error::{ActionError, SetupError};
use crate::history::{scale_monster, RaidHistory, RaidRecord};
use crate::loot::{ChestTable, LootTable};
use crate::monster::{insight_quality, Difficulty, Monster, MonsterView};
use crate::outcome::{evaluate, Classification, EncounterOutcome};
use crate::participant::{Action, HeroClass, Participant, ParticipantId};
use crate::registry::{ActionRecord, ActionRegistry, Tally, Window};
use crate::rewards::{distribute, RewardLedger, RewardSettings};
use crate::{Dice, Roller, Timestamp};

/// Leader rebirths at which hard mode is guaranteed; from `HARD_MODE_COIN` it
/// is a coin flip.
pub const HARD_MODE_ALWAYS: u32 = 30;
pub const HARD_MODE_COIN: u32 = 20;

/// Read access to participant profiles for the lifetime of an encounter.
pub trait ProfileStore {
    fn load(&self, id: ParticipantId) -> Result<&Participant, SetupError>;
}

/// Monster definitions by id.
pub trait ThemeLoader {
    fn monster(&self, id: &str) -> Result<Monster, SetupError>;
    fn names(&self) -> Vec<String>;
}

/// Profiles held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: IndexMap<ParticipantId, Participant>,
}

impl MemoryStore {
    pub fn new(profiles: impl IntoIterator<Item = Participant>) -> Self {
        Self { profiles: profiles.into_iter().map(|p| (p.id, p)).collect() }
    }

    pub fn ids(&self) -> Vec<ParticipantId> {
        self.profiles.keys().copied().collect()
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self, id: ParticipantId) -> Result<&Participant, SetupError> {
        self.profiles
            .get(&id)
            .ok_or_else(|| SetupError::ProfileUnavailable { id, reason: "no such profile".into() })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EncounterReport {
    pub monster: String,
    /// Everyone on the roster, including those who never acted.
    pub party_size: usize,
    pub outcome: EncounterOutcome,
    pub rewards: RewardLedger,
    pub auto_resolved: Vec<ParticipantId>,
    pub auto_updates: Vec<AutoUpdate>,
    pub log: Vec<String>,
}

impl EncounterReport {
    pub fn raid_record(&self) -> RaidRecord {
        RaidRecord::from_outcome(&self.outcome, self.party_size)
    }
}

/// Difficulty for a fresh encounter, decided by the party leader's rebirths.
pub fn pick_mode(
    config: &EngineConfig,
    leader: &Participant,
    roller: &mut impl Roller,
) -> Difficulty {
    if !config.hard_mode {
        return Difficulty::Normal;
    }
    let hard = if leader.rebirths >= HARD_MODE_ALWAYS {
        true
    } else if leader.rebirths >= HARD_MODE_COIN {
        roller.chance(0.5)
    } else {
        false
    };
    if hard { Difficulty::Hard } else { Difficulty::Normal }
}

/// One encounter: a monster, a roster borrowed from the profile store and a
/// single action window.
pub struct Encounter<'a> {
    monster: Monster,
    party: Vec<&'a Participant>,
    registry: ActionRegistry<'a>,
    insight: Mutex<Option<f64>>,
    settings: EngineConfig,
}

impl<'a> Encounter<'a> {
    /// Load every profile and the monster up front. Any collaborator failure
    /// aborts here, before a round exists.
    pub fn setup(
        store: &'a impl ProfileStore,
        themes: &impl ThemeLoader,
        ids: &[ParticipantId],
        monster_id: &str,
        config: &EngineConfig,
        opens_at: Timestamp,
        roller: &mut impl Roller,
    ) -> Result<Self, SetupError> {
        let mut party: Vec<&'a Participant> = Vec::with_capacity(ids.len());
        for &id in ids {
            if party.iter().any(|p| p.id == id) {
                continue;
            }
            party.push(store.load(id)?);
        }
        let Some(leader) = party.first().copied() else {
            return Err(SetupError::NoParticipants);
        };
        let mut monster = themes.monster(monster_id)?;
        monster.mode = pick_mode(config, leader, roller);
        tracing::info!(
            monster = %monster.name,
            mode = ?monster.mode,
            party = party.len(),
            "encounter set up"
        );
        let window = Window::starting_at(opens_at, config.window_ms);
        Ok(Self {
            registry: ActionRegistry::new(party.iter().copied(), window),
            party,
            monster,
            insight: Mutex::new(None),
            settings: config.clone(),
        })
    }

    /// Rescale the monster from recent raids before anyone acts.
    pub fn scaled(
        mut self,
        history: &RaidHistory,
        strength: f64,
        roller: &mut impl Roller,
    ) -> Self {
        let mode = self.monster.mode;
        self.monster = scale_monster(&self.monster, &history.stat_range(), strength, roller);
        self.monster.mode = mode;
        self
    }

    pub fn monster(&self) -> &Monster {
        &self.monster
    }

    pub fn party(&self) -> &[&'a Participant] {
        &self.party
    }

    pub fn window(&self) -> Window {
        self.registry.window()
    }

    pub fn submit_action(
        &self,
        id: ParticipantId,
        action: Action,
        at: Timestamp,
    ) -> Result<(), ActionError> {
        self.registry.submit_action(id, action, at)
    }

    pub fn tally(&self) -> Tally {
        self.registry.snapshot_tally()
    }

    pub fn action_log(&self) -> Vec<ActionRecord> {
        self.registry.log()
    }

    /// A primed psychic reads the monster. Returns the view this read
    /// unlocks, or `None` for anyone who can't.
    pub fn insight(
        &self,
        id: ParticipantId,
        roller: &mut impl Roller,
    ) -> Result<Option<MonsterView>, ActionError> {
        let p = self
            .party
            .iter()
            .find(|p| p.id == id)
            .ok_or(ActionError::UnknownParticipant(id))?;
        if !(p.is(HeroClass::Psychic) && p.skill_active) {
            return Ok(None);
        }
        let quality = insight_quality(p, roller);
        let mut best = self.insight.lock().unwrap_or_else(PoisonError::into_inner);
        *best = Some(best.map_or(quality, |b: f64| b.max(quality)));
        tracing::debug!(participant = id, quality, "insight");
        Ok(Some(self.monster.view(Some(quality))))
    }

    /// What the party currently sees of the monster.
    pub fn monster_view(&self) -> MonsterView {
        let best = *self.insight.lock().unwrap_or_else(PoisonError::into_inner);
        self.monster.view(best)
    }

    /// Drop the encounter before resolution. Nothing is paid or billed.
    pub fn abort(self) {
        tracing::info!(
            monster = %self.monster.name,
            submissions = self.registry.log().len(),
            "encounter aborted"
        );
    }

    /// Close the window and resolve the round. `weekday` is ISO (1 = Monday).
    pub fn close(
        self,
        weekday: u8,
        roller: &mut impl Roller,
        loot: &mut impl LootTable,
    ) -> EncounterReport {
        let mut round = self.registry.freeze();
        let auto_resolved = resolve_auto(&mut round);
        let auto_updates = write_back(&round);

        let mut log = Vec::new();
        for id in &auto_resolved {
            if let Some(e) = round.entries.get(id) {
                if let Some(action) = e.action.action() {
                    let name = &e.profile.name;
                    log.push(format!("[AUTO][{}] {:?} (streak {})", name, action, e.streak));
                }
            }
        }
        let ledger = resolve_contributions(&round, &self.monster, roller, |line| log.push(line));
        let outcome = evaluate(&self.monster, ledger, &self.party);
        if !outcome.requirement_met {
            log.push(format!(
                "[REQUIREMENT] {} could not be beaten by this party",
                self.monster.display_name()
            ));
        }
        log.push(format!(
            "[END] {:?} combat={:.1}/{} talk={:.1}/{}",
            outcome.classification,
            outcome.combat_total,
            outcome.combat_threshold,
            outcome.talk_total,
            outcome.talk_threshold
        ));

        let settings = RewardSettings::from_config(&self.settings, weekday);
        let rewards = distribute(&outcome, &self.party, &settings, roller, loot);

        EncounterReport {
            monster: self.monster.display_name(),
            party_size: self.party.len(),
            outcome,
            rewards,
            auto_resolved,
            auto_updates,
            log,
        }
    }
}

/* ---------------- scenario harness ---------------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioAction {
    pub participant: ParticipantId,
    pub action: Action,
    #[serde(default)]
    pub at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioConfig {
    #[serde(default)]
    pub monster_id: Option<String>,
    #[serde(default)]
    pub monster_path: Option<String>,
    pub party: Vec<Participant>,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
    /// Without a seed the dice land on their midpoint every time.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_weekday")]
    pub weekday: u8,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub chests: bool,
    /// Earlier raids, oldest first. Only the last `config.history_len` count.
    #[serde(default)]
    pub history: Vec<RaidRecord>,
}

fn default_weekday() -> u8 {
    1
}

struct FixedTheme(Monster);

impl ThemeLoader for FixedTheme {
    fn monster(&self, _: &str) -> Result<Monster, SetupError> {
        Ok(self.0.clone())
    }

    fn names(&self) -> Vec<String> {
        vec![self.0.name.clone()]
    }
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario: {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse scenario YAML: {}", path.display())),
        _ => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse scenario JSON: {}", path.display())),
    }
}

fn load_monster_file(path: &str) -> Result<Monster> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read monster JSON: {}", path))?;
    parse_monster(path, &text).with_context(|| format!("failed to parse monster JSON: {}", path))
}

fn dice_for(seed: Option<u64>) -> Dice {
    seed.map_or_else(Dice::steady, Dice::from_seed)
}

/// Run one encounter from a scenario. Rejected scripted submissions are logged
/// and the round proceeds without them.
pub fn simulate_encounter(cfg: &ScenarioConfig) -> Result<EncounterReport> {
    let themes = match (&cfg.monster_id, &cfg.monster_path) {
        (_, Some(path)) => FixedTheme(load_monster_file(path)?),
        (Some(id), None) => FixedTheme(BuiltinThemes.monster(id)?),
        (None, None) => bail!("scenario needs monster_id or monster_path"),
    };
    let store = MemoryStore::new(cfg.party.iter().cloned());
    let mut dice = dice_for(cfg.seed);
    let mut encounter =
        Encounter::setup(&store, &themes, &store.ids(), "", &cfg.config, 0, &mut dice)?;
    let mut history = RaidHistory::from_config(&cfg.config);
    for raid in &cfg.history {
        history.record(*raid);
    }
    if !history.is_empty() {
        encounter = encounter.scaled(&history, 1.0, &mut dice);
    }

    let mut rejected = Vec::new();
    for a in &cfg.actions {
        if let Err(e) = encounter.submit_action(a.participant, a.action, a.at) {
            rejected.push(format!("[REJECTED] {}", e));
        }
    }
    let mut report = if cfg.chests {
        let mut chests = ChestTable::new(dice_for(cfg.seed.map(|s| s ^ 0x5eed)));
        encounter.close(cfg.weekday, &mut dice, &mut chests)
    } else {
        encounter.close(cfg.weekday, &mut dice, &mut crate::loot::NoLoot)
    };
    rejected.append(&mut report.log);
    report.log = rejected;
    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EncounterSummary {
    pub samples: u32,
    pub both_won: u32,
    pub physical_magical_won: u32,
    pub diplomacy_won: u32,
    pub lost: u32,
    pub avg_combat: f64,
    pub avg_talk: f64,
    pub avg_xp: f64,
}

/// Monte Carlo over `samples` encounters; sample `i` uses `seed + i`.
pub fn simulate_encounter_many(cfg: &ScenarioConfig, samples: u32) -> Result<EncounterSummary> {
    let mut summary = EncounterSummary { samples, ..Default::default() };
    let base = cfg.seed.unwrap_or(0);
    let (mut combat, mut talk, mut xp) = (0.0, 0.0, 0.0);
    for i in 0..samples {
        let mut run = cfg.clone();
        run.seed = Some(base.wrapping_add(i as u64));
        let report = simulate_encounter(&run)?;
        match report.outcome.classification {
            Classification::BothWon => summary.both_won += 1,
            Classification::PhysicalMagicalWon => summary.physical_magical_won += 1,
            Classification::DiplomacyWon => summary.diplomacy_won += 1,
            Classification::Lost => summary.lost += 1,
        }
        combat += report.outcome.combat_total;
        talk += report.outcome.talk_total;
        xp += report.rewards.total_xp() as f64;
    }
    if samples > 0 {
        let n = samples as f64;
        summary.avg_combat = combat / n;
        summary.avg_talk = talk / n;
        summary.avg_xp = xp / n;
    }
    Ok(summary)
}
