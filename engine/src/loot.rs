use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::monster::MonsterTier;
use crate::outcome::{Classification, EncounterOutcome};
use crate::participant::Participant;
use crate::Roller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Normal,
    Rare,
    Epic,
    Legendary,
    Ascended,
    Set,
}

/// Chest counts by rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Treasure {
    #[serde(default)]
    pub normal: u32,
    #[serde(default)]
    pub rare: u32,
    #[serde(default)]
    pub epic: u32,
    #[serde(default)]
    pub legendary: u32,
    #[serde(default)]
    pub ascended: u32,
    #[serde(default)]
    pub set: u32,
}

impl Treasure {
    pub fn is_empty(&self) -> bool {
        *self == Treasure::default()
    }

    pub fn count(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Normal => self.normal,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
            Rarity::Ascended => self.ascended,
            Rarity::Set => self.set,
        }
    }

    pub fn total(&self) -> u32 {
        self.normal + self.rare + self.epic + self.legendary + self.ascended + self.set
    }
}

impl AddAssign for Treasure {
    fn add_assign(&mut self, o: Treasure) {
        self.normal += o.normal;
        self.rare += o.rare;
        self.epic += o.epic;
        self.legendary += o.legendary;
        self.ascended += o.ascended;
        self.set += o.set;
    }
}

/// Loot hook, called once per rewarded participant after classification.
pub trait LootTable {
    fn grant_loot(&mut self, participant: &Participant, outcome: &EncounterOutcome) -> Treasure;
}

/// Never grants anything.
pub struct NoLoot;

impl LootTable for NoLoot {
    fn grant_loot(&mut self, _: &Participant, _: &EncounterOutcome) -> Treasure {
        Treasure::default()
    }
}

const fn t(normal: u32, rare: u32, epic: u32, legendary: u32, ascended: u32, set: u32) -> Treasure {
    Treasure { normal, rare, epic, legendary, ascended, set }
}

const TRANSCENDED_BOSS: [Treasure; 3] =
    [t(0, 0, 1, 5, 2, 3), t(0, 0, 2, 6, 1, 3), t(0, 0, 3, 7, 1, 3)];
const TRANSCENDED: [Treasure; 4] = [
    t(0, 0, 1, 5, 1, 1),
    t(0, 0, 2, 3, 0, 1),
    t(0, 0, 3, 1, 1, 1),
    t(0, 0, 1, 5, 0, 1),
];
const BOSS: [Treasure; 3] = [t(0, 0, 3, 5, 0, 1), t(0, 0, 1, 2, 1, 1), t(0, 0, 0, 3, 2, 1)];
const MINIBOSS: [Treasure; 4] = [
    t(0, 0, 4, 0, 2, 0),
    t(0, 0, 2, 1, 2, 0),
    t(0, 0, 3, 2, 0, 0),
    t(0, 6, 0, 3, 2, 0),
];

/// (minimum amount, chance out of 10, table)
const BY_AMOUNT: [(f64, i32, &[Treasure]); 8] = [
    (8000.0, 10, &[t(0, 0, 3, 3, 1, 0), t(0, 0, 1, 5, 0, 0), t(0, 0, 1, 2, 1, 0)]),
    (6000.0, 9, &[t(0, 0, 3, 3, 0, 0), t(0, 0, 1, 1, 1, 0), t(0, 0, 0, 2, 1, 0)]),
    (5000.0, 7, &[t(0, 0, 3, 3, 0, 0), t(0, 0, 1, 1, 1, 0), t(0, 0, 0, 2, 1, 0)]),
    (3000.0, 7, &[t(0, 0, 3, 1, 0, 0), t(0, 0, 1, 2, 0, 0), t(0, 0, 0, 1, 1, 0)]),
    (1500.0, 7, &[t(0, 1, 3, 0, 0, 0), t(0, 5, 1, 0, 0, 0), t(0, 0, 2, 1, 0, 0)]),
    (700.0, 7, &[t(0, 0, 1, 0, 0, 0), t(0, 1, 0, 0, 0, 0), t(0, 0, 0, 1, 0, 0)]),
    (500.0, 5, &[t(0, 0, 1, 0, 0, 0), t(0, 1, 0, 0, 0, 0), t(0, 1, 1, 0, 0, 0)]),
    (300.0, 2, &[t(1, 0, 0, 0, 0, 0), t(0, 1, 0, 0, 0, 0), t(1, 1, 0, 0, 0, 0)]),
];

/// Tiered chest table: boss and transcended pools, otherwise by the size of
/// the won thresholds, plus rebirth bonus chests.
pub struct ChestTable<R: Roller> {
    roller: R,
}

impl<R: Roller> ChestTable<R> {
    pub fn new(roller: R) -> Self {
        Self { roller }
    }

    fn pick(&mut self, pool: &[Treasure]) -> Treasure {
        let i = self.roller.roll_range(0, pool.len() as i32 - 1) as usize;
        pool[i]
    }

    fn encounter_chest(&mut self, outcome: &EncounterOutcome) -> Treasure {
        let amount = outcome.won_amount();
        let roll = self.roller.roll_range(1, 10);
        let mut chest = match (outcome.transcended, outcome.tier) {
            (true, MonsterTier::Boss) => self.pick(&TRANSCENDED_BOSS),
            (true, _) => self.pick(&TRANSCENDED),
            (false, MonsterTier::Boss) => self.pick(&BOSS),
            (false, MonsterTier::Miniboss) => self.pick(&MINIBOSS),
            (false, MonsterTier::Common) => {
                match BY_AMOUNT.iter().find(|(min, ..)| amount >= *min) {
                    Some((_, chance, pool)) if roll <= *chance => self.pick(pool),
                    Some(_) => Treasure::default(),
                    None if amount >= 80.0 && roll == 1 => t(1, 0, 0, 0, 0, 0),
                    None => Treasure::default(),
                }
            }
        };
        if outcome.criticals > 0 {
            chest.epic += 1;
        }
        chest
    }

    fn rebirth_chests(&mut self, p: &Participant) -> Treasure {
        let mut chest = Treasure::default();
        if p.rebirths <= 1 {
            return chest;
        }
        let mut roll = self.roller.roll_range(1, 100);
        if p.level_for(p.exp) >= p.max_level() {
            roll += self.roller.roll_range(50, 100);
        }
        if roll < 50 {
            chest.normal += 1;
        }
        if p.rebirths > 5 && roll < 30 {
            chest.rare += 1;
        }
        if p.rebirths > 10 && roll < 10 {
            chest.epic += 1;
        }
        if p.rebirths > 15 && roll < 5 {
            chest.legendary += 1;
        }
        chest
    }
}

impl<R: Roller> LootTable for ChestTable<R> {
    fn grant_loot(&mut self, p: &Participant, outcome: &EncounterOutcome) -> Treasure {
        if outcome.classification == Classification::Lost {
            return Treasure::default();
        }
        let mut chest = self.encounter_chest(outcome);
        chest += self.rebirth_chests(p);
        chest
    }
}
