use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::monster::DamageCategory;

pub type ParticipantId = u64;

/// Rebirths needed for the Veteran rank of every class.
pub const VETERAN_REBIRTHS: u32 = 20;

/// Auto-battle stops once a participant has acted automatically this many
/// rounds in a row.
pub const MAX_AUTO_STREAK: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attack,
    Magic,
    Talk,
    Pray,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Attack, Action::Magic, Action::Talk, Action::Pray];

    /// Damage axis the action feeds; Pray multiplies instead of dealing.
    pub fn category(self) -> Option<DamageCategory> {
        match self {
            Action::Attack => Some(DamageCategory::Physical),
            Action::Magic => Some(DamageCategory::Magical),
            Action::Talk => Some(DamageCategory::Diplomacy),
            Action::Pray => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Action::Attack => 0,
            Action::Magic => 1,
            Action::Talk => 2,
            Action::Pray => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroClass {
    Berserker,
    Wizard,
    Ranger,
    Cleric,
    Bard,
    Psychic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightPreference {
    Attack,
    Magic,
}

impl From<FightPreference> for Action {
    fn from(p: FightPreference) -> Self {
        match p {
            FightPreference::Attack => Action::Attack,
            FightPreference::Magic => Action::Magic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub att: i32,
    pub cha: i32,
    pub int: i32,
    #[serde(default)]
    pub dex: i32,
    #[serde(default)]
    pub luck: i32,
}

impl Stats {
    pub fn total(&self) -> i32 {
        self.att + self.cha + self.int + self.dex + self.luck
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    /// Reward multiplier, e.g. 1.1 for a 10% bonus.
    pub bonus: f64,
    /// Crit chance in percent; sharpens a ranger's volley.
    #[serde(default)]
    pub crit: u32,
    /// The bonus procs every time instead of 45% of the time.
    #[serde(default)]
    pub always: bool,
}

impl Pet {
    pub fn bonus_fraction(&self) -> f64 {
        (self.bonus - 1.0).max(0.0)
    }
}

/// Profile snapshot supplied by the profile store for one encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub stats: Stats,
    #[serde(default)]
    pub class: Option<HeroClass>,
    #[serde(default)]
    pub rebirths: u32,
    #[serde(default)]
    pub pet: Option<Pet>,
    #[serde(default)]
    pub auto_battle: bool,
    #[serde(default)]
    pub auto_mode: Option<FightPreference>,
    #[serde(default)]
    pub auto_streak: u8,
    /// Class skill (rage, focus, rain, bless, music, insight) is primed.
    #[serde(default)]
    pub skill_active: bool,
    #[serde(default)]
    pub do_not_disturb: bool,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, stats: Stats) -> Self {
        Self {
            id,
            name: name.into(),
            stats,
            class: None,
            rebirths: 0,
            pet: None,
            auto_battle: false,
            auto_mode: None,
            auto_streak: 0,
            skill_active: false,
            do_not_disturb: false,
            balance: 0,
            exp: 0,
            equipment: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: HeroClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_rebirths(mut self, rebirths: u32) -> Self {
        self.rebirths = rebirths;
        self
    }

    pub fn with_auto(mut self, mode: Option<FightPreference>) -> Self {
        self.auto_battle = true;
        self.auto_mode = mode;
        self
    }

    pub fn with_skill(mut self) -> Self {
        self.skill_active = true;
        self
    }

    pub fn is(&self, class: HeroClass) -> bool {
        self.class == Some(class)
    }

    pub fn is_cleric(&self) -> bool {
        self.is(HeroClass::Cleric)
    }

    pub fn is_veteran(&self) -> bool {
        self.rebirths >= VETERAN_REBIRTHS
    }

    /// Clerics may only pray, and only clerics may pray.
    pub fn check_action(&self, action: Action) -> Result<(), ActionError> {
        let cleric = self.is_cleric();
        if cleric != (action == Action::Pray) {
            return Err(ActionError::InvalidAction {
                participant: self.id,
                action,
                class: self.class,
            });
        }
        Ok(())
    }

    pub fn max_level(&self) -> u32 {
        5 + 5 * self.rebirths
    }

    /// Level implied by an experience total, capped by rebirth tier.
    pub fn level_for(&self, exp: u64) -> u32 {
        let lvl = (exp as f64).powf(1.0 / 3.5).floor() as u32;
        lvl.min(self.max_level())
    }
}
