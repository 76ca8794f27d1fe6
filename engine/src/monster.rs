use serde::{Deserialize, Serialize};

use crate::checks::max_roll_for;
use crate::participant::Participant;
use crate::Roller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCategory {
    Physical,
    Magical,
    Diplomacy,
}

impl DamageCategory {
    pub fn is_combat(self) -> bool {
        matches!(self, DamageCategory::Physical | DamageCategory::Magical)
    }
}

/// Multipliers applied to raw contributions: 0.5 halves, 1.5 amplifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResistanceTable {
    #[serde(default = "one")]
    pub physical: f64,
    #[serde(default = "one")]
    pub magic: f64,
    #[serde(default = "one")]
    pub diplomacy: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for ResistanceTable {
    fn default() -> Self {
        Self { physical: 1.0, magic: 1.0, diplomacy: 1.0 }
    }
}

impl ResistanceTable {
    pub fn multiplier(&self, category: DamageCategory) -> f64 {
        match category {
            DamageCategory::Physical => self.physical,
            DamageCategory::Magical => self.magic,
            DamageCategory::Diplomacy => self.diplomacy,
        }
    }
}

/// How a resistance multiplier reads to the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResistanceGrade {
    Impervious,
    Tough,
    Resistant,
    Soft,
    Vulnerable,
}

impl ResistanceGrade {
    pub fn of(multiplier: f64) -> Self {
        if multiplier <= 1.0 / 1.5 {
            ResistanceGrade::Impervious
        } else if multiplier <= 1.0 / 1.25 {
            ResistanceGrade::Tough
        } else if multiplier < 1.0 {
            ResistanceGrade::Resistant
        } else if multiplier < 1.0 / 0.75 {
            ResistanceGrade::Soft
        } else {
            ResistanceGrade::Vulnerable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterTier {
    #[default]
    Common,
    Miniboss,
    Boss,
}

/// Threshold modifier such as "n immortal" or " possessed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub combat: f64,
    pub talk: f64,
}

/// What a miniboss demands before it can be beaten at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Strictly more than this many participants.
    Members(usize),
    /// Someone must carry an item whose name contains this text.
    Item(String),
}

impl Requirement {
    pub fn satisfied_by(&self, party: &[&Participant]) -> bool {
        match self {
            Requirement::Members(n) => party.len() > *n,
            Requirement::Item(needle) => {
                let needle = needle.to_lowercase();
                party.iter().any(|p| {
                    p.equipment.iter().any(|item| {
                        let item = item.to_lowercase();
                        item.contains(&needle) || item.contains("shiny")
                    })
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub mode: Difficulty,
    pub combat_threshold: f64,
    pub talk_threshold: f64,
    #[serde(default)]
    pub resistances: ResistanceTable,
    #[serde(default)]
    pub tier: MonsterTier,
    #[serde(default)]
    pub transcended: bool,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    #[serde(default)]
    pub requirement: Option<Requirement>,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Monster {
    pub fn new(name: impl Into<String>, combat_threshold: f64, talk_threshold: f64) -> Self {
        Self {
            name: name.into(),
            theme: default_theme(),
            mode: Difficulty::Normal,
            combat_threshold,
            talk_threshold,
            resistances: ResistanceTable::default(),
            tier: MonsterTier::Common,
            transcended: false,
            attribute: None,
            requirement: None,
        }
    }

    pub fn with_resistances(mut self, physical: f64, magic: f64, diplomacy: f64) -> Self {
        self.resistances = ResistanceTable { physical, magic, diplomacy };
        self
    }

    /// Combat threshold after the attribute multiplier, never below 1.
    pub fn combat_target(&self) -> f64 {
        let mult = self.attribute.as_ref().map_or(1.0, |a| a.combat);
        (self.combat_threshold * mult).floor().max(1.0)
    }

    pub fn talk_target(&self) -> f64 {
        let mult = self.attribute.as_ref().map_or(1.0, |a| a.talk);
        (self.talk_threshold * mult).floor().max(1.0)
    }

    pub fn display_name(&self) -> String {
        match &self.attribute {
            Some(a) => format!("a{} {}", a.name, self.name),
            None => self.name.clone(),
        }
    }

    /// What participants see. Normal mode shows everything; Hard mode hides
    /// details until an insight of sufficient quality uncovers them.
    pub fn view(&self, insight: Option<f64>) -> MonsterView {
        if self.mode == Difficulty::Normal {
            return self.full_view();
        }
        let q = insight.unwrap_or(0.0);
        let grade = |m: f64, min: f64| (q >= min).then(|| ResistanceGrade::of(m));
        MonsterView {
            name: (q > 0.5).then(|| self.name.clone()),
            attribute: if q > 0.75 {
                self.attribute.as_ref().map(|a| a.name.clone())
            } else {
                None
            },
            combat_threshold: (q >= 0.90).then(|| self.combat_target()),
            talk_threshold: (q >= 0.95).then(|| self.talk_target()),
            physical: grade(self.resistances.physical, 0.4),
            magic: grade(self.resistances.magic, 0.6),
            diplomacy: grade(self.resistances.diplomacy, 0.8),
            tier: self.tier,
        }
    }

    fn full_view(&self) -> MonsterView {
        MonsterView {
            name: Some(self.name.clone()),
            attribute: self.attribute.as_ref().map(|a| a.name.clone()),
            combat_threshold: Some(self.combat_target()),
            talk_threshold: Some(self.talk_target()),
            physical: Some(ResistanceGrade::of(self.resistances.physical)),
            magic: Some(ResistanceGrade::of(self.resistances.magic)),
            diplomacy: Some(ResistanceGrade::of(self.resistances.diplomacy)),
            tier: self.tier,
        }
    }
}

/// Display-only projection of a monster. Never feeds the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonsterView {
    pub name: Option<String>,
    pub attribute: Option<String>,
    pub combat_threshold: Option<f64>,
    pub talk_threshold: Option<f64>,
    pub physical: Option<ResistanceGrade>,
    pub magic: Option<ResistanceGrade>,
    pub diplomacy: Option<ResistanceGrade>,
    pub tier: MonsterTier,
}

/// Quality (0..=1) of a psychic's read on the monster.
pub fn insight_quality(psychic: &Participant, roller: &mut impl Roller) -> f64 {
    let max_roll = max_roll_for(psychic.rebirths);
    let lo = (psychic.rebirths as i32 - 12).min(max_roll / 2);
    let roll = roller.roll_range(lo, max_roll);
    (roll as f64 / max_roll as f64).clamp(0.0, 1.0)
}
