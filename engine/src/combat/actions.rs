use serde::Serialize;

use crate::checks::LuckRoll;
use crate::participant::{Action, HeroClass, Participant};
use crate::registry::Tally;
use crate::Roller;

pub const RAGE_MULT: f64 = 1.5;
pub const FOCUS_MULT: f64 = 1.5;
/// Second cast of a veteran wizard, relative to the focused first cast.
pub const SECOND_CAST: f64 = 0.65;
pub const VOLLEY_COEF: f64 = 0.25;
pub const VETERAN_VOLLEY_COEF: f64 = 0.35;
pub const PRAY_STEP: f64 = 0.1;
pub const BLESS_STEP: f64 = 0.2;
pub const MUSIC_BASE: f64 = 1.5;
pub const MUSIC_CAP: f64 = 2.0;
/// Share of a veteran bard's own music bonus passed to the other talkers.
pub const RALLY_SHARE: f64 = 0.25;

/// Class capability for this encounter. Skills other than the cleric's bless
/// only exist while primed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassSkill {
    Plain,
    Rage { veteran: bool },
    Focus { veteran: bool },
    Rain { veteran: bool },
    Bless { veteran: bool, primed: bool },
    Music { veteran: bool, multiplier: f64 },
    Insight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Volley {
    pub arrows: u32,
    pub landed: u32,
    pub per_hit: f64,
}

/// Contribution before the resistance table is consulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    pub raw: f64,
    /// Physical resistance does not reduce this hit.
    pub pierce: bool,
    pub volley: Option<Volley>,
}

impl ClassSkill {
    pub fn of(p: &Participant) -> Self {
        let veteran = p.is_veteran();
        match p.class {
            Some(HeroClass::Cleric) => ClassSkill::Bless { veteran, primed: p.skill_active },
            _ if !p.skill_active => ClassSkill::Plain,
            Some(HeroClass::Berserker) => ClassSkill::Rage { veteran },
            Some(HeroClass::Wizard) => ClassSkill::Focus { veteran },
            Some(HeroClass::Ranger) => ClassSkill::Rain { veteran },
            Some(HeroClass::Bard) => ClassSkill::Music {
                veteran,
                multiplier: (MUSIC_BASE + 0.01 * p.rebirths as f64).min(MUSIC_CAP),
            },
            Some(HeroClass::Psychic) => ClassSkill::Insight,
            None => ClassSkill::Plain,
        }
    }

    /// Party multiplier a veteran bard hands to the other talkers.
    pub fn rally(&self) -> Option<f64> {
        match *self {
            ClassSkill::Music { veteran: true, multiplier } => {
                Some(1.0 + RALLY_SHARE * (multiplier - 1.0))
            }
            _ => None,
        }
    }

    /// Raw contribution of an Attack, Magic or Talk action. `rally` is the
    /// party music multiplier this participant receives (1.0 for none).
    pub fn raw_hit(
        &self,
        p: &Participant,
        action: Action,
        roll: &LuckRoll,
        rally: f64,
        roller: &mut impl Roller,
    ) -> RawHit {
        let s = &p.stats;
        let base = |stat: i32| (stat.max(0) as f64 + roll.crit_bonus).max(0.0);
        let plain = |raw: f64| RawHit { raw, pierce: false, volley: None };
        match (action, *self) {
            (Action::Attack, ClassSkill::Rage { veteran }) => RawHit {
                raw: base(s.att) * RAGE_MULT,
                pierce: veteran,
                volley: None,
            },
            (Action::Attack, ClassSkill::Rain { veteran }) => {
                let volley = loose_volley(p, veteran, roller);
                RawHit {
                    raw: base(s.att) + volley.per_hit * volley.landed as f64,
                    pierce: false,
                    volley: Some(volley),
                }
            }
            (Action::Attack, _) => plain(base(s.att)),
            (Action::Magic, ClassSkill::Focus { veteran }) => {
                let first = base(s.int) * FOCUS_MULT;
                let second = if veteran { first * SECOND_CAST } else { 0.0 };
                plain(first + second)
            }
            (Action::Magic, _) => plain(base(s.int)),
            (Action::Talk, ClassSkill::Music { multiplier, .. }) => plain(base(s.cha) * multiplier),
            (Action::Talk, _) => plain(base(s.cha) * rally),
            (Action::Pray, _) => plain(0.0),
        }
    }

    /// Share of the combined combat total this prayer adds, given the counts
    /// of participants who acted without fumbling.
    pub fn pray_bonus(&self, p: &Participant, active: &Tally) -> f64 {
        let ClassSkill::Bless { veteran, primed } = *self else {
            return 0.0;
        };
        let counts = if veteran { active.boosted() } else { *active };
        let step = if primed { BLESS_STEP } else { PRAY_STEP };
        let fighters = counts.fight() as f64;
        step * (fighters + (p.rebirths / 15) as f64)
    }
}

/// Chance for each arrow of a volley to land.
pub fn landing_chance(p: &Participant) -> f64 {
    let s = &p.stats;
    let pet = p
        .pet
        .as_ref()
        .map_or(0.0, |pet| pet.bonus_fraction() + pet.crit as f64 / 100.0);
    (0.5 + (s.dex as f64 + s.luck as f64 / 2.0) / 200.0 + pet).clamp(0.05, 0.95)
}

fn loose_volley(p: &Participant, veteran: bool, roller: &mut impl Roller) -> Volley {
    let max_arrows = if veteran { 8 } else { 6 };
    let arrows = roller.roll_range(3, max_arrows) as u32;
    let coef = if veteran { VETERAN_VOLLEY_COEF } else { VOLLEY_COEF };
    let per_hit = (p.stats.att.max(0) as f64 * coef).round_ties_even();
    let chance = landing_chance(p);
    let landed = (0..arrows).filter(|_| roller.chance(chance)).count() as u32;
    Volley { arrows, landed, per_hit }
}
