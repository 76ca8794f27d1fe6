//! Per-participant contributions and the resistance table.

pub mod actions;

use serde::Serialize;

use crate::checks::{luck_check, LuckRoll, RollOutcome};
use crate::monster::{DamageCategory, Monster, ResistanceTable};
use crate::participant::{Action, Participant, ParticipantId};
use crate::registry::{RoundSnapshot, Tally};
use crate::Roller;

use actions::{ClassSkill, Volley};

/// One line of the contribution ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub participant: ParticipantId,
    pub name: String,
    pub action: Action,
    pub auto: bool,
    pub roll: LuckRoll,
    /// `None` for prayers, which multiply the combat total instead.
    pub category: Option<DamageCategory>,
    pub raw: f64,
    /// Multiplier actually applied; `mitigated == raw * resistance`.
    pub resistance: f64,
    pub mitigated: f64,
    pub volley: Option<Volley>,
}

impl Contribution {
    pub fn fumbled(&self) -> bool {
        self.roll.outcome == RollOutcome::Fumble
    }

    pub fn is_combat(&self) -> bool {
        matches!(self.action, Action::Attack | Action::Magic | Action::Pray)
    }

    pub fn is_talk(&self) -> bool {
        self.action == Action::Talk
    }
}

/// Apply the resistance table once. Piercing hits treat physical resistance
/// as no worse than neutral.
pub fn mitigate(
    raw: f64,
    category: DamageCategory,
    table: &ResistanceTable,
    pierce: bool,
) -> (f64, f64) {
    let mut resistance = table.multiplier(category);
    if pierce && category == DamageCategory::Physical {
        resistance = resistance.max(1.0);
    }
    (resistance, raw * resistance)
}

/// Turn a resolved round into contributions. Prayers are settled last since
/// they scale what the fighters and casters achieved.
pub fn resolve_contributions(
    round: &RoundSnapshot<'_>,
    monster: &Monster,
    roller: &mut impl Roller,
    mut log: impl FnMut(String),
) -> Vec<Contribution> {
    let mut acted: Vec<(&Participant, Action, bool, LuckRoll)> = Vec::new();
    for (p, action, auto) in round.acted() {
        let roll = luck_check(roller, p, action);
        acted.push((p, action, auto, roll));
    }

    let rallies: Vec<(ParticipantId, f64)> = acted
        .iter()
        .filter(|(_, action, _, roll)| {
            *action == Action::Talk && roll.outcome != RollOutcome::Fumble
        })
        .filter_map(|(p, ..)| ClassSkill::of(p).rally().map(|r| (p.id, r)))
        .collect();

    let mut ledger = Vec::with_capacity(acted.len());
    for (p, action, auto, roll) in acted.iter().copied() {
        let Some(category) = action.category() else {
            continue;
        };
        let mut entry = Contribution {
            participant: p.id,
            name: p.name.clone(),
            action,
            auto,
            roll,
            category: Some(category),
            raw: 0.0,
            resistance: monster.resistances.multiplier(category),
            mitigated: 0.0,
            volley: None,
        };
        if roll.outcome == RollOutcome::Fumble {
            log(format!("[FUMBLE][{}] {:?} roll={}/{}", p.name, action, roll.roll, roll.max_roll));
            ledger.push(entry);
            continue;
        }
        let rally = rallies
            .iter()
            .filter(|(bard, _)| *bard != p.id)
            .map(|(_, r)| *r)
            .fold(1.0, f64::max);
        let skill = ClassSkill::of(p);
        let hit = skill.raw_hit(p, action, &roll, rally, roller);
        let (resistance, mitigated) = mitigate(hit.raw, category, &monster.resistances, hit.pierce);
        entry.raw = hit.raw;
        entry.resistance = resistance;
        entry.mitigated = mitigated;
        entry.volley = hit.volley;
        log(format_hit(&entry, hit.pierce));
        tracing::debug!(participant = p.id, ?action, raw = hit.raw, mitigated, "contribution");
        ledger.push(entry);
    }

    let active = Tally::from_actions(ledger.iter().filter(|c| !c.fumbled()).map(|c| c.action));
    let combat_before: f64 = ledger
        .iter()
        .filter(|c| c.category.is_some_and(DamageCategory::is_combat))
        .map(|c| c.mitigated)
        .sum();

    for (p, action, auto, roll) in acted.iter().copied() {
        if action != Action::Pray {
            continue;
        }
        let bonus = if roll.outcome == RollOutcome::Fumble {
            log(format!("[FUMBLE][{}] sermon went unanswered", p.name));
            0.0
        } else {
            ClassSkill::of(p).pray_bonus(p, &active)
        };
        let uplift = combat_before * bonus;
        if roll.outcome != RollOutcome::Fumble {
            if active.fight() == 0 {
                log(format!("[PRAY][{}] blessed like a madman but nobody was there", p.name));
            } else {
                log(format!(
                    "[PRAY][{}] ×{:.2} on {:.1} → +{:.1}",
                    p.name,
                    1.0 + bonus,
                    combat_before,
                    uplift
                ));
            }
        }
        ledger.push(Contribution {
            participant: p.id,
            name: p.name.clone(),
            action,
            auto,
            roll,
            category: None,
            raw: uplift,
            resistance: 1.0,
            mitigated: uplift,
            volley: None,
        });
    }
    ledger
}

fn format_hit(c: &Contribution, pierce: bool) -> String {
    let tag = match c.action {
        Action::Attack => "ATTACK",
        Action::Magic => "MAGIC",
        Action::Talk => "TALK",
        Action::Pray => "PRAY",
    };
    let crit = if c.roll.outcome == RollOutcome::Critical { " CRIT!" } else { "" };
    let auto = if c.auto { " (auto)" } else { "" };
    let volley = c
        .volley
        .map(|v| format!(" volley {}/{}×{}", v.landed, v.arrows, v.per_hit))
        .unwrap_or_default();
    let pierce = if pierce { " PIERCE" } else { "" };
    format!(
        "[{}][{}]{} roll={}/{}{}{} raw={:.1} ×{:.2}{} = {:.1}",
        tag,
        c.name,
        auto,
        c.roll.roll,
        c.roll.max_roll,
        crit,
        volley,
        c.raw,
        c.resistance,
        pierce,
        c.mitigated
    )
}
