use serde::Serialize;

use crate::participant::{Action, Participant};
use crate::Roller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    Fumble,
    Normal,
    Critical,
}

/* ---------------- typed luck-roll API ---------------- */

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LuckRoll {
    pub roll: i32,
    pub max_roll: i32,
    pub outcome: RollOutcome,
    /// Flat bonus added to the raw contribution on a critical.
    pub crit_bonus: f64,
}

impl LuckRoll {
    /// A plain, non-critical roll; used where no dice are thrown.
    pub fn normal() -> Self {
        Self { roll: 10, max_roll: 20, outcome: RollOutcome::Normal, crit_bonus: 0.0 }
    }

    pub fn fraction(&self) -> f64 {
        self.roll as f64 / self.max_roll as f64
    }
}

/// Die size by rebirth tier: d20, d50 from 15 rebirths, d100 from 30.
pub fn max_roll_for(rebirths: u32) -> i32 {
    if rebirths >= 30 {
        100
    } else if rebirths >= 15 {
        50
    } else {
        20
    }
}

/// Lower bound shift and die size for an action's luck roll.
pub fn roll_window(p: &Participant, action: Action) -> (i32, i32) {
    let s = &p.stats;
    let stat_part = match action {
        Action::Attack => s.att / 20,
        Action::Magic | Action::Pray => s.int / 20,
        Action::Talk => s.int / 50 + s.cha / 20,
    };
    let crit_mod = (s.dex.max(s.luck / 2) + stat_part).max(0);
    let mut max_roll = max_roll_for(p.rebirths);
    let mut shift = (crit_mod as f64 / 10.0).round_ties_even() as i32;
    if p.rebirths < 15 && shift > 15 {
        shift = 15;
        max_roll = 20;
    } else if shift + 1 > 45 {
        shift = 45;
    }
    (shift, max_roll)
}

/// Roll for fumble/critical. Below 10% of the die fumbles, above 95% crits.
pub fn luck_check(roller: &mut impl Roller, p: &Participant, action: Action) -> LuckRoll {
    let (shift, max_roll) = roll_window(p, action);
    let roll = roller.roll_range((1 + shift).min(max_roll), max_roll).max(1);
    let fraction = roll as f64 / max_roll as f64;
    let (outcome, crit_bonus) = if fraction < 0.10 {
        (RollOutcome::Fumble, 0.0)
    } else if fraction > 0.95 {
        let bonus = roller.roll_range(5, 20) + 2 * p.rebirths as i32;
        (RollOutcome::Critical, bonus as f64)
    } else {
        (RollOutcome::Normal, 0.0)
    };
    LuckRoll { roll, max_roll, outcome, crit_bonus }
}
