use serde::Serialize;

use crate::checks::RollOutcome;
use crate::combat::Contribution;
use crate::monster::{Difficulty, Monster, MonsterTier};
use crate::participant::{Action, Participant};
use crate::registry::Tally;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BothWon,
    PhysicalMagicalWon,
    DiplomacyWon,
    Lost,
}

impl Classification {
    pub fn combat_won(self) -> bool {
        matches!(self, Classification::BothWon | Classification::PhysicalMagicalWon)
    }

    pub fn talk_won(self) -> bool {
        matches!(self, Classification::BothWon | Classification::DiplomacyWon)
    }

    pub fn is_win(self) -> bool {
        self != Classification::Lost
    }
}

/// Both thresholds are inclusive.
pub fn classify(
    combat_total: f64,
    talk_total: f64,
    combat_threshold: f64,
    talk_threshold: f64,
) -> Classification {
    match (combat_total >= combat_threshold, talk_total >= talk_threshold) {
        (true, true) => Classification::BothWon,
        (true, false) => Classification::PhysicalMagicalWon,
        (false, true) => Classification::DiplomacyWon,
        (false, false) => Classification::Lost,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterOutcome {
    pub classification: Classification,
    pub combat_total: f64,
    pub talk_total: f64,
    pub combat_threshold: f64,
    pub talk_threshold: f64,
    pub tier: MonsterTier,
    pub transcended: bool,
    pub mode: Difficulty,
    /// Critical rolls across the party.
    pub criticals: u32,
    /// False when a miniboss requirement went unmet.
    pub requirement_met: bool,
    /// Who acted, per action; sizes the reward pool. A veteran cleric's
    /// blessing counts every used category two extra.
    pub reward_tally: Tally,
    pub ledger: Vec<Contribution>,
}

impl EncounterOutcome {
    /// Reward pool before per-participant scaling: the threshold of every
    /// axis that was won.
    pub fn won_amount(&self) -> f64 {
        let mut amount = 0.0;
        if self.classification.combat_won() {
            amount += self.combat_threshold;
        }
        if self.classification.talk_won() {
            amount += self.talk_threshold;
        }
        amount
    }
}

/// Sum both axes and classify. An empty ledger or an unmet requirement is a
/// loss, never an error.
pub fn evaluate(
    monster: &Monster,
    ledger: Vec<Contribution>,
    party: &[&Participant],
) -> EncounterOutcome {
    let combat_total: f64 = ledger.iter().filter(|c| c.is_combat()).map(|c| c.mitigated).sum();
    let talk_total: f64 = ledger.iter().filter(|c| c.is_talk()).map(|c| c.mitigated).sum();
    let combat_threshold = monster.combat_target();
    let talk_threshold = monster.talk_target();
    let requirement_met = monster.requirement.as_ref().is_none_or(|r| r.satisfied_by(party));

    let classification = if ledger.is_empty() || !requirement_met {
        Classification::Lost
    } else {
        classify(combat_total, talk_total, combat_threshold, talk_threshold)
    };
    let criticals = ledger
        .iter()
        .filter(|c| c.roll.outcome == RollOutcome::Critical)
        .count() as u32;
    let reward_tally = tally_for_rewards(&ledger, party);

    tracing::info!(
        monster = %monster.name,
        ?classification,
        combat_total,
        talk_total,
        combat_threshold,
        talk_threshold,
        "encounter classified"
    );

    EncounterOutcome {
        classification,
        combat_total,
        talk_total,
        combat_threshold,
        talk_threshold,
        tier: monster.tier,
        transcended: monster.transcended,
        mode: monster.mode,
        criticals,
        requirement_met,
        reward_tally,
        ledger,
    }
}

/// Everyone in the ledger counts once, fumbles included. A veteran cleric
/// whose prayer landed boosts the tally.
fn tally_for_rewards(ledger: &[Contribution], party: &[&Participant]) -> Tally {
    let acted = Tally::from_actions(ledger.iter().map(|c| c.action));
    let blessed = ledger.iter().any(|c| {
        c.action == Action::Pray
            && !c.fumbled()
            && party
                .iter()
                .any(|p| p.id == c.participant && p.is_cleric() && p.is_veteran())
    });
    if blessed { acted.boosted() } else { acted }
}
