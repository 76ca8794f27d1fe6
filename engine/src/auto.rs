//! Auto-battle: picks actions for absent participants from what the rest of
//! the party chose manually.

use serde::Serialize;

use crate::participant::{Action, FightPreference, Participant, ParticipantId, MAX_AUTO_STREAK};
use crate::registry::{Entry, RoundAction, RoundSnapshot, Tally};

/// Streak and eligibility to write back to the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoUpdate {
    pub participant: ParticipantId,
    pub streak: u8,
    pub eligible: bool,
}

/// Opted in, reachable, and not yet at the streak cap.
pub fn is_eligible(p: &Participant, streak: u8) -> bool {
    p.auto_battle && !p.do_not_disturb && streak < MAX_AUTO_STREAK
}

/// Attack or Magic for a fighter: stated preference first, otherwise the
/// stronger stat with ties going to Attack.
pub fn fight_choice(p: &Participant) -> Action {
    match p.auto_mode {
        Some(pref) => pref.into(),
        None if p.stats.int > p.stats.att => FightPreference::Magic.into(),
        None => FightPreference::Attack.into(),
    }
}

/// The action an auto participant takes given the manual tally.
pub fn choose_action(p: &Participant, tally: &Tally) -> Action {
    if p.is_cleric() {
        return Action::Pray;
    }
    if tally.talk() > tally.fight() {
        Action::Talk
    } else {
        fight_choice(p)
    }
}

/// Fill in actions for every eligible participant who did not act.
/// Returns who was resolved; a second call on the same round resolves nobody.
pub fn resolve_auto(round: &mut RoundSnapshot<'_>) -> Vec<ParticipantId> {
    let tally = round.manual_tally();
    let mut resolved = Vec::new();
    for (id, entry) in round.entries.iter_mut() {
        if entry.action != RoundAction::Unset || !is_eligible(entry.profile, entry.streak) {
            continue;
        }
        let action = choose_action(entry.profile, &tally);
        entry.action = RoundAction::Auto(action);
        entry.streak = entry.streak.saturating_add(1);
        tracing::debug!(participant = *id, ?action, streak = entry.streak, "auto action");
        resolved.push(*id);
    }
    resolved
}

pub fn write_back(round: &RoundSnapshot<'_>) -> Vec<AutoUpdate> {
    round
        .entries
        .values()
        .map(|Entry { profile, streak, .. }| AutoUpdate {
            participant: profile.id,
            streak: *streak,
            eligible: is_eligible(profile, *streak),
        })
        .collect()
}
