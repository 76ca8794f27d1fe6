use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ActionError;
use crate::participant::{Action, Participant, ParticipantId};
use crate::Timestamp;

/// A participant's action for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "action")]
pub enum RoundAction {
    Unset,
    Manual(Action),
    Auto(Action),
}

impl RoundAction {
    pub fn action(self) -> Option<Action> {
        match self {
            RoundAction::Unset => None,
            RoundAction::Manual(a) | RoundAction::Auto(a) => Some(a),
        }
    }

    pub fn is_auto(self) -> bool {
        matches!(self, RoundAction::Auto(_))
    }
}

/// Number of participants per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    counts: [u32; 4],
}

impl Tally {
    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut t = Tally::default();
        for a in actions {
            t.counts[a.index()] += 1;
        }
        t
    }

    pub fn get(&self, action: Action) -> u32 {
        self.counts[action.index()]
    }

    /// Attackers plus casters.
    pub fn fight(&self) -> u32 {
        self.get(Action::Attack) + self.get(Action::Magic)
    }

    pub fn talk(&self) -> u32 {
        self.get(Action::Talk)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Veteran-cleric view: every category someone used counts two extra.
    pub fn boosted(&self) -> Self {
        let mut t = *self;
        for c in t.counts.iter_mut() {
            if *c > 0 {
                *c += 2;
            }
        }
        t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub participant: ParticipantId,
    pub action: Action,
    pub at: Timestamp,
}

/// The action-collection interval. Submissions at `closes_at` still count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub opens_at: Timestamp,
    pub closes_at: Timestamp,
}

impl Window {
    pub fn starting_at(opens_at: Timestamp, length_ms: u64) -> Self {
        Self { opens_at, closes_at: opens_at.saturating_add(length_ms) }
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        at <= self.closes_at
    }
}

#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub profile: &'a Participant,
    pub action: RoundAction,
    pub streak: u8,
}

struct RoundState<'a> {
    entries: IndexMap<ParticipantId, Entry<'a>>,
    log: Vec<ActionRecord>,
    closed: bool,
}

/// Collects manual actions during the window. Every mutation goes through one
/// lock; reads for display return copies.
pub struct ActionRegistry<'a> {
    window: Window,
    state: Mutex<RoundState<'a>>,
}

impl<'a> ActionRegistry<'a> {
    pub fn new(profiles: impl IntoIterator<Item = &'a Participant>, window: Window) -> Self {
        let entries = profiles
            .into_iter()
            .map(|p| {
                let entry = Entry { profile: p, action: RoundAction::Unset, streak: p.auto_streak };
                (p.id, entry)
            })
            .collect();
        Self {
            window,
            state: Mutex::new(RoundState { entries, log: Vec::new(), closed: false }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RoundState<'a>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Record a manual action. A repeat submission replaces the earlier one.
    pub fn submit_action(
        &self,
        id: ParticipantId,
        action: Action,
        at: Timestamp,
    ) -> Result<(), ActionError> {
        let mut state = self.lock();
        if state.closed || !self.window.contains(at) {
            tracing::warn!(participant = id, at, "late submission rejected");
            return Err(ActionError::WindowClosed { at, closes_at: self.window.closes_at });
        }
        let entry = state.entries.get_mut(&id).ok_or(ActionError::UnknownParticipant(id))?;
        entry.profile.check_action(action)?;
        entry.action = RoundAction::Manual(action);
        entry.streak = 0;
        state.log.push(ActionRecord { participant: id, action, at });
        tracing::debug!(participant = id, ?action, at, "manual action recorded");
        Ok(())
    }

    /// Tally over every participant with an action set.
    pub fn snapshot_tally(&self) -> Tally {
        let state = self.lock();
        Tally::from_actions(state.entries.values().filter_map(|e| e.action.action()))
    }

    pub fn action_of(&self, id: ParticipantId) -> Option<RoundAction> {
        self.lock().entries.get(&id).map(|e| e.action)
    }

    pub fn streak_of(&self, id: ParticipantId) -> Option<u8> {
        self.lock().entries.get(&id).map(|e| e.streak)
    }

    pub fn log(&self) -> Vec<ActionRecord> {
        self.lock().log.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Close the window and hand out the frozen round.
    pub fn freeze(&self) -> RoundSnapshot<'a> {
        let mut state = self.lock();
        state.closed = true;
        RoundSnapshot { entries: state.entries.clone() }
    }
}

/// The round as it stood when the window closed.
#[derive(Debug, Clone)]
pub struct RoundSnapshot<'a> {
    pub entries: IndexMap<ParticipantId, Entry<'a>>,
}

impl<'a> RoundSnapshot<'a> {
    pub fn tally(&self) -> Tally {
        Tally::from_actions(self.entries.values().filter_map(|e| e.action.action()))
    }

    /// Tally of manual choices only; what the auto resolver reads.
    pub fn manual_tally(&self) -> Tally {
        Tally::from_actions(self.entries.values().filter_map(|e| match e.action {
            RoundAction::Manual(a) => Some(a),
            _ => None,
        }))
    }

    pub fn acted(&self) -> impl Iterator<Item = (&'a Participant, Action, bool)> + '_ {
        self.entries
            .values()
            .filter_map(|e| e.action.action().map(|a| (e.profile, a, e.action.is_auto())))
    }

    pub fn is_empty_round(&self) -> bool {
        self.entries.values().all(|e| e.action == RoundAction::Unset)
    }
}
