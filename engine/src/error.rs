use thiserror::Error;

use crate::participant::{Action, HeroClass, ParticipantId};
use crate::Timestamp;

/// Rejected submissions. None of these change encounter state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("participant {participant} ({class:?}) cannot {action:?}")]
    InvalidAction {
        participant: ParticipantId,
        action: Action,
        class: Option<HeroClass>,
    },
    #[error("action window closed at {closes_at}, submission at {at}")]
    WindowClosed { at: Timestamp, closes_at: Timestamp },
    #[error("participant {0} is not in this encounter")]
    UnknownParticipant(ParticipantId),
}

/// Collaborator failures surfaced before the first round begins.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("profile {id} unavailable: {reason}")]
    ProfileUnavailable { id: ParticipantId, reason: String },
    #[error("malformed theme asset '{asset}': {source}")]
    MalformedTheme {
        asset: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot read theme asset '{asset}': {source}")]
    ThemeUnreadable {
        asset: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown monster '{0}'")]
    UnknownMonster(String),
    #[error("encounter has no participants")]
    NoParticipants,
}
