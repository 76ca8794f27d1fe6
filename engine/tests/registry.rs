use engine::registry::{ActionRegistry, RoundAction, Window};
use engine::{Action, ActionError, FightPreference, HeroClass, Participant, Stats};

fn stats(att: i32, cha: i32, int: i32) -> Stats {
    Stats { att, cha, int, dex: 0, luck: 0 }
}

fn party() -> Vec<Participant> {
    let mut auto =
        Participant::new(3, "Dorn", stats(60, 10, 10)).with_auto(Some(FightPreference::Attack));
    auto.auto_streak = 7;
    vec![
        Participant::new(1, "Aria", stats(100, 10, 10)),
        Participant::new(2, "Ruun", stats(10, 10, 40)).with_class(HeroClass::Cleric),
        auto,
    ]
}

#[test]
fn manual_submission_sets_action_and_resets_streak() {
    let profiles = party();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(0, 1000));
    assert_eq!(reg.streak_of(3), Some(7));

    reg.submit_action(3, Action::Magic, 10).unwrap();
    assert_eq!(reg.action_of(3), Some(RoundAction::Manual(Action::Magic)));
    assert_eq!(reg.streak_of(3), Some(0));
}

#[test]
fn cleric_can_only_pray_and_only_clerics_pray() {
    let profiles = party();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(0, 1000));

    let err = reg.submit_action(2, Action::Attack, 5).unwrap_err();
    assert!(matches!(
        err,
        ActionError::InvalidAction { participant: 2, action: Action::Attack, .. }
    ));
    assert_eq!(reg.action_of(2), Some(RoundAction::Unset));

    let err = reg.submit_action(1, Action::Pray, 5).unwrap_err();
    assert!(matches!(err, ActionError::InvalidAction { participant: 1, .. }));

    reg.submit_action(2, Action::Pray, 5).unwrap();
    assert_eq!(reg.action_of(2), Some(RoundAction::Manual(Action::Pray)));
    assert!(reg.log().iter().all(|r| r.participant == 2));
}

#[test]
fn deadline_is_inclusive_and_late_submissions_change_nothing() {
    let profiles = party();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(100, 50));

    reg.submit_action(1, Action::Attack, 150).unwrap();
    let err = reg.submit_action(3, Action::Talk, 151).unwrap_err();
    assert_eq!(err, ActionError::WindowClosed { at: 151, closes_at: 150 });
    assert_eq!(reg.action_of(3), Some(RoundAction::Unset));
    assert_eq!(reg.streak_of(3), Some(7));
    assert_eq!(reg.log().len(), 1);
}

#[test]
fn frozen_registry_rejects_everything() {
    let profiles = party();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(0, 1000));
    let _round = reg.freeze();
    assert!(reg.is_closed());
    let late = reg.submit_action(1, Action::Attack, 1);
    assert!(matches!(late, Err(ActionError::WindowClosed { .. })));
}

#[test]
fn unknown_participant_is_rejected() {
    let profiles = party();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(0, 1000));
    assert_eq!(reg.submit_action(99, Action::Talk, 1), Err(ActionError::UnknownParticipant(99)));
}

#[test]
fn later_submission_replaces_but_log_keeps_both() {
    let profiles = party();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(0, 1000));
    reg.submit_action(1, Action::Attack, 1).unwrap();
    reg.submit_action(1, Action::Talk, 2).unwrap();

    assert_eq!(reg.action_of(1), Some(RoundAction::Manual(Action::Talk)));
    let tally = reg.snapshot_tally();
    assert_eq!(tally.get(Action::Attack), 0);
    assert_eq!(tally.talk(), 1);
    let log: Vec<Action> = reg.log().iter().map(|r| r.action).collect();
    assert_eq!(log, vec![Action::Attack, Action::Talk]);
}

#[test]
fn concurrent_submissions_all_land() {
    let profiles: Vec<Participant> = (1..=32)
        .map(|id| Participant::new(id, format!("p{id}"), stats(50, 50, 50)))
        .collect();
    let reg = ActionRegistry::new(&profiles, Window::starting_at(0, 10_000));

    std::thread::scope(|s| {
        for p in &profiles {
            let reg = &reg;
            s.spawn(move || {
                let action = if p.id % 2 == 0 { Action::Attack } else { Action::Talk };
                reg.submit_action(p.id, action, p.id * 10).unwrap();
            });
        }
    });

    let tally = reg.snapshot_tally();
    assert_eq!(tally.fight(), 16);
    assert_eq!(tally.talk(), 16);
    assert_eq!(reg.log().len(), 32);
}
