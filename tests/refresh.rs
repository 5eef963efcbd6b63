use std::sync::{Arc, Mutex};

use courtside::error::ErrorKind;
use courtside::model::{LeadTrackerEntry, Side, SubjectKey, SubjectSummary, TeamStatsSummary};
use courtside::refresh::{
    Availability, Callback, RefreshCoordinator, RefreshState, Resolution, SubjectView,
};
use courtside::team_colors::resolve_identity;

type Seen = Arc<Mutex<Vec<(RefreshState, u64, bool)>>>;

fn recorder() -> (Seen, Callback) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: Callback = Box::new(move |_: &SubjectKey, view: &SubjectView| {
        sink.lock().unwrap().push((view.status, view.generation, view.stale));
    });
    (seen, callback)
}

fn game_summary(lead_changes: u32) -> SubjectSummary {
    SubjectSummary::Game(TeamStatsSummary {
        home: resolve_identity("1610612761", "TOR", Side::Home),
        away: resolve_identity("1610612744", "GSW", Side::Away),
        times_tied: 1,
        lead_changes,
        entries: vec![LeadTrackerEntry {
            sequence: 1,
            leading_team_id: Some("1610612761".to_string()),
            margin: 2,
        }],
        quarter_scores: Vec::new(),
        boxscore: Vec::new(),
    })
}

fn empty_game_summary() -> SubjectSummary {
    SubjectSummary::Game(TeamStatsSummary {
        home: resolve_identity("1610612761", "TOR", Side::Home),
        away: resolve_identity("1610612744", "GSW", Side::Away),
        times_tied: 0,
        lead_changes: 0,
        entries: Vec::new(),
        quarter_scores: Vec::new(),
        boxscore: Vec::new(),
    })
}

fn lead_changes(coordinator: &RefreshCoordinator, key: &SubjectKey) -> Option<u32> {
    match coordinator.view(key).summary.as_deref() {
        Some(SubjectSummary::Game(summary)) => Some(summary.lead_changes),
        _ => None,
    }
}

#[test]
fn unknown_subject_is_idle() {
    let coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    assert_eq!(coordinator.status(&key), RefreshState::Idle);
    assert_eq!(coordinator.view(&key).availability(), Availability::NotLoaded);
}

#[test]
fn lifecycle_loading_ready_refreshing_ready() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (seen, callback) = recorder();

    let (_, ticket) = coordinator.subscribe(key.clone(), callback);
    let first = ticket.expect("first subscriber starts the load");
    assert_eq!(coordinator.status(&key), RefreshState::Loading);

    assert_eq!(coordinator.resolve(&first, Ok(game_summary(1))), Resolution::Committed);
    assert_eq!(coordinator.status(&key), RefreshState::Ready);

    let second = coordinator.request_refresh(&key);
    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Refreshing);
    assert!(view.stale, "previous summary stays visible while refreshing");
    assert_eq!(lead_changes(&coordinator, &key), Some(1));

    coordinator.resolve(&second, Ok(game_summary(2)));
    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Ready);
    assert!(!view.stale);
    assert_eq!(lead_changes(&coordinator, &key), Some(2));

    let seen = seen.lock().unwrap();
    let states: Vec<RefreshState> = seen.iter().map(|(s, _, _)| *s).collect();
    assert_eq!(
        states,
        vec![
            RefreshState::Loading,
            RefreshState::Ready,
            RefreshState::Refreshing,
            RefreshState::Ready
        ]
    );
}

#[test]
fn second_subscriber_does_not_start_another_load() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (_, first) = recorder();
    let (_, second) = recorder();
    let (_, ticket) = coordinator.subscribe(key.clone(), first);
    assert!(ticket.is_some());
    let (_, ticket) = coordinator.subscribe(key.clone(), second);
    assert!(ticket.is_none());
    assert_eq!(coordinator.view(&key).generation, 1);
}

#[test]
fn late_older_generation_never_overwrites_newer() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (seen, callback) = recorder();
    let (_, ticket) = coordinator.subscribe(key.clone(), callback);
    let gen1 = ticket.expect("initial ticket");
    let gen2 = coordinator.request_refresh(&key);
    assert!(gen1.is_cancelled());
    assert!(!gen2.is_cancelled());

    // Generation 2 lands first, then the slow generation 1 response.
    assert_eq!(coordinator.resolve(&gen2, Ok(game_summary(2))), Resolution::Committed);
    assert_eq!(coordinator.resolve(&gen1, Ok(game_summary(1))), Resolution::Superseded);

    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Ready);
    assert_eq!(view.generation, 2);
    assert_eq!(lead_changes(&coordinator, &key), Some(2));
    let commits = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|(s, _, _)| *s == RefreshState::Ready)
        .count();
    assert_eq!(commits, 1, "superseded result must not notify");
}

#[test]
fn early_older_generation_is_never_visible() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (seen, callback) = recorder();
    let (_, ticket) = coordinator.subscribe(key.clone(), callback);
    let gen1 = ticket.expect("initial ticket");
    let gen2 = coordinator.request_refresh(&key);

    // Generation 1 lands first but was already superseded.
    assert_eq!(coordinator.resolve(&gen1, Ok(game_summary(1))), Resolution::Superseded);
    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Loading);
    assert!(view.summary.is_none());
    assert_eq!(lead_changes(&coordinator, &key), None);

    assert_eq!(coordinator.resolve(&gen2, Ok(game_summary(2))), Resolution::Committed);
    assert_eq!(lead_changes(&coordinator, &key), Some(2));
    let committed: Vec<u64> = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|(s, _, _)| *s == RefreshState::Ready)
        .map(|(_, generation, _)| *generation)
        .collect();
    assert_eq!(committed, vec![2]);
}

#[test]
fn superseded_error_is_ignored_too() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (_, callback) = recorder();
    let (_, ticket) = coordinator.subscribe(key.clone(), callback);
    let gen1 = ticket.expect("initial ticket");
    let gen2 = coordinator.request_refresh(&key);
    let outcome = Err(ErrorKind::TransportFailure("timed out".to_string()));
    assert_eq!(coordinator.resolve(&gen1, outcome), Resolution::Superseded);
    assert_eq!(coordinator.status(&key), RefreshState::Loading);
    coordinator.resolve(&gen2, Ok(game_summary(0)));
    assert_eq!(coordinator.status(&key), RefreshState::Ready);
}

#[test]
fn resolving_twice_only_commits_once() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let ticket = coordinator.request_refresh(&key);
    assert_eq!(coordinator.resolve(&ticket, Ok(game_summary(1))), Resolution::Committed);
    assert_eq!(coordinator.resolve(&ticket, Ok(game_summary(5))), Resolution::Superseded);
    assert_eq!(lead_changes(&coordinator, &key), Some(1));
}

#[test]
fn transport_failure_keeps_previous_summary_as_stale() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let first = coordinator.request_refresh(&key);
    coordinator.resolve(&first, Ok(game_summary(3)));

    let second = coordinator.request_refresh(&key);
    let err = ErrorKind::TransportFailure("connection reset".to_string());
    coordinator.resolve(&second, Err(err.clone()));

    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Error);
    assert_eq!(view.error, Some(err));
    assert!(view.stale);
    assert_eq!(lead_changes(&coordinator, &key), Some(3));
    assert_eq!(view.availability(), Availability::Populated);
}

#[test]
fn refresh_from_error_clears_error_until_resolved() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let first = coordinator.request_refresh(&key);
    coordinator.resolve(&first, Err(ErrorKind::malformed("bad row")));
    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Error);
    assert!(!view.stale, "nothing was loaded before the failure");
    assert!(!view.error.as_ref().is_some_and(ErrorKind::is_retryable));

    coordinator.request_refresh(&key);
    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Refreshing);
    assert_eq!(view.error, None);
}

#[test]
fn empty_success_is_not_yet_available() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let ticket = coordinator.request_refresh(&key);
    coordinator.resolve(&ticket, Ok(empty_game_summary()));
    let view = coordinator.view(&key);
    assert_eq!(view.status, RefreshState::Ready);
    assert_eq!(view.error, None);
    assert_eq!(view.availability(), Availability::NotYetAvailable);
}

#[test]
fn refresh_while_loading_supersedes_without_notifying() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (seen, callback) = recorder();
    coordinator.subscribe(key.clone(), callback);
    coordinator.request_refresh(&key);
    assert_eq!(coordinator.status(&key), RefreshState::Loading);
    assert_eq!(coordinator.view(&key).generation, 2);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn unsubscribed_callbacks_stop_firing() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::player("202695", "2018-19");
    let (seen, callback) = recorder();
    let (id, ticket) = coordinator.subscribe(key.clone(), callback);
    assert!(coordinator.unsubscribe(&key, id));
    assert!(!coordinator.unsubscribe(&key, id));
    coordinator.resolve(&ticket.expect("initial ticket"), Ok(game_summary(0)));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn subscriber_count_follows_subscriptions() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let (_, first) = recorder();
    let (_, second) = recorder();
    let (first_id, _) = coordinator.subscribe(key.clone(), first);
    coordinator.subscribe(key.clone(), second);
    assert_eq!(coordinator.subscriber_count(&key), 2);
    coordinator.unsubscribe(&key, first_id);
    assert_eq!(coordinator.subscriber_count(&key), 1);
    assert_eq!(coordinator.subscriber_count(&SubjectKey::game("other")), 0);
}

#[test]
fn removed_subject_rejects_in_flight_result() {
    let mut coordinator = RefreshCoordinator::new();
    let key = SubjectKey::game("0041800406");
    let ticket = coordinator.request_refresh(&key);
    assert!(coordinator.remove(&key));
    assert!(ticket.is_cancelled());
    assert_eq!(
        coordinator.resolve(&ticket, Ok(game_summary(1))),
        Resolution::UnknownSubject
    );
    assert_eq!(coordinator.keys().count(), 0);
}

#[test]
fn subjects_are_independent() {
    let mut coordinator = RefreshCoordinator::new();
    let game = SubjectKey::game("0041800406");
    let player = SubjectKey::player("202695", "2018-19");
    let game_ticket = coordinator.request_refresh(&game);
    let player_ticket = coordinator.request_refresh(&player);
    assert_eq!(game_ticket.generation(), 1);
    assert_eq!(player_ticket.generation(), 1);
    coordinator.resolve(&game_ticket, Ok(game_summary(1)));
    assert_eq!(coordinator.status(&game), RefreshState::Ready);
    assert_eq!(coordinator.status(&player), RefreshState::Loading);
}
