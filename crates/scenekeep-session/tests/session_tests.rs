//! Edit-session lifecycle tests

use pretty_assertions::assert_eq;
use scenekeep_model::{Document, ElementKey};
use scenekeep_session::{
    actions, ConfirmOutcome, DiffMode, ExitOptions, ExitOutcome, PersistenceError, SaveOptions,
    SaveResult, SceneSession, SessionConfig, SessionRegistry, UrlState,
};
use scenekeep_test_utils::{
    edit_url, panel_item, sample_document, setup_session, InMemoryPersistence, RecordedEvent,
};
use std::time::Duration;

fn inline() -> SessionConfig {
    SessionConfig::new().with_diff_mode(DiffMode::Inline)
}

fn retitle(session: &mut SceneSession, title: &str) {
    let entry = actions::change_title(session.document(), title);
    session.perform(entry).unwrap();
}

#[test]
fn test_reentering_edit_mode_keeps_first_snapshot() {
    let (mut session, _, _) = setup_session(inline());
    let original = session.document().clone();

    session.enter_edit_mode();
    retitle(&mut session, "Mutated");
    session.enter_edit_mode();

    let snapshot = session.initial_snapshot().unwrap();
    assert_eq!(snapshot.document, original);
    assert!(session.is_dirty());
}

#[test]
fn test_discard_restores_exactly() {
    let (mut session, _, _) = setup_session(inline());
    let d0 = session.document().clone();

    session.enter_edit_mode();
    retitle(&mut session, "D1");
    let entry = actions::remove_element(session.document(), &ElementKey::new("row-hosts")).unwrap();
    session.perform(entry).unwrap();
    let entry = actions::add_item(session.document(), None, 0, panel_item("panel-new", "New")).unwrap();
    session.perform(entry).unwrap();

    let outcome = session.exit_edit_mode(ExitOptions::discard());
    assert_eq!(outcome, ExitOutcome::Exited { restored: true });
    assert_eq!(session.document(), &d0);
    assert!(!session.is_editing());
    assert!(!session.is_dirty());
    assert!(!session.can_discard());
}

#[test]
fn test_save_completed_rebaselines_snapshot() {
    let (mut session, _, _) = setup_session(inline());
    session.enter_edit_mode();
    retitle(&mut session, "D1");

    let saved = session.document().save_model().unwrap();
    session.save_completed(
        saved,
        SaveResult {
            uid: "svc-overview".into(),
            version: 4,
            url: "/d/svc-overview".into(),
            slug: "service-overview".into(),
            id: 11,
        },
        None,
    );
    let d1 = session.document().clone();
    assert!(!session.is_dirty());

    retitle(&mut session, "D2");
    assert!(session.is_dirty());
    session.exit_edit_mode(ExitOptions::discard());

    assert_eq!(session.document(), &d1);
    assert_eq!(session.document().title, "D1");
    assert_eq!(session.document().version, 4);
}

#[test]
fn test_dirty_flag_lifecycle() {
    let (mut session, _, _) = setup_session(inline());
    session.enter_edit_mode();
    assert!(!session.is_dirty());

    retitle(&mut session, "x");
    assert!(session.is_dirty());

    let mut persistence = InMemoryPersistence::new();
    session.save(&mut persistence, SaveOptions::default()).unwrap();
    assert!(!session.is_dirty());

    session.mark_dirty();
    assert!(session.is_dirty());
    session.exit_edit_mode(ExitOptions::discard());
    assert!(!session.is_dirty());
}

#[test]
fn test_view_mode_changes_do_not_leak_into_a_new_edit() {
    let (mut session, navigator, _) = setup_session(inline());
    session.move_to_folder(Some("folder-archive".into()));
    assert!(session.is_editing());
    assert!(session.is_dirty());
    session.exit_edit_mode(ExitOptions::discard());
    assert_eq!(session.document().meta.folder_uid.as_deref(), Some("folder-ops"));

    session.apply_system_update(|doc| doc.title = "Renamed elsewhere".into());
    session.tracker().set_dirty(true);
    session.enter_edit_mode();
    assert!(!session.is_dirty());

    let outcome = session.exit_edit_mode(ExitOptions::default());
    assert_eq!(outcome, ExitOutcome::Exited { restored: false });
    assert_eq!(session.document().title, "Renamed elsewhere");
    assert_eq!(navigator.replaced().len(), 2);
}

#[test]
fn test_save_withdraws_pending_confirmation() {
    let (mut session, _, _) = setup_session(inline());
    retitle(&mut session, "first");
    let ExitOutcome::ConfirmationRequested(id) = session.exit_edit_mode(ExitOptions::default())
    else {
        panic!("expected a confirmation request");
    };

    let mut persistence = InMemoryPersistence::new();
    session.save(&mut persistence, SaveOptions::default()).unwrap();
    assert!(session.pending_confirmation().is_none());

    retitle(&mut session, "after save");
    assert_eq!(
        session.resolve_confirmation(id, ConfirmOutcome::Confirmed),
        ExitOutcome::UnknownConfirmation
    );
    assert!(session.is_editing());
    assert_eq!(session.document().title, "after save");
}

#[test]
fn test_title_undo_scenario() {
    let mut session = SceneSession::new(
        Document::new("A"),
        Box::new(scenekeep_session::MemoryNavigator::default()),
        inline(),
    );
    session.enter_edit_mode();
    retitle(&mut session, "B");
    assert!(session.is_dirty());

    let panel = panel_item("panel-1", "CPU");
    let entry = actions::add_item(session.document(), None, 0, panel).unwrap();
    session.perform(entry).unwrap();
    session.select(ElementKey::new("panel-1")).unwrap();

    assert!(session.undo());
    assert!(session.selection().is_some());
    assert!(session.undo());
    assert_eq!(session.document().title, "A");
    assert!(session.is_dirty());
    assert_eq!(session.history().undo_len(), 0);
    assert!(session.selection().is_none());

    let outcome = session.exit_edit_mode(ExitOptions {
        skip_confirm: true,
        ..ExitOptions::default()
    });
    assert_eq!(outcome, ExitOutcome::Exited { restored: true });
    assert_eq!(session.document().title, "A");
}

#[test]
fn test_perform_enters_edit_mode() {
    let (mut session, _, recorder) = setup_session(inline());
    assert!(!session.is_editing());

    retitle(&mut session, "auto");
    assert!(session.is_editing());
    assert!(session.can_discard());
    assert_eq!(
        &recorder.events()[..2],
        &[
            RecordedEvent::EditModeChanged(true),
            RecordedEvent::StateChanged {
                title: "auto".into(),
                user: true
            },
        ]
    );
}

#[test]
fn test_dirty_exit_asks_for_confirmation() {
    let (mut session, _, recorder) = setup_session(inline());
    retitle(&mut session, "changed");

    let ExitOutcome::ConfirmationRequested(id) = session.exit_edit_mode(ExitOptions::default())
    else {
        panic!("expected a confirmation request");
    };
    assert!(session.is_editing());
    assert_eq!(session.pending_confirmation().unwrap().yes_text, "Discard");
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::ConfirmDiscard(_))),
        1
    );

    assert_eq!(
        session.resolve_confirmation(id, ConfirmOutcome::Cancelled),
        ExitOutcome::Cancelled
    );
    assert!(session.is_editing());
    assert_eq!(session.document().title, "changed");

    let ExitOutcome::ConfirmationRequested(second) = session.exit_edit_mode(ExitOptions::default())
    else {
        panic!("expected a second confirmation request");
    };
    assert_ne!(id, second);
    assert_eq!(
        session.resolve_confirmation(id, ConfirmOutcome::Confirmed),
        ExitOutcome::UnknownConfirmation
    );
    assert!(session.pending_confirmation().is_some());

    assert_eq!(
        session.resolve_confirmation(second, ConfirmOutcome::Confirmed),
        ExitOutcome::Exited { restored: true }
    );
    assert_eq!(session.document().title, "Service overview");
    assert_eq!(recorder.count(|e| *e == RecordedEvent::Discarded), 1);
}

#[test]
fn test_clean_exit_keeps_document() {
    let (mut session, navigator, recorder) = setup_session(inline());
    session.enter_edit_mode();
    navigator.push(UrlState::new("/d/svc-overview").with_query("editPanel", "3"));

    let outcome = session.exit_edit_mode(ExitOptions::default());
    assert_eq!(outcome, ExitOutcome::Exited { restored: false });
    assert_eq!(
        navigator.current(),
        UrlState::new("/d/svc-overview/service-overview").with_query("orgId", "1")
    );
    assert_eq!(recorder.count(|e| *e == RecordedEvent::Discarded), 0);
}

#[test]
fn test_discard_returns_to_initial_location() {
    let (mut session, navigator, _) = setup_session(inline());
    retitle(&mut session, "changed");
    assert_eq!(session.initial_url_state(), Some(&edit_url()));
    navigator.push(UrlState::new("/elsewhere").with_query("editview", "links"));

    session.exit_edit_mode(ExitOptions::discard());
    let expected = UrlState::new("/d/svc-overview/service-overview").with_query("orgId", "1");
    assert_eq!(navigator.replaced(), vec![expected]);
}

#[test]
fn test_exit_without_snapshot_is_reported() {
    let (mut session, navigator, recorder) = setup_session(inline());
    assert_eq!(
        session.exit_edit_mode(ExitOptions::discard()),
        ExitOutcome::NothingToDiscard
    );
    assert!(navigator.replaced().is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_save_failure_keeps_edits() {
    let (mut session, _, recorder) = setup_session(inline());
    retitle(&mut session, "unsaved");

    let mut persistence = InMemoryPersistence::new();
    persistence.fail_next(PersistenceError::VersionConflict {
        attempted: 3,
        stored: 5,
    });

    assert!(session.save(&mut persistence, SaveOptions::default()).is_err());
    assert!(session.is_dirty());
    assert_eq!(session.document().version, 3);
    assert_eq!(persistence.save_count(), 0);
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::SaveFailed(_))),
        1
    );

    let result = session.save(&mut persistence, SaveOptions::default()).unwrap();
    assert_eq!(result.version, 4);
    assert_eq!(session.document().version, 4);
    assert!(recorder
        .events()
        .contains(&RecordedEvent::SaveCompleted {
            uid: "svc-overview".into(),
            version: 4
        }));
}

#[test]
fn test_save_uses_folder_override() {
    let (mut session, _, _) = setup_session(inline());
    retitle(&mut session, "moved");
    session.move_to_folder(Some("folder-archive".into()));

    let mut persistence = InMemoryPersistence::new();
    session.save(&mut persistence, SaveOptions::default()).unwrap();

    let requests = persistence.requests();
    assert_eq!(requests[0].folder_uid.as_deref(), Some("folder-archive"));
    assert_eq!(requests[0].base_version, 3);
    assert!(requests[0].save_model.get("meta").is_none());
    assert_eq!(
        session.document().meta.folder_uid.as_deref(),
        Some("folder-archive")
    );
}

#[test]
fn test_changes_after_save_are_against_saved_state() {
    let (mut session, _, _) = setup_session(SessionConfig::new());
    retitle(&mut session, "v2");
    let mut persistence = InMemoryPersistence::new();
    session.save(&mut persistence, SaveOptions::default()).unwrap();

    let entry = actions::change_description(session.document(), "now with docs");
    session.perform(entry).unwrap();

    assert!(session.flush_changes(Duration::from_secs(5)));
    let changes = session.latest_changes().unwrap();
    assert_eq!(changes.diff_count, 1);
    assert_eq!(changes.diffs[0].path.to_string(), "description");
    assert!(!changes.is_new);
}

#[test]
fn test_registry_tracks_active_session() {
    let registry = SessionRegistry::new();
    let (first, _, _) = setup_session(inline());
    let (second, _, _) = setup_session(inline());

    let _outer = first.activate(&registry);
    {
        let _inner = second.activate(&registry);
        assert_eq!(registry.current(), Some(second.id()));
    }
    assert_eq!(registry.current(), Some(first.id()));
}

#[test]
fn test_dropping_session_stops_worker() {
    let (mut session, _, _) = setup_session(SessionConfig::new());
    retitle(&mut session, "x");
    assert!(session.tracker().has_worker());
    drop(session);
}

#[test]
fn test_sample_document_round_trips_through_json() {
    let doc = sample_document();
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}
