//! Active save session tests.
//!
//! Tests cover: write-back on mutation, the load guard, stale load
//! responses, failure handling, rename and close.

mod common;

use common::{Call, RecordingBackend};
use planner_core::{
    backend::SaveBackend,
    error::EditorError,
    error_channel::ErrorChannel,
    save::{FacilityKind, SaveDocument},
    session::{ActiveSession, LoadOutcome},
};
use std::rc::Rc;

fn session_with(backend: &Rc<RecordingBackend>) -> (ActiveSession, Rc<ErrorChannel>) {
    let errors = Rc::new(ErrorChannel::new());
    let session = ActiveSession::new(backend.clone(), errors.clone());
    (session, errors)
}

fn with_drones(drones: u32) -> SaveDocument {
    SaveDocument { drones, ..SaveDocument::default() }
}

#[test]
fn reading_before_any_load_is_empty_not_an_error() {
    let backend = Rc::new(RecordingBackend::new());
    let (mut session, errors) = session_with(&backend);

    assert!(session.name().is_none());
    assert!(session.document().is_none());
    assert!(!session.update(|doc| doc.drones = 5), "nothing to mutate");
    assert!(backend.updates().is_empty());
    assert!(errors.is_empty());
}

/// Installing a loaded document is not an edit and must not re-stamp it.
#[test]
fn loading_never_writes_back() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, _) = session_with(&backend);

    assert_eq!(session.load("alpha"), LoadOutcome::Installed);

    assert!(backend.updates().is_empty(), "load echoed a write: {:?}", backend.calls());
    assert_eq!(session.name(), Some("alpha"));
    assert!(!session.is_loading());
}

#[test]
fn every_mutation_writes_back_under_the_loaded_name() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, _) = session_with(&backend);
    session.load("alpha");

    session.update(|doc| doc.drones = 10);
    session.update(|doc| {
        doc.layout.set_level(FacilityKind::Dormitory, 0, 2);
    });

    let updates = backend.updates();
    assert_eq!(updates.len(), 2, "one write per mutation, no coalescing");
    assert!(updates.iter().all(|(name, _)| name == "alpha"));
    assert_eq!(updates[1].1.drones, 10);
    assert_eq!(updates[1].1.layout.dorm[0].level, 2);
}

#[test]
fn set_document_replaces_and_writes() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, _) = session_with(&backend);
    assert!(!session.set_document(with_drones(1)), "no save loaded yet");

    session.load("alpha");
    assert!(session.set_document(with_drones(7)));
    assert_eq!(backend.updates(), vec![("alpha".to_string(), with_drones(7))]);
}

/// Load A, edit A, then switch to B. No write for A may happen once
/// B's load has begun, even if the UI mutates during the transition.
#[test]
fn switching_saves_never_echoes_to_the_previous_save() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha", "beta"]));
    backend.insert("beta", with_drones(3));
    let (mut session, _) = session_with(&backend);

    session.load("alpha");
    session.update(|doc| doc.drones = 1);
    let writes_before_switch = backend.updates().len();

    let ticket = session.begin_load("beta");
    assert!(session.is_loading());
    session.update(|doc| doc.drones = 99);
    assert_eq!(
        backend.updates().len(),
        writes_before_switch,
        "mutation during load must not be written"
    );

    let response = backend.get_save("beta");
    assert_eq!(session.complete_load(ticket, response), LoadOutcome::Installed);

    let late_writes: Vec<_> = backend.updates().into_iter().skip(writes_before_switch).collect();
    assert!(late_writes.is_empty(), "unexpected writes after switch: {late_writes:?}");
    assert_eq!(session.name(), Some("beta"));
    assert_eq!(session.document().map(|d| d.drones), Some(3));

    session.update(|doc| doc.drones = 4);
    assert_eq!(backend.updates().last().map(|(n, _)| n.as_str()), Some("beta"));
}

/// Responses arriving out of order: only the latest request is installed.
#[test]
fn stale_load_responses_are_discarded() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha", "beta"]));
    backend.insert("alpha", with_drones(1));
    backend.insert("beta", with_drones(2));
    let (mut session, _) = session_with(&backend);

    let first = session.begin_load("alpha");
    let second = session.begin_load("beta");

    let beta = backend.get_save("beta");
    assert_eq!(session.complete_load(second, beta), LoadOutcome::Installed);

    let alpha = backend.get_save("alpha");
    assert_eq!(session.complete_load(first, alpha), LoadOutcome::Stale);

    assert_eq!(session.name(), Some("beta"));
    assert_eq!(session.document().map(|d| d.drones), Some(2));
    assert!(!session.is_loading());
}

#[test]
fn failed_load_keeps_prior_state_and_reports() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, errors) = session_with(&backend);
    session.load("alpha");

    assert_eq!(session.load("missing"), LoadOutcome::Failed);

    assert_eq!(session.name(), Some("alpha"));
    assert!(session.document().is_some());
    assert!(!session.is_loading(), "guard released after failure");
    assert_eq!(errors.current().as_deref(), Some("Save 'missing' not found"));

    // Still attached to alpha: edits keep writing there.
    session.update(|doc| doc.drones = 2);
    assert_eq!(backend.updates().last().map(|(n, _)| n.as_str()), Some("alpha"));
}

#[test]
fn successful_load_renames_window_best_effort() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, errors) = session_with(&backend);

    backend.clear_calls();
    session.load("alpha");
    assert_eq!(
        backend.calls(),
        vec![Call::Get("alpha".into()), Call::Window(Some("alpha".into()))]
    );
    assert!(errors.is_empty());
}

#[test]
fn write_back_failure_is_routed_not_raised() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, errors) = session_with(&backend);
    session.load("alpha");

    backend.fail_with("disk full");
    assert!(session.update(|doc| doc.drones = 3));

    assert_eq!(errors.current().as_deref(), Some("disk full"));
    assert_eq!(session.document().map(|d| d.drones), Some(3), "local edit kept");
}

#[test]
fn rename_keeps_session_attached() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha", "beta"]));
    let (mut session, errors) = session_with(&backend);
    session.load("alpha");

    assert!(!session.rename("beta"), "name taken");
    assert_eq!(session.name(), Some("alpha"));
    assert_eq!(
        errors.current(),
        Some(EditorError::DuplicateName.to_string())
    );

    assert!(session.rename("gamma"));
    session.update(|doc| doc.drones = 8);
    assert_eq!(backend.updates().last().map(|(n, _)| n.as_str()), Some("gamma"));
}

#[test]
fn close_invalidates_pending_load() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    let (mut session, _) = session_with(&backend);

    let ticket = session.begin_load("alpha");
    session.close();
    let response = backend.get_save("alpha");

    assert_eq!(session.complete_load(ticket, response), LoadOutcome::Stale);
    assert!(session.document().is_none());
    assert!(!session.is_loading());
    assert_eq!(backend.calls().last(), Some(&Call::Get("alpha".into())));
}

#[test]
fn window_rename_failure_does_not_undo_the_load() {
    let backend = Rc::new(RecordingBackend::with_saves(&["alpha"]));
    backend.insert("alpha", with_drones(6));
    let (mut session, errors) = session_with(&backend);

    let ticket = session.begin_load("alpha");
    let response = backend.get_save("alpha");
    // The next backend call is the window rename.
    backend.fail_with("window gone");

    assert_eq!(session.complete_load(ticket, response), LoadOutcome::Installed);
    assert_eq!(session.name(), Some("alpha"));
    assert_eq!(session.document().map(|d| d.drones), Some(6));
    assert!(!session.is_loading());
    assert_eq!(errors.current().as_deref(), Some("window gone"));
    assert_eq!(backend.calls().last(), Some(&Call::Window(Some("alpha".into()))));
}
