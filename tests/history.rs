use egui::{Color32, pos2};
use scene_editor::element::factory;
use scene_editor::history::{History, RestoreDirection};
use scene_editor::{Background, EditorError, Fill, Scene, SceneStore, ShapeKind, Snapshot};

mod common;

fn store() -> SceneStore {
    SceneStore::new(Scene::new(200, 100, Background::default()).unwrap())
}

fn add_square(store: &mut SceneStore, x: f32) {
    store
        .add_object(factory::create_shape(pos2(x, 50.0), ShapeKind::Rectangle, 10.0, 10.0, Fill::Solid(Color32::RED)))
        .unwrap();
}

#[test]
fn test_cannot_undo_after_initialize() {
    common::init_logger();
    let mut history = History::new();
    history.initialize_from(store().scene()).unwrap();

    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.past_len(), 1);
    assert!(history.begin_undo().unwrap().is_none());
    assert!(history.begin_redo().unwrap().is_none());
}

#[test]
fn test_identical_records_coalesce() {
    let mut store = store();
    let mut history = History::new();
    history.initialize_from(store.scene()).unwrap();

    // Nothing changed since initialize
    assert!(!history.record_scene(store.scene()).unwrap());

    add_square(&mut store, 20.0);
    assert!(history.record_scene(store.scene()).unwrap());
    assert!(!history.record_scene(store.scene()).unwrap());
    assert_eq!(history.past_len(), 2);
}

#[test]
fn test_record_clears_future_and_past_only_grows() {
    let mut store = store();
    let mut history = History::new();
    history.initialize_from(store.scene()).unwrap();

    let mut last_len = history.past_len();
    for x in [20.0, 40.0, 60.0] {
        add_square(&mut store, x);
        history.record_scene(store.scene()).unwrap();
        assert!(history.past_len() >= last_len);
        last_len = history.past_len();
    }

    let ticket = history.begin_undo().unwrap().unwrap();
    history.finish_restore(ticket);
    assert!(history.can_redo());

    add_square(&mut store, 80.0);
    assert!(history.record_scene(store.scene()).unwrap());
    assert_eq!(history.future_len(), 0);
}

#[test]
fn test_undo_then_redo_returns_to_the_same_snapshot() {
    let mut store = store();
    let mut history = History::new();
    history.initialize_from(store.scene()).unwrap();
    add_square(&mut store, 20.0);
    history.record_scene(store.scene()).unwrap();
    add_square(&mut store, 40.0);
    history.record_scene(store.scene()).unwrap();

    let before = history.current().cloned().unwrap();

    let undo = history.begin_undo().unwrap().unwrap();
    assert_eq!(undo.direction(), RestoreDirection::Undo);
    assert_ne!(undo.snapshot(), &before);
    history.finish_restore(undo);

    let redo = history.begin_redo().unwrap().unwrap();
    assert_eq!(redo.direction(), RestoreDirection::Redo);
    assert_eq!(redo.snapshot(), &before);
    history.finish_restore(redo);

    assert_eq!(history.current(), Some(&before));
    assert!(!history.can_redo());
}

#[test]
fn test_restore_guard_rejects_reentry() {
    let mut store = store();
    let mut history = History::new();
    history.initialize_from(store.scene()).unwrap();
    add_square(&mut store, 20.0);
    history.record_scene(store.scene()).unwrap();

    let ticket = history.begin_undo().unwrap().unwrap();
    assert!(history.is_restoring());

    // The restored scene must not be recorded, and no second restore may start
    let restored = ticket.snapshot().restore().unwrap();
    assert!(matches!(history.record_scene(&restored), Err(EditorError::RestoreInFlight)));
    assert!(matches!(history.begin_redo(), Err(EditorError::RestoreInFlight)));
    assert!(matches!(history.begin_undo(), Err(EditorError::RestoreInFlight)));
    assert_eq!(history.past_len(), 1);
    assert_eq!(history.future_len(), 1);

    history.finish_restore(ticket);
    assert!(!history.is_restoring());
    assert!(history.can_redo());
}

#[test]
fn test_abort_puts_the_entry_back() {
    let mut store = store();
    let mut history = History::new();
    history.initialize_from(store.scene()).unwrap();
    add_square(&mut store, 20.0);
    history.record_scene(store.scene()).unwrap();
    let current = history.current().cloned();

    let ticket = history.begin_undo().unwrap().unwrap();
    history.abort_restore(ticket);
    assert_eq!(history.current().cloned(), current);
    assert_eq!((history.past_len(), history.future_len()), (2, 0));

    let undo = history.begin_undo().unwrap().unwrap();
    history.finish_restore(undo);
    let redo = history.begin_redo().unwrap().unwrap();
    history.abort_restore(redo);
    assert_eq!((history.past_len(), history.future_len()), (1, 1));
    assert!(!history.is_restoring());
}

#[test]
fn test_dropped_guard_rolls_back() {
    let mut store = store();
    let mut history = History::new();
    history.initialize_from(store.scene()).unwrap();
    add_square(&mut store, 20.0);
    history.record_scene(store.scene()).unwrap();
    let current = history.current().cloned();

    let ticket = history.begin_undo().unwrap().unwrap();
    drop(history.guard(ticket));
    assert!(!history.is_restoring());
    assert_eq!(history.current().cloned(), current);
    assert_eq!((history.past_len(), history.future_len()), (2, 0));

    // A finished guard keeps the step
    let ticket = history.begin_undo().unwrap().unwrap();
    history.guard(ticket).finish();
    assert_eq!((history.past_len(), history.future_len()), (1, 1));

    add_square(&mut store, 40.0);
    assert!(history.record_scene(store.scene()).unwrap());
}

#[test]
fn test_snapshot_round_trip_is_lossless() {
    let mut store = store();
    add_square(&mut store, 20.0);
    store
        .add_object(factory::create_gradient_line(
            pos2(5.0, 5.0),
            pos2(80.0, 40.0),
            6.0,
            Default::default(),
        ))
        .unwrap();

    let snapshot = Snapshot::capture(store.scene()).unwrap();
    let restored = snapshot.restore().unwrap();
    assert_eq!(&restored, store.scene());
    assert_eq!(Snapshot::capture(&restored).unwrap(), snapshot);
}
