use std::rc::Rc;

use changeview::core::*;

fn changes(paths: &[&str]) -> Vec<SharedChange> {
    paths
        .iter()
        .map(|p| ChangeRecord::new(*p, ChangeState::Modified).shared())
        .collect()
}

fn setup(mode: ViewMode) -> (ChangeCollectionView, Vec<SharedChange>) {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt", "c/d/e.txt"]);
    let mut view = ChangeCollectionView::new(ViewSettings::new(mode, false));
    view.set_changes(input.clone());
    (view, input)
}

#[test]
fn push_raises_one_model_notification_and_no_pull() {
    for mode in [ViewMode::Tree, ViewMode::List, ViewMode::Grid] {
        let (mut view, input) = setup(mode);
        let before = view.sync_stats();
        let revision = view.projection().unwrap().selection_revision();

        view.set_selected_changes(vec![Rc::clone(&input[0]), Rc::clone(&input[3])]);

        let after = view.sync_stats();
        assert_eq!(after.pushes, before.pushes + 1, "{mode:?}");
        assert_eq!(after.notifications, before.notifications + 1, "{mode:?}");
        assert_eq!(after.suppressed_echoes, before.suppressed_echoes + 1, "{mode:?}");
        assert_eq!(after.pulls, before.pulls, "{mode:?}");
        assert_eq!(
            view.projection().unwrap().selection_revision(),
            revision + 1,
            "{mode:?}"
        );
        assert_eq!(view.sync_state(), SyncState::Idle);
    }
}

#[test]
fn push_does_not_publish_back_to_the_caller() {
    let (mut view, input) = setup(ViewMode::List);
    let rx = view.subscribe();

    view.set_selected_changes(vec![Rc::clone(&input[1])]);

    assert!(rx.try_recv().is_err());
    assert_eq!(view.selected_changes().len(), 1);
}

#[test]
fn repeated_identical_push_is_a_no_op() {
    let (mut view, input) = setup(ViewMode::Tree);
    view.set_selected_changes(vec![Rc::clone(&input[2])]);
    let stats = view.sync_stats();
    let revision = view.projection().unwrap().selection_revision();

    view.set_selected_changes(vec![Rc::clone(&input[2])]);

    assert_eq!(view.sync_stats(), stats);
    assert_eq!(view.projection().unwrap().selection_revision(), revision);
}

#[test]
fn user_click_pulls_exactly_once() {
    let (mut view, _input) = setup(ViewMode::List);
    let rx = view.subscribe();
    let before = view.sync_stats();

    view.select_row(2).unwrap();

    let after = view.sync_stats();
    assert_eq!(after.pulls, before.pulls + 1);
    assert_eq!(after.pushes, before.pushes);
    assert!(matches!(rx.try_recv(), Ok(ViewEvent::SelectionChanged(list)) if list.len() == 1));
    assert!(rx.try_recv().is_err());
}

#[test]
fn clicking_the_already_selected_row_publishes_nothing() {
    let (mut view, _input) = setup(ViewMode::Grid);
    view.select_row(0).unwrap();
    let rx = view.subscribe();
    let stats = view.sync_stats();

    view.select_row(0).unwrap();

    assert_eq!(view.sync_stats(), stats);
    assert!(rx.try_recv().is_err());
}

#[test]
fn dropped_subscribers_are_pruned() {
    let (mut view, _input) = setup(ViewMode::List);
    let rx = view.subscribe();
    drop(rx);
    let live = view.subscribe();

    view.select_row(1).unwrap();

    assert!(live.try_recv().is_ok());
}
