use std::rc::Rc;

use changeview::core::*;

fn changes(paths: &[&str]) -> Vec<SharedChange> {
    paths
        .iter()
        .map(|p| ChangeRecord::new(*p, ChangeState::Modified).shared())
        .collect()
}

fn selected_rows(view: &ChangeCollectionView) -> usize {
    view.rows().iter().filter(|r| r.selected).count()
}

#[test]
fn second_click_replaces_the_first_in_every_mode() {
    for mode in [ViewMode::Tree, ViewMode::List, ViewMode::Grid] {
        let mut view = ChangeCollectionView::new(ViewSettings::new(mode, true));
        view.set_changes(changes(&["x.txt", "y.txt", "z.txt"]));

        view.select_row(0).unwrap();
        view.toggle_row(1).unwrap();
        assert_eq!(selected_rows(&view), 1, "{mode:?}");
        assert_eq!(view.selected_changes().len(), 1, "{mode:?}");
        assert_eq!(view.selected_changes()[0].path, "y.txt", "{mode:?}");

        view.extend_selection_to(2).unwrap();
        assert_eq!(selected_rows(&view), 1, "{mode:?}");
        assert_eq!(view.selected_changes()[0].path, "z.txt", "{mode:?}");
    }
}

#[test]
fn select_all_is_ignored() {
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::List, true));
    view.set_changes(changes(&["x.txt", "y.txt"]));
    view.select_row(1).unwrap();

    view.select_all();

    assert_eq!(selected_rows(&view), 1);
    assert_eq!(view.selected_changes()[0].path, "y.txt");
}

#[test]
fn toggling_the_selected_row_clears_it() {
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::List, true));
    view.set_changes(changes(&["x.txt", "y.txt"]));
    view.select_row(0).unwrap();

    view.toggle_row(0).unwrap();

    assert!(view.selected_changes().is_empty());
}

#[test]
fn push_of_several_keeps_first_in_row_order() {
    let input = changes(&["a/x.txt", "b.txt", "a/y.txt"]);
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::Tree, true));
    view.set_changes(input.clone());
    let rx = view.subscribe();

    view.set_selected_changes(vec![Rc::clone(&input[1]), Rc::clone(&input[2])]);

    // Tree rows: a/, a/x.txt, a/y.txt, b.txt, so a/y.txt comes first.
    assert_eq!(view.selected_changes().len(), 1);
    assert_eq!(view.selected_changes()[0].path, "a/y.txt");
    assert!(matches!(rx.try_recv(), Ok(ViewEvent::SelectionChanged(list)) if list.len() == 1));
}

#[test]
fn switching_to_single_select_trims_the_selection() {
    let input = changes(&["x.txt", "y.txt", "z.txt"]);
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::List, false));
    view.set_changes(input.clone());
    view.select_all();
    assert_eq!(view.selected_changes().len(), 3);

    view.set_single_select(true);

    assert_eq!(view.selected_changes().len(), 1);
    assert_eq!(view.selected_changes()[0].path, "x.txt");
    assert_eq!(selected_rows(&view), 1);
}

#[test]
fn folder_click_publishes_a_single_change() {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt"]);
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::Tree, true));
    view.set_changes(input.clone());
    let rx = view.subscribe();

    // rows: a/, a/x.txt, a/y.txt, b.txt
    view.select_row(0).unwrap();

    assert!(view.row(0).unwrap().selected);
    assert_eq!(view.selected_changes().len(), 1);
    assert!(Rc::ptr_eq(&view.selected_changes()[0], &input[0]));
    assert!(matches!(rx.try_recv(), Ok(ViewEvent::SelectionChanged(list)) if list.len() == 1));
}

#[test]
fn folder_click_survives_mode_switch_and_refresh() {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt"]);
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::Tree, true));
    view.set_changes(input.clone());
    view.select_row(0).unwrap();
    let published = view.selected_changes().to_vec();
    let rx = view.subscribe();

    view.set_view_mode(ViewMode::List);
    assert!(same_changes(view.selected_changes(), &published));
    assert_eq!(selected_rows(&view), 1);

    view.set_changes(input.clone());
    assert!(same_changes(view.selected_changes(), &published));

    view.set_view_mode(ViewMode::Tree);
    view.set_changes(input);
    assert!(same_changes(view.selected_changes(), &published));
    assert_eq!(selected_rows(&view), 1);

    assert!(rx.try_recv().is_err(), "selected changes were never republished");
}
