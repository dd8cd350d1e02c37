use std::rc::Rc;

use changeview::core::*;
use pretty_assertions::assert_eq;

fn changes(paths: &[&str]) -> Vec<SharedChange> {
    paths
        .iter()
        .map(|p| ChangeRecord::new(*p, ChangeState::Modified).shared())
        .collect()
}

fn paths(changes: &[SharedChange]) -> Vec<String> {
    let mut out: Vec<String> = changes.iter().map(|c| c.path.clone()).collect();
    out.sort();
    out
}

fn tree_view(input: &[SharedChange]) -> ChangeCollectionView {
    let mut view = ChangeCollectionView::new(ViewSettings::new(ViewMode::Tree, false));
    view.set_changes(input.to_vec());
    view
}

#[test]
fn clicking_a_folder_selects_every_file_under_it() {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt"]);
    let mut view = tree_view(&input);

    // rows: a/, a/x.txt, a/y.txt, b.txt
    assert!(view.row(0).unwrap().is_folder);
    view.select_row(0).unwrap();

    assert_eq!(paths(view.selected_changes()), vec!["a/x.txt", "a/y.txt"]);
    // The folder row itself is what the model holds.
    assert!(view.row(0).unwrap().selected);
    assert!(!view.row(1).unwrap().selected);
}

#[test]
fn pushing_a_root_leaf_marks_no_folder() {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt"]);
    let mut view = tree_view(&input);

    view.set_selected_changes(vec![Rc::clone(&input[2])]);

    let selected: Vec<String> = view
        .rows()
        .into_iter()
        .filter(|r| r.selected)
        .map(|r| r.full_path)
        .collect();
    assert_eq!(selected, vec!["b.txt"]);
}

#[test]
fn pushing_all_children_does_not_select_the_folder() {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt"]);
    let mut view = tree_view(&input);

    view.set_selected_changes(vec![Rc::clone(&input[0]), Rc::clone(&input[1])]);

    let rows = view.rows();
    assert!(!rows[0].selected, "folder must stay unselected");
    assert!(rows[1].selected);
    assert!(rows[2].selected);
    assert!(!rows[3].selected);
}

#[test]
fn nested_folder_and_overlapping_leaf_are_deduplicated() {
    let input = changes(&["src/core/a.rs", "src/core/b.rs", "src/lib.rs"]);
    let mut view = tree_view(&input);

    // rows: src/, src/core/, a.rs, b.rs, lib.rs
    view.select_row(1).unwrap();
    view.toggle_row(2).unwrap();
    view.toggle_row(2).unwrap();
    view.toggle_row(0).unwrap();

    assert_eq!(
        paths(view.selected_changes()),
        vec!["src/core/a.rs", "src/core/b.rs", "src/lib.rs"]
    );
    assert_eq!(view.selected_changes().len(), 3);
}

#[test]
fn echoing_the_published_value_keeps_the_folder_row() {
    let input = changes(&["a/x.txt", "a/y.txt", "b.txt"]);
    let mut view = tree_view(&input);
    let rx = view.subscribe();

    view.select_row(0).unwrap();
    let published = match rx.try_recv().unwrap() {
        ViewEvent::SelectionChanged(list) => list,
        other => panic!("unexpected event {other:?}"),
    };

    // A two-way binding writes the value straight back.
    view.set_selected_changes(published);

    assert!(view.row(0).unwrap().selected);
    assert!(rx.try_recv().is_err());
    assert_eq!(view.sync_stats().pushes, 1, "only the initial rebuild pushed");
}
