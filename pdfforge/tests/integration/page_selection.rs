//! Range parsing and click-order selection, driven through the editor.

use pdfforge::document::{ContentRef, SourceDocument};
use pdfforge::selection::{SelectionMode, parse_page_range};
use pdfforge::session::SplitEditor;
use rstest::rstest;

use crate::common::numbered_pdf;

fn source(pages: usize) -> SourceDocument {
    let bytes = numbered_pdf(100, pages);
    SourceDocument::new("doc.pdf", bytes.len() as u64, pages, ContentRef::from_bytes(bytes))
}

#[rstest]
#[case("1-3,2,5", 10, vec![1, 2, 3, 5])]
#[case(" 7 , 2-3 ", 10, vec![2, 3, 7])]
#[case("9-12", 10, vec![9, 10])]
#[case("0,1", 3, vec![1])]
#[case("a-b,2,-,3-", 5, vec![2])]
#[case("4-2", 5, vec![])]
fn test_range_is_sorted_deduplicated_and_clamped(
    #[case] expression: &str,
    #[case] max_page: usize,
    #[case] expected: Vec<u32>,
) {
    let selection = parse_page_range(expression, max_page);
    assert_eq!(selection.pages(), expected.as_slice());
    assert_eq!(selection.mode(), SelectionMode::Range);
}

#[test]
fn test_clicks_keep_their_order() {
    let mut editor = SplitEditor::new(source(5));
    for page in [3, 1, 2] {
        editor.toggle(page).unwrap();
    }

    assert_eq!(editor.selection().pages(), &[3, 1, 2]);
    assert_eq!(editor.selection().mode(), SelectionMode::Click);
    assert_eq!(editor.selection_rank(3), Some(1));
    assert_eq!(editor.selection_rank(2), Some(3));
    assert_eq!(editor.selection_rank(5), None);
}

#[test]
fn test_unclick_removes_without_reordering_the_rest() {
    let mut editor = SplitEditor::new(source(5));
    for page in [4, 2, 5, 2] {
        editor.toggle(page).unwrap();
    }

    assert_eq!(editor.selection().pages(), &[4, 5]);
}

#[test]
fn test_grid_tracks_the_selection() {
    let mut editor = SplitEditor::new(source(4));
    editor.apply_range("2-3");

    let selected: Vec<u32> = editor
        .grid()
        .snapshot()
        .into_iter()
        .filter(|entry| entry.selected)
        .map(|entry| entry.page_number)
        .collect();
    assert_eq!(selected, vec![2, 3]);

    editor.toggle_all();
    assert_eq!(editor.selection().len(), 4);
    editor.toggle_all();
    assert!(editor.selection().is_empty());
    assert!(editor.grid().snapshot().iter().all(|entry| !entry.selected));
}

#[test]
fn test_range_replaces_clicked_pages() {
    let mut editor = SplitEditor::new(source(6));
    editor.toggle(6).unwrap();
    editor.toggle(1).unwrap();

    editor.apply_range("2,4");
    assert_eq!(editor.selection().pages(), &[2, 4]);
}

#[test]
fn test_toggle_outside_document_is_rejected() {
    let mut editor = SplitEditor::new(source(2));
    assert!(editor.toggle(0).is_err());
    assert!(editor.toggle(3).is_err());
    assert!(editor.selection().is_empty());
}
