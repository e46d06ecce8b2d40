//! End-to-end split and merge, checking page order in the written files.

use pdfforge::PdfForgeError;
use pdfforge::document::OperationDetail;
use pdfforge::history::MemoryHistoryStore;
use pdfforge::io::PdfReader;
use pdfforge::transform::TransformEngine;
use std::sync::Arc;

use crate::common::{numbered_pdf, page_widths, pdf_upload, workspace};

#[tokio::test]
async fn test_split_writes_pages_in_click_order() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws.upload(pdf_upload("report.pdf", numbered_pdf(100, 5))).await.unwrap();

    let mut editor = ws.open_editor(doc.id()).unwrap();
    for page in [3, 1, 2] {
        editor.toggle(page).unwrap();
    }
    let outcome = ws.split(&editor).await.unwrap();

    let written = tokio::fs::read(&outcome.artifact.output_path).await.unwrap();
    assert_eq!(page_widths(&written), vec![103, 101, 102]);
    assert_eq!(outcome.processed.result_page_count, 3);
    assert_eq!(outcome.processed.file_name, "split_report.pdf");
    assert_eq!(
        outcome.processed.detail,
        OperationDetail::Split { pages: vec![3, 1, 2] }
    );
}

#[tokio::test]
async fn test_split_of_a_path_like_upload_name_stays_in_the_output_dir() {
    let (dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws
        .upload(pdf_upload("nested/../../report.pdf", numbered_pdf(100, 2)))
        .await
        .unwrap();

    let mut editor = ws.open_editor(doc.id()).unwrap();
    editor.toggle(2).unwrap();
    let outcome = ws.split(&editor).await.unwrap();

    assert_eq!(outcome.processed.file_name, "split_report.pdf");
    assert_eq!(outcome.artifact.output_path, dir.path().join("split_report.pdf"));
}

#[tokio::test]
async fn test_split_with_range_is_ascending() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws.upload(pdf_upload("a.pdf", numbered_pdf(100, 6))).await.unwrap();

    let mut editor = ws.open_editor(doc.id()).unwrap();
    editor.apply_range("5-6,2");
    editor.set_output_name("excerpt").unwrap();
    let outcome = ws.split(&editor).await.unwrap();

    assert!(outcome.artifact.output_path.ends_with("excerpt.pdf"));
    let written = tokio::fs::read(&outcome.artifact.output_path).await.unwrap();
    assert_eq!(page_widths(&written), vec![102, 105, 106]);
}

#[tokio::test]
async fn test_split_output_reparses_with_selected_page_count() {
    let bytes = numbered_pdf(100, 8);
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws.upload(pdf_upload("eight.pdf", bytes)).await.unwrap();

    let mut editor = ws.open_editor(doc.id()).unwrap();
    editor.apply_range("1,4,8");
    let outcome = ws.split(&editor).await.unwrap();

    let written = tokio::fs::read(&outcome.artifact.output_path).await.unwrap();
    let reparsed = PdfReader::new().parse("out.pdf", written.into()).await.unwrap();
    assert_eq!(reparsed.page_count, 3);
}

#[tokio::test]
async fn test_selecting_every_page_round_trips_the_page_count() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws.upload(pdf_upload("whole.pdf", numbered_pdf(100, 4))).await.unwrap();

    let mut editor = ws.open_editor(doc.id()).unwrap();
    editor.toggle_all();
    let outcome = ws.split(&editor).await.unwrap();

    assert_eq!(outcome.processed.result_page_count, doc.page_count());
    let written = tokio::fs::read(&outcome.artifact.output_path).await.unwrap();
    assert_eq!(page_widths(&written), vec![101, 102, 103, 104]);
}

#[tokio::test]
async fn test_split_with_nothing_selected_fails_without_side_effects() {
    let (dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws.upload(pdf_upload("a.pdf", numbered_pdf(100, 2))).await.unwrap();
    let editor = ws.open_editor(doc.id()).unwrap();

    let err = ws.split(&editor).await.unwrap_err();
    assert!(matches!(err, PdfForgeError::EmptySelection));
    assert_eq!(ws.session().processed().len(), 0);
    assert_eq!(ws.guest_allowance().remaining, 3);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_merge_concatenates_in_plan_order() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let first = ws.upload(pdf_upload("first.pdf", numbered_pdf(100, 2))).await.unwrap();
    let second = ws.upload(pdf_upload("second.pdf", numbered_pdf(200, 3))).await.unwrap();

    let plan = ws.plan_merge(&[first.id(), second.id()]).unwrap();
    let planned_name = plan.output_name().to_string();
    let outcome = ws.merge(&plan).await.unwrap();

    let written = tokio::fs::read(&outcome.artifact.output_path).await.unwrap();
    assert_eq!(page_widths(&written), vec![101, 102, 201, 202, 203]);
    assert_eq!(outcome.processed.result_page_count, 5);
    assert!(outcome.processed.file_name.starts_with("merged_"));
    // The name shown while planning is the one written.
    assert_eq!(outcome.processed.file_name, planned_name);
    assert!(outcome.artifact.output_path.ends_with(&planned_name));
}

#[tokio::test]
async fn test_reordered_plan_changes_output_order() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let a = ws.upload(pdf_upload("a.pdf", numbered_pdf(100, 1))).await.unwrap();
    let b = ws.upload(pdf_upload("b.pdf", numbered_pdf(200, 1))).await.unwrap();
    let c = ws.upload(pdf_upload("c.pdf", numbered_pdf(300, 2))).await.unwrap();

    let mut plan = ws.plan_merge(&[a.id(), b.id(), c.id()]).unwrap();
    plan.move_item(2, 0).unwrap();
    plan.set_output_name("bundle.PDF").unwrap();
    let outcome = ws.merge(&plan).await.unwrap();

    assert!(outcome.artifact.output_path.ends_with("bundle.PDF"));
    let written = tokio::fs::read(&outcome.artifact.output_path).await.unwrap();
    assert_eq!(page_widths(&written), vec![301, 302, 101, 201]);
}

#[tokio::test]
async fn test_merge_of_one_document_is_rejected() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let only = ws.upload(pdf_upload("only.pdf", numbered_pdf(100, 3))).await.unwrap();

    let plan = ws.plan_merge(&[only.id()]).unwrap();
    let err = ws.merge(&plan).await.unwrap_err();
    assert!(matches!(err, PdfForgeError::InsufficientInput { count: 1 }));
    assert_eq!(ws.guest_allowance().remaining, 3);
}

#[tokio::test]
async fn test_engine_merge_names_the_corrupt_source() {
    use pdfforge::document::{ContentRef, SourceDocument};

    let good = numbered_pdf(100, 1);
    let sources = vec![
        SourceDocument::new("good.pdf", good.len() as u64, 1, ContentRef::from_bytes(good)),
        SourceDocument::new("bad.pdf", 4, 1, ContentRef::from_bytes(b"%PDF".to_vec())),
    ];

    match TransformEngine::new().merge(&sources).await {
        Err(PdfForgeError::CorruptSource { name, .. }) => assert_eq!(name, "bad.pdf"),
        other => panic!("expected CorruptSource, got {other:?}"),
    }
}
