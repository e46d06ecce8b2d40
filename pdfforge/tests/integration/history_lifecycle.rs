//! Identity-dependent recording, listing and deletion of results.

use pdfforge::document::OperationKind;
use pdfforge::history::{HistoryStore, MemoryHistoryStore};
use pdfforge::identity::OwnerId;
use pdfforge::workspace::{RemoteDeletion, Workspace};
use pdfforge::{Config, PdfForgeError};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{numbered_pdf, pdf_upload, workspace};

async fn split_first_page(ws: &mut Workspace, name: &str) -> uuid::Uuid {
    let doc = ws.upload(pdf_upload(name, numbered_pdf(100, 2))).await.unwrap();
    let mut editor = ws.open_editor(doc.id()).unwrap();
    editor.toggle(1).unwrap();
    ws.split(&editor).await.unwrap().processed.id
}

#[tokio::test]
async fn test_guest_results_stay_in_the_session() {
    let store = Arc::new(MemoryHistoryStore::new());
    let (_dir, mut ws) = workspace(store.clone(), 3);

    let id = split_first_page(&mut ws, "a.pdf").await;

    assert!(store.is_empty().await);
    let view = ws.history().await;
    assert!(view.warning.is_none());
    assert_eq!(view.entries.len(), 1);
    assert_eq!(view.entries[0].id, id);
    assert_eq!(view.entries[0].user_id, None);

    let outcome = ws.delete_processed(id).await.unwrap();
    assert!(outcome.removed_locally);
    assert!(matches!(outcome.remote, RemoteDeletion::Skipped));
    assert!(ws.history().await.entries.is_empty());
}

#[tokio::test]
async fn test_guest_is_stopped_at_the_limit() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 2);

    split_first_page(&mut ws, "a.pdf").await;
    split_first_page(&mut ws, "b.pdf").await;
    assert!(!ws.guest_allowance().allowed);

    let doc = ws.upload(pdf_upload("c.pdf", numbered_pdf(100, 2))).await.unwrap();
    let mut editor = ws.open_editor(doc.id()).unwrap();
    editor.toggle(2).unwrap();
    let err = ws.split(&editor).await.unwrap_err();
    assert!(matches!(err, PdfForgeError::GuestLimitReached { limit: 2 }));

    // Signing in lifts the limit.
    ws.identity().sign_in(OwnerId::new("alice"));
    assert!(ws.split(&editor).await.is_ok());
}

#[tokio::test]
async fn test_owner_results_are_mirrored_and_listed_newest_first() {
    let store = Arc::new(MemoryHistoryStore::new());
    let (_dir, mut ws) = workspace(store.clone(), 3);
    ws.identity().sign_in(OwnerId::new("alice"));

    let older = split_first_page(&mut ws, "older.pdf").await;
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newer = split_first_page(&mut ws, "newer.pdf").await;

    let view = ws.history().await;
    assert!(view.warning.is_none());
    let ids: Vec<_> = view.entries.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer, older]);
    assert!(view.entries.iter().all(|r| r.file_type == OperationKind::Split));
    assert_eq!(view.entries[0].operation_data.pages, Some(vec![1]));

    // Another user sees none of them.
    let bob = store.list_records(&OwnerId::new("bob")).await.unwrap();
    assert!(bob.is_empty());
}

#[tokio::test]
async fn test_owner_delete_reaches_the_store() {
    let store = Arc::new(MemoryHistoryStore::new());
    let (_dir, mut ws) = workspace(store.clone(), 3);
    ws.identity().sign_in(OwnerId::new("alice"));

    let id = split_first_page(&mut ws, "a.pdf").await;
    assert_eq!(store.len().await, 1);

    let outcome = ws.delete_processed(id).await.unwrap();
    assert!(outcome.removed_locally);
    assert!(matches!(outcome.remote, RemoteDeletion::Deleted));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_guest_result_is_not_deleted_remotely_after_sign_in() {
    let store = Arc::new(MemoryHistoryStore::new());
    let (_dir, mut ws) = workspace(store.clone(), 3);

    let id = split_first_page(&mut ws, "a.pdf").await;
    ws.identity().sign_in(OwnerId::new("alice"));

    let outcome = ws.delete_processed(id).await.unwrap();
    assert!(outcome.removed_locally);
    assert!(matches!(outcome.remote, RemoteDeletion::Skipped));
}

#[tokio::test]
async fn test_guest_delete_of_unknown_id_is_not_found() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let err = ws.delete_processed(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PdfForgeError::NotFound { .. }));
}

#[tokio::test]
async fn test_guest_usage_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        guest_limit: 2,
        guest_usage_file: Some(dir.path().join("guest.json")),
        ..Config::default()
    };

    let mut first = Workspace::from_config(config.clone()).await.unwrap();
    split_first_page(&mut first, "a.pdf").await;
    drop(first);

    let second = Workspace::from_config(config).await.unwrap();
    let allowance = second.guest_allowance();
    assert_eq!(allowance.remaining, 1);
    assert!(allowance.allowed);
}
