//! Quota accounting across upload, delete and copy.

use cloudtree_core::error::ErrorKind;
use cloudtree_core::traits::storage::ByteStore;
use cloudtree_entity::NodeId;
use cloudtree_service::{DeleteOutcome, FileUpload};

use crate::helpers::{TestApp, assert_kind};

#[tokio::test]
async fn test_quota_scenario() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 1000).await;

    let docs = app.mkdir(&ctx, None, "Docs").await;
    let a = app.upload(&ctx, Some(docs.id), "a.txt", 400).await;
    assert_eq!(app.used(&ctx).await, 400);

    assert_kind(
        app.try_upload(&ctx, Some(docs.id), "b.txt", 700).await,
        ErrorKind::QuotaExceeded,
    );
    assert_eq!(app.used(&ctx).await, 400);

    let first = app.engine.delete(&ctx, NodeId::File(a.id)).await.unwrap();
    assert!(matches!(first, DeleteOutcome::Trashed(_)));
    assert_eq!(app.used(&ctx).await, 400);

    let second = app.engine.delete(&ctx, NodeId::File(a.id)).await.unwrap();
    assert!(matches!(second, DeleteOutcome::Erased(_)));
    assert_eq!(app.used(&ctx).await, 0);
    assert!(!app.store.exists(&a.storage_key).await.unwrap());

    let copy = app
        .engine
        .copy(&ctx, NodeId::Folder(docs.id), None)
        .await
        .unwrap();
    assert_eq!(copy.display_name(), "Docs_(copy)");
}

#[tokio::test]
async fn test_batch_upload_is_admitted_as_a_whole() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 100).await;

    let batch = vec![
        FileUpload::new("a.bin", vec![0u8; 60]),
        FileUpload::new("b.bin", vec![0u8; 50]),
    ];
    assert_kind(app.engine.upload(&ctx, None, batch).await, ErrorKind::QuotaExceeded);
    assert_eq!(app.used(&ctx).await, 0);
    assert!(app.store.is_empty());

    let batch = vec![
        FileUpload::new("a.bin", vec![0u8; 60]),
        FileUpload::new("a.bin", vec![0u8; 10]),
    ];
    assert_kind(app.engine.upload(&ctx, None, batch).await, ErrorKind::AlreadyExists);

    let batch = vec![
        FileUpload::new("a.bin", vec![0u8; 60]),
        FileUpload::new("b.bin", vec![0u8; 40]),
    ];
    let files = app.engine.upload(&ctx, None, batch).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(app.used(&ctx).await, 100);
}

#[tokio::test]
async fn test_upload_size_limit() {
    let app = TestApp::with_storage(cloudtree_core::config::StorageConfig {
        max_upload_size_bytes: 16,
        ..Default::default()
    });
    let ctx = app.tenant("acme", 1000).await;
    assert_kind(app.try_upload(&ctx, None, "big.bin", 17).await, ErrorKind::Validation);
    app.upload(&ctx, None, "small.bin", 16).await;
}

#[tokio::test]
async fn test_erasing_a_folder_releases_its_subtree() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 1000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    let sub = app.mkdir(&ctx, Some(docs.id), "Sub").await;
    app.upload(&ctx, Some(docs.id), "a.txt", 100).await;
    let deep = app.upload(&ctx, Some(sub.id), "b.txt", 200).await;
    assert_eq!(app.used(&ctx).await, 300);

    let id = NodeId::Folder(docs.id);
    app.engine.delete(&ctx, id).await.unwrap();
    app.engine.delete(&ctx, id).await.unwrap();

    assert_eq!(app.used(&ctx).await, 0);
    assert!(app.store.is_empty());
    assert!(app.file(deep.id).await.is_none());
    assert!(app.engine.get(NodeId::Folder(sub.id)).await.is_err());
}
