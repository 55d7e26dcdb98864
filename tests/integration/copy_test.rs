//! Deep copy.

use cloudtree_core::error::ErrorKind;
use cloudtree_entity::{Node, NodeFlag, NodeId};

use crate::helpers::{TestApp, assert_kind};

#[tokio::test]
async fn test_copy_next_to_source_gets_suffix() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    let file = app.upload(&ctx, None, "a.txt", 10).await;

    let folder_copy = app
        .engine
        .copy(&ctx, NodeId::Folder(docs.id), None)
        .await
        .unwrap();
    assert_eq!(folder_copy.display_name(), "Docs_(copy)");

    let file_copy = app
        .engine
        .copy(&ctx, NodeId::File(file.id), None)
        .await
        .unwrap();
    assert_eq!(file_copy.display_name(), "a_(copy).txt");

    // A second copy collides with the first.
    assert_kind(
        app.engine.copy(&ctx, NodeId::Folder(docs.id), None).await,
        ErrorKind::AlreadyExists,
    );
}

#[tokio::test]
async fn test_copy_is_isolated_from_source() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let source = app.mkdir(&ctx, None, "F").await;
    let sub = app.mkdir(&ctx, Some(source.id), "Sub").await;
    let x = app.upload(&ctx, Some(source.id), "x.bin", 30).await;
    app.upload(&ctx, Some(sub.id), "y.bin", 20).await;
    let target = app.mkdir(&ctx, None, "Target").await;

    let copied = app
        .engine
        .copy(&ctx, NodeId::Folder(source.id), Some(target.id))
        .await
        .unwrap();
    let Node::Folder(copy) = copied else {
        panic!("copy of a folder must be a folder");
    };
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.name, "F");
    assert_eq!(copy.parent_id, Some(target.id));
    assert_eq!(app.used(&ctx).await, 100);

    let listing = app.engine.list(&ctx, Some(copy.id)).await.unwrap();
    assert_eq!(listing.folders.len(), 1);
    assert_eq!(listing.files.len(), 1);
    let x_copy = listing.files[0].clone();
    assert_eq!(x_copy.display_name(), "x.bin");
    assert_ne!(x_copy.storage_key, x.storage_key);

    let sub_copy = app
        .engine
        .list(&ctx, Some(listing.folders[0].id))
        .await
        .unwrap();
    assert_eq!(sub_copy.files[0].display_name(), "y.bin");

    // Erasing the original leaves the copy readable.
    app.engine.delete(&ctx, NodeId::File(x.id)).await.unwrap();
    app.engine.delete(&ctx, NodeId::File(x.id)).await.unwrap();
    assert!(app.file(x.id).await.is_none());
    let (_, data) = app.engine.read_file(&ctx, x_copy.id).await.unwrap();
    assert_eq!(data.len(), 30);
}

#[tokio::test]
async fn test_copy_checks_capacity_before_writing() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 100).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    app.upload(&ctx, Some(docs.id), "a.bin", 40).await;
    app.upload(&ctx, Some(docs.id), "b.bin", 20).await;
    let target = app.mkdir(&ctx, None, "Target").await;

    assert_kind(
        app.engine
            .copy(&ctx, NodeId::Folder(docs.id), Some(target.id))
            .await,
        ErrorKind::QuotaExceeded,
    );
    assert_eq!(app.used(&ctx).await, 60);
    assert!(app.engine.list(&ctx, Some(target.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_copy_into_descendant_is_refused() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let a = app.mkdir(&ctx, None, "A").await;
    let b = app.mkdir(&ctx, Some(a.id), "B").await;

    assert_kind(
        app.engine.copy(&ctx, NodeId::Folder(a.id), Some(b.id)).await,
        ErrorKind::NotAllowed,
    );
    assert_kind(
        app.engine.copy(&ctx, NodeId::Folder(a.id), Some(a.id)).await,
        ErrorKind::NotAllowed,
    );
}

#[tokio::test]
async fn test_copy_from_frozen_source_and_into_other_tenant() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let other = app.tenant("globex", 10_000).await;
    let file = app.upload(&ctx, None, "plan.doc", 25).await;
    app.engine
        .toggle_flag(&ctx, NodeId::File(file.id), NodeFlag::Frozen)
        .await
        .unwrap();
    let inbox = app.mkdir(&other, None, "Inbox").await;

    let copied = app
        .engine
        .copy(&ctx, NodeId::File(file.id), Some(inbox.id))
        .await
        .unwrap();
    assert_eq!(copied.tenant_id(), other.tenant_id);
    assert!(!copied.is_frozen());
    assert_eq!(app.used(&ctx).await, 25);
    assert_eq!(app.used(&other).await, 25);
}
