//! Create, rename, move, flags and listings.

use cloudtree_core::error::ErrorKind;
use cloudtree_entity::{AccessMode, Node, NodeFlag, NodeId};

use crate::helpers::{TestApp, assert_kind};

#[tokio::test]
async fn test_create_requires_unique_sibling_names() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;

    assert_kind(app.engine.create_folder(&ctx, None, "Docs").await, ErrorKind::AlreadyExists);
    // Same name in another folder is fine.
    app.mkdir(&ctx, Some(docs.id), "Docs").await;

    app.upload(&ctx, Some(docs.id), "a.txt", 10).await;
    assert_kind(app.try_upload(&ctx, Some(docs.id), "a.txt", 10).await, ErrorKind::AlreadyExists);
    // Stem and extension are compared together.
    app.upload(&ctx, Some(docs.id), "a.md", 10).await;
}

#[tokio::test]
async fn test_create_under_missing_or_trashed_parent() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    app.engine.delete(&ctx, NodeId::Folder(docs.id)).await.unwrap();

    assert_kind(app.engine.create_folder(&ctx, Some(docs.id), "Sub").await, ErrorKind::NotFound);
    assert_kind(app.engine.create_folder(&ctx, None, "  ").await, ErrorKind::Validation);
}

#[tokio::test]
async fn test_upload_splits_name_and_charges_quota() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let file = app.upload(&ctx, None, "report.final.pdf", 120).await;

    assert_eq!(file.name, "report.final");
    assert_eq!(file.extension, ".pdf");
    assert_eq!(file.size_bytes, 120);
    assert_eq!(app.used(&ctx).await, 120);

    let (_, data) = app.engine.read_file(&ctx, file.id).await.unwrap();
    assert_eq!(data.len(), 120);
}

#[tokio::test]
async fn test_rename_keeps_storage_key() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let file = app.upload(&ctx, None, "a.txt", 5).await;
    app.upload(&ctx, None, "b.txt", 5).await;

    let renamed = app
        .engine
        .rename(&ctx, NodeId::File(file.id), "c.md")
        .await
        .unwrap();
    assert_eq!(renamed.display_name(), "c.md");
    assert_eq!(renamed.storage_key(), &file.storage_key);

    assert_kind(
        app.engine.rename(&ctx, NodeId::File(file.id), "b.txt").await,
        ErrorKind::AlreadyExists,
    );
    // Renaming to its own name is not a collision.
    app.engine
        .rename(&ctx, NodeId::File(file.id), "c.md")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_move_rejects_cycles_and_cross_tenant() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let other = app.tenant("globex", 10_000).await;

    let a = app.mkdir(&ctx, None, "A").await;
    let b = app.mkdir(&ctx, Some(a.id), "B").await;
    let foreign = app.mkdir(&other, None, "Theirs").await;

    assert_kind(
        app.engine.move_node(&ctx, NodeId::Folder(a.id), Some(a.id)).await,
        ErrorKind::NotAllowed,
    );
    assert_kind(
        app.engine.move_node(&ctx, NodeId::Folder(a.id), Some(b.id)).await,
        ErrorKind::NotAllowed,
    );
    assert_kind(
        app.engine
            .move_node(&ctx, NodeId::Folder(b.id), Some(foreign.id))
            .await,
        ErrorKind::NotAllowed,
    );

    let moved = app
        .engine
        .move_node(&ctx, NodeId::Folder(b.id), None)
        .await
        .unwrap();
    assert_eq!(moved.parent_id(), None);
    assert_eq!(moved.tenant_id(), ctx.tenant_id);
}

#[tokio::test]
async fn test_move_refuses_name_collision() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let a = app.mkdir(&ctx, None, "A").await;
    app.upload(&ctx, None, "x.txt", 1).await;
    let inner = app.upload(&ctx, Some(a.id), "x.txt", 1).await;

    assert_kind(
        app.engine.move_node(&ctx, NodeId::File(inner.id), None).await,
        ErrorKind::AlreadyExists,
    );
    assert_eq!(app.file(inner.id).await.unwrap().parent_id, Some(a.id));
}

#[tokio::test]
async fn test_frozen_blocks_structure_but_not_flags() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    let id = NodeId::Folder(docs.id);

    let frozen = app
        .engine
        .toggle_flag(&ctx, id, NodeFlag::Frozen)
        .await
        .unwrap();
    assert!(frozen.is_frozen());

    assert_kind(app.engine.rename(&ctx, id, "Other").await, ErrorKind::Frozen);
    assert_kind(app.engine.move_node(&ctx, id, None).await, ErrorKind::Frozen);
    assert_kind(app.engine.delete(&ctx, id).await, ErrorKind::Frozen);

    // Creating inside and flag toggles stay allowed.
    app.mkdir(&ctx, Some(docs.id), "Inside").await;
    app.engine
        .toggle_flag(&ctx, id, NodeFlag::Pinned)
        .await
        .unwrap();
    let thawed = app
        .engine
        .toggle_flag(&ctx, id, NodeFlag::Frozen)
        .await
        .unwrap();
    assert!(!thawed.is_frozen());
    app.engine.rename(&ctx, id, "Other").await.unwrap();
}

#[tokio::test]
async fn test_listing_puts_pinned_first() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    app.mkdir(&ctx, None, "Alpha").await;
    let zulu = app.mkdir(&ctx, None, "Zulu").await;
    app.upload(&ctx, None, "a.txt", 1).await;
    let z = app.upload(&ctx, None, "z.txt", 1).await;

    app.engine
        .toggle_flag(&ctx, NodeId::Folder(zulu.id), NodeFlag::Pinned)
        .await
        .unwrap();
    app.engine
        .toggle_flag(&ctx, NodeId::File(z.id), NodeFlag::Pinned)
        .await
        .unwrap();

    let listing = app.engine.list(&ctx, None).await.unwrap();
    assert_eq!(listing.access, AccessMode::Edit);
    let folders: Vec<&str> = listing.folders.iter().map(|f| f.name.as_str()).collect();
    let files: Vec<String> = listing.files.iter().map(|f| f.display_name()).collect();
    assert_eq!(folders, ["Zulu", "Alpha"]);
    assert_eq!(files, ["z.txt", "a.txt"]);
}

#[tokio::test]
async fn test_list_flagged_skips_trashed() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let keep = app.upload(&ctx, None, "keep.txt", 1).await;
    let gone = app.upload(&ctx, None, "gone.txt", 1).await;
    for file in [&keep, &gone] {
        app.engine
            .toggle_flag(&ctx, NodeId::File(file.id), NodeFlag::Favorite)
            .await
            .unwrap();
    }
    app.engine.delete(&ctx, NodeId::File(gone.id)).await.unwrap();

    let favorites = app
        .engine
        .list_flagged(&ctx, NodeFlag::Favorite)
        .await
        .unwrap();
    assert_eq!(favorites.len(), 1);
    assert!(matches!(&favorites[0], Node::File(f) if f.id == keep.id));
}
