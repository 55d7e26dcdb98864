//! Trash, restore and erase.

use cloudtree_core::error::ErrorKind;
use cloudtree_entity::{NodeFlag, NodeId};
use cloudtree_service::DeleteOutcome;

use crate::helpers::{TestApp, assert_kind};

#[tokio::test]
async fn test_trash_restore_round_trip() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    let file = app.upload(&ctx, Some(docs.id), "a.txt", 10).await;
    let id = NodeId::File(file.id);

    let DeleteOutcome::Trashed(trashed) = app.engine.delete(&ctx, id).await.unwrap() else {
        panic!("first delete must trash");
    };
    assert!(trashed.is_trashed());
    assert_eq!(trashed.parent_id(), None);
    assert!(app.trash_state_consistent(&trashed).await);
    assert_eq!(app.engine.list_trash(&ctx).await.unwrap().len(), 1);
    assert!(app.engine.list(&ctx, Some(docs.id)).await.unwrap().is_empty());

    let restored = app.engine.restore(&ctx, id).await.unwrap();
    assert!(!restored.is_trashed());
    assert_eq!(restored.parent_id(), Some(docs.id));
    assert_eq!(restored.display_name(), "a.txt");
    assert_eq!(restored.storage_key(), &file.storage_key);
    assert!(app.trash_state_consistent(&restored).await);
    assert!(app.engine.list_trash(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restore_of_active_node_is_noop() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    let id = NodeId::Folder(docs.id);

    let before = app.node(id).await;
    let after = app.engine.restore(&ctx, id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_restore_falls_back_to_root() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&ctx, None, "Docs").await;
    let file = app.upload(&ctx, Some(docs.id), "a.txt", 10).await;

    app.engine.delete(&ctx, NodeId::File(file.id)).await.unwrap();
    app.engine.delete(&ctx, NodeId::Folder(docs.id)).await.unwrap();

    let restored = app
        .engine
        .restore(&ctx, NodeId::File(file.id))
        .await
        .unwrap();
    assert_eq!(restored.parent_id(), None);

    // Erasing the old parent does not touch the restored file.
    app.engine.delete(&ctx, NodeId::Folder(docs.id)).await.unwrap();
    assert!(app.file(file.id).await.is_some());
    assert_eq!(app.used(&ctx).await, 10);
}

#[tokio::test]
async fn test_restore_refuses_name_collision() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let old = app.upload(&ctx, None, "a.txt", 10).await;
    app.engine.delete(&ctx, NodeId::File(old.id)).await.unwrap();
    app.upload(&ctx, None, "a.txt", 10).await;

    assert_kind(
        app.engine.restore(&ctx, NodeId::File(old.id)).await,
        ErrorKind::AlreadyExists,
    );
    let still_trashed = app.node(NodeId::File(old.id)).await;
    assert!(still_trashed.is_trashed());
    assert!(app.trash_state_consistent(&still_trashed).await);
}

#[tokio::test]
async fn test_trashed_names_do_not_collide() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let a = app.mkdir(&ctx, None, "A").await;
    let b = app.mkdir(&ctx, None, "B").await;
    let first = app.upload(&ctx, Some(a.id), "x.txt", 1).await;
    let second = app.upload(&ctx, Some(b.id), "x.txt", 1).await;

    app.engine.delete(&ctx, NodeId::File(first.id)).await.unwrap();
    app.engine.delete(&ctx, NodeId::File(second.id)).await.unwrap();
    assert_eq!(app.engine.list_trash(&ctx).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_erase_unpins_and_clears_records() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let file = app.upload(&ctx, None, "a.txt", 10).await;
    let id = NodeId::File(file.id);
    app.engine
        .toggle_flag(&ctx, id, NodeFlag::Pinned)
        .await
        .unwrap();

    app.engine.delete(&ctx, id).await.unwrap();
    let DeleteOutcome::Erased(erased) = app.engine.delete(&ctx, id).await.unwrap() else {
        panic!("second delete must erase");
    };
    assert!(!erased.flag(NodeFlag::Pinned));
    assert_kind(app.engine.get(id).await, ErrorKind::NotFound);
    assert_kind(app.engine.restore(&ctx, id).await, ErrorKind::NotFound);
    assert!(app.engine.list_trash(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_flags_cannot_change_in_trash() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let file = app.upload(&ctx, None, "a.txt", 10).await;
    let id = NodeId::File(file.id);

    app.engine.delete(&ctx, id).await.unwrap();
    app.engine
        .toggle_flag(&ctx, id, NodeFlag::Frozen)
        .await
        .unwrap_err();
    // Trashed nodes cannot be frozen, so the second phase always proceeds.
    app.engine.delete(&ctx, id).await.unwrap();
    assert_eq!(app.used(&ctx).await, 0);
}

#[tokio::test]
async fn test_restore_never_nests_folder_inside_itself() {
    let app = TestApp::new();
    let ctx = app.tenant("acme", 10_000).await;
    let a = app.mkdir(&ctx, None, "A").await;
    let b = app.mkdir(&ctx, Some(a.id), "B").await;
    let c = app.mkdir(&ctx, Some(b.id), "C").await;

    app.engine.delete(&ctx, NodeId::Folder(b.id)).await.unwrap();
    app.engine
        .move_node(&ctx, NodeId::Folder(a.id), Some(c.id))
        .await
        .unwrap();

    let restored = app.engine.restore(&ctx, NodeId::Folder(b.id)).await.unwrap();
    assert_eq!(restored.parent_id(), None);
    assert!(!restored.is_trashed());

    // Every folder reaches the root within three hops.
    for id in [a.id, b.id, c.id] {
        let mut cursor = Some(id);
        let mut hops = 0;
        while let Some(current) = cursor {
            hops += 1;
            assert!(hops <= 3, "parent chain of {id} does not terminate");
            cursor = app.node(NodeId::Folder(current)).await.parent_id();
        }
    }

    let root = app.engine.list(&ctx, None).await.unwrap();
    assert_eq!(root.folders.len(), 1);
    assert_eq!(root.folders[0].id, b.id);

    assert_kind(
        app.engine
            .move_node(&ctx, NodeId::Folder(b.id), Some(a.id))
            .await,
        ErrorKind::NotAllowed,
    );
}
