//! Sharing across tenants.

use cloudtree_core::error::ErrorKind;
use cloudtree_entity::{AccessMode, NodeFlag, NodeId, ShareAction, ShareSettings};

use crate::helpers::{TestApp, assert_kind};

const OPEN_READ: ShareSettings = ShareSettings {
    access_mode: AccessMode::Read,
    open: true,
};

const OPEN_EDIT: ShareSettings = ShareSettings {
    access_mode: AccessMode::Edit,
    open: true,
};

#[tokio::test]
async fn test_foreign_listing_requires_open_share() {
    let app = TestApp::new();
    let owner = app.tenant("acme", 10_000).await;
    let guest = app.tenant("globex", 10_000).await;
    let docs = app.mkdir(&owner, None, "Docs").await;
    app.upload(&owner, Some(docs.id), "a.txt", 5).await;

    assert_kind(app.engine.list(&guest, Some(docs.id)).await, ErrorKind::NotAllowed);

    app.engine
        .share(&owner, NodeId::Folder(docs.id), OPEN_READ)
        .await
        .unwrap();
    let listing = app.engine.list(&guest, Some(docs.id)).await.unwrap();
    assert_eq!(listing.access, AccessMode::Read);
    assert_eq!(listing.files.len(), 1);

    // Children created after sharing are not visible to the guest.
    app.upload(&owner, Some(docs.id), "b.txt", 5).await;
    assert_eq!(app.engine.list(&guest, Some(docs.id)).await.unwrap().len(), 1);
    assert_eq!(app.engine.list(&owner, Some(docs.id)).await.unwrap().len(), 2);

    // The guest's root only shows the guest's own nodes.
    assert!(app.engine.list(&guest, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_share_cascades_to_descendants() {
    let app = TestApp::new();
    let owner = app.tenant("acme", 10_000).await;
    let guest = app.tenant("globex", 10_000).await;
    let docs = app.mkdir(&owner, None, "Docs").await;
    let sub = app.mkdir(&owner, Some(docs.id), "Sub").await;
    let deep = app.upload(&owner, Some(sub.id), "deep.txt", 5).await;

    app.engine
        .share(&owner, NodeId::Folder(docs.id), OPEN_EDIT)
        .await
        .unwrap();

    for id in [
        NodeId::Folder(docs.id),
        NodeId::Folder(sub.id),
        NodeId::File(deep.id),
    ] {
        assert_eq!(
            app.engine.sharing().resolve_access(id).await.unwrap(),
            Some(AccessMode::Edit)
        );
        app.engine
            .authorize(&guest, id, ShareAction::Write)
            .await
            .unwrap();
    }
    let listing = app.engine.list(&guest, Some(sub.id)).await.unwrap();
    assert_eq!(listing.access, AccessMode::Edit);
    assert_eq!(listing.files[0].id, deep.id);
}

#[tokio::test]
async fn test_read_share_refuses_writes() {
    let app = TestApp::new();
    let owner = app.tenant("acme", 10_000).await;
    let guest = app.tenant("globex", 10_000).await;
    let docs = app.mkdir(&owner, None, "Docs").await;
    let id = NodeId::Folder(docs.id);

    app.engine.share(&owner, id, OPEN_READ).await.unwrap();
    app.engine
        .authorize(&guest, id, ShareAction::Read)
        .await
        .unwrap();
    assert_kind(
        app.engine.authorize(&guest, id, ShareAction::Write).await,
        ErrorKind::NotAllowed,
    );
    app.engine
        .authorize(&owner, id, ShareAction::Write)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_closing_a_share_hides_the_subtree() {
    let app = TestApp::new();
    let owner = app.tenant("acme", 10_000).await;
    let guest = app.tenant("globex", 10_000).await;
    let docs = app.mkdir(&owner, None, "Docs").await;
    let id = NodeId::Folder(docs.id);

    app.engine.share(&owner, id, OPEN_EDIT).await.unwrap();
    let closed = app
        .engine
        .share(
            &owner,
            id,
            ShareSettings {
                access_mode: AccessMode::Edit,
                open: false,
            },
        )
        .await
        .unwrap();
    assert!(!closed.is_shared());
    assert_kind(app.engine.list(&guest, Some(docs.id)).await, ErrorKind::NotAllowed);
}

#[tokio::test]
async fn test_guest_creates_inside_shared_folder() {
    let app = TestApp::new();
    let owner = app.tenant("acme", 10_000).await;
    let guest = app.tenant("globex", 10_000).await;
    let docs = app.mkdir(&owner, None, "Docs").await;
    app.engine
        .share(&owner, NodeId::Folder(docs.id), OPEN_EDIT)
        .await
        .unwrap();

    let created = app.upload(&guest, Some(docs.id), "note.txt", 7).await;
    assert_eq!(created.tenant_id, owner.tenant_id);
    assert_eq!(app.used(&owner).await, 7);
    assert_eq!(app.used(&guest).await, 0);
}

#[tokio::test]
async fn test_frozen_node_cannot_be_shared() {
    let app = TestApp::new();
    let owner = app.tenant("acme", 10_000).await;
    let docs = app.mkdir(&owner, None, "Docs").await;
    let id = NodeId::Folder(docs.id);
    app.engine
        .toggle_flag(&owner, id, NodeFlag::Frozen)
        .await
        .unwrap();

    assert_kind(app.engine.share(&owner, id, OPEN_READ).await, ErrorKind::Frozen);
    assert_eq!(app.engine.sharing().resolve_access(id).await.unwrap(), None);
}
