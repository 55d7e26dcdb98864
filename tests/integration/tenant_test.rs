//! Tenant lifecycle and storage reports.

use cloudtree_core::error::ErrorKind;
use cloudtree_entity::{Category, NodeId};

use crate::helpers::{TestApp, assert_kind};

#[tokio::test]
async fn test_tenant_roots_are_disjoint() {
    let app = TestApp::new();
    let acme = app.tenant("acme", 10_000).await;
    let globex = app.tenant("globex", 10_000).await;
    app.mkdir(&acme, None, "Docs").await;
    // The same root name is free in another tenant.
    app.mkdir(&globex, None, "Docs").await;

    assert_eq!(app.engine.list(&acme, None).await.unwrap().len(), 1);
    assert_eq!(app.engine.list(&globex, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_tenant_erases_everything() {
    let app = TestApp::new();
    let acme = app.tenant("acme", 10_000).await;
    let globex = app.tenant("globex", 10_000).await;
    let docs = app.mkdir(&acme, None, "Docs").await;
    let active = app.upload(&acme, Some(docs.id), "a.txt", 10).await;
    let trashed = app.upload(&acme, None, "b.txt", 10).await;
    app.engine
        .delete(&acme, NodeId::File(trashed.id))
        .await
        .unwrap();
    let kept = app.upload(&globex, None, "c.txt", 10).await;

    app.tenants.remove(acme.tenant_id).await.unwrap();

    assert_kind(app.tenants.get(acme.tenant_id).await, ErrorKind::NotFound);
    assert!(app.file(active.id).await.is_none());
    assert!(app.file(trashed.id).await.is_none());
    assert_kind(app.engine.get(NodeId::Folder(docs.id)).await, ErrorKind::NotFound);
    assert_eq!(app.store.len(), 1);
    assert!(app.file(kept.id).await.is_some());
}

#[tokio::test]
async fn test_shrunk_allocation_refuses_writes() {
    let app = TestApp::new();
    let acme = app.tenant("acme", 1000).await;
    app.upload(&acme, None, "a.txt", 500).await;

    app.tenants
        .set_allocation(acme.tenant_id, 400)
        .await
        .unwrap();
    assert_kind(app.try_upload(&acme, None, "b.txt", 1).await, ErrorKind::QuotaExceeded);

    let usage = app.stats.usage(acme.tenant_id).await.unwrap();
    assert_eq!(usage.available_bytes, 0);
}

#[tokio::test]
async fn test_analysis_includes_trashed_files() {
    let app = TestApp::new();
    let acme = app.tenant("acme", 10_000).await;
    app.upload(&acme, None, "photo.jpg", 100).await;
    let doc = app.upload(&acme, None, "notes.txt", 30).await;
    app.upload(&acme, None, "README", 5).await;
    app.engine.delete(&acme, NodeId::File(doc.id)).await.unwrap();

    let report = app.stats.analyze(acme.tenant_id).await.unwrap();
    let total: i64 = report.iter().map(|u| u.bytes).sum();
    assert_eq!(total, app.used(&acme).await);

    let bytes_of = |category| {
        report
            .iter()
            .find(|u| u.category == category)
            .map(|u| u.bytes)
    };
    assert_eq!(bytes_of(Category::Image), Some(100));
    assert_eq!(bytes_of(Category::Doc), Some(30));
    assert_eq!(bytes_of(Category::Video), Some(0));
    assert_eq!(bytes_of(Category::Other), Some(5));
}
