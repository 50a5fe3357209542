mod common;

use common::*;
use leadforge_backend::entities::{LeadStatus, business_entity as businesses};
use leadforge_backend::models::{BusinessQuery, ExternalLeadRecord, SubscriptionPlan};
use leadforge_backend::services::{ImportService, LeadService};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn same_key_twice_updates_in_place() {
    let db = setup_db().await;
    let user = create_user(&db, "owner", SubscriptionPlan::Free).await;
    let svc = ImportService::new(db.clone());

    let first = svc
        .import_businesses(user.id, vec![record("p1", "Joe's Pizza")])
        .await
        .unwrap();
    assert_eq!((first.imported, first.updated, first.skipped), (1, 0, 0));

    let second = svc
        .import_businesses(user.id, vec![record("p1", "Joe's Pizza & Pasta")])
        .await
        .unwrap();
    assert_eq!((second.imported, second.updated, second.skipped), (0, 1, 0));

    let rows = businesses::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Joe's Pizza & Pasta");
}

#[tokio::test]
async fn same_place_for_two_owners_creates_two_rows() {
    let db = setup_db().await;
    let a = create_user(&db, "alice", SubscriptionPlan::Free).await;
    let b = create_user(&db, "bob", SubscriptionPlan::Free).await;
    let svc = ImportService::new(db.clone());

    svc.import_businesses(a.id, vec![record("p1", "Cafe")]).await.unwrap();
    let result = svc.import_businesses(b.id, vec![record("p1", "Cafe")]).await.unwrap();
    assert_eq!(result.imported, 1);

    assert_eq!(businesses::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn malformed_record_is_skipped_and_batch_continues() {
    let db = setup_db().await;
    let user = create_user(&db, "owner", SubscriptionPlan::Free).await;
    let svc = ImportService::new(db.clone());

    let bad = ExternalLeadRecord {
        name: "Broken".to_string(),
        ..Default::default()
    };
    let result = svc
        .import_businesses(user.id, vec![record("p1", "A"), bad, record("p3", "C")])
        .await
        .unwrap();

    assert_eq!(result.imported, 2);
    assert_eq!(result.updated, 0);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Error importing Broken:"));
    assert_eq!(result.summary(), "Imported: 2, Updated: 0, Skipped: 1, Errors: 1");
}

#[tokio::test]
async fn duplicate_within_batch_updates_earlier_insert() {
    let db = setup_db().await;
    let user = create_user(&db, "owner", SubscriptionPlan::Free).await;
    let svc = ImportService::new(db.clone());

    let result = svc
        .import_businesses(user.id, vec![record("p1", "A"), record("p1", "A-renamed")])
        .await
        .unwrap();
    assert_eq!((result.imported, result.updated), (1, 1));

    let rows = businesses::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "A-renamed");
}

#[tokio::test]
async fn reimport_preserves_outreach_state() {
    let db = setup_db().await;
    let user = create_user(&db, "owner", SubscriptionPlan::Free).await;
    let imports = ImportService::new(db.clone());
    let leads = LeadService::new(db.clone());

    imports.import_businesses(user.id, vec![record("p1", "A")]).await.unwrap();
    let lead = leads
        .list_businesses(user.id, &BusinessQuery::default())
        .await
        .unwrap()
        .remove(0);
    leads
        .mark_contacted(user.id, lead.id, Some("Called".into()))
        .await
        .unwrap();
    leads
        .mark_website_generated(user.id, lead.id, Some("http://x/preview/1".into()), "code".into())
        .await
        .unwrap();

    let mut refreshed = record("p1", "A2");
    refreshed.types = Some(vec![]);
    refreshed.website = Some("https://a.example".into());
    imports.import_businesses(user.id, vec![refreshed]).await.unwrap();

    let after = leads.get_business(user.id, lead.id).await.unwrap();
    assert_eq!(after.name, "A2");
    assert_eq!(after.website.as_deref(), Some("https://a.example"));
    // 空类型列表不覆盖原值
    assert_eq!(after.types.as_deref(), Some("restaurant,food"));
    assert!(after.contacted);
    assert!(after.website_generated);
    assert_eq!(after.lead_status, LeadStatus::DemoSent);
    assert_eq!(after.notes.as_deref(), Some("Called"));
    assert_eq!(after.generated_website_code.as_deref(), Some("code"));
}

#[tokio::test]
async fn new_record_defaults() {
    let db = setup_db().await;
    let user = create_user(&db, "owner", SubscriptionPlan::Free).await;
    let svc = ImportService::new(db.clone());

    let mut r = record("p9", "Plain");
    r.types = None;
    svc.import_businesses(user.id, vec![r]).await.unwrap();

    let row = businesses::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(row.user_id, user.id);
    assert_eq!(row.lead_status, LeadStatus::New);
    assert!(!row.contacted);
    assert!(!row.website_generated);
    assert_eq!(row.types, None);
    assert!(row.needs_website());
}
