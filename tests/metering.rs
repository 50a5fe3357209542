mod common;

use common::*;
use leadforge_backend::AppError;
use leadforge_backend::models::{ActionType, SubscriptionPlan};
use leadforge_backend::services::{CustomizationService, EntitlementService};

#[tokio::test]
async fn basic_plan_allows_fifth_search_then_blocks() {
    let db = setup_db().await;
    let user = create_user(&db, "basic", SubscriptionPlan::Basic).await;
    set_usage(&db, user.id, 4, 0, 0).await;
    let svc = EntitlementService::new(db.clone());

    assert!(svc.can_perform(user.id, ActionType::Search).await.unwrap());
    svc.increment_usage(user.id, ActionType::Search).await.unwrap();

    assert_eq!(reload_user(&db, user.id).await.searches_used, 5);
    assert!(!svc.can_perform(user.id, ActionType::Search).await.unwrap());
    let err = svc.ensure_allowed(user.id, ActionType::Search).await.unwrap_err();
    assert!(matches!(err, AppError::QuotaExceeded(_)));
}

#[tokio::test]
async fn free_plan_blocks_after_single_search() {
    let db = setup_db().await;
    let user = create_user(&db, "free", SubscriptionPlan::Free).await;
    let svc = EntitlementService::new(db.clone());

    assert!(svc.can_perform(user.id, ActionType::Search).await.unwrap());
    svc.increment_usage(user.id, ActionType::Search).await.unwrap();
    assert!(!svc.can_perform(user.id, ActionType::Search).await.unwrap());
    // 其他动作互不影响
    assert!(svc.can_perform(user.id, ActionType::GenerateWebsite).await.unwrap());
}

#[tokio::test]
async fn unlimited_messages_ignore_counter() {
    let db = setup_db().await;
    let user = create_user(&db, "pro", SubscriptionPlan::Pro).await;
    set_usage(&db, user.id, 0, 0, 5_000).await;
    let svc = EntitlementService::new(db.clone());

    assert!(svc.can_perform(user.id, ActionType::GenerateMessage).await.unwrap());
    svc.increment_usage(user.id, ActionType::GenerateMessage).await.unwrap();
    assert_eq!(reload_user(&db, user.id).await.messages_generated, 5_001);

    let summary = svc.usage_summary(user.id).await.unwrap();
    assert_eq!(summary.messages.allowance, None);
    assert_eq!(summary.messages.remaining, None);
    assert_eq!(summary.searches.allowance, Some(20));
    assert_eq!(summary.searches.remaining, Some(20));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let db = setup_shared_db("concurrent-increments", 4).await;
    let user = create_user(&db, "busy", SubscriptionPlan::Enterprise).await;
    let svc = EntitlementService::new(db.clone());

    let mut handles = Vec::new();
    for _ in 0..20 {
        let svc = svc.clone();
        let id = user.id;
        handles.push(tokio::spawn(async move {
            svc.increment_usage(id, ActionType::GenerateWebsite).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(reload_user(&db, user.id).await.websites_generated, 20);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let db = setup_db().await;
    let svc = EntitlementService::new(db.clone());

    let err = svc.can_perform(999, ActionType::Search).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = svc.increment_usage(999, ActionType::Search).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn customization_quota_requires_capable_plan() {
    let db = setup_db().await;
    let basic = create_user(&db, "basic", SubscriptionPlan::Basic).await;
    let svc = CustomizationService::new(db.clone());

    assert!(!svc.can_customize(basic.id).await.unwrap());
    assert_eq!(svc.get_remaining(basic.id, 42).await.unwrap(), 0);

    // 即使已有用量记录，不支持定制的套餐依然为 0
    svc.decrement(basic.id, 42).await.unwrap();
    assert_eq!(svc.get_remaining(basic.id, 42).await.unwrap(), 0);
}

#[tokio::test]
async fn customization_quota_is_per_website_and_lazily_created() {
    let db = setup_db().await;
    let pro = create_user(&db, "pro", SubscriptionPlan::Pro).await;
    let svc = CustomizationService::new(db.clone());

    assert_eq!(svc.get_remaining(pro.id, 7).await.unwrap(), 10);
    svc.decrement(pro.id, 7).await.unwrap();
    svc.decrement(pro.id, 7).await.unwrap();
    assert_eq!(svc.get_remaining(pro.id, 7).await.unwrap(), 8);
    assert_eq!(svc.get_remaining(pro.id, 8).await.unwrap(), 10);

    for _ in 0..10 {
        svc.decrement(pro.id, 7).await.unwrap();
    }
    assert_eq!(svc.get_remaining(pro.id, 7).await.unwrap(), 0);
}

#[tokio::test]
async fn enterprise_gets_fifty_customizations() {
    let db = setup_db().await;
    let ent = create_user(&db, "ent", SubscriptionPlan::Enterprise).await;
    let svc = CustomizationService::new(db.clone());

    assert!(svc.can_customize(ent.id).await.unwrap());
    assert_eq!(svc.get_remaining(ent.id, 1).await.unwrap(), 50);
}
