mod common;

use chrono::{Duration, Utc};
use common::*;
use leadforge_backend::AppError;
use leadforge_backend::entities::{SubscriptionStatus, user_entity as users};
use leadforge_backend::external::CheckoutOutcome;
use leadforge_backend::models::{ActionType, RegisterRequest, SubscriptionPlan};
use leadforge_backend::services::{AuthService, EntitlementService};
use leadforge_backend::utils::JwtService;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

#[tokio::test]
async fn upgrade_resets_counters_and_activates() {
    let db = setup_db().await;
    let user = create_user(&db, "jane", SubscriptionPlan::Free).await;
    set_usage(&db, user.id, 1, 2, 9).await;
    let billing = billing_service(&db);

    let before = Utc::now();
    billing
        .upgrade_user_plan(
            user.id,
            SubscriptionPlan::Pro,
            Some("cus_123".into()),
            Some("sub_123".into()),
        )
        .await
        .unwrap();

    let after = reload_user(&db, user.id).await;
    assert_eq!(after.subscription_plan, SubscriptionPlan::Pro);
    assert_eq!(after.subscription_status, SubscriptionStatus::Active);
    assert_eq!(after.stripe_customer_id.as_deref(), Some("cus_123"));
    assert_eq!(after.stripe_subscription_id.as_deref(), Some("sub_123"));
    assert_eq!(
        (after.searches_used, after.websites_generated, after.messages_generated),
        (0, 0, 0)
    );
    let reset = after.usage_reset_date.expect("reset date set");
    assert!(reset > before + Duration::days(27));
    assert!(reset < before + Duration::days(32));
}

#[tokio::test]
async fn upgrade_missing_user_is_not_found() {
    let db = setup_db().await;
    let billing = billing_service(&db);

    let err = billing
        .upgrade_user_plan(42, SubscriptionPlan::Basic, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn price_ids_map_to_plans() {
    let db = setup_db().await;
    let billing = billing_service(&db);

    assert_eq!(billing.price_id_to_plan("price_basic"), SubscriptionPlan::Basic);
    assert_eq!(billing.price_id_to_plan("price_pro"), SubscriptionPlan::Pro);
    assert_eq!(
        billing.price_id_to_plan("price_enterprise"),
        SubscriptionPlan::Enterprise
    );
    assert_eq!(billing.price_id_to_plan("price_free"), SubscriptionPlan::Free);
    assert_eq!(billing.price_id_to_plan("price_bogus"), SubscriptionPlan::Free);
}

#[tokio::test]
async fn completed_checkout_activates_plan() {
    let db = setup_db().await;
    let user = create_user(&db, "jane", SubscriptionPlan::Free).await;
    set_usage(&db, user.id, 1, 0, 0).await;
    let billing = billing_service(&db);

    let outcome = CheckoutOutcome {
        complete: true,
        client_reference_id: Some(user.id.to_string()),
        price_id: Some("price_enterprise".into()),
        customer_id: Some("cus_1".into()),
        subscription_id: Some("sub_1".into()),
    };
    let result = billing.activate_checkout(user.id, outcome).await.unwrap();
    assert!(result.activated);
    assert_eq!(result.plan, SubscriptionPlan::Enterprise);

    let after = reload_user(&db, user.id).await;
    assert_eq!(after.subscription_plan, SubscriptionPlan::Enterprise);
    assert_eq!(after.searches_used, 0);
}

#[tokio::test]
async fn incomplete_checkout_changes_nothing() {
    let db = setup_db().await;
    let user = create_user(&db, "jane", SubscriptionPlan::Basic).await;
    set_usage(&db, user.id, 3, 0, 0).await;
    let billing = billing_service(&db);

    let outcome = CheckoutOutcome {
        complete: false,
        price_id: Some("price_pro".into()),
        ..Default::default()
    };
    let result = billing.activate_checkout(user.id, outcome).await.unwrap();
    assert!(!result.activated);

    let after = reload_user(&db, user.id).await;
    assert_eq!(after.subscription_plan, SubscriptionPlan::Basic);
    assert_eq!(after.searches_used, 3);
}

#[tokio::test]
async fn subscription_status_follows_subscription_id() {
    let db = setup_db().await;
    let user = create_user(&db, "jane", SubscriptionPlan::Free).await;
    let billing = billing_service(&db);
    billing
        .upgrade_user_plan(user.id, SubscriptionPlan::Pro, None, Some("sub_9".into()))
        .await
        .unwrap();

    let n = billing
        .set_subscription_status("sub_9", SubscriptionStatus::PastDue)
        .await
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(
        reload_user(&db, user.id).await.subscription_status,
        SubscriptionStatus::PastDue
    );

    let n = billing
        .set_subscription_status("sub_unknown", SubscriptionStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn rollover_touches_expired_and_unanchored_users() {
    let db = setup_db().await;
    let expired = create_user(&db, "old", SubscriptionPlan::Basic).await;
    let current = create_user(&db, "new", SubscriptionPlan::Basic).await;
    let unanchored = create_user(&db, "legacy", SubscriptionPlan::Free).await;
    set_usage(&db, unanchored.id, 1, 1, 1).await;

    let mut am: users::ActiveModel = set_usage(&db, expired.id, 5, 3, 7).await.into_active_model();
    am.usage_reset_date = Set(Some(Utc::now() - Duration::days(1)));
    am.update(&db).await.unwrap();

    let mut am: users::ActiveModel = set_usage(&db, current.id, 2, 2, 2).await.into_active_model();
    am.usage_reset_date = Set(Some(Utc::now() + Duration::days(10)));
    am.update(&db).await.unwrap();

    let billing = billing_service(&db);
    assert_eq!(billing.rollover_expired_usage().await.unwrap(), 2);

    let e = reload_user(&db, expired.id).await;
    assert_eq!((e.searches_used, e.websites_generated, e.messages_generated), (0, 0, 0));
    assert!(e.usage_reset_date.unwrap() > Utc::now());

    // 没有重置日期的老用户也进入月度周期
    let u = reload_user(&db, unanchored.id).await;
    assert_eq!(u.searches_used, 0);
    assert!(u.usage_reset_date.unwrap() > Utc::now());

    assert_eq!(reload_user(&db, current.id).await.searches_used, 2);
}

#[tokio::test]
async fn free_signup_is_reached_by_rollover() {
    let db = setup_db().await;
    let auth = AuthService::new(db.clone(), JwtService::new("test-secret", 60, 120));
    let registered = auth
        .register(RegisterRequest {
            username: "newbie".into(),
            email: "newbie@example.com".into(),
            password: "Password123!".into(),
        })
        .await
        .unwrap();
    let user_id = registered.user.id;

    let signup = reload_user(&db, user_id).await;
    assert_eq!(signup.subscription_plan, SubscriptionPlan::Free);
    let reset = signup.usage_reset_date.expect("reset date set at signup");
    assert!(reset > Utc::now() + Duration::days(27));

    let entitlements = EntitlementService::new(db.clone());
    entitlements.increment_usage(user_id, ActionType::Search).await.unwrap();
    assert!(!entitlements.can_perform(user_id, ActionType::Search).await.unwrap());

    // 一个月过去
    let mut am = signup.into_active_model();
    am.usage_reset_date = Set(Some(Utc::now() - Duration::minutes(1)));
    am.update(&db).await.unwrap();

    let billing = billing_service(&db);
    assert_eq!(billing.rollover_expired_usage().await.unwrap(), 1);
    assert_eq!(reload_user(&db, user_id).await.searches_used, 0);
    assert!(entitlements.can_perform(user_id, ActionType::Search).await.unwrap());
}
