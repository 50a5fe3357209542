#![allow(dead_code)]

use chrono::Utc;
use leadforge_backend::config::StripeConfig;
use leadforge_backend::entities::{SubscriptionStatus, user_entity as users};
use leadforge_backend::external::StripeService;
use leadforge_backend::models::{ExternalLeadRecord, SubscriptionPlan};
use leadforge_backend::services::BillingService;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    IntoActiveModel, Set,
};

/// 内存 SQLite；单连接保证所有查询看到同一个库
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// 文件库 + WAL，多连接并发写；每个测试用独立文件名
pub async fn setup_shared_db(name: &str, connections: u32) -> DatabaseConnection {
    let path = std::env::temp_dir().join(format!("leadforge-{name}-{}.db", std::process::id()));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }

    let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    opts.max_connections(connections)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite file");
    db.execute_unprepared("PRAGMA journal_mode=WAL;")
        .await
        .expect("enable wal");
    db.execute_unprepared("PRAGMA busy_timeout=5000;")
        .await
        .expect("set busy timeout");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    plan: SubscriptionPlan,
) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("x".to_string()),
        roles: Set("USER".to_string()),
        subscription_plan: Set(plan),
        stripe_customer_id: Set(None),
        stripe_subscription_id: Set(None),
        subscription_status: Set(SubscriptionStatus::Active),
        searches_used: Set(0),
        websites_generated: Set(0),
        messages_generated: Set(0),
        usage_reset_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn set_usage(
    db: &DatabaseConnection,
    user_id: i32,
    searches: i32,
    websites: i32,
    messages: i32,
) -> users::Model {
    let mut am = reload_user(db, user_id).await.into_active_model();
    am.searches_used = Set(searches);
    am.websites_generated = Set(websites);
    am.messages_generated = Set(messages);
    am.update(db).await.expect("update usage")
}

pub async fn reload_user(db: &DatabaseConnection, user_id: i32) -> users::Model {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await
        .expect("query user")
        .expect("user exists")
}

pub fn record(place_id: &str, name: &str) -> ExternalLeadRecord {
    ExternalLeadRecord {
        name: name.to_string(),
        address: Some("1 Main St, Austin, TX".to_string()),
        website: Some("NO WEBSITE".to_string()),
        phone: Some("(512) 555-0100".to_string()),
        rating: Some(4.5),
        total_ratings: Some(120),
        types: Some(vec!["restaurant".to_string(), "food".to_string()]),
        place_id: place_id.to_string(),
        business_status: Some("OPERATIONAL".to_string()),
    }
}

pub fn billing_service(db: &DatabaseConnection) -> BillingService {
    let stripe = StripeService::new(StripeConfig {
        secret_key: "sk_test_placeholder".to_string(),
        webhook_secret: "whsec_placeholder".to_string(),
        price_free: Some("price_free".to_string()),
        price_basic: Some("price_basic".to_string()),
        price_pro: Some("price_pro".to_string()),
        price_enterprise: Some("price_enterprise".to_string()),
        frontend_url: "http://localhost:3000".to_string(),
    });
    BillingService::new(db.clone(), stripe)
}
