use crate::models::{ActionType, SubscriptionPlan};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "past_due")]
    PastDue,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Canceled => write!(f, "canceled"),
            SubscriptionStatus::PastDue => write!(f, "past_due"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    /// 逗号分隔，例如 "USER,ADMIN"
    pub roles: String,
    pub subscription_plan: SubscriptionPlan,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub searches_used: i32,
    pub websites_generated: i32,
    pub messages_generated: i32,
    pub usage_reset_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn usage_for(&self, action: ActionType) -> i32 {
        match action {
            ActionType::Search => self.searches_used,
            ActionType::GenerateWebsite => self.websites_generated,
            ActionType::GenerateMessage => self.messages_generated,
        }
    }

    pub fn role_list(&self) -> Vec<String> {
        self.roles
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 每种计量动作对应的计数列
pub fn usage_column(action: ActionType) -> Column {
    match action {
        ActionType::Search => Column::SearchesUsed,
        ActionType::GenerateWebsite => Column::WebsitesGenerated,
        ActionType::GenerateMessage => Column::MessagesGenerated,
    }
}
