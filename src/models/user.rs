use crate::entities::{SubscriptionStatus, user_entity};
use crate::models::plan::{ActionType, SubscriptionPlan, allowance_for};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "jane")]
    pub username: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Password123!")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email.
    #[schema(example = "jane")]
    pub login: String,
    #[schema(example = "Password123!")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            roles: user.role_list(),
            username: user.username,
            email: user.email,
            subscription_plan: user.subscription_plan,
            subscription_status: user.subscription_status,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// 单个计量动作的用量。`allowance`/`remaining` 为 null 表示不限量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionUsage {
    pub used: i32,
    pub allowance: Option<i32>,
    pub remaining: Option<i32>,
}

impl ActionUsage {
    pub fn for_user(user: &user_entity::Model, action: ActionType) -> Self {
        let allowance = allowance_for(user.subscription_plan, action);
        let used = user.usage_for(action);
        Self {
            used,
            allowance: allowance.limit(),
            remaining: allowance.remaining(used),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsageSummary {
    pub subscription_plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    pub searches: ActionUsage,
    pub websites: ActionUsage,
    pub messages: ActionUsage,
    pub usage_reset_date: Option<DateTime<Utc>>,
}

impl From<&user_entity::Model> for UsageSummary {
    fn from(user: &user_entity::Model) -> Self {
        Self {
            subscription_plan: user.subscription_plan,
            subscription_status: user.subscription_status,
            searches: ActionUsage::for_user(user, ActionType::Search),
            websites: ActionUsage::for_user(user, ActionType::GenerateWebsite),
            messages: ActionUsage::for_user(user, ActionType::GenerateMessage),
            usage_reset_date: user.usage_reset_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
    pub usage: UsageSummary,
}
