use crate::entities::{customization_usage_entity as usages, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{can_customize, customization_limit};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// 每个 (用户, 网站) 的 AI 定制消息额度
#[derive(Clone)]
pub struct CustomizationService {
    pool: DatabaseConnection,
}

impl CustomizationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find_user(&self, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn can_customize(&self, user_id: i32) -> AppResult<bool> {
        let user = self.find_user(user_id).await?;
        Ok(can_customize(user.subscription_plan))
    }

    async fn messages_used(&self, username: &str, business_id: i32) -> AppResult<i32> {
        let row = usages::Entity::find()
            .filter(usages::Column::Username.eq(username))
            .filter(usages::Column::BusinessId.eq(business_id))
            .one(&self.pool)
            .await?;
        Ok(row.map(|r| r.messages_used).unwrap_or(0))
    }

    /// 套餐不支持定制时为 0（不管有没有用量记录）；否则 max(0, 额度 - 已用)
    pub async fn get_remaining(&self, user_id: i32, business_id: i32) -> AppResult<i32> {
        let user = self.find_user(user_id).await?;
        let Some(limit) = customization_limit(user.subscription_plan) else {
            return Ok(0);
        };
        let used = self.messages_used(&user.username, business_id).await?;
        Ok((limit - used).max(0))
    }

    /// 首次使用时插入记录，否则原子 +1
    pub async fn decrement(&self, user_id: i32, business_id: i32) -> AppResult<()> {
        let user = self.find_user(user_id).await?;
        let now = Utc::now();

        let row = usages::ActiveModel {
            username: Set(user.username.clone()),
            business_id: Set(business_id),
            messages_used: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        usages::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([usages::Column::Username, usages::Column::BusinessId])
                    .value(
                        usages::Column::MessagesUsed,
                        Expr::col((usages::Entity, usages::Column::MessagesUsed)).add(1),
                    )
                    .update_column(usages::Column::UpdatedAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        log::info!(
            "User {} used a customization message on business {}",
            user.username,
            business_id
        );
        Ok(())
    }
}
