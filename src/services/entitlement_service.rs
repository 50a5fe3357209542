//! Per-user monthly metering.
//!
//! Checks are pure reads against the plan catalog. Increments are a single
//! `UPDATE ... SET col = col + 1` so concurrent callers never lose a count.

use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{ActionType, UsageSummary, allowance_for};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, UpdateMany};

/// 在用户快照上判断是否还能执行该动作
pub fn can_perform_action(user: &users::Model, action: ActionType) -> bool {
    allowance_for(user.subscription_plan, action).permits(user.usage_for(action))
}

/// 单条 `UPDATE users SET <计数列> = <计数列> + 1 WHERE id = ?`，不先读后写
fn increment_statement(user_id: i32, action: ActionType) -> UpdateMany<users::Entity> {
    let column = users::usage_column(action);
    users::Entity::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .col_expr(users::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(users::Column::Id.eq(user_id))
}

#[derive(Clone)]
pub struct EntitlementService {
    pool: DatabaseConnection,
}

impl EntitlementService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find_user(&self, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn can_perform(&self, user_id: i32, action: ActionType) -> AppResult<bool> {
        let user = self.find_user(user_id).await?;
        Ok(can_perform_action(&user, action))
    }

    /// 额度不足时返回 QuotaExceeded（前端据此展示升级提示）
    pub async fn ensure_allowed(&self, user_id: i32, action: ActionType) -> AppResult<()> {
        let user = self.find_user(user_id).await?;
        if can_perform_action(&user, action) {
            return Ok(());
        }
        log::warn!(
            "User {} reached {} limit ({})",
            user.id,
            action,
            allowance_for(user.subscription_plan, action)
        );
        Err(AppError::QuotaExceeded(format!(
            "Monthly {action} limit reached for the {} plan. Please upgrade your plan to continue.",
            user.subscription_plan
        )))
    }

    /// 原子自增；用户不存在时什么也不改并返回 NotFound
    pub async fn increment_usage(&self, user_id: i32, action: ActionType) -> AppResult<()> {
        let result = increment_statement(user_id, action)
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if let Ok(user) = self.find_user(user_id).await {
            log::info!(
                "User {} {} count: {}/{}",
                user.id,
                action,
                user.usage_for(action),
                allowance_for(user.subscription_plan, action)
            );
        }
        Ok(())
    }

    pub async fn usage_summary(&self, user_id: i32) -> AppResult<UsageSummary> {
        let user = self.find_user(user_id).await?;
        Ok(UsageSummary::from(&user))
    }
}
