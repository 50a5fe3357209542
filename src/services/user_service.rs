use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::{DatabaseConnection, EntityTrait};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 当前用户信息 + 本月用量
    pub async fn me(&self, user_id: i32) -> AppResult<MeResponse> {
        let user = self.get_user(user_id).await?;
        let usage = UsageSummary::from(&user);
        Ok(MeResponse {
            user: UserResponse::from(user),
            usage,
        })
    }
}
