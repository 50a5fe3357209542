use crate::entities::{SubscriptionStatus, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::{Months, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.username)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 新用户默认 FREE 套餐，用量从 0 开始
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username.as_str()))
                    .add(users::Column::Email.eq(email.as_str())),
            )
            .one(&self.pool)
            .await?;
        if let Some(u) = existing {
            let field = if u.username == username { "Username" } else { "Email" };
            return Err(AppError::ValidationError(format!("{field} is already registered")));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let user = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            roles: Set("USER".to_string()),
            subscription_plan: Set(SubscriptionPlan::Free),
            stripe_customer_id: Set(None),
            stripe_subscription_id: Set(None),
            subscription_status: Set(SubscriptionStatus::Active),
            searches_used: Set(0),
            websites_generated: Set(0),
            messages_generated: Set(0),
            usage_reset_date: Set(now.checked_add_months(Months::new(1))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Registered user {} ({})", user.id, user.username);
        self.issue_tokens(user)
    }

    /// 用户名或邮箱登录
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let login = request.login.trim();
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(login))
                    .add(users::Column::Email.eq(login.to_lowercase())),
            )
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid username or password".to_string()));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = users::Entity::find_by_id(claims.user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        self.issue_tokens(user)
    }
}
