//! Bridge between Stripe subscriptions and the local plan/usage state.

use crate::config::StripeConfig;
use crate::entities::{SubscriptionStatus, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutOutcome, StripeService};
use crate::models::{CheckoutResponse, SubscriptionPlan, VerifySessionResponse};
use chrono::{Months, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};

/// 套餐对应的 Stripe 价格 ID；未配置的套餐不能下单
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    prices: Vec<(SubscriptionPlan, String)>,
}

impl PriceCatalog {
    pub fn from_config(config: &StripeConfig) -> Self {
        let prices = [
            (SubscriptionPlan::Free, &config.price_free),
            (SubscriptionPlan::Basic, &config.price_basic),
            (SubscriptionPlan::Pro, &config.price_pro),
            (SubscriptionPlan::Enterprise, &config.price_enterprise),
        ]
        .into_iter()
        .filter_map(|(plan, price)| {
            price
                .as_ref()
                .filter(|p| !p.is_empty())
                .map(|p| (plan, p.clone()))
        })
        .collect();
        Self { prices }
    }

    pub fn price_for(&self, plan: SubscriptionPlan) -> Option<&str> {
        self.prices
            .iter()
            .find(|(p, _)| *p == plan)
            .map(|(_, price)| price.as_str())
    }

    /// 未知价格 ID 一律视为 FREE
    pub fn plan_for(&self, price_id: &str) -> SubscriptionPlan {
        self.prices
            .iter()
            .find(|(_, price)| price == price_id)
            .map(|(plan, _)| *plan)
            .unwrap_or(SubscriptionPlan::Free)
    }
}

#[derive(Clone)]
pub struct BillingService {
    pool: DatabaseConnection,
    stripe: StripeService,
    prices: PriceCatalog,
}

impl BillingService {
    pub fn new(pool: DatabaseConnection, stripe: StripeService) -> Self {
        let prices = PriceCatalog::from_config(stripe.config());
        Self {
            pool,
            stripe,
            prices,
        }
    }

    pub fn price_id_to_plan(&self, price_id: &str) -> SubscriptionPlan {
        self.prices.plan_for(price_id)
    }

    /// 切换套餐：写入账单 ID、状态置为 active、三个计数清零、下次重置日期为一个月后
    pub async fn upgrade_user_plan(
        &self,
        user_id: i32,
        plan: SubscriptionPlan,
        customer_id: Option<String>,
        subscription_id: Option<String>,
    ) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now();
        let mut am = user.into_active_model();
        am.subscription_plan = Set(plan);
        am.stripe_customer_id = Set(customer_id);
        am.stripe_subscription_id = Set(subscription_id);
        am.subscription_status = Set(SubscriptionStatus::Active);
        am.searches_used = Set(0);
        am.websites_generated = Set(0);
        am.messages_generated = Set(0);
        am.usage_reset_date = Set(now.checked_add_months(Months::new(1)));
        am.updated_at = Set(now);
        am.update(&self.pool).await?;

        log::info!("Upgraded user {user_id} to plan {plan}");
        Ok(())
    }

    /// 按 Stripe 订阅 ID 更新订阅状态，返回受影响的用户数
    pub async fn set_subscription_status(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> AppResult<u64> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::SubscriptionStatus, Expr::value(status))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::StripeSubscriptionId.eq(subscription_id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            log::warn!("No user found for subscription {subscription_id}");
        } else {
            log::info!("Subscription {subscription_id} marked {status}");
        }
        Ok(result.rows_affected)
    }

    /// 清零重置日期已过（或从未设置）的用户用量，并把重置日期设为一个月后
    pub async fn rollover_expired_usage(&self) -> AppResult<u64> {
        let now = Utc::now();
        let result = users::Entity::update_many()
            .col_expr(users::Column::SearchesUsed, Expr::value(0))
            .col_expr(users::Column::WebsitesGenerated, Expr::value(0))
            .col_expr(users::Column::MessagesGenerated, Expr::value(0))
            .col_expr(
                users::Column::UsageResetDate,
                Expr::value(now.checked_add_months(Months::new(1))),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(
                Condition::any()
                    .add(users::Column::UsageResetDate.is_null())
                    .add(users::Column::UsageResetDate.lte(now)),
            )
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn create_checkout_session(
        &self,
        user_id: i32,
        plan: SubscriptionPlan,
    ) -> AppResult<CheckoutResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let price_id = self.prices.price_for(plan).ok_or_else(|| {
            AppError::ValidationError(format!("No Stripe price configured for plan {plan}"))
        })?;

        let session = self
            .stripe
            .create_subscription_checkout(price_id, user.id, Some(user.email.as_str()))
            .await?;

        let checkout_url = session
            .url
            .clone()
            .ok_or_else(|| AppError::ExternalApiError("Checkout session has no URL".to_string()))?;

        log::info!("Created checkout session {} for user {user_id} ({plan})", session.id);
        Ok(CheckoutResponse {
            checkout_url,
            session_id: session.id.to_string(),
        })
    }

    /// 校验已完成的 Checkout 会话并为当前用户激活套餐
    pub async fn verify_session(
        &self,
        user_id: i32,
        session_id: &str,
    ) -> AppResult<VerifySessionResponse> {
        let session = self.stripe.retrieve_checkout_session(session_id).await?;
        let outcome = CheckoutOutcome::from(&session);

        if let Some(reference) = outcome.client_reference_id.as_deref()
            && reference != user_id.to_string()
        {
            return Err(AppError::Forbidden);
        }

        self.activate_checkout(user_id, outcome).await
    }

    /// Webhook 路径：用户来自 client_reference_id
    pub async fn complete_checkout_session(
        &self,
        session_id: &str,
    ) -> AppResult<VerifySessionResponse> {
        let session = self.stripe.retrieve_checkout_session(session_id).await?;
        let outcome = CheckoutOutcome::from(&session);
        let user_id = outcome
            .client_reference_id
            .as_deref()
            .and_then(|r| r.parse::<i32>().ok())
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Checkout session {session_id} has no user reference"
                ))
            })?;
        self.activate_checkout(user_id, outcome).await
    }

    pub async fn activate_checkout(
        &self,
        user_id: i32,
        outcome: CheckoutOutcome,
    ) -> AppResult<VerifySessionResponse> {
        if !outcome.complete {
            log::warn!("Checkout for user {user_id} is not complete yet");
            return Ok(VerifySessionResponse {
                activated: false,
                plan: SubscriptionPlan::Free,
            });
        }

        let plan = outcome
            .price_id
            .as_deref()
            .map(|p| self.price_id_to_plan(p))
            .unwrap_or(SubscriptionPlan::Free);

        self.upgrade_user_plan(user_id, plan, outcome.customer_id, outcome.subscription_id)
            .await?;

        Ok(VerifySessionResponse {
            activated: true,
            plan,
        })
    }

    pub fn stripe(&self) -> &StripeService {
        &self.stripe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StripeConfig {
        StripeConfig {
            price_basic: Some("price_basic".into()),
            price_pro: Some("price_pro".into()),
            price_enterprise: Some("price_ent".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_price_mapping() {
        let catalog = PriceCatalog::from_config(&config());
        assert_eq!(catalog.plan_for("price_pro"), SubscriptionPlan::Pro);
        assert_eq!(catalog.plan_for("price_ent"), SubscriptionPlan::Enterprise);
        assert_eq!(catalog.plan_for("price_unknown"), SubscriptionPlan::Free);
        assert_eq!(catalog.price_for(SubscriptionPlan::Basic), Some("price_basic"));
        assert_eq!(catalog.price_for(SubscriptionPlan::Free), None);
    }
}
