use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionMode, CheckoutSessionPaymentStatus,
    CheckoutSessionStatus, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems, Event,
    Expandable, Webhook,
};

/// Stripe 客户端封装：订阅 Checkout、会话查询、Webhook 验签
#[derive(Clone)]
pub struct StripeService {
    client: Client,
    config: StripeConfig,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// 创建订阅模式的 Checkout Session，client_reference_id 记录用户 ID
    pub async fn create_subscription_checkout(
        &self,
        price_id: &str,
        user_id: i32,
        email: Option<&str>,
    ) -> AppResult<CheckoutSession> {
        let base = self.config.frontend_url.trim_end_matches('/');
        let success_url = format!("{base}/payment/success?session_id={{CHECKOUT_SESSION_ID}}");
        let cancel_url = format!("{base}/payment/canceled");
        let reference = user_id.to_string();

        let params = CreateCheckoutSession {
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(price_id.to_string()),
                quantity: Some(1),
                ..Default::default()
            }]),
            mode: Some(CheckoutSessionMode::Subscription),
            success_url: Some(success_url.as_str()),
            cancel_url: Some(cancel_url.as_str()),
            client_reference_id: Some(reference.as_str()),
            customer_email: email,
            ..Default::default()
        };

        CheckoutSession::create(&self.client, params)
            .await
            .map_err(AppError::from)
    }

    /// 查询会话并展开 line_items，用于读取价格 ID
    pub async fn retrieve_checkout_session(&self, session_id: &str) -> AppResult<CheckoutSession> {
        let id = session_id.parse::<CheckoutSessionId>().map_err(|e| {
            AppError::ValidationError(format!("Invalid checkout session id {session_id}: {e}"))
        })?;
        CheckoutSession::retrieve(&self.client, &id, &["line_items"])
            .await
            .map_err(AppError::from)
    }

    pub fn construct_event(&self, payload: &str, signature: &str) -> AppResult<Event> {
        Webhook::construct_event(payload, signature, &self.config.webhook_secret).map_err(|e| {
            log::error!("Error constructing webhook event: {e}");
            AppError::AuthError(format!("Webhook signature verification failed: {e}"))
        })
    }
}

/// The fields of a checkout session needed to activate a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub complete: bool,
    pub client_reference_id: Option<String>,
    pub price_id: Option<String>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

impl From<&CheckoutSession> for CheckoutOutcome {
    fn from(session: &CheckoutSession) -> Self {
        // status=complete 或 payment_status=paid 任一满足即视为完成
        let complete = matches!(session.status, Some(CheckoutSessionStatus::Complete))
            || matches!(session.payment_status, CheckoutSessionPaymentStatus::Paid);

        let price_id = session
            .line_items
            .as_ref()
            .and_then(|items| items.data.first())
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.to_string());

        let customer_id = session.customer.as_ref().map(|c| match c {
            Expandable::Id(id) => id.to_string(),
            Expandable::Object(obj) => obj.id.to_string(),
        });

        let subscription_id = session.subscription.as_ref().map(|s| match s {
            Expandable::Id(id) => id.to_string(),
            Expandable::Object(obj) => obj.id.to_string(),
        });

        Self {
            complete,
            client_reference_id: session.client_reference_id.clone(),
            price_id,
            customer_id,
            subscription_id,
        }
    }
}
