use crate::entities::SubscriptionStatus;
use crate::error::AppResult;
use crate::services::BillingService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::{error, info, warn};
use stripe::{Event, EventObject, EventType, Expandable};

/// Stripe webhook处理器
///
/// 订阅生命周期事件：完成 Checkout 激活套餐，取消/扣款失败更新订阅状态
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    billing_service: web::Data<BillingService>,
) -> Result<HttpResponse> {
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            warn!("Missing Stripe-Signature header");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing Stripe-Signature header"
            })));
        }
    };

    let payload = std::str::from_utf8(&body).map_err(|_| {
        error!("Invalid UTF-8 in webhook payload");
        actix_web::error::ErrorBadRequest("Invalid payload encoding")
    })?;

    let event = match billing_service.stripe().construct_event(payload, signature) {
        Ok(event) => event,
        Err(e) => {
            error!("Webhook signature verification failed: {e}");
            return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid signature"
            })));
        }
    };

    info!("Received Stripe webhook event: {} ({})", event.type_, event.id);

    match handle_stripe_event(event, &billing_service).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "received": true
        }))),
        Err(e) => {
            error!("Failed to process webhook event: {e}");
            // 返回200避免Stripe重试，但记录错误
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "received": true,
                "error": format!("Processing failed: {e}")
            })))
        }
    }
}

async fn handle_stripe_event(event: Event, billing_service: &BillingService) -> AppResult<()> {
    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                // 事件里不带 line_items，重新查询一次
                let outcome = billing_service
                    .complete_checkout_session(session.id.as_str())
                    .await?;
                info!(
                    "Checkout session {} processed: activated={}, plan={}",
                    session.id, outcome.activated, outcome.plan
                );
            }
            Ok(())
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                billing_service
                    .set_subscription_status(subscription.id.as_str(), SubscriptionStatus::Canceled)
                    .await?;
            }
            Ok(())
        }
        EventType::InvoicePaymentFailed => {
            if let EventObject::Invoice(invoice) = event.data.object
                && let Some(sub) = invoice.subscription.as_ref()
            {
                let sub_id = match sub {
                    Expandable::Id(id) => id.to_string(),
                    Expandable::Object(obj) => obj.id.to_string(),
                };
                billing_service
                    .set_subscription_status(&sub_id, SubscriptionStatus::PastDue)
                    .await?;
            }
            Ok(())
        }
        _ => {
            info!("Unhandled event type: {:?}", event.type_);
            Ok(())
        }
    }
}

/// 配置webhook路由
pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/stripe", web::post().to(stripe_webhook)));
}
