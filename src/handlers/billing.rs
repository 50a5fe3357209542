use crate::models::*;
use crate::services::BillingService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/billing/checkout",
    tag = "billing",
    request_body = CheckoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Stripe Checkout session created", body = CheckoutResponse),
        (status = 400, description = "No price configured for the plan"),
        (status = 502, description = "Stripe error")
    )
)]
pub async fn create_checkout(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match billing_service
        .create_checkout_session(user_id, request.plan)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/billing/verify-session",
    tag = "billing",
    request_body = VerifySessionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Session checked; plan activated when complete", body = VerifySessionResponse),
        (status = 403, description = "Session belongs to another user")
    )
)]
pub async fn verify_session(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
    request: web::Json<VerifySessionRequest>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match billing_service
        .verify_session(user_id, &request.session_id)
        .await
    {
        Ok(response) if response.activated => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Subscription activated",
            "data": response
        }))),
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": false,
            "message": "Payment not complete",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn billing_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/billing")
            .route("/checkout", web::post().to(create_checkout))
            .route("/verify-session", web::post().to(verify_session)),
    );
}
