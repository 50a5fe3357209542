use crate::models::plan::SubscriptionPlan;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub plan: SubscriptionPlan,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySessionRequest {
    #[schema(example = "cs_test_a1b2c3")]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySessionResponse {
    pub activated: bool,
    pub plan: SubscriptionPlan,
}
