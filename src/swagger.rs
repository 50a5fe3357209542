use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{LeadStatus, SubscriptionStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::me,
        handlers::business::list_businesses,
        handlers::business::get_stats,
        handlers::business::import_businesses,
        handlers::business::get_business,
        handlers::business::update_business,
        handlers::business::update_status,
        handlers::business::mark_contacted,
        handlers::business::delete_business,
        handlers::business::delete_all_businesses,
        handlers::outreach::search_leads,
        handlers::outreach::generate_website,
        handlers::outreach::generate_message,
        handlers::outreach::customize_website,
        handlers::outreach::remaining_customizations,
        handlers::billing::create_checkout,
        handlers::billing::verify_session,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            UserResponse,
            AuthResponse,
            ActionUsage,
            UsageSummary,
            MeResponse,
            SubscriptionPlan,
            SubscriptionStatus,
            ActionType,
            Business,
            LeadStatus,
            ExternalLeadRecord,
            ImportResult,
            UpdateBusinessRequest,
            UpdateLeadStatusRequest,
            MarkContactedRequest,
            BusinessQuery,
            BusinessStats,
            SearchLeadsRequest,
            SearchLeadsResponse,
            GenerateWebsiteResponse,
            GenerateMessageResponse,
            CustomizeWebsiteRequest,
            CustomizeWebsiteResponse,
            RemainingMessagesResponse,
            CheckoutRequest,
            CheckoutResponse,
            VerifySessionRequest,
            VerifySessionResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and tokens"),
        (name = "user", description = "Current user and plan usage"),
        (name = "business", description = "Lead management"),
        (name = "outreach", description = "Metered lead search and AI generation"),
        (name = "billing", description = "Stripe subscriptions"),
    ),
    info(
        title = "LeadForge Backend API",
        version = "0.1.0",
        description = "Lead generation and outreach SaaS REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_metered_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/leads/search"));
        assert!(doc.paths.paths.contains_key("/businesses/{id}/customize"));
        assert!(doc.paths.paths.contains_key("/me"));
    }
}
