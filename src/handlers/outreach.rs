use crate::models::*;
use crate::services::OutreachService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/leads/search",
    tag = "outreach",
    request_body = SearchLeadsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Crawled and imported", body = SearchLeadsResponse),
        (status = 403, description = "Monthly search limit reached"),
        (status = 502, description = "Lead source failed")
    )
)]
pub async fn search_leads(
    outreach_service: web::Data<OutreachService>,
    req: HttpRequest,
    request: web::Json<SearchLeadsRequest>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match outreach_service
        .search_leads(user_id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Search completed successfully",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/businesses/{id}/generate-website",
    tag = "outreach",
    params(("id" = i32, Path, description = "Business id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Website generated", body = GenerateWebsiteResponse),
        (status = 403, description = "Monthly website limit reached"),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn generate_website(
    outreach_service: web::Data<OutreachService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match outreach_service
        .generate_website(user_id, path.into_inner())
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
    path = "/businesses/{id}/generate-message",
    tag = "outreach",
    params(("id" = i32, Path, description = "Business id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Outreach message", body = GenerateMessageResponse),
        (status = 403, description = "Monthly message limit reached"),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn generate_message(
    outreach_service: web::Data<OutreachService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match outreach_service
        .generate_message(user_id, path.into_inner())
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
    path = "/businesses/{id}/customize",
    tag = "outreach",
    params(("id" = i32, Path, description = "Business id")),
    request_body = CustomizeWebsiteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Website customized", body = CustomizeWebsiteResponse),
        (status = 403, description = "Plan cannot customize or no messages left"),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn customize_website(
    outreach_service: web::Data<OutreachService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<CustomizeWebsiteRequest>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match outreach_service
        .customize_website(user_id, path.into_inner(), request.into_inner())
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
    get,
    path = "/businesses/{id}/customize/remaining",
    tag = "outreach",
    params(("id" = i32, Path, description = "Business id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Customization messages left", body = RemainingMessagesResponse)
    )
)]
pub async fn remaining_customizations(
    outreach_service: web::Data<OutreachService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match outreach_service
        .remaining_customizations(user_id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn outreach_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/leads/search", web::post().to(search_leads))
        .route(
            "/businesses/{id}/generate-website",
            web::post().to(generate_website),
        )
        .route(
            "/businesses/{id}/generate-message",
            web::post().to(generate_message),
        )
        .route("/businesses/{id}/customize", web::post().to(customize_website))
        .route(
            "/businesses/{id}/customize/remaining",
            web::get().to(remaining_customizations),
        );
}
