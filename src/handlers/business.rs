use crate::models::*;
use crate::services::{ImportService, LeadService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/businesses",
    tag = "business",
    params(BusinessQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Own leads matching the filters", body = [Business]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_businesses(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
    query: web::Query<BusinessQuery>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service.list_businesses(user_id, &query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/businesses/stats",
    tag = "business",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lead counters", body = BusinessStats),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_stats(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service.stats(user_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/businesses/import",
    tag = "business",
    request_body = Vec<ExternalLeadRecord>,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Import tallies", body = ImportResult),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn import_businesses(
    import_service: web::Data<ImportService>,
    req: HttpRequest,
    records: web::Json<Vec<ExternalLeadRecord>>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match import_service
        .import_businesses(user_id, records.into_inner())
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": result.summary(),
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/businesses/{id}",
    tag = "business",
    params(("id" = i32, Path, description = "Business id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lead", body = Business),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn get_business(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service.get_business(user_id, path.into_inner()).await {
        Ok(business) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": business
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/businesses/{id}",
    tag = "business",
    params(("id" = i32, Path, description = "Business id")),
    request_body = UpdateBusinessRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Updated lead", body = Business),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn update_business(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateBusinessRequest>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service
        .update_business(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(business) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": business
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/businesses/{id}/status",
    tag = "business",
    params(("id" = i32, Path, description = "Business id")),
    request_body = UpdateLeadStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = Business),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn update_status(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateLeadStatusRequest>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service
        .update_lead_status(user_id, path.into_inner(), request.status)
        .await
    {
        Ok(business) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": business
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/businesses/{id}/contacted",
    tag = "business",
    params(("id" = i32, Path, description = "Business id")),
    request_body = MarkContactedRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Marked as contacted", body = Business),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn mark_contacted(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: Option<web::Json<MarkContactedRequest>>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);
    let notes = request.and_then(|r| r.into_inner().notes);

    match lead_service
        .mark_contacted(user_id, path.into_inner(), notes)
        .await
    {
        Ok(business) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": business
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/businesses/{id}",
    tag = "business",
    params(("id" = i32, Path, description = "Business id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or owned by another user")
    )
)]
pub async fn delete_business(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service.delete_business(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Business deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/businesses",
    tag = "business",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All own leads deleted"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn delete_all_businesses(
    lead_service: web::Data<LeadService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = user_or_reject!(req);

    match lead_service.delete_all_businesses(user_id).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "deleted": deleted }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn business_config(cfg: &mut web::ServiceConfig) {
    // 固定路径要在 /{id} 之前注册
    cfg.service(
        web::resource("/businesses")
            .route(web::get().to(list_businesses))
            .route(web::delete().to(delete_all_businesses)),
    )
    .route("/businesses/stats", web::get().to(get_stats))
    .route("/businesses/import", web::post().to(import_businesses))
    .service(
        web::resource("/businesses/{id}")
            .route(web::get().to(get_business))
            .route(web::put().to(update_business))
            .route(web::delete().to(delete_business)),
    )
    .route("/businesses/{id}/status", web::patch().to(update_status))
    .route("/businesses/{id}/contacted", web::post().to(mark_contacted));
}
