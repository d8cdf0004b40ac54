use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::parse_status;
use crate::auth::resolve_actor;
use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{
    ApiResponse, CreateActivityLogRequest, CreateEmergencyServiceRequest, CreateReviewRequest,
    ModerationStatus, UpsertSiteContentRequest,
};

fn validate(payload: &impl Validate) -> Result<(), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::invalid(format!("Validation failed: {e}")))
}

// ============================================================================
// REVIEWS
// ============================================================================

#[post("/reviews")]
pub async fn create_review(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    db.get_business(body.business_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Business"))?;
    let review = db.create_review(body.into_review(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(review)))
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[get("/businesses/{business_id}/reviews")]
pub async fn list_business_reviews(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    query: web::Query<ReviewListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let requested = parse_status::<ModerationStatus>(query.status.as_deref())?;
    let status = match requested {
        // Only admins browse the unapproved queue.
        Some(other) if other != ModerationStatus::Approved => {
            let actor = resolve_actor(&req, &db).await?;
            actor.require_admin()?;
            Some(other)
        }
        _ => Some(ModerationStatus::Approved),
    };

    let reviews = db
        .filter_reviews(Some(business_id.into_inner()), status, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(reviews)))
}

#[delete("/reviews/{review_id}")]
pub async fn delete_review(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let review = db
        .get_review(review_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Review"))?;
    if review.author_id != actor.id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not the author of this review"));
    }

    db.delete_review(review.id).await?;
    db.refresh_business_rating(review.business_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// SITE CONTENT
// ============================================================================

#[get("/site-content")]
pub async fn list_site_content(db: web::Data<Database>) -> Result<HttpResponse, ServiceError> {
    let pages = db.list_site_content().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(pages)))
}

#[get("/site-content/{slug}")]
pub async fn get_site_content(
    db: web::Data<Database>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let page = db
        .get_site_content(&slug.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Page"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

#[put("/site-content")]
pub async fn upsert_site_content(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<UpsertSiteContentRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;
    let body = payload.into_inner();
    validate(&body)?;

    let page = db.upsert_site_content(&body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

#[delete("/site-content/{slug}")]
pub async fn delete_site_content(
    req: HttpRequest,
    db: web::Data<Database>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    db.delete_site_content(&slug.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// EMERGENCY SERVICES
// ============================================================================

#[get("/emergency-services")]
pub async fn list_emergency_services(
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let services = db.list_emergency_services().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(services)))
}

#[post("/emergency-services")]
pub async fn create_emergency_service(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateEmergencyServiceRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;
    let body = payload.into_inner();
    validate(&body)?;

    let service = db.create_emergency_service(body.into_service()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(service)))
}

#[delete("/emergency-services/{service_id}")]
pub async fn delete_emergency_service(
    req: HttpRequest,
    db: web::Data<Database>,
    service_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    db.delete_emergency_service(service_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// APP SETTINGS (public read) & ACTIVITY
// ============================================================================

#[get("/settings")]
pub async fn get_app_settings(db: web::Data<Database>) -> Result<HttpResponse, ServiceError> {
    let settings = db
        .get_app_settings()
        .await?
        .ok_or_else(|| ServiceError::not_found("Settings"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(settings)))
}

#[post("/activity")]
pub async fn record_activity(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateActivityLogRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let entry = db
        .record_activity(Some(actor.id), &body.action, body.details.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(entry)))
}
