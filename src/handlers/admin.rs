use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::parse_status;
use crate::auth::resolve_actor;
use crate::clients::mailer::Mailer;
use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{
    ApiResponse, AppSettings, ApproveContentRequest, BroadcastNotificationsRequest, KycStatus,
    ModerationStatus, NotifyContentCreatedRequest, NotifyRoleRequestRequest,
    NotifySubscriptionRequestRequest, ProcessTransactionRequest, RequestStatus, Role,
    TransactionStatus, UpdateRoleRequest,
};
use crate::workflows;

fn validate(payload: &impl Validate) -> Result<(), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::invalid(format!("Validation failed: {e}")))
}

// ============================================================================
// MODERATION WORKFLOWS
// ============================================================================

#[post("/admin/content/approve")]
pub async fn approve_content(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<ApproveContentRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let outcome = workflows::approve_content(&db, &actor, &payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[post("/admin/promotions/{request_id}/approve")]
pub async fn approve_promotion(
    req: HttpRequest,
    db: web::Data<Database>,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let outcome = workflows::approve_promotion(&db, &actor, request_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[post("/admin/promotions/{request_id}/reject")]
pub async fn reject_promotion(
    req: HttpRequest,
    db: web::Data<Database>,
    request_id: web::Path<Uuid>,
    payload: web::Json<RejectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let outcome = workflows::reject_promotion(
        &db,
        &actor,
        request_id.into_inner(),
        payload.reason.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[post("/admin/subscriptions/{request_id}/approve")]
pub async fn approve_subscription(
    req: HttpRequest,
    db: web::Data<Database>,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let outcome = workflows::approve_subscription(&db, &actor, request_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[put("/admin/users/{user_id}/role")]
pub async fn update_user_role(
    req: HttpRequest,
    db: web::Data<Database>,
    user_id: web::Path<Uuid>,
    payload: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let outcome =
        workflows::update_user_role(&db, &actor, user_id.into_inner(), payload.new_role).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[post("/transactions/process")]
pub async fn process_transaction(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<ProcessTransactionRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;
    let outcome = workflows::process_transaction(&db, &actor, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[post("/admin/notifications/broadcast")]
pub async fn broadcast_notifications(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<BroadcastNotificationsRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;
    let outcome = workflows::broadcast_notifications(&db, &actor, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

// ============================================================================
// ADMIN FAN-OUT TRIGGERS
// ============================================================================

#[post("/notify-admins/content")]
pub async fn notify_admins_content(
    req: HttpRequest,
    db: web::Data<Database>,
    mailer: web::Data<Mailer>,
    payload: web::Json<NotifyContentCreatedRequest>,
) -> Result<HttpResponse, ServiceError> {
    resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;
    let outcome = workflows::notify_admins_on_content_creation(&db, &mailer, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[post("/notify-admins/role-request")]
pub async fn notify_admins_role_request(
    req: HttpRequest,
    db: web::Data<Database>,
    mailer: web::Data<Mailer>,
    payload: web::Json<NotifyRoleRequestRequest>,
) -> Result<HttpResponse, ServiceError> {
    resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;
    let outcome = workflows::notify_admins_on_role_request(&db, &mailer, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[post("/notify-admins/subscription-request")]
pub async fn notify_admins_subscription_request(
    req: HttpRequest,
    db: web::Data<Database>,
    mailer: web::Data<Mailer>,
    payload: web::Json<NotifySubscriptionRequestRequest>,
) -> Result<HttpResponse, ServiceError> {
    resolve_actor(&req, &db).await?;
    let outcome =
        workflows::notify_admins_on_subscription_request(&db, &mailer, &payload.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

// ============================================================================
// USERS & KYC
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

#[get("/admin/users")]
pub async fn list_users(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let users = match query.role {
        Some(role) => db.list_profiles_by_role(role).await?,
        None => db.list_profiles().await?,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

#[derive(Debug, Deserialize)]
pub struct KycStatusRequest {
    pub status: KycStatus,
}

#[put("/admin/users/{user_id}/kyc")]
pub async fn set_kyc_status(
    req: HttpRequest,
    db: web::Data<Database>,
    user_id: web::Path<Uuid>,
    payload: web::Json<KycStatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let user_id = user_id.into_inner();
    db.get_profile(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Profile"))?;
    db.set_kyc_status(user_id, payload.status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "updated": true }))))
}

// ============================================================================
// REVIEW MODERATION
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReviewStatusRequest {
    pub status: ModerationStatus,
}

#[put("/admin/reviews/{review_id}/status")]
pub async fn set_review_status(
    req: HttpRequest,
    db: web::Data<Database>,
    review_id: web::Path<Uuid>,
    payload: web::Json<ReviewStatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let review = db
        .get_review(review_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Review"))?;
    db.set_review_status(review.id, payload.status).await?;
    // The denormalized business rating tracks approved reviews only.
    db.refresh_business_rating(review.business_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "updated": true }))))
}

// ============================================================================
// REQUEST & TRANSACTION QUEUES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[get("/admin/promotion-requests")]
pub async fn list_promotion_requests(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<QueueQuery>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let status = parse_status::<RequestStatus>(query.status.as_deref())?;
    let requests = db
        .filter_promotion_requests(status, query.user_id, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

#[get("/admin/subscription-requests")]
pub async fn list_subscription_requests(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<QueueQuery>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let status = parse_status::<RequestStatus>(query.status.as_deref())?;
    let requests = db
        .filter_subscription_requests(status, query.user_id, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

#[get("/admin/transactions")]
pub async fn list_transactions(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<QueueQuery>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let status = parse_status::<TransactionStatus>(query.status.as_deref())?;
    let transactions = db
        .filter_transactions(status, query.user_id, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(transactions)))
}

#[derive(Debug, Deserialize)]
pub struct TransactionStatusRequest {
    pub status: TransactionStatus,
}

#[put("/admin/transactions/{transaction_id}/status")]
pub async fn set_transaction_status(
    req: HttpRequest,
    db: web::Data<Database>,
    transaction_id: web::Path<Uuid>,
    payload: web::Json<TransactionStatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let transaction_id = transaction_id.into_inner();
    db.get_transaction(transaction_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Transaction"))?;
    db.set_transaction_status(transaction_id, payload.status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "updated": true }))))
}

// ============================================================================
// APP SETTINGS & ACTIVITY
// ============================================================================

#[put("/admin/settings")]
pub async fn update_app_settings(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<AppSettings>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let settings = db.update_app_settings(&payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(settings)))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

#[get("/admin/activity")]
pub async fn list_activity(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<ActivityQuery>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    actor.require_admin()?;

    let entries = db.list_activity(query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}
