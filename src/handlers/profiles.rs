use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{resolve_actor, resolve_profile};
use crate::clients::auth_admin::AuthAdminClient;
use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{
    ApiResponse, CreateProfileRequest, CreatePromotionRequestPayload, CreateReminderRequest,
    CreateSubscriptionRequestPayload, RequestStatus, UpdateMyProfileRequest,
};

fn validate(payload: &impl Validate) -> Result<(), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::invalid(format!("Validation failed: {e}")))
}

/// Owners may only clear out requests the moderators turned down; anything
/// still in flight or already settled stays on record.
fn request_deletable(status: RequestStatus) -> bool {
    status == RequestStatus::Rejected
}

// ============================================================================
// PROFILES
// ============================================================================

/// Mirror a freshly registered auth identity into a profile row. Called by
/// the gateway right after signup, carrying the new user's own id.
#[post("/profiles")]
pub async fn create_profile(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse, ServiceError> {
    let caller = crate::auth::actor_id_from_request(&req)?;
    let body = payload.into_inner();
    validate(&body)?;
    if body.id != caller {
        return Err(ServiceError::forbidden("profile id must match the caller"));
    }

    let profile = db.create_profile(body.into_profile()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(profile)))
}

#[get("/profiles/me")]
pub async fn get_my_profile(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let profile = resolve_profile(&req, &db).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

#[put("/profiles/me")]
pub async fn update_my_profile(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<UpdateMyProfileRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let profile = db.update_my_profile(actor.id, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

/// Self-service account removal. The profile row goes first; the auth record
/// removal is delegated to the identity provider and failures there only log,
/// so a flaky provider cannot resurrect the local account.
#[delete("/profiles/me")]
pub async fn delete_my_account(
    req: HttpRequest,
    db: web::Data<Database>,
    auth_admin: web::Data<AuthAdminClient>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    db.delete_profile(actor.id).await?;

    if let Err(err) = auth_admin.delete_user(actor.id).await {
        log::error!("auth record removal for {} failed: {err}", actor.id);
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[get("/notifications")]
pub async fn list_my_notifications(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let notifications = db.list_notifications_for_user(actor.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(notifications)))
}

#[get("/notifications/unread-count")]
pub async fn unread_notification_count(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let count = db.unread_notification_count(actor.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "unread": count }))))
}

#[put("/notifications/{notification_id}/read")]
pub async fn mark_notification_read(
    req: HttpRequest,
    db: web::Data<Database>,
    notification_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    if !db
        .mark_notification_read(notification_id.into_inner(), actor.id)
        .await?
    {
        return Err(ServiceError::not_found("Notification"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "read": true }))))
}

#[put("/notifications/read-all")]
pub async fn mark_all_notifications_read(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let updated = db.mark_all_notifications_read(actor.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "updated": updated }))))
}

#[delete("/notifications/{notification_id}")]
pub async fn delete_notification(
    req: HttpRequest,
    db: web::Data<Database>,
    notification_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    if !db
        .delete_notification(notification_id.into_inner(), actor.id)
        .await?
    {
        return Err(ServiceError::not_found("Notification"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// PROMOTION & SUBSCRIPTION REQUESTS
// ============================================================================

#[post("/promotion-requests")]
pub async fn create_promotion_request(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreatePromotionRequestPayload>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let request = db.create_promotion_request(body.into_request(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

#[get("/promotion-requests")]
pub async fn list_my_promotion_requests(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let requests = db
        .filter_promotion_requests(None, Some(actor.id), None)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

#[delete("/promotion-requests/{request_id}")]
pub async fn delete_promotion_request(
    req: HttpRequest,
    db: web::Data<Database>,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let request = db
        .get_promotion_request(request_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Promotion request"))?;
    if request.user_id != actor.id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not the owner of this request"));
    }
    if !request_deletable(request.status) {
        return Err(ServiceError::invalid("only rejected requests can be deleted"));
    }

    if !db
        .delete_rejected_promotion_request(request.id, request.user_id)
        .await?
    {
        return Err(ServiceError::not_found("Promotion request"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

#[post("/subscription-requests")]
pub async fn create_subscription_request(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateSubscriptionRequestPayload>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let request = db
        .create_subscription_request(body.into_request(actor.id))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

#[get("/subscription-requests")]
pub async fn list_my_subscription_requests(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let requests = db
        .filter_subscription_requests(None, Some(actor.id), None)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

#[delete("/subscription-requests/{request_id}")]
pub async fn delete_subscription_request(
    req: HttpRequest,
    db: web::Data<Database>,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let request = db
        .get_subscription_request(request_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Subscription request"))?;
    if request.user_id != actor.id && !actor.is_admin() {
        return Err(ServiceError::forbidden("not the owner of this request"));
    }
    if !request_deletable(request.status) {
        return Err(ServiceError::invalid("only rejected requests can be deleted"));
    }

    if !db
        .delete_rejected_subscription_request(request.id, request.user_id)
        .await?
    {
        return Err(ServiceError::not_found("Subscription request"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// TRANSACTIONS (user view)
// ============================================================================

#[get("/transactions")]
pub async fn list_my_transactions(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let transactions = db.list_transactions_for_user(actor.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(transactions)))
}

// ============================================================================
// REMINDERS
// ============================================================================

#[post("/reminders")]
pub async fn create_reminder(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateReminderRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let reminder = db.create_reminder(body.into_reminder(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(reminder)))
}

#[get("/reminders")]
pub async fn list_my_reminders(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let reminders = db.list_reminders_for_user(actor.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(reminders)))
}

#[put("/reminders/{reminder_id}/done")]
pub async fn mark_reminder_done(
    req: HttpRequest,
    db: web::Data<Database>,
    reminder_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    if !db
        .set_reminder_done(reminder_id.into_inner(), actor.id, true)
        .await?
    {
        return Err(ServiceError::not_found("Reminder"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "done": true }))))
}

#[delete("/reminders/{reminder_id}")]
pub async fn delete_reminder(
    req: HttpRequest,
    db: web::Data<Database>,
    reminder_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    if !db
        .delete_reminder(reminder_id.into_inner(), actor.id)
        .await?
    {
        return Err(ServiceError::not_found("Reminder"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rejected_requests_are_deletable() {
        assert!(request_deletable(RequestStatus::Rejected));
        assert!(!request_deletable(RequestStatus::Pending));
        assert!(!request_deletable(RequestStatus::Paid));
        assert!(!request_deletable(RequestStatus::Completed));
    }
}
