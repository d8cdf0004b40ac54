use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::parse_status;
use crate::auth::{resolve_actor, Actor};
use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{
    ApiResponse, ContentFilter, CreateBusinessRequest, CreateDonationRequest, CreateEventRequest,
    CreateJobRequest, CreateLostItemRequest, CreateMarketItemRequest, DonationStatus, EventStatus,
    JobStatus, LostItemKind, LostItemStatus, MarketItemStatus, ModerationStatus,
    UpdateBusinessRequest,
};

fn require_owner(actor: &Actor, owner: Uuid) -> Result<(), ServiceError> {
    if actor.id == owner || actor.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("not the owner of this listing"))
    }
}

fn validate(payload: &impl Validate) -> Result<(), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::invalid(format!("Validation failed: {e}")))
}

/// Listings default to publicly visible rows; browsing the moderation queue
/// (pending or rejected) needs an admin, or an owner filtering their own rows.
async fn authorize_status_filter(
    req: &HttpRequest,
    db: &Database,
    filter: &ContentFilter,
) -> Result<(), ServiceError> {
    let requested = filter
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match requested {
        Some("pending") | Some("rejected") => {
            let actor = resolve_actor(req, db).await?;
            if actor.is_admin() || filter.owner_id == Some(actor.id) {
                Ok(())
            } else {
                Err(ServiceError::forbidden(
                    "moderation queue is restricted to admins",
                ))
            }
        }
        _ => Ok(()),
    }
}

// ============================================================================
// BUSINESSES
// ============================================================================

#[post("/businesses")]
pub async fn create_business(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateBusinessRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let business = db.create_business(body.into_business(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(business)))
}

#[get("/businesses")]
pub async fn list_businesses(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<ContentFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    authorize_status_filter(&req, &db, &filter).await?;
    let status = parse_status::<ModerationStatus>(filter.status.as_deref())?
        .or(Some(ModerationStatus::Approved));
    let businesses = db.filter_businesses(status, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(businesses)))
}

#[get("/businesses/{business_id}")]
pub async fn get_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let business = db
        .get_business(business_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Business"))?;

    if business.status != ModerationStatus::Approved {
        let actor = resolve_actor(&req, &db).await?;
        require_owner(&actor, business.owner_id)?;
    } else {
        db.increment_business_views(business.id).await?;
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(business)))
}

#[put("/businesses/{business_id}")]
pub async fn update_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
    payload: web::Json<UpdateBusinessRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let mut business = db
        .get_business(business_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Business"))?;
    require_owner(&actor, business.owner_id)?;

    body.apply_to_existing(&mut business);
    let updated = db.update_business(&business).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[delete("/businesses/{business_id}")]
pub async fn delete_business(
    req: HttpRequest,
    db: web::Data<Database>,
    business_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let business = db
        .get_business(business_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Business"))?;
    require_owner(&actor, business.owner_id)?;

    db.delete_business(business.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// JOBS
// ============================================================================

#[post("/jobs")]
pub async fn create_job(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateJobRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let job = db.create_job(body.into_job(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(job)))
}

#[get("/jobs")]
pub async fn list_jobs(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<ContentFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    authorize_status_filter(&req, &db, &filter).await?;
    let status =
        parse_status::<JobStatus>(filter.status.as_deref())?.or(Some(JobStatus::Approved));
    let jobs = db.filter_jobs(status, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(jobs)))
}

#[get("/jobs/{job_id}")]
pub async fn get_job(
    req: HttpRequest,
    db: web::Data<Database>,
    job_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let job = db
        .get_job(job_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Job"))?;

    if matches!(job.status, JobStatus::Pending | JobStatus::Rejected) {
        let actor = resolve_actor(&req, &db).await?;
        require_owner(&actor, job.poster_id)?;
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(job)))
}

#[put("/jobs/{job_id}")]
pub async fn update_job(
    req: HttpRequest,
    db: web::Data<Database>,
    job_id: web::Path<Uuid>,
    payload: web::Json<CreateJobRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let existing = db
        .get_job(job_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Job"))?;
    require_owner(&actor, existing.poster_id)?;

    let mut updated = body.into_job(existing.poster_id);
    updated.id = existing.id;
    let job = db.update_job(&updated).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(job)))
}

#[post("/jobs/{job_id}/close")]
pub async fn close_job(
    req: HttpRequest,
    db: web::Data<Database>,
    job_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let job = db
        .get_job(job_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Job"))?;
    require_owner(&actor, job.poster_id)?;

    db.close_job(job.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "closed": true }))))
}

#[delete("/jobs/{job_id}")]
pub async fn delete_job(
    req: HttpRequest,
    db: web::Data<Database>,
    job_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let job = db
        .get_job(job_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Job"))?;
    require_owner(&actor, job.poster_id)?;

    db.delete_job(job.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// EVENTS
// ============================================================================

#[post("/events")]
pub async fn create_event(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateEventRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;
    body.validate_business_rules().map_err(ServiceError::invalid)?;

    let event = db.create_event(body.into_event(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(event)))
}

#[get("/events")]
pub async fn list_events(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<ContentFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    authorize_status_filter(&req, &db, &filter).await?;
    let status =
        parse_status::<EventStatus>(filter.status.as_deref())?.or(Some(EventStatus::Approved));
    let events = db.filter_events(status, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(events)))
}

#[get("/events/{event_id}")]
pub async fn get_event(
    req: HttpRequest,
    db: web::Data<Database>,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let event = db
        .get_event(event_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Event"))?;

    if matches!(event.status, EventStatus::Pending | EventStatus::Rejected) {
        let actor = resolve_actor(&req, &db).await?;
        require_owner(&actor, event.organizer_id)?;
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}

#[put("/events/{event_id}")]
pub async fn update_event(
    req: HttpRequest,
    db: web::Data<Database>,
    event_id: web::Path<Uuid>,
    payload: web::Json<CreateEventRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;
    body.validate_business_rules().map_err(ServiceError::invalid)?;

    let existing = db
        .get_event(event_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Event"))?;
    require_owner(&actor, existing.organizer_id)?;

    let mut updated = body.into_event(existing.organizer_id);
    updated.id = existing.id;
    let event = db.update_event(&updated).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}

#[post("/events/{event_id}/cancel")]
pub async fn cancel_event(
    req: HttpRequest,
    db: web::Data<Database>,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let event = db
        .get_event(event_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Event"))?;
    require_owner(&actor, event.organizer_id)?;

    db.set_event_status(event.id, EventStatus::Cancelled).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "cancelled": true }))))
}

#[delete("/events/{event_id}")]
pub async fn delete_event(
    req: HttpRequest,
    db: web::Data<Database>,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let event = db
        .get_event(event_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Event"))?;
    require_owner(&actor, event.organizer_id)?;

    db.delete_event(event.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// MARKET ITEMS
// ============================================================================

#[post("/market-items")]
pub async fn create_market_item(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateMarketItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let item = db.create_market_item(body.into_market_item(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(item)))
}

#[get("/market-items")]
pub async fn list_market_items(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<ContentFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    authorize_status_filter(&req, &db, &filter).await?;
    let status = parse_status::<MarketItemStatus>(filter.status.as_deref())?
        .or(Some(MarketItemStatus::Approved));
    let items = db.filter_market_items(status, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

#[get("/market-items/{item_id}")]
pub async fn get_market_item(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let item = db
        .get_market_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Market item"))?;

    if matches!(
        item.status,
        MarketItemStatus::Pending | MarketItemStatus::Rejected
    ) {
        let actor = resolve_actor(&req, &db).await?;
        require_owner(&actor, item.seller_id)?;
    } else {
        db.increment_market_item_views(item.id).await?;
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

#[put("/market-items/{item_id}")]
pub async fn update_market_item(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
    payload: web::Json<CreateMarketItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let existing = db
        .get_market_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Market item"))?;
    require_owner(&actor, existing.seller_id)?;

    let mut updated = body.into_market_item(existing.seller_id);
    updated.id = existing.id;
    let item = db.update_market_item(&updated).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

#[derive(Debug, Deserialize)]
pub struct SellerStatusRequest {
    pub status: MarketItemStatus,
}

/// Sellers can flip their own listing to sold or pull it; moderation states
/// stay with the admin workflow.
#[put("/market-items/{item_id}/status")]
pub async fn set_market_item_status(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
    payload: web::Json<SellerStatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let item = db
        .get_market_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Market item"))?;
    require_owner(&actor, item.seller_id)?;

    if !matches!(
        payload.status,
        MarketItemStatus::Sold | MarketItemStatus::Removed
    ) {
        return Err(ServiceError::invalid(
            "sellers may only mark a listing sold or removed",
        ));
    }
    db.set_market_item_status(item.id, payload.status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "updated": true }))))
}

#[delete("/market-items/{item_id}")]
pub async fn delete_market_item(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let item = db
        .get_market_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Market item"))?;
    require_owner(&actor, item.seller_id)?;

    db.delete_market_item(item.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// LOST & FOUND
// ============================================================================

#[post("/lost-items")]
pub async fn create_lost_item(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateLostItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let item = db.create_lost_item(body.into_lost_item(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(item)))
}

#[get("/lost-items")]
pub async fn list_lost_items(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<ContentFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    authorize_status_filter(&req, &db, &filter).await?;
    let status = parse_status::<LostItemStatus>(filter.status.as_deref())?
        .or(Some(LostItemStatus::Approved));
    let kind = parse_status::<LostItemKind>(filter.kind.as_deref())?;
    let items = db.filter_lost_items(status, kind, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

#[get("/lost-items/{item_id}")]
pub async fn get_lost_item(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let item = db
        .get_lost_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Lost item report"))?;

    if matches!(
        item.status,
        LostItemStatus::Pending | LostItemStatus::Rejected
    ) {
        let actor = resolve_actor(&req, &db).await?;
        require_owner(&actor, item.reporter_id)?;
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

#[put("/lost-items/{item_id}")]
pub async fn update_lost_item(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
    payload: web::Json<CreateLostItemRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let existing = db
        .get_lost_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Lost item report"))?;
    require_owner(&actor, existing.reporter_id)?;

    let mut updated = body.into_lost_item(existing.reporter_id);
    updated.id = existing.id;
    let item = db.update_lost_item(&updated).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

#[post("/lost-items/{item_id}/reunited")]
pub async fn mark_lost_item_reunited(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let item = db
        .get_lost_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Lost item report"))?;
    require_owner(&actor, item.reporter_id)?;

    db.set_lost_item_status(item.id, LostItemStatus::Reunited).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "reunited": true }))))
}

#[delete("/lost-items/{item_id}")]
pub async fn delete_lost_item(
    req: HttpRequest,
    db: web::Data<Database>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let item = db
        .get_lost_item(item_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Lost item report"))?;
    require_owner(&actor, item.reporter_id)?;

    db.delete_lost_item(item.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}

// ============================================================================
// DONATIONS
// ============================================================================

#[post("/donations")]
pub async fn create_donation(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<CreateDonationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let donation = db.create_donation(body.into_donation(actor.id)).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(donation)))
}

#[get("/donations")]
pub async fn list_donations(
    db: web::Data<Database>,
    query: web::Query<ContentFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    let status = parse_status::<DonationStatus>(filter.status.as_deref())?
        .or(Some(DonationStatus::Active));
    let donations = db.filter_donations(status, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(donations)))
}

#[get("/donations/{donation_id}")]
pub async fn get_donation(
    db: web::Data<Database>,
    donation_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let donation = db
        .get_donation(donation_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Donation drive"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(donation)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContributeRequest {
    #[validate(range(min = 0.01))]
    pub amount: f64,
}

#[post("/donations/{donation_id}/contribute")]
pub async fn contribute_to_donation(
    req: HttpRequest,
    db: web::Data<Database>,
    donation_id: web::Path<Uuid>,
    payload: web::Json<ContributeRequest>,
) -> Result<HttpResponse, ServiceError> {
    resolve_actor(&req, &db).await?;
    let body = payload.into_inner();
    validate(&body)?;

    let donation = db
        .get_donation(donation_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Donation drive"))?;
    if donation.status != DonationStatus::Active {
        return Err(ServiceError::invalid("donation drive is not active"));
    }

    let updated = db.add_donation_amount(donation.id, body.amount).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Requesters close their own drive; a drive that met its target is already
/// completed by the contribution path.
#[post("/donations/{donation_id}/close")]
pub async fn close_donation(
    req: HttpRequest,
    db: web::Data<Database>,
    donation_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let donation = db
        .get_donation(donation_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Donation drive"))?;
    require_owner(&actor, donation.requester_id)?;

    db.set_donation_status(donation.id, DonationStatus::Closed).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "closed": true }))))
}

#[delete("/donations/{donation_id}")]
pub async fn delete_donation(
    req: HttpRequest,
    db: web::Data<Database>,
    donation_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let donation = db
        .get_donation(donation_id.into_inner())
        .await?
        .ok_or_else(|| ServiceError::not_found("Donation drive"))?;
    require_owner(&actor, donation.requester_id)?;

    db.delete_donation(donation.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "deleted": true }))))
}
