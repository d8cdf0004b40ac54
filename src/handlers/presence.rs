use actix_web::{get, put, web, HttpRequest, HttpResponse};

use crate::auth::resolve_actor;
use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{ApiResponse, NearbyQuery, Role, UpdateLocationRequest};
use crate::presence;

const DEFAULT_RADIUS_KM: f64 = 5.0;

#[put("/presence/location")]
pub async fn update_location(
    req: HttpRequest,
    db: web::Data<Database>,
    payload: web::Json<UpdateLocationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let actor = resolve_actor(&req, &db).await?;
    let profile = presence::apply_location_update(&db, actor.id, &payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

#[get("/presence/nearby/agents")]
pub async fn nearby_agents(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, ServiceError> {
    resolve_actor(&req, &db).await?;
    let radius = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let candidates = presence::find_nearby(&db, Role::Agent, query.lat, query.lng, radius).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(candidates)))
}

#[get("/presence/nearby/drivers")]
pub async fn nearby_drivers(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, ServiceError> {
    resolve_actor(&req, &db).await?;
    let radius = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let candidates = presence::find_nearby(&db, Role::Driver, query.lat, query.lng, radius).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(candidates)))
}
