use actix_web::HttpRequest;
use uuid::Uuid;

use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{Profile, Role};

/// Caller identity for one request: the authenticated user id plus the role
/// read from their profile row. Resolved per request and passed explicitly to
/// whatever needs it; there is no ambient session state.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("admin role required"))
        }
    }
}

/// The gateway terminates auth and forwards the verified user id in
/// `X-User-Id`; a missing or malformed header means no session.
pub fn actor_id_from_request(req: &HttpRequest) -> Result<Uuid, ServiceError> {
    req.headers()
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(ServiceError::Unauthenticated)
}

/// Resolve the caller to a full actor, including their stored role.
pub async fn resolve_actor(req: &HttpRequest, db: &Database) -> Result<Actor, ServiceError> {
    let id = actor_id_from_request(req)?;
    let profile = db
        .get_profile(id)
        .await?
        .ok_or(ServiceError::Unauthenticated)?;
    Ok(Actor {
        id: profile.id,
        role: profile.role,
    })
}

/// Resolve the caller and return the whole profile row (for `me`).
pub async fn resolve_profile(req: &HttpRequest, db: &Database) -> Result<Profile, ServiceError> {
    let id = actor_id_from_request(req)?;
    db.get_profile(id)
        .await?
        .ok_or(ServiceError::Unauthenticated)
}
