use std::time::Duration;

use chrono::Utc;

use crate::database::Database;
use crate::error::{LocationError, ServiceError};
use crate::geo;
use crate::models::{NearbyCandidate, Profile, Role, UpdateLocationRequest};

const DEFAULT_STALE_SECS: u64 = 120;
const DEFAULT_SWEEP_SECS: u64 = 30;

/// Apply a location report from a signed-in user. A device error code wins
/// over any coordinates in the same report and marks the user offline.
pub async fn apply_location_update(
    db: &Database,
    user_id: uuid::Uuid,
    req: &UpdateLocationRequest,
) -> Result<Profile, ServiceError> {
    if let Some(code) = req.error_code {
        let err = LocationError::from_code(code).unwrap_or(LocationError::PositionUnavailable);
        db.update_location(user_id, None, None, false).await?;
        return Err(err.into());
    }

    let online = req.is_online;
    if online && (req.latitude.is_none() || req.longitude.is_none()) {
        return Err(ServiceError::invalid(
            "latitude and longitude are required while online",
        ));
    }
    if let (Some(lat), Some(lng)) = (req.latitude, req.longitude) {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ServiceError::invalid("coordinates out of range"));
        }
    }

    let profile = db
        .update_location(user_id, req.latitude, req.longitude, online)
        .await?;
    Ok(profile)
}

/// Online, KYC-approved candidates of one role sorted by distance from the
/// caller. The distance filter runs in-process on the candidate set.
pub async fn find_nearby(
    db: &Database,
    role: Role,
    lat: f64,
    lng: f64,
    radius_km: f64,
) -> Result<Vec<NearbyCandidate>, ServiceError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ServiceError::invalid("coordinates out of range"));
    }
    if !(radius_km > 0.0) {
        return Err(ServiceError::invalid("radius must be greater than zero"));
    }

    let candidates = db.list_online_candidates(role).await?;
    Ok(geo::nearby(candidates, lat, lng, radius_km))
}

fn env_secs(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Background task that flips users offline once their last report is older
/// than the staleness window. Replaces any client-side heartbeat timer.
pub fn spawn_staleness_sweeper(db: Database) {
    let stale_secs = env_secs("PRESENCE_STALE_SECS", DEFAULT_STALE_SECS);
    let sweep_secs = env_secs("PRESENCE_SWEEP_SECS", DEFAULT_SWEEP_SECS);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(sweep_secs));
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::seconds(stale_secs as i64);
            match db.mark_stale_offline(cutoff).await {
                Ok(0) => {}
                Ok(count) => log::info!("presence sweep: {count} users marked offline"),
                Err(err) => log::error!("presence sweep failed: {err:?}"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_secs_falls_back_on_garbage() {
        std::env::set_var("PRESENCE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_secs("PRESENCE_TEST_GARBAGE", 120), 120);
        std::env::remove_var("PRESENCE_TEST_GARBAGE");
    }

    #[test]
    fn env_secs_reads_valid_values() {
        std::env::set_var("PRESENCE_TEST_VALID", "45");
        assert_eq!(env_secs("PRESENCE_TEST_VALID", 120), 45);
        std::env::remove_var("PRESENCE_TEST_VALID");
    }
}
