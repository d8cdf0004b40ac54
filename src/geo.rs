use crate::models::{NearbyCandidate, Profile};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Keep candidates within `radius_km` of the query point, sorted nearest
/// first. Profiles without coordinates are skipped; an empty result is not an
/// error.
pub fn nearby(profiles: Vec<Profile>, lat: f64, lng: f64, radius_km: f64) -> Vec<NearbyCandidate> {
    let mut candidates: Vec<NearbyCandidate> = profiles
        .into_iter()
        .filter_map(|profile| {
            let (p_lat, p_lng) = match (profile.latitude, profile.longitude) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => return None,
            };
            let distance_km = haversine_km(lat, lng, p_lat, p_lng);
            (distance_km <= radius_km).then_some(NearbyCandidate {
                profile,
                distance_km,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KycStatus, Role, SubscriptionStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn agent_at(lat: f64, lng: f64) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            full_name: "Agent".into(),
            email: "agent@example.com".into(),
            phone: None,
            role: Role::Agent,
            kyc_status: KycStatus::Approved,
            subscription_status: SubscriptionStatus::Inactive,
            subscription_expires: None,
            balance: 0.0,
            latitude: Some(lat),
            longitude: Some(lng),
            is_online: true,
            last_seen: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_km(25.2048, 55.2708, 25.2048, 55.2708), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn excludes_candidates_beyond_the_radius() {
        // Roughly 10 km north of the query point.
        let far = agent_at(25.2048 + 10.0 / 111.19, 55.2708);
        let near = agent_at(25.2048 + 1.0 / 111.19, 55.2708);
        let found = nearby(vec![far, near.clone()], 25.2048, 55.2708, 5.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.id, near.id);
        assert!(found[0].distance_km < 1.5);
    }

    #[test]
    fn sorts_ascending_by_distance() {
        let a = agent_at(25.21, 55.2708);
        let b = agent_at(25.206, 55.2708);
        let found = nearby(vec![a, b.clone()], 25.2048, 55.2708, 5.0);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].profile.id, b.id);
        assert!(found[0].distance_km <= found[1].distance_km);
    }

    #[test]
    fn skips_profiles_without_coordinates() {
        let mut p = agent_at(25.2048, 55.2708);
        p.latitude = None;
        assert!(nearby(vec![p], 25.2048, 55.2708, 5.0).is_empty());
    }
}
