use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::entities::*;
use super::enums::*;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// CONTENT CREATION / UPDATE
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBusinessRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub emirate: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub whatsapp: Option<String>,
}

impl CreateBusinessRequest {
    pub fn into_business(self, owner_id: Uuid) -> Business {
        let now = Utc::now();
        Business {
            id: Uuid::new_v4(),
            owner_id,
            name: self.name,
            description: self.description,
            category: self.category,
            images: self.images,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
            city: self.city,
            emirate: self.emirate,
            phone: self.phone,
            email: self.email,
            whatsapp: self.whatsapp,
            rating: 0.0,
            views_count: 0,
            is_featured: false,
            promotion_expires: None,
            status: ModerationStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Owner-editable business fields; status and promotion flags stay admin-only.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub emirate: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub whatsapp: Option<String>,
}

impl UpdateBusinessRequest {
    pub fn apply_to_existing(&self, existing: &mut Business) {
        existing.name = self.name.clone();
        existing.description = self.description.clone();
        existing.category = self.category.clone();
        existing.images = self.images.clone();
        existing.latitude = self.latitude;
        existing.longitude = self.longitude;
        existing.address = self.address.clone();
        existing.city = self.city.clone();
        existing.emirate = self.emirate.clone();
        existing.phone = self.phone.clone();
        existing.email = self.email.clone();
        existing.whatsapp = self.whatsapp.clone();
        existing.updated_at = Utc::now();
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub category: String,
    pub job_type: Option<String>,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_urgent: bool,
}

impl CreateJobRequest {
    pub fn into_job(self, poster_id: Uuid) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            poster_id,
            title: self.title,
            description: self.description,
            category: self.category,
            job_type: self.job_type,
            salary_range: self.salary_range,
            location: self.location,
            requirements: self.requirements,
            expires_at: self.expires_at,
            is_urgent: self.is_urgent,
            status: JobStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub category: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    pub ticket_options: Option<Value>,
    #[validate(range(min = 1))]
    pub max_attendees: Option<i32>,
}

impl CreateEventRequest {
    pub fn validate_business_rules(&self) -> Result<(), String> {
        if self.end_at <= self.start_at {
            return Err("Event end time must be after its start time".into());
        }
        Ok(())
    }

    pub fn into_event(self, organizer_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            organizer_id,
            title: self.title,
            description: self.description,
            category: self.category,
            start_at: self.start_at,
            end_at: self.end_at,
            location: self.location,
            ticket_options: self.ticket_options.unwrap_or(Value::Array(Vec::new())),
            max_attendees: self.max_attendees,
            current_attendees: 0,
            is_featured: false,
            promotion_expires: None,
            status: EventStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMarketItemRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub currency: Option<String>,
    pub condition: Option<String>,
    #[serde(default)]
    pub is_negotiable: bool,
}

impl CreateMarketItemRequest {
    pub fn into_market_item(self, seller_id: Uuid) -> MarketItem {
        let now = Utc::now();
        MarketItem {
            id: Uuid::new_v4(),
            seller_id,
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            currency: self.currency.unwrap_or_else(|| "AED".to_string()),
            condition: self.condition,
            is_promoted: false,
            promotion_expires: None,
            is_negotiable: self.is_negotiable,
            views_count: 0,
            status: MarketItemStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLostItemRequest {
    #[validate(length(min = 2, max = 120))]
    pub item_name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub last_seen_location: Option<String>,
    pub kind: LostItemKind,
}

impl CreateLostItemRequest {
    pub fn into_lost_item(self, reporter_id: Uuid) -> LostItem {
        let now = Utc::now();
        LostItem {
            id: Uuid::new_v4(),
            reporter_id,
            item_name: self.item_name,
            description: self.description,
            last_seen_location: self.last_seen_location,
            kind: self.kind,
            status: LostItemStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDonationRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[validate(range(min = 1.0))]
    pub target_amount: f64,
}

impl CreateDonationRequest {
    pub fn into_donation(self, requester_id: Uuid) -> Donation {
        let now = Utc::now();
        Donation {
            id: Uuid::new_v4(),
            requester_id,
            title: self.title,
            description: self.description,
            target_amount: self.target_amount,
            current_amount: 0.0,
            status: DonationStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// FILTER QUERIES
// ============================================================================

/// Exact-match content filters; `None` and empty-string members are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ContentFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub emirate: Option<String>,
    pub owner_id: Option<Uuid>,
    pub kind: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<i64>,
}

// ============================================================================
// PROFILES
// ============================================================================

/// Mirrors a freshly created auth identity into a profile row
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    pub id: Uuid,
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
}

impl CreateProfileRequest {
    pub fn into_profile(self) -> Profile {
        let now = Utc::now();
        Profile {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            role: Role::Customer,
            kyc_status: KycStatus::Pending,
            subscription_status: SubscriptionStatus::Inactive,
            subscription_expires: None,
            balance: 0.0,
            latitude: None,
            longitude: None,
            is_online: false,
            last_seen: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Self-service profile update, restricted to non-privileged fields
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMyProfileRequest {
    #[validate(length(min = 2, max = 120))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

// ============================================================================
// REQUESTS, TRANSACTIONS, NOTIFICATIONS
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePromotionRequestPayload {
    pub entity_kind: ContentKind,
    pub entity_id: Uuid,
    #[validate(length(min = 1, max = 160))]
    pub entity_title: String,
    #[validate(range(min = 0.0))]
    pub promotion_cost: f64,
    #[validate(range(min = 1, max = 365))]
    pub duration_days: Option<i32>,
}

impl CreatePromotionRequestPayload {
    pub fn into_request(self, user_id: Uuid) -> PromotionRequest {
        let now = Utc::now();
        PromotionRequest {
            id: Uuid::new_v4(),
            user_id,
            entity_kind: self.entity_kind,
            entity_id: self.entity_id,
            entity_title: self.entity_title,
            promotion_cost: self.promotion_cost,
            duration_days: self.duration_days.unwrap_or(7),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubscriptionRequestPayload {
    #[validate(length(min = 1, max = 60))]
    pub package_id: String,
    #[validate(length(min = 1, max = 120))]
    pub package_name: String,
    #[validate(range(min = 1, max = 365))]
    pub duration_days: i32,
    #[validate(range(min = 0.0))]
    pub cost: f64,
}

impl CreateSubscriptionRequestPayload {
    pub fn into_request(self, user_id: Uuid) -> SubscriptionRequest {
        let now = Utc::now();
        SubscriptionRequest {
            id: Uuid::new_v4(),
            user_id,
            package_id: self.package_id,
            package_name: self.package_name,
            duration_days: self.duration_days,
            cost: self.cost,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// WORKFLOW INPUTS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApproveContentRequest {
    pub entity: ContentKind,
    pub item_id: Uuid,
    pub status: ContentDecision,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub new_role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProcessTransactionRequest {
    pub kind: TransactionKind,
    pub amount: f64,
    pub agent_id: Option<Uuid>,
    pub payment_method: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastNotificationsRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    pub kind: Option<NotificationKind>,
    pub target_role: Option<Role>,
    pub target_users: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NotifyContentCreatedRequest {
    pub entity_kind: ContentKind,
    #[validate(length(min = 1, max = 160))]
    pub entity_title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NotifyRoleRequestRequest {
    pub user_id: Uuid,
    #[validate(email)]
    pub user_email: String,
    #[validate(length(min = 1, max = 120))]
    pub user_name: String,
    pub requested_role: Role,
}

#[derive(Debug, Deserialize)]
pub struct NotifySubscriptionRequestRequest {
    pub subscription_request_id: Uuid,
    pub user_details: Option<String>,
    pub package_details: Option<String>,
}

// ============================================================================
// PRESENCE
// ============================================================================

/// Either a coordinate fix or the platform geolocation error code (1/2/3)
#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_online: bool,
    pub error_code: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

// ============================================================================
// SUPPORTING ENTITY DTOS
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub business_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_review(self, author_id: Uuid) -> Review {
        Review {
            id: Uuid::new_v4(),
            author_id,
            business_id: self.business_id,
            rating: self.rating,
            comment: self.comment,
            status: ModerationStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertSiteContentRequest {
    #[validate(length(min = 1, max = 120))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmergencyServiceRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(min = 2, max = 120))]
    pub category: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: String,
    pub description: Option<String>,
    pub city: Option<String>,
}

impl CreateEmergencyServiceRequest {
    pub fn into_service(self) -> EmergencyService {
        EmergencyService {
            id: Uuid::new_v4(),
            name: self.name,
            category: self.category,
            phone: self.phone,
            description: self.description,
            city: self.city,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub notes: Option<String>,
    pub remind_at: DateTime<Utc>,
}

impl CreateReminderRequest {
    pub fn into_reminder(self, user_id: Uuid) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            notes: self.notes,
            remind_at: self.remind_at,
            is_done: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityLogRequest {
    #[validate(length(min = 1, max = 200))]
    pub action: String,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_business_starts_pending_with_fresh_id() {
        let owner = Uuid::new_v4();
        let req = CreateBusinessRequest {
            name: "Al Noor Bakery".into(),
            description: None,
            category: "food".into(),
            images: vec![],
            latitude: Some(25.2),
            longitude: Some(55.27),
            address: None,
            city: Some("Dubai".into()),
            emirate: Some("Dubai".into()),
            phone: None,
            email: None,
            whatsapp: None,
        };
        let business = req.into_business(owner);
        assert_eq!(business.owner_id, owner);
        assert_eq!(business.status, ModerationStatus::Pending);
        assert!(!business.is_featured);
        assert_eq!(business.views_count, 0);
    }

    #[test]
    fn event_rules_reject_inverted_window() {
        let now = Utc::now();
        let req = CreateEventRequest {
            title: "Souq night".into(),
            description: None,
            category: "community".into(),
            start_at: now,
            end_at: now - chrono::Duration::hours(1),
            location: None,
            ticket_options: None,
            max_attendees: None,
        };
        assert!(req.validate_business_rules().is_err());
    }

    #[test]
    fn new_event_starts_unpromoted() {
        let now = Utc::now();
        let req = CreateEventRequest {
            title: "Souq night".into(),
            description: None,
            category: "community".into(),
            start_at: now,
            end_at: now + chrono::Duration::hours(2),
            location: None,
            ticket_options: None,
            max_attendees: None,
        };
        let event = req.into_event(Uuid::new_v4());
        assert_eq!(event.status, EventStatus::Pending);
        assert!(!event.is_featured);
        assert!(event.promotion_expires.is_none());
    }

    #[test]
    fn promotion_request_defaults_to_seven_days() {
        let payload = CreatePromotionRequestPayload {
            entity_kind: ContentKind::Business,
            entity_id: Uuid::new_v4(),
            entity_title: "Al Noor Bakery".into(),
            promotion_cost: 50.0,
            duration_days: None,
        };
        let request = payload.into_request(Uuid::new_v4());
        assert_eq!(request.duration_days, 7);
        assert_eq!(request.status, RequestStatus::Pending);
    }
}
