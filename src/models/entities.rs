use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::enums::*;

// ============================================================================
// PROFILES
// ============================================================================

/// User profile row; the auth identity is external, this is its app mirror.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub kyc_status: KycStatus,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires: Option<DateTime<Utc>>,
    pub balance: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// MODERATED CONTENT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Business {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub emirate: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub rating: f64,
    pub views_count: i32,
    pub is_featured: bool,
    pub promotion_expires: Option<DateTime<Utc>>,
    pub status: ModerationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub poster_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub job_type: Option<String>,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    pub requirements: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_urgent: bool,
    pub status: JobStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    pub ticket_options: Value,
    pub max_attendees: Option<i32>,
    pub current_attendees: i32,
    pub is_featured: bool,
    pub promotion_expires: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketItem {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub currency: String,
    pub condition: Option<String>,
    pub is_promoted: bool,
    pub promotion_expires: Option<DateTime<Utc>>,
    pub is_negotiable: bool,
    pub views_count: i32,
    pub status: MarketItemStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LostItem {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub item_name: String,
    pub description: Option<String>,
    pub last_seen_location: Option<String>,
    pub kind: LostItemKind,
    pub status: LostItemStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub current_amount: f64,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Helper used when inserting a notification from a workflow
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: Uuid, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            kind,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

// ============================================================================
// MONETIZED UPGRADE REQUESTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PromotionRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_kind: ContentKind,
    pub entity_id: Uuid,
    pub entity_title: String,
    pub promotion_cost: f64,
    pub duration_days: i32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubscriptionRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: String,
    pub package_name: String,
    pub duration_days: i32,
    pub cost: f64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub reference: String,
    pub notes: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// SUPPORTING ENTITIES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub business_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteContent {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmergencyService {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub phone: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Singleton configuration row; `singleton` is a constant-valued unique key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppSettings {
    pub id: Uuid,
    pub singleton: i32,
    pub site_name: String,
    pub maintenance_mode: bool,
    pub promotion_base_cost: f64,
    pub subscription_base_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub remind_at: DateTime<Utc>,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// COMPOSITE RESPONSE TYPES
// ============================================================================

/// Profile candidate returned by nearby search, with computed distance
#[derive(Debug, Clone, Serialize)]
pub struct NearbyCandidate {
    #[serde(flatten)]
    pub profile: Profile,
    pub distance_km: f64,
}
