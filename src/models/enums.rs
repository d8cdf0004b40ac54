use serde::{Deserialize, Serialize};

// ============================================================================
// ENUMS
// ============================================================================

/// Account role (this is also a Postgres enum)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Vendor,
    Agent,
    Driver,
    Admin,
}

/// KYC verification state gating privileged roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "kyc_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Inactive,
    Active,
    Expired,
}

/// Moderation lifecycle shared by businesses and reviews
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Approved,
    Rejected,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "market_item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarketItemStatus {
    Pending,
    Approved,
    Rejected,
    Sold,
    Removed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "lost_item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LostItemStatus {
    Pending,
    Approved,
    Rejected,
    Reunited,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "lost_item_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LostItemKind {
    Lost,
    Found,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "donation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Active,
    Completed,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
    Transaction,
}

/// Shared lifecycle for promotion and subscription requests.
/// Monotonic: pending -> paid -> completed, rejected reachable before completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Paid,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Withdrawal,
    Deposit,
    Payment,
    Subscription,
}

/// Tag identifying which moderated table a workflow targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Business,
    Job,
    Event,
    MarketItem,
    LostItem,
}

impl ContentKind {
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Business => "businesses",
            ContentKind::Job => "jobs",
            ContentKind::Event => "events",
            ContentKind::MarketItem => "market_items",
            ContentKind::LostItem => "lost_items",
        }
    }

    /// Each moderated table names its owner column differently.
    pub fn owner_column(&self) -> &'static str {
        match self {
            ContentKind::Business => "owner_id",
            ContentKind::Job => "poster_id",
            ContentKind::Event => "organizer_id",
            ContentKind::MarketItem => "seller_id",
            ContentKind::LostItem => "reporter_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Business => "business",
            ContentKind::Job => "job",
            ContentKind::Event => "event",
            ContentKind::MarketItem => "marketplace listing",
            ContentKind::LostItem => "lost & found report",
        }
    }
}

/// Moderation decision an admin can apply to content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentDecision {
    Approved,
    Rejected,
}

impl ContentDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDecision::Approved => "approved",
            ContentDecision::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"customer\"").unwrap(),
            Role::Customer
        );
        assert_eq!(
            serde_json::to_string(&ContentKind::MarketItem).unwrap(),
            "\"market_item\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionKind>("\"withdrawal\"").unwrap(),
            TransactionKind::Withdrawal
        );
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn content_kind_owner_columns() {
        assert_eq!(ContentKind::Business.owner_column(), "owner_id");
        assert_eq!(ContentKind::Job.owner_column(), "poster_id");
        assert_eq!(ContentKind::Event.owner_column(), "organizer_id");
        assert_eq!(ContentKind::MarketItem.owner_column(), "seller_id");
        assert_eq!(ContentKind::LostItem.owner_column(), "reporter_id");
    }
}
