use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Actor;
use crate::clients::mailer::Mailer;
use crate::database::{
    content::{apply_content_decision, apply_promotion},
    insert_notification,
    profiles::{activate_subscription, adjust_balance, get_balance, get_subscription_expiry, set_role},
    requests::{insert_transaction_tx, set_request_status_tx},
    Database,
};
use crate::error::ServiceError;
use crate::models::{
    ApproveContentRequest, BroadcastNotificationsRequest, ContentDecision, ContentKind,
    NewNotification, NotificationKind, NotifyContentCreatedRequest, NotifyRoleRequestRequest,
    NotifySubscriptionRequestRequest, ProcessTransactionRequest, RequestStatus, Role, Transaction,
    TransactionKind, TransactionStatus,
};

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PromotionOutcome {
    pub success: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SimpleOutcome {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct TransactionOutcome {
    pub success: bool,
    pub transaction: Transaction,
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastOutcome {
    pub success: bool,
    pub sent: usize,
}

// ============================================================================
// PURE HELPERS
// ============================================================================

const REFERENCE_PREFIX: &str = "CL";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Display reference for transactions: prefix + epoch millis + random base-36
/// suffix, uppercased. Collision-resistant in practice, not a primary key.
pub fn generate_reference() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{REFERENCE_PREFIX}{millis}{suffix}").to_uppercase()
}

/// Extend an expiry: an unexpired current date stacks, an expired or missing
/// one restarts from now.
pub fn extend_expiry(current: Option<DateTime<Utc>>, duration_days: i64) -> DateTime<Utc> {
    let now = Utc::now();
    let base = match current {
        Some(existing) if existing > now => existing,
        _ => now,
    };
    base + Duration::days(duration_days)
}

/// Withdrawal decision for a balance snapshot: a covered amount debits in
/// full, a short one becomes a rejected record with no debit.
fn withdrawal_outcome(balance: f64, amount: f64) -> (TransactionStatus, f64) {
    if balance >= amount {
        (TransactionStatus::Pending, -amount)
    } else {
        (TransactionStatus::Rejected, 0.0)
    }
}

// ============================================================================
// CONTENT APPROVAL
// ============================================================================

/// Moderation decision on one content row. The status write and the owner
/// notification commit together.
pub async fn approve_content(
    db: &Database,
    actor: &Actor,
    req: &ApproveContentRequest,
) -> Result<ApprovalOutcome, ServiceError> {
    actor.require_admin()?;

    if req.status == ContentDecision::Rejected {
        if let Some(reason) = &req.reason {
            if reason.trim().is_empty() {
                return Err(ServiceError::invalid("rejection reason must not be blank"));
            }
        }
    }

    let mut tx = db.begin().await?;
    let owner = apply_content_decision(&mut tx, req.entity, req.item_id, req.status, req.reason.as_deref())
        .await?;

    let Some(owner_id) = owner else {
        tx.rollback().await?;
        return Err(ServiceError::not_found(req.entity.label().to_string()));
    };

    let (kind, message) = match req.status {
        ContentDecision::Approved => (
            NotificationKind::Success,
            format!("Your {} has been approved and is now live", req.entity.label()),
        ),
        ContentDecision::Rejected => {
            let reason = req
                .reason
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or("it did not meet the community guidelines");
            (
                NotificationKind::Warning,
                format!("Your {} was rejected: {}", req.entity.label(), reason),
            )
        }
    };
    let link = format!("/{}/{}", req.entity.table().replace('_', "-"), req.item_id);
    insert_notification(
        &mut *tx,
        &NewNotification::new(owner_id, kind, message).with_link(link),
    )
    .await?;
    tx.commit().await?;

    log::info!(
        "content {} {} by admin {}: {}",
        req.entity.label(),
        req.item_id,
        actor.id,
        req.status.as_str()
    );

    Ok(ApprovalOutcome {
        success: true,
        message: format!("{} {}", req.entity.label(), req.status.as_str()),
    })
}

// ============================================================================
// PROMOTION APPROVAL
// ============================================================================

pub async fn approve_promotion(
    db: &Database,
    actor: &Actor,
    request_id: Uuid,
) -> Result<PromotionOutcome, ServiceError> {
    actor.require_admin()?;

    let request = db
        .get_promotion_request(request_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Promotion request"))?;

    if matches!(request.entity_kind, ContentKind::Job | ContentKind::LostItem) {
        return Err(ServiceError::invalid(format!(
            "a {} cannot be promoted",
            request.entity_kind.label()
        )));
    }

    let expires = Utc::now() + Duration::days(i64::from(request.duration_days));

    // Re-approval is allowed; the expiry simply reflects the latest call.
    let mut tx = db.begin().await?;
    set_request_status_tx(&mut tx, "promotion_requests", request_id, RequestStatus::Completed)
        .await?;
    if !apply_promotion(&mut tx, request.entity_kind, request.entity_id, expires).await? {
        tx.rollback().await?;
        return Err(ServiceError::not_found(request.entity_kind.label().to_string()));
    }
    insert_notification(
        &mut *tx,
        &NewNotification::new(
            request.user_id,
            NotificationKind::Success,
            format!(
                "Your promotion for \"{}\" is active until {}",
                request.entity_title,
                expires.format("%Y-%m-%d")
            ),
        ),
    )
    .await?;
    tx.commit().await?;

    Ok(PromotionOutcome {
        success: true,
        expires_at: expires,
    })
}

pub async fn reject_promotion(
    db: &Database,
    actor: &Actor,
    request_id: Uuid,
    reason: Option<&str>,
) -> Result<SimpleOutcome, ServiceError> {
    actor.require_admin()?;

    let request = db
        .get_promotion_request(request_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Promotion request"))?;

    let mut tx = db.begin().await?;
    set_request_status_tx(&mut tx, "promotion_requests", request_id, RequestStatus::Rejected)
        .await?;
    let reason = reason.filter(|r| !r.trim().is_empty()).unwrap_or("not specified");
    insert_notification(
        &mut *tx,
        &NewNotification::new(
            request.user_id,
            NotificationKind::Warning,
            format!(
                "Your promotion request for \"{}\" was declined: {}",
                request.entity_title, reason
            ),
        ),
    )
    .await?;
    tx.commit().await?;

    Ok(SimpleOutcome { success: true })
}

// ============================================================================
// SUBSCRIPTION APPROVAL
// ============================================================================

pub async fn approve_subscription(
    db: &Database,
    actor: &Actor,
    request_id: Uuid,
) -> Result<SimpleOutcome, ServiceError> {
    actor.require_admin()?;

    let request = db
        .get_subscription_request(request_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Subscription request"))?;

    let mut tx = db.begin().await?;
    let current = get_subscription_expiry(&mut tx, request.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Profile"))?;
    let new_expiry = extend_expiry(current, i64::from(request.duration_days));

    set_request_status_tx(
        &mut tx,
        "subscription_requests",
        request_id,
        RequestStatus::Completed,
    )
    .await?;
    activate_subscription(&mut tx, request.user_id, new_expiry).await?;
    insert_notification(
        &mut *tx,
        &NewNotification::new(
            request.user_id,
            NotificationKind::Success,
            format!(
                "Your {} subscription is active until {}",
                request.package_name,
                new_expiry.format("%Y-%m-%d")
            ),
        ),
    )
    .await?;
    tx.commit().await?;

    Ok(SimpleOutcome { success: true })
}

// ============================================================================
// ROLE UPDATE
// ============================================================================

pub async fn update_user_role(
    db: &Database,
    actor: &Actor,
    user_id: Uuid,
    new_role: Role,
) -> Result<ApprovalOutcome, ServiceError> {
    actor.require_admin()?;

    let mut tx = db.begin().await?;
    if !set_role(&mut tx, user_id, new_role).await? {
        tx.rollback().await?;
        return Err(ServiceError::not_found("Profile"));
    }
    insert_notification(
        &mut *tx,
        &NewNotification::new(
            user_id,
            NotificationKind::Info,
            format!(
                "Your account role is now {}",
                format!("{new_role:?}").to_lowercase()
            ),
        ),
    )
    .await?;
    tx.commit().await?;

    Ok(ApprovalOutcome {
        success: true,
        message: "role updated".to_string(),
    })
}

// ============================================================================
// TRANSACTION PROCESSING
// ============================================================================

/// Money-agent transaction. Withdrawals with insufficient funds are recorded
/// as `rejected` and never touch the balance; deposits credit immediately.
pub async fn process_transaction(
    db: &Database,
    actor: &Actor,
    req: &ProcessTransactionRequest,
) -> Result<TransactionOutcome, ServiceError> {
    if !(req.amount > 0.0) {
        return Err(ServiceError::invalid("amount must be greater than zero"));
    }

    let reference = generate_reference();
    let now = Utc::now();
    let mut transaction = Transaction {
        id: Uuid::new_v4(),
        customer_id: actor.id,
        agent_id: req.agent_id,
        kind: req.kind,
        amount: req.amount,
        payment_method: req.payment_method.clone(),
        reference: reference.clone(),
        notes: req.notes.clone(),
        status: TransactionStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    let mut tx = db.begin().await?;
    match req.kind {
        TransactionKind::Withdrawal => {
            let balance = get_balance(&mut tx, actor.id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Profile"))?;
            let (status, delta) = withdrawal_outcome(balance, req.amount);
            transaction.status = status;
            // The guarded update settles a race between the read and the debit.
            if delta != 0.0 && !adjust_balance(&mut tx, actor.id, delta).await? {
                transaction.status = TransactionStatus::Rejected;
            }
        }
        TransactionKind::Deposit => {
            if !adjust_balance(&mut tx, actor.id, req.amount).await? {
                return Err(ServiceError::not_found("Profile"));
            }
        }
        TransactionKind::Payment | TransactionKind::Subscription => {}
    }

    let stored = insert_transaction_tx(&mut tx, &transaction).await?;

    let message = match stored.status {
        TransactionStatus::Rejected => format!(
            "Your withdrawal of {:.2} was rejected: insufficient balance (ref {})",
            stored.amount, stored.reference
        ),
        _ => format!(
            "Your {} of {:.2} was received (ref {})",
            format!("{:?}", stored.kind).to_lowercase(),
            stored.amount,
            stored.reference
        ),
    };
    insert_notification(
        &mut *tx,
        &NewNotification::new(actor.id, NotificationKind::Transaction, message),
    )
    .await?;
    tx.commit().await?;

    Ok(TransactionOutcome {
        success: true,
        reference: stored.reference.clone(),
        transaction: stored,
    })
}

// ============================================================================
// BULK / TARGETED NOTIFICATION
// ============================================================================

pub async fn broadcast_notifications(
    db: &Database,
    actor: &Actor,
    req: &BroadcastNotificationsRequest,
) -> Result<BroadcastOutcome, ServiceError> {
    actor.require_admin()?;

    // Explicit ids win over a role filter; neither means everyone.
    let targets: Vec<Uuid> = match (&req.target_users, req.target_role) {
        (Some(users), _) if !users.is_empty() => users.clone(),
        (_, Some(role)) => db
            .list_profiles_by_role(role)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect(),
        _ => db.list_profiles().await?.into_iter().map(|p| p.id).collect(),
    };

    let kind = req.kind.unwrap_or(NotificationKind::Info);
    let mut sent = 0usize;
    for user_id in targets {
        match db
            .create_notification(&NewNotification::new(user_id, kind, req.message.clone()))
            .await
        {
            Ok(_) => sent += 1,
            Err(err) => {
                log::warn!("broadcast insert failed for user {user_id}: {err:?}");
            }
        }
    }

    Ok(BroadcastOutcome {
        success: true,
        sent,
    })
}

// ============================================================================
// ADMIN FAN-OUT ON CREATION EVENTS
// ============================================================================

async fn notify_all_admins(
    db: &Database,
    mailer: &Mailer,
    message: String,
    subject: &str,
) -> Result<(), ServiceError> {
    let admins = db.list_profiles_by_role(Role::Admin).await?;

    // Notification failures abort the workflow; email stays best-effort.
    for admin in &admins {
        db.create_notification(&NewNotification::new(
            admin.id,
            NotificationKind::Info,
            message.clone(),
        ))
        .await?;
    }

    let emails = admins
        .iter()
        .map(|admin| mailer.send(&admin.email, subject, &message));
    for (admin, result) in admins.iter().zip(join_all(emails).await) {
        if let Err(err) = result {
            log::warn!("admin email to {} failed: {err}", admin.email);
        }
    }
    Ok(())
}

pub async fn notify_admins_on_content_creation(
    db: &Database,
    mailer: &Mailer,
    req: &NotifyContentCreatedRequest,
) -> Result<SimpleOutcome, ServiceError> {
    notify_all_admins(
        db,
        mailer,
        format!(
            "New {} pending review: \"{}\"",
            req.entity_kind.label(),
            req.entity_title
        ),
        "New content pending review",
    )
    .await?;
    Ok(SimpleOutcome { success: true })
}

pub async fn notify_admins_on_role_request(
    db: &Database,
    mailer: &Mailer,
    req: &NotifyRoleRequestRequest,
) -> Result<SimpleOutcome, ServiceError> {
    notify_all_admins(
        db,
        mailer,
        format!(
            "{} ({}) requested the {} role",
            req.user_name,
            req.user_email,
            format!("{:?}", req.requested_role).to_lowercase()
        ),
        "Role upgrade request",
    )
    .await?;
    Ok(SimpleOutcome { success: true })
}

pub async fn notify_admins_on_subscription_request(
    db: &Database,
    mailer: &Mailer,
    req: &NotifySubscriptionRequestRequest,
) -> Result<SimpleOutcome, ServiceError> {
    let request = db
        .get_subscription_request(req.subscription_request_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Subscription request"))?;

    let mut message = format!(
        "New subscription request for {} ({} days)",
        request.package_name, request.duration_days
    );
    if let Some(user_details) = &req.user_details {
        message.push_str(&format!(" from {user_details}"));
    }
    if let Some(package_details) = &req.package_details {
        message.push_str(&format!(" ({package_details})"));
    }

    notify_all_admins(db, mailer, message, "New subscription request").await?;
    Ok(SimpleOutcome { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_prefix_and_uppercase_alphanumerics() {
        let reference = generate_reference();
        assert!(reference.starts_with("CL"), "got {reference}");
        assert!(reference.len() > 15);
        assert!(reference
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn references_are_distinct_within_a_millisecond() {
        let a = generate_reference();
        let b = generate_reference();
        assert_ne!(a, b);
    }

    #[test]
    fn expired_subscription_restarts_from_now() {
        let expired = Some(Utc::now() - Duration::days(1));
        let new_expiry = extend_expiry(expired, 30);
        let expected = Utc::now() + Duration::days(30);
        assert!((new_expiry - expected).num_seconds().abs() < 60);
    }

    #[test]
    fn active_subscription_stacks() {
        let active = Some(Utc::now() + Duration::days(10));
        let new_expiry = extend_expiry(active, 30);
        let expected = Utc::now() + Duration::days(40);
        assert!((new_expiry - expected).num_seconds().abs() < 60);
    }

    #[test]
    fn missing_expiry_restarts_from_now() {
        let new_expiry = extend_expiry(None, 7);
        let expected = Utc::now() + Duration::days(7);
        assert!((new_expiry - expected).num_seconds().abs() < 60);
    }

    #[test]
    fn overdrawn_withdrawal_is_rejected_with_no_debit() {
        let (status, delta) = withdrawal_outcome(49.99, 50.0);
        assert_eq!(status, TransactionStatus::Rejected);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn covered_withdrawal_debits_the_full_amount() {
        let (status, delta) = withdrawal_outcome(100.0, 50.0);
        assert_eq!(status, TransactionStatus::Pending);
        assert_eq!(delta, -50.0);

        let (status, delta) = withdrawal_outcome(50.0, 50.0);
        assert_eq!(status, TransactionStatus::Pending);
        assert_eq!(delta, -50.0);
    }
}
