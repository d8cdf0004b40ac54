use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::Database;
use crate::models::{
    KycStatus, Profile, Role, SubscriptionStatus, UpdateMyProfileRequest,
};

impl Database {
    pub async fn create_profile(&self, profile: Profile) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (
                id, full_name, email, phone, role, kyc_status, subscription_status,
                subscription_expires, balance, latitude, longitude, is_online, last_seen,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(profile.full_name)
        .bind(profile.email)
        .bind(profile.phone)
        .bind(profile.role)
        .bind(profile.kyc_status)
        .bind(profile.subscription_status)
        .bind(profile.subscription_expires)
        .bind(profile.balance)
        .bind(profile.latitude)
        .bind(profile.longitude)
        .bind(profile.is_online)
        .bind(profile.last_seen)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
            .fetch_all(self.pool())
            .await
    }

    pub async fn list_profiles_by_role(&self, role: Role) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE role = $1 ORDER BY created_at DESC",
        )
        .bind(role)
        .fetch_all(self.pool())
        .await
    }

    /// Candidates for nearby search: online, KYC-approved holders of the role
    /// with known coordinates. Distance filtering happens in `geo`.
    pub async fn list_online_candidates(&self, role: Role) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE role = $1 AND kyc_status = $2 AND is_online = TRUE
              AND latitude IS NOT NULL AND longitude IS NOT NULL
            "#,
        )
        .bind(role)
        .bind(KycStatus::Approved)
        .fetch_all(self.pool())
        .await
    }

    /// Self-service update: only the caller's own row, only the open fields.
    pub async fn update_my_profile(
        &self,
        id: Uuid,
        update: &UpdateMyProfileRequest,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .fetch_one(self.pool())
        .await
    }

    pub async fn set_kyc_status(&self, id: Uuid, status: KycStatus) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE profiles SET kyc_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Upsert presence. `last_seen` moves only while online so the sweeper
    /// and nearby search read a truthful timestamp; going offline keeps the
    /// last known coordinates.
    pub async fn update_location(
        &self,
        id: Uuid,
        latitude: Option<f64>,
        longitude: Option<f64>,
        is_online: bool,
    ) -> Result<Profile, sqlx::Error> {
        if is_online {
            sqlx::query_as::<_, Profile>(
                r#"
                UPDATE profiles
                SET latitude = COALESCE($2, latitude),
                    longitude = COALESCE($3, longitude),
                    is_online = TRUE, last_seen = NOW(), updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(latitude)
            .bind(longitude)
            .fetch_one(self.pool())
            .await
        } else {
            sqlx::query_as::<_, Profile>(
                "UPDATE profiles SET is_online = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .fetch_one(self.pool())
            .await
        }
    }

    /// Flip stale profiles offline. Coordinates are left untouched.
    pub async fn mark_stale_offline(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET is_online = FALSE, updated_at = NOW() WHERE is_online = TRUE AND (last_seen IS NULL OR last_seen < $1)",
        )
        .bind(cutoff)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_profile(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// WORKFLOW HELPERS (transaction-scoped)
// ============================================================================

pub async fn set_role(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    role: Role,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE profiles SET role = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(role)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_subscription_expiry(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<Option<DateTime<Utc>>>, sqlx::Error> {
    let row: Option<(Option<DateTime<Utc>>,)> =
        sqlx::query_as("SELECT subscription_expires FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.map(|(expires,)| expires))
}

pub async fn activate_subscription(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    expires: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE profiles SET subscription_status = $2, subscription_expires = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(user_id)
    .bind(SubscriptionStatus::Active)
    .bind(expires)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<f64>, sqlx::Error> {
    let row: Option<(f64,)> = sqlx::query_as("SELECT balance FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.map(|(balance,)| balance))
}

/// Applies a signed delta. The guard keeps the balance non-negative even when
/// two withdrawals race past the same balance read; a false return means the
/// profile is missing or the delta would overdraw.
pub async fn adjust_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    delta: f64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE profiles SET balance = balance + $2, updated_at = NOW() WHERE id = $1 AND balance + $2 >= 0",
    )
    .bind(user_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}
