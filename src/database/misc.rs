use chrono::Utc;
use uuid::Uuid;

use super::{Database, FilterBuilder};
use crate::models::{
    ActivityLog, AppSettings, EmergencyService, ModerationStatus, Reminder, Review, SiteContent,
    UpsertSiteContentRequest,
};

// ============================================================================
// REVIEWS
// ============================================================================

impl Database {
    pub async fn create_review(&self, review: Review) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, author_id, business_id, rating, comment, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(review.author_id)
        .bind(review.business_id)
        .bind(review.rating)
        .bind(review.comment)
        .bind(review.status)
        .bind(review.created_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn get_review(&self, id: Uuid) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn filter_reviews(
        &self,
        business_id: Option<Uuid>,
        status: Option<ModerationStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM reviews");
        fb.eq("business_id", business_id)
            .eq("status", status)
            .order(None, &[], "created_at DESC")
            .limit(limit);
        fb.into_inner()
            .build_query_as::<Review>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn set_review_status(
        &self,
        id: Uuid,
        status: ModerationStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reviews SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Refresh the denormalized average rating from approved reviews.
    pub async fn refresh_business_rating(&self, business_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE businesses
            SET rating = COALESCE(
                (SELECT AVG(rating)::DOUBLE PRECISION FROM reviews
                 WHERE business_id = $1 AND status = 'approved'), 0),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(business_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn delete_review(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// SITE CONTENT
// ============================================================================

impl Database {
    pub async fn upsert_site_content(
        &self,
        content: &UpsertSiteContentRequest,
    ) -> Result<SiteContent, sqlx::Error> {
        sqlx::query_as::<_, SiteContent>(
            r#"
            INSERT INTO site_content (id, slug, title, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (slug)
            DO UPDATE SET title = EXCLUDED.title, body = EXCLUDED.body, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&content.slug)
        .bind(&content.title)
        .bind(&content.body)
        .fetch_one(self.pool())
        .await
    }

    pub async fn get_site_content(&self, slug: &str) -> Result<Option<SiteContent>, sqlx::Error> {
        sqlx::query_as::<_, SiteContent>("SELECT * FROM site_content WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn list_site_content(&self) -> Result<Vec<SiteContent>, sqlx::Error> {
        sqlx::query_as::<_, SiteContent>("SELECT * FROM site_content ORDER BY slug ASC")
            .fetch_all(self.pool())
            .await
    }

    pub async fn delete_site_content(&self, slug: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM site_content WHERE slug = $1")
            .bind(slug)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// EMERGENCY SERVICES
// ============================================================================

impl Database {
    pub async fn create_emergency_service(
        &self,
        service: EmergencyService,
    ) -> Result<EmergencyService, sqlx::Error> {
        sqlx::query_as::<_, EmergencyService>(
            r#"
            INSERT INTO emergency_services (id, name, category, phone, description, city, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(service.id)
        .bind(service.name)
        .bind(service.category)
        .bind(service.phone)
        .bind(service.description)
        .bind(service.city)
        .bind(service.created_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn list_emergency_services(&self) -> Result<Vec<EmergencyService>, sqlx::Error> {
        sqlx::query_as::<_, EmergencyService>(
            "SELECT * FROM emergency_services ORDER BY category ASC, name ASC",
        )
        .fetch_all(self.pool())
        .await
    }

    pub async fn delete_emergency_service(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM emergency_services WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// APP SETTINGS (singleton)
// ============================================================================

impl Database {
    /// Create-if-absent through the constant unique key, so concurrent first
    /// runs cannot create two rows. Always returns the single row.
    pub async fn ensure_app_settings(&self) -> Result<AppSettings, sqlx::Error> {
        sqlx::query(
            "INSERT INTO app_settings (id, singleton) VALUES ($1, 1) ON CONFLICT (singleton) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .execute(self.pool())
        .await?;

        sqlx::query_as::<_, AppSettings>("SELECT * FROM app_settings WHERE singleton = 1")
            .fetch_one(self.pool())
            .await
    }

    pub async fn get_app_settings(&self) -> Result<Option<AppSettings>, sqlx::Error> {
        sqlx::query_as::<_, AppSettings>("SELECT * FROM app_settings WHERE singleton = 1")
            .fetch_optional(self.pool())
            .await
    }

    pub async fn update_app_settings(
        &self,
        settings: &AppSettings,
    ) -> Result<AppSettings, sqlx::Error> {
        sqlx::query_as::<_, AppSettings>(
            r#"
            UPDATE app_settings
            SET site_name = $1, maintenance_mode = $2, promotion_base_cost = $3,
                subscription_base_cost = $4, updated_at = NOW()
            WHERE singleton = 1
            RETURNING *
            "#,
        )
        .bind(&settings.site_name)
        .bind(settings.maintenance_mode)
        .bind(settings.promotion_base_cost)
        .bind(settings.subscription_base_cost)
        .fetch_one(self.pool())
        .await
    }
}

// ============================================================================
// ACTIVITY LOG & REMINDERS
// ============================================================================

impl Database {
    pub async fn record_activity(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        details: Option<&str>,
    ) -> Result<ActivityLog, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (id, user_id, action, details, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
    }

    pub async fn list_activity(&self, limit: Option<i64>) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM activity_logs");
        fb.order(None, &[], "created_at DESC").limit(limit);
        fb.into_inner()
            .build_query_as::<ActivityLog>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn create_reminder(&self, reminder: Reminder) -> Result<Reminder, sqlx::Error> {
        sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (id, user_id, title, notes, remind_at, is_done, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(reminder.id)
        .bind(reminder.user_id)
        .bind(reminder.title)
        .bind(reminder.notes)
        .bind(reminder.remind_at)
        .bind(reminder.is_done)
        .bind(reminder.created_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn list_reminders_for_user(&self, user_id: Uuid) -> Result<Vec<Reminder>, sqlx::Error> {
        sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE user_id = $1 ORDER BY remind_at ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
    }

    pub async fn set_reminder_done(
        &self,
        id: Uuid,
        user_id: Uuid,
        is_done: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE reminders SET is_done = $3 WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .bind(is_done)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_reminder(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
