use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{Database, FilterBuilder};
use crate::models::{
    Business, ContentDecision, ContentFilter, ContentKind, Donation, DonationStatus, Event,
    EventStatus, Job, JobStatus, LostItem, LostItemKind, LostItemStatus, MarketItem,
    MarketItemStatus, ModerationStatus,
};

// ============================================================================
// BUSINESSES
// ============================================================================

impl Database {
    pub async fn create_business(&self, business: Business) -> Result<Business, sqlx::Error> {
        sqlx::query_as::<_, Business>(
            r#"
            INSERT INTO businesses (
                id, owner_id, name, description, category, images, latitude, longitude,
                address, city, emirate, phone, email, whatsapp, rating, views_count,
                is_featured, promotion_expires, status, rejection_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING *
            "#,
        )
        .bind(business.id)
        .bind(business.owner_id)
        .bind(business.name)
        .bind(business.description)
        .bind(business.category)
        .bind(business.images)
        .bind(business.latitude)
        .bind(business.longitude)
        .bind(business.address)
        .bind(business.city)
        .bind(business.emirate)
        .bind(business.phone)
        .bind(business.email)
        .bind(business.whatsapp)
        .bind(business.rating)
        .bind(business.views_count)
        .bind(business.is_featured)
        .bind(business.promotion_expires)
        .bind(business.status)
        .bind(business.rejection_reason)
        .bind(business.created_at)
        .bind(business.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn filter_businesses(
        &self,
        status: Option<ModerationStatus>,
        filter: &ContentFilter,
    ) -> Result<Vec<Business>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM businesses");
        fb.eq("status", status)
            .eq_text("category", filter.category.as_deref())
            .eq_text("city", filter.city.as_deref())
            .eq_text("emirate", filter.emirate.as_deref())
            .eq("owner_id", filter.owner_id)
            .order(
                filter.order_by.as_deref(),
                &["created_at", "rating", "views_count", "name"],
                "created_at DESC",
            )
            .limit(filter.limit);
        fb.into_inner()
            .build_query_as::<Business>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn get_business(&self, id: Uuid) -> Result<Option<Business>, sqlx::Error> {
        sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn update_business(&self, business: &Business) -> Result<Business, sqlx::Error> {
        sqlx::query_as::<_, Business>(
            r#"
            UPDATE businesses
            SET name = $2, description = $3, category = $4, images = $5, latitude = $6,
                longitude = $7, address = $8, city = $9, emirate = $10, phone = $11,
                email = $12, whatsapp = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(business.id)
        .bind(&business.name)
        .bind(&business.description)
        .bind(&business.category)
        .bind(&business.images)
        .bind(business.latitude)
        .bind(business.longitude)
        .bind(&business.address)
        .bind(&business.city)
        .bind(&business.emirate)
        .bind(&business.phone)
        .bind(&business.email)
        .bind(&business.whatsapp)
        .fetch_one(self.pool())
        .await
    }

    pub async fn delete_business(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn increment_business_views(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE businesses SET views_count = views_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// JOBS
// ============================================================================

impl Database {
    pub async fn create_job(&self, job: Job) -> Result<Job, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, poster_id, title, description, category, job_type, salary_range,
                location, requirements, expires_at, is_urgent, status, rejection_reason,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(job.poster_id)
        .bind(job.title)
        .bind(job.description)
        .bind(job.category)
        .bind(job.job_type)
        .bind(job.salary_range)
        .bind(job.location)
        .bind(job.requirements)
        .bind(job.expires_at)
        .bind(job.is_urgent)
        .bind(job.status)
        .bind(job.rejection_reason)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn filter_jobs(
        &self,
        status: Option<JobStatus>,
        filter: &ContentFilter,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM jobs");
        fb.eq("status", status)
            .eq_text("category", filter.category.as_deref())
            .eq("poster_id", filter.owner_id)
            .order(
                filter.order_by.as_deref(),
                &["created_at", "expires_at", "title"],
                "created_at DESC",
            )
            .limit(filter.limit);
        fb.into_inner()
            .build_query_as::<Job>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn update_job(&self, job: &Job) -> Result<Job, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, category = $4, job_type = $5,
                salary_range = $6, location = $7, requirements = $8, expires_at = $9,
                is_urgent = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.category)
        .bind(&job.job_type)
        .bind(&job.salary_range)
        .bind(&job.location)
        .bind(&job.requirements)
        .bind(job.expires_at)
        .bind(job.is_urgent)
        .fetch_one(self.pool())
        .await
    }

    pub async fn close_job(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(JobStatus::Closed)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// EVENTS
// ============================================================================

impl Database {
    pub async fn create_event(&self, event: Event) -> Result<Event, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, organizer_id, title, description, category, start_at, end_at, location,
                ticket_options, max_attendees, current_attendees, is_featured,
                promotion_expires, status, rejection_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(event.organizer_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.category)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.location)
        .bind(event.ticket_options)
        .bind(event.max_attendees)
        .bind(event.current_attendees)
        .bind(event.is_featured)
        .bind(event.promotion_expires)
        .bind(event.status)
        .bind(event.rejection_reason)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(self.pool())
        .await
    }

    /// Events list in ascending start order, unlike the other feeds.
    pub async fn filter_events(
        &self,
        status: Option<EventStatus>,
        filter: &ContentFilter,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM events");
        fb.eq("status", status)
            .eq_text("category", filter.category.as_deref())
            .eq("organizer_id", filter.owner_id)
            .order(
                filter.order_by.as_deref(),
                &["start_at", "created_at", "title"],
                "start_at ASC",
            )
            .limit(filter.limit);
        fb.into_inner()
            .build_query_as::<Event>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn update_event(&self, event: &Event) -> Result<Event, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2, description = $3, category = $4, start_at = $5, end_at = $6,
                location = $7, ticket_options = $8, max_attendees = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(&event.location)
        .bind(&event.ticket_options)
        .bind(event.max_attendees)
        .fetch_one(self.pool())
        .await
    }

    pub async fn set_event_status(&self, id: Uuid, status: EventStatus) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// MARKET ITEMS
// ============================================================================

impl Database {
    pub async fn create_market_item(&self, item: MarketItem) -> Result<MarketItem, sqlx::Error> {
        sqlx::query_as::<_, MarketItem>(
            r#"
            INSERT INTO market_items (
                id, seller_id, title, description, category, price, currency, condition,
                is_promoted, promotion_expires, is_negotiable, views_count, status,
                rejection_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.seller_id)
        .bind(item.title)
        .bind(item.description)
        .bind(item.category)
        .bind(item.price)
        .bind(item.currency)
        .bind(item.condition)
        .bind(item.is_promoted)
        .bind(item.promotion_expires)
        .bind(item.is_negotiable)
        .bind(item.views_count)
        .bind(item.status)
        .bind(item.rejection_reason)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn filter_market_items(
        &self,
        status: Option<MarketItemStatus>,
        filter: &ContentFilter,
    ) -> Result<Vec<MarketItem>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM market_items");
        fb.eq("status", status)
            .eq_text("category", filter.category.as_deref())
            .eq("seller_id", filter.owner_id)
            .order(
                filter.order_by.as_deref(),
                &["created_at", "price", "views_count", "title"],
                "created_at DESC",
            )
            .limit(filter.limit);
        fb.into_inner()
            .build_query_as::<MarketItem>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn get_market_item(&self, id: Uuid) -> Result<Option<MarketItem>, sqlx::Error> {
        sqlx::query_as::<_, MarketItem>("SELECT * FROM market_items WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn update_market_item(&self, item: &MarketItem) -> Result<MarketItem, sqlx::Error> {
        sqlx::query_as::<_, MarketItem>(
            r#"
            UPDATE market_items
            SET title = $2, description = $3, category = $4, price = $5, currency = $6,
                condition = $7, is_negotiable = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.category)
        .bind(item.price)
        .bind(&item.currency)
        .bind(&item.condition)
        .bind(item.is_negotiable)
        .fetch_one(self.pool())
        .await
    }

    pub async fn set_market_item_status(
        &self,
        id: Uuid,
        status: MarketItemStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE market_items SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn increment_market_item_views(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE market_items SET views_count = views_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_market_item(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM market_items WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// LOST ITEMS
// ============================================================================

impl Database {
    pub async fn create_lost_item(&self, item: LostItem) -> Result<LostItem, sqlx::Error> {
        sqlx::query_as::<_, LostItem>(
            r#"
            INSERT INTO lost_items (
                id, reporter_id, item_name, description, last_seen_location, kind, status,
                rejection_reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.reporter_id)
        .bind(item.item_name)
        .bind(item.description)
        .bind(item.last_seen_location)
        .bind(item.kind)
        .bind(item.status)
        .bind(item.rejection_reason)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn filter_lost_items(
        &self,
        status: Option<LostItemStatus>,
        kind: Option<LostItemKind>,
        filter: &ContentFilter,
    ) -> Result<Vec<LostItem>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM lost_items");
        fb.eq("status", status)
            .eq("kind", kind)
            .eq("reporter_id", filter.owner_id)
            .order(
                filter.order_by.as_deref(),
                &["created_at", "item_name"],
                "created_at DESC",
            )
            .limit(filter.limit);
        fb.into_inner()
            .build_query_as::<LostItem>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn get_lost_item(&self, id: Uuid) -> Result<Option<LostItem>, sqlx::Error> {
        sqlx::query_as::<_, LostItem>("SELECT * FROM lost_items WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn update_lost_item(&self, item: &LostItem) -> Result<LostItem, sqlx::Error> {
        sqlx::query_as::<_, LostItem>(
            r#"
            UPDATE lost_items
            SET item_name = $2, description = $3, last_seen_location = $4, kind = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(&item.item_name)
        .bind(&item.description)
        .bind(&item.last_seen_location)
        .bind(item.kind)
        .fetch_one(self.pool())
        .await
    }

    pub async fn set_lost_item_status(
        &self,
        id: Uuid,
        status: LostItemStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE lost_items SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_lost_item(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM lost_items WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// DONATIONS
// ============================================================================

impl Database {
    pub async fn create_donation(&self, donation: Donation) -> Result<Donation, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (
                id, requester_id, title, description, target_amount, current_amount,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(donation.id)
        .bind(donation.requester_id)
        .bind(donation.title)
        .bind(donation.description)
        .bind(donation.target_amount)
        .bind(donation.current_amount)
        .bind(donation.status)
        .bind(donation.created_at)
        .bind(donation.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn filter_donations(
        &self,
        status: Option<DonationStatus>,
        filter: &ContentFilter,
    ) -> Result<Vec<Donation>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM donations");
        fb.eq("status", status)
            .eq("requester_id", filter.owner_id)
            .order(
                filter.order_by.as_deref(),
                &["created_at", "target_amount"],
                "created_at DESC",
            )
            .limit(filter.limit);
        fb.into_inner()
            .build_query_as::<Donation>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn get_donation(&self, id: Uuid) -> Result<Option<Donation>, sqlx::Error> {
        sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn add_donation_amount(
        &self,
        id: Uuid,
        amount: f64,
    ) -> Result<Donation, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            r#"
            UPDATE donations
            SET current_amount = current_amount + $2,
                status = CASE WHEN current_amount + $2 >= target_amount THEN 'completed'::donation_status ELSE status END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_one(self.pool())
        .await
    }

    pub async fn set_donation_status(
        &self,
        id: Uuid,
        status: DonationStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE donations SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_donation(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// WORKFLOW HELPERS (transaction-scoped)
// ============================================================================

/// Apply a moderation decision inside an open transaction and return the
/// owner id of the affected row, or `None` when the id does not exist. The
/// table and its owner column come from the kind; the status bind stays
/// typed because each table carries its own status enum.
pub async fn apply_content_decision(
    tx: &mut Transaction<'_, Postgres>,
    kind: ContentKind,
    id: Uuid,
    decision: ContentDecision,
    reason: Option<&str>,
) -> Result<Option<Uuid>, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET status = $2, rejection_reason = $3, updated_at = NOW() WHERE id = $1 RETURNING {}",
        kind.table(),
        kind.owner_column()
    );
    let approved = decision == ContentDecision::Approved;
    let query = sqlx::query_as::<_, (Uuid,)>(&sql).bind(id);
    let owner: Option<(Uuid,)> = match kind {
        ContentKind::Business => {
            let status = if approved {
                ModerationStatus::Approved
            } else {
                ModerationStatus::Rejected
            };
            query.bind(status).bind(reason).fetch_optional(&mut **tx).await?
        }
        ContentKind::Job => {
            let status = if approved {
                JobStatus::Approved
            } else {
                JobStatus::Rejected
            };
            query.bind(status).bind(reason).fetch_optional(&mut **tx).await?
        }
        ContentKind::Event => {
            let status = if approved {
                EventStatus::Approved
            } else {
                EventStatus::Rejected
            };
            query.bind(status).bind(reason).fetch_optional(&mut **tx).await?
        }
        ContentKind::MarketItem => {
            let status = if approved {
                MarketItemStatus::Approved
            } else {
                MarketItemStatus::Rejected
            };
            query.bind(status).bind(reason).fetch_optional(&mut **tx).await?
        }
        ContentKind::LostItem => {
            let status = if approved {
                LostItemStatus::Approved
            } else {
                LostItemStatus::Rejected
            };
            query.bind(status).bind(reason).fetch_optional(&mut **tx).await?
        }
    };
    Ok(owner.map(|(owner_id,)| owner_id))
}

/// Stamp the promoted/featured flag and expiry on a promotion target.
/// Jobs and lost & found reports carry no promotion surface.
pub async fn apply_promotion(
    tx: &mut Transaction<'_, Postgres>,
    kind: ContentKind,
    id: Uuid,
    expires: chrono::DateTime<chrono::Utc>,
) -> Result<bool, sqlx::Error> {
    let result = match kind {
        ContentKind::Business => {
            sqlx::query(
                "UPDATE businesses SET is_featured = TRUE, promotion_expires = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(expires)
            .execute(&mut **tx)
            .await?
        }
        ContentKind::MarketItem => {
            sqlx::query(
                "UPDATE market_items SET is_promoted = TRUE, promotion_expires = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(expires)
            .execute(&mut **tx)
            .await?
        }
        ContentKind::Event => {
            sqlx::query(
                "UPDATE events SET is_featured = TRUE, promotion_expires = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(expires)
            .execute(&mut **tx)
            .await?
        }
        ContentKind::Job | ContentKind::LostItem => return Ok(false),
    };
    Ok(result.rows_affected() > 0)
}
