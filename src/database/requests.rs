use sqlx::{Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use super::{Database, FilterBuilder};
use crate::models::{
    PromotionRequest, RequestStatus, SubscriptionRequest, Transaction, TransactionStatus,
};

// ============================================================================
// PROMOTION REQUESTS
// ============================================================================

impl Database {
    pub async fn create_promotion_request(
        &self,
        request: PromotionRequest,
    ) -> Result<PromotionRequest, sqlx::Error> {
        sqlx::query_as::<_, PromotionRequest>(
            r#"
            INSERT INTO promotion_requests (
                id, user_id, entity_kind, entity_id, entity_title, promotion_cost,
                duration_days, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.entity_kind)
        .bind(request.entity_id)
        .bind(request.entity_title)
        .bind(request.promotion_cost)
        .bind(request.duration_days)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn get_promotion_request(
        &self,
        id: Uuid,
    ) -> Result<Option<PromotionRequest>, sqlx::Error> {
        sqlx::query_as::<_, PromotionRequest>("SELECT * FROM promotion_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn filter_promotion_requests(
        &self,
        status: Option<RequestStatus>,
        user_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<PromotionRequest>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM promotion_requests");
        fb.eq("status", status)
            .eq("user_id", user_id)
            .order(None, &[], "created_at DESC")
            .limit(limit);
        fb.into_inner()
            .build_query_as::<PromotionRequest>()
            .fetch_all(self.pool())
            .await
    }

    /// Owner cleanup of a turned-down request. The status guard in the SQL
    /// keeps a concurrent approval from deleting a now-completed row.
    pub async fn delete_rejected_promotion_request(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM promotion_requests WHERE id = $1 AND user_id = $2 AND status = $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(RequestStatus::Rejected)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// SUBSCRIPTION REQUESTS
// ============================================================================

impl Database {
    pub async fn create_subscription_request(
        &self,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionRequest, sqlx::Error> {
        sqlx::query_as::<_, SubscriptionRequest>(
            r#"
            INSERT INTO subscription_requests (
                id, user_id, package_id, package_name, duration_days, cost, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.package_id)
        .bind(request.package_name)
        .bind(request.duration_days)
        .bind(request.cost)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(self.pool())
        .await
    }

    pub async fn get_subscription_request(
        &self,
        id: Uuid,
    ) -> Result<Option<SubscriptionRequest>, sqlx::Error> {
        sqlx::query_as::<_, SubscriptionRequest>(
            "SELECT * FROM subscription_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    pub async fn filter_subscription_requests(
        &self,
        status: Option<RequestStatus>,
        user_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<SubscriptionRequest>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM subscription_requests");
        fb.eq("status", status)
            .eq("user_id", user_id)
            .order(None, &[], "created_at DESC")
            .limit(limit);
        fb.into_inner()
            .build_query_as::<SubscriptionRequest>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn delete_rejected_subscription_request(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM subscription_requests WHERE id = $1 AND user_id = $2 AND status = $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(RequestStatus::Rejected)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

impl Database {
    pub async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn list_transactions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE customer_id = $1 OR agent_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
    }

    pub async fn filter_transactions(
        &self,
        status: Option<TransactionStatus>,
        customer_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let mut fb = FilterBuilder::new("SELECT * FROM transactions");
        fb.eq("status", status)
            .eq("customer_id", customer_id)
            .order(None, &[], "created_at DESC")
            .limit(limit);
        fb.into_inner()
            .build_query_as::<Transaction>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn set_transaction_status(
        &self,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE transactions SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

// ============================================================================
// WORKFLOW HELPERS (transaction-scoped)
// ============================================================================

pub async fn set_request_status_tx(
    tx: &mut PgTransaction<'_, Postgres>,
    table: &str,
    id: Uuid,
    status: RequestStatus,
) -> Result<bool, sqlx::Error> {
    // `table` is one of two literals supplied by the workflows, never input.
    let sql = format!(
        "UPDATE {table} SET status = $2, updated_at = NOW() WHERE id = $1"
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_transaction_tx(
    tx: &mut PgTransaction<'_, Postgres>,
    transaction: &Transaction,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, customer_id, agent_id, kind, amount, payment_method, reference, notes,
            status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(transaction.id)
    .bind(transaction.customer_id)
    .bind(transaction.agent_id)
    .bind(transaction.kind)
    .bind(transaction.amount)
    .bind(&transaction.payment_method)
    .bind(&transaction.reference)
    .bind(&transaction.notes)
    .bind(transaction.status)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .fetch_one(&mut **tx)
    .await
}
