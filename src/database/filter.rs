use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// Incremental WHERE/ORDER BY/LIMIT builder for the exact-match filter
/// contract: absent and empty-string conditions are skipped, order-by columns
/// come from a per-entity whitelist (a `-` prefix means descending), and the
/// limit is bound, never interpolated.
pub struct FilterBuilder {
    qb: QueryBuilder<'static, Postgres>,
    has_where: bool,
}

impl FilterBuilder {
    pub fn new(select: &str) -> Self {
        Self {
            qb: QueryBuilder::new(select),
            has_where: false,
        }
    }

    fn push_condition(&mut self, column: &str) {
        if self.has_where {
            self.qb.push(" AND ");
        } else {
            self.qb.push(" WHERE ");
            self.has_where = true;
        }
        self.qb.push(column);
        self.qb.push(" = ");
    }

    /// Equality condition, skipped when the value is absent.
    pub fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + Send + Encode<'static, Postgres> + Type<Postgres>,
    {
        if let Some(value) = value {
            self.push_condition(column);
            self.qb.push_bind(value);
        }
        self
    }

    /// Text equality; empty and whitespace-only strings count as absent.
    pub fn eq_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                self.push_condition(column);
                self.qb.push_bind(trimmed.to_string());
            }
        }
        self
    }

    /// Ordering from a whitelist. `requested` may carry a `-` prefix for
    /// descending; anything not whitelisted falls back to `default_order`
    /// (a full clause like `created_at DESC`).
    pub fn order(
        &mut self,
        requested: Option<&str>,
        allowed: &[&str],
        default_order: &str,
    ) -> &mut Self {
        self.qb.push(" ORDER BY ");
        match requested {
            Some(raw) => {
                let (column, direction) = match raw.strip_prefix('-') {
                    Some(col) => (col, "DESC"),
                    None => (raw, "ASC"),
                };
                if allowed.contains(&column) {
                    self.qb.push(column);
                    self.qb.push(" ");
                    self.qb.push(direction);
                } else {
                    self.qb.push(default_order);
                }
            }
            None => {
                self.qb.push(default_order);
            }
        }
        self
    }

    pub fn limit(&mut self, limit: Option<i64>) -> &mut Self {
        if let Some(limit) = limit {
            self.qb.push(" LIMIT ");
            self.qb.push_bind(limit.max(1));
        }
        self
    }

    pub fn sql(&self) -> &str {
        self.qb.sql()
    }

    pub fn into_inner(self) -> QueryBuilder<'static, Postgres> {
        self.qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModerationStatus;
    use uuid::Uuid;

    #[test]
    fn empty_filter_matches_plain_list() {
        let mut fb = FilterBuilder::new("SELECT * FROM businesses");
        fb.eq_text("category", None)
            .eq::<ModerationStatus>("status", None)
            .order(None, &["created_at"], "created_at DESC");
        assert_eq!(
            fb.sql(),
            "SELECT * FROM businesses ORDER BY created_at DESC"
        );
    }

    #[test]
    fn empty_string_conditions_are_ignored() {
        let mut fb = FilterBuilder::new("SELECT * FROM businesses");
        fb.eq("status", Some(ModerationStatus::Approved))
            .eq_text("category", Some(""))
            .eq_text("city", Some("   "));
        assert_eq!(fb.sql(), "SELECT * FROM businesses WHERE status = $1");
    }

    #[test]
    fn conditions_chain_with_and() {
        let mut fb = FilterBuilder::new("SELECT * FROM jobs");
        fb.eq("status", Some(ModerationStatus::Pending))
            .eq_text("category", Some("retail"))
            .eq("poster_id", Some(Uuid::new_v4()));
        assert_eq!(
            fb.sql(),
            "SELECT * FROM jobs WHERE status = $1 AND category = $2 AND poster_id = $3"
        );
    }

    #[test]
    fn order_by_respects_whitelist_and_descending_prefix() {
        let mut fb = FilterBuilder::new("SELECT * FROM events");
        fb.order(Some("-start_at"), &["start_at", "created_at"], "start_at ASC");
        assert_eq!(fb.sql(), "SELECT * FROM events ORDER BY start_at DESC");

        let mut fb = FilterBuilder::new("SELECT * FROM events");
        fb.order(Some("drop_table"), &["start_at"], "start_at ASC");
        assert_eq!(fb.sql(), "SELECT * FROM events ORDER BY start_at ASC");
    }

    #[test]
    fn limit_is_bound_not_interpolated() {
        let mut fb = FilterBuilder::new("SELECT * FROM reviews");
        fb.order(None, &[], "created_at DESC").limit(Some(10));
        assert_eq!(
            fb.sql(),
            "SELECT * FROM reviews ORDER BY created_at DESC LIMIT $1"
        );
    }
}
