use crate::db::StoreDb;
use crate::error::{StoreError, StoreResult};
use crate::models::*;
use chrono::{Days, NaiveDate};

/// Listing filter: optional portfolio scope and creation-date range.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub portfolio_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl AlertFilter {
    pub fn for_portfolio(portfolio_id: i64) -> Self {
        Self {
            portfolio_id: Some(portfolio_id),
            ..Self::default()
        }
    }
}

pub struct AlertManager {
    db: StoreDb,
}

impl AlertManager {
    pub fn new(db: StoreDb) -> Self {
        Self { db }
    }

    /// Append a new unread alert. created_at is assigned by the database.
    pub async fn create_alert(&self, alert: AlertInput) -> StoreResult<i64> {
        if alert.message.trim().is_empty() {
            return Err(StoreError::Validation("alert message is required".into()));
        }

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO alerts (portfolio_id, message)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(alert.portfolio_id)
        .bind(&alert.message)
        .fetch_one(self.db.pool())
        .await?;

        Ok(id)
    }

    pub async fn get_alert(&self, id: i64) -> StoreResult<Option<Alert>> {
        let alert = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(alert)
    }

    /// Newest-first listing honoring the filter. The date range is
    /// inclusive of `date_from` and of the whole `date_to` day.
    pub async fn list_alerts(&self, filter: AlertFilter) -> StoreResult<Vec<Alert>> {
        let mut sql = String::from("SELECT * FROM alerts WHERE 1=1");
        if filter.portfolio_id.is_some() {
            sql.push_str(" AND portfolio_id = ?");
        }
        if filter.date_from.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if filter.date_to.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, Alert>(&sql);
        if let Some(pid) = filter.portfolio_id {
            query = query.bind(pid);
        }
        if let Some(from) = filter.date_from {
            query = query.bind(format!("{from} 00:00:00"));
        }
        if let Some(to) = filter.date_to {
            let next_day = to.checked_add_days(Days::new(1)).unwrap_or(to);
            query = query.bind(format!("{next_day} 00:00:00"));
        }
        query = query.bind(filter.limit.unwrap_or(50));

        let alerts = query.fetch_all(self.db.pool()).await?;
        Ok(alerts)
    }

    pub async fn mark_read(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE alerts SET is_read = 1, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("alert {id}")));
        }

        Ok(())
    }

    /// Dismissal removes the alert outright.
    pub async fn dismiss_alert(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("alert {id}")));
        }

        Ok(())
    }

    pub async fn count_for_portfolio(&self, portfolio_id: i64) -> StoreResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM alerts WHERE portfolio_id = ?")
                .bind(portfolio_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(count)
    }
}
