use crate::db::StoreDb;
use crate::error::{StoreError, StoreResult};
use crate::models::*;

pub struct PortfolioManager {
    db: StoreDb,
}

impl PortfolioManager {
    pub fn new(db: StoreDb) -> Self {
        Self { db }
    }

    /// Create a new portfolio. The name must be non-empty after trimming.
    pub async fn create_portfolio(&self, input: PortfolioInput) -> StoreResult<i64> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("portfolio name is required".into()));
        }
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO portfolios (name, description)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.db.pool())
        .await?;

        Ok(id)
    }

    pub async fn get_portfolio(&self, id: i64) -> StoreResult<Option<Portfolio>> {
        let portfolio = sqlx::query_as::<_, Portfolio>("SELECT * FROM portfolios WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(portfolio)
    }

    pub async fn list_portfolios(&self) -> StoreResult<Vec<Portfolio>> {
        let portfolios =
            sqlx::query_as::<_, Portfolio>("SELECT * FROM portfolios ORDER BY name")
                .fetch_all(self.db.pool())
                .await?;

        Ok(portfolios)
    }

    /// Update name/description and bump updated_at.
    pub async fn update_portfolio(&self, id: i64, input: PortfolioInput) -> StoreResult<()> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("portfolio name is required".into()));
        }

        let result = sqlx::query(
            r#"
            UPDATE portfolios
            SET name = ?, description = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(&input.description)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("portfolio {id}")));
        }

        Ok(())
    }

    /// Delete a portfolio along with its holdings and alerts, atomically.
    pub async fn delete_portfolio(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM holdings WHERE portfolio_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM alerts WHERE portfolio_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM portfolios WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound(format!("portfolio {id}")));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Dashboard aggregate: holdings count, total shares, distinct tickers,
    /// and the number of alerts recorded in the last 7 days.
    pub async fn get_summary(&self, id: i64) -> StoreResult<PortfolioSummary> {
        let portfolio = self
            .get_portfolio(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("portfolio {id}")))?;

        let (holdings_count, total_shares, unique_tickers): (i64, f64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(shares), 0.0), COUNT(DISTINCT ticker)
            FROM holdings WHERE portfolio_id = ?
            "#,
        )
        .bind(id)
        .fetch_one(self.db.pool())
        .await?;

        let (recent_alerts,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM alerts
            WHERE portfolio_id = ? AND created_at >= datetime('now', '-7 days')
            "#,
        )
        .bind(id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(PortfolioSummary {
            portfolio,
            holdings_count,
            total_shares,
            unique_tickers,
            recent_alerts,
        })
    }
}
