use crate::db::StoreDb;
use crate::error::{StoreError, StoreResult};
use crate::models::*;

pub struct HoldingManager {
    db: StoreDb,
}

impl HoldingManager {
    pub fn new(db: StoreDb) -> Self {
        Self { db }
    }

    fn validate(input: &HoldingInput) -> StoreResult<(String, f64)> {
        let ticker = input.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(StoreError::Validation("ticker is required".into()));
        }
        if !input.shares.is_finite() || input.shares <= 0.0 {
            return Err(StoreError::Validation(format!(
                "shares must be a positive number, got {}",
                input.shares
            )));
        }
        Ok((ticker, input.shares))
    }

    /// Add a holding to a portfolio. Rejects unknown portfolios, empty
    /// tickers, and non-positive share counts without writing anything.
    pub async fn create_holding(&self, portfolio_id: i64, input: HoldingInput) -> StoreResult<i64> {
        let (ticker, shares) = Self::validate(&input)?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM portfolios WHERE id = ?")
            .bind(portfolio_id)
            .fetch_optional(self.db.pool())
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(format!("portfolio {portfolio_id}")));
        }

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO holdings (portfolio_id, ticker, shares)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(portfolio_id)
        .bind(&ticker)
        .bind(shares)
        .fetch_one(self.db.pool())
        .await?;

        Ok(id)
    }

    pub async fn get_holding(&self, id: i64) -> StoreResult<Option<Holding>> {
        let holding = sqlx::query_as::<_, Holding>("SELECT * FROM holdings WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(holding)
    }

    pub async fn list_for_portfolio(&self, portfolio_id: i64) -> StoreResult<Vec<Holding>> {
        let holdings = sqlx::query_as::<_, Holding>(
            "SELECT * FROM holdings WHERE portfolio_id = ? ORDER BY id",
        )
        .bind(portfolio_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(holdings)
    }

    /// Every holding in the store, in stable id order.
    pub async fn list_all(&self) -> StoreResult<Vec<Holding>> {
        let holdings = sqlx::query_as::<_, Holding>("SELECT * FROM holdings ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;

        Ok(holdings)
    }

    pub async fn update_shares(&self, id: i64, shares: f64) -> StoreResult<()> {
        if !shares.is_finite() || shares <= 0.0 {
            return Err(StoreError::Validation(format!(
                "shares must be a positive number, got {shares}"
            )));
        }

        let result = sqlx::query(
            "UPDATE holdings SET shares = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(shares)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("holding {id}")));
        }

        Ok(())
    }

    pub async fn delete_holding(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM holdings WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("holding {id}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolios::PortfolioManager;

    async fn setup() -> (StoreDb, i64) {
        let db = StoreDb::new("sqlite::memory:").await.unwrap();
        let id = PortfolioManager::new(db.clone())
            .create_portfolio(PortfolioInput {
                name: "Test".to_string(),
                description: None,
            })
            .await
            .unwrap();
        (db, id)
    }

    #[tokio::test]
    async fn test_create_uppercases_ticker() {
        let (db, portfolio_id) = setup().await;
        let manager = HoldingManager::new(db);

        let id = manager
            .create_holding(
                portfolio_id,
                HoldingInput {
                    ticker: " aapl ".to_string(),
                    shares: 3.0,
                },
            )
            .await
            .unwrap();

        let holding = manager.get_holding(id).await.unwrap().unwrap();
        assert_eq!(holding.ticker, "AAPL");
        assert_eq!(holding.shares, 3.0);
    }

    #[tokio::test]
    async fn test_nonpositive_shares_rejected() {
        let (db, portfolio_id) = setup().await;
        let manager = HoldingManager::new(db);

        for shares in [0.0, -1.5, f64::NAN] {
            let err = manager
                .create_holding(
                    portfolio_id,
                    HoldingInput {
                        ticker: "AAPL".to_string(),
                        shares,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
        }

        // nothing was written
        assert!(manager.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_portfolio_rejected() {
        let (db, _) = setup().await;
        let manager = HoldingManager::new(db);

        let err = manager
            .create_holding(
                9999,
                HoldingInput {
                    ticker: "AAPL".to_string(),
                    shares: 1.0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_shares_validates() {
        let (db, portfolio_id) = setup().await;
        let manager = HoldingManager::new(db);

        let id = manager
            .create_holding(
                portfolio_id,
                HoldingInput {
                    ticker: "MSFT".to_string(),
                    shares: 2.0,
                },
            )
            .await
            .unwrap();

        manager.update_shares(id, 5.0).await.unwrap();
        assert_eq!(manager.get_holding(id).await.unwrap().unwrap().shares, 5.0);

        let err = manager.update_shares(id, -2.0).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
