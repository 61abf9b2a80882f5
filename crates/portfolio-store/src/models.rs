use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Portfolio {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Holding {
    pub id: Option<i64>,
    pub portfolio_id: i64,
    pub ticker: String,
    pub shares: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingInput {
    pub ticker: String,
    pub shares: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alert {
    pub id: Option<i64>,
    pub portfolio_id: Option<i64>,
    pub message: String,
    pub is_read: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInput {
    pub portfolio_id: Option<i64>,
    pub message: String,
}

/// Dashboard-style aggregate for one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub portfolio: Portfolio,
    pub holdings_count: i64,
    pub total_shares: f64,
    pub unique_tickers: i64,
    pub recent_alerts: i64,
}
