use async_trait::async_trait;

use crate::{Forecast, Interval, PassSummary, PricePoint, SentimentSummary, SignalResult};

/// Source of historical closing prices for a ticker.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch up to `lookback_days` of history ending now. An unknown ticker
    /// or a window with no trading data yields an empty, non-error series.
    async fn fetch_history(
        &self,
        ticker: &str,
        lookback_days: i64,
        interval: Interval,
    ) -> SignalResult<Vec<PricePoint>>;
}

/// Source of aggregated social polarity for a search term.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Collect and score up to `max_items` recent posts. Infallible by
    /// contract: any collection failure degrades to the neutral empty
    /// summary rather than surfacing an error.
    async fn scan(&self, query: &str, max_items: usize) -> SentimentSummary;
}

/// Fits a model to a price series and projects it forward.
pub trait Forecaster: Send + Sync {
    /// Returns `None` for an empty series, otherwise exactly `horizon`
    /// future points.
    fn forecast(&self, series: &[PricePoint], horizon: usize) -> Option<Forecast>;
}

/// An externally supplied implementation of the analysis pass.
///
/// Resolved once at startup from configuration; when present it takes
/// priority over the local algorithm, which remains the fallback if the
/// delegate errors.
#[async_trait]
pub trait WorkflowDelegate: Send + Sync {
    async fn run_pass(&self, portfolio_id: Option<i64>) -> anyhow::Result<PassSummary>;
}
