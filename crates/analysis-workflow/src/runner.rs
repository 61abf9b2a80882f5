use std::sync::Arc;

use anyhow::Context;
use notification_service::NotificationService;
use portfolio_store::{AlertInput, AlertManager, Holding, HoldingManager, StoreDb};
use sentinel_core::{
    Forecaster, Interval, PassSummary, PriceProvider, SentimentProvider, WorkflowDelegate,
};

use crate::synthesizer::synthesize;

/// Tunables for one analysis pass.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub lookback_days: i64,
    pub forecast_horizon: usize,
    pub sentiment_max_posts: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            lookback_days: 14,
            forecast_horizon: 3,
            sentiment_max_posts: 200,
        }
    }
}

/// Executes analysis passes over tracked holdings.
///
/// Per holding: price history, social sentiment, short-horizon forecast,
/// synthesized report, one alert insert in its own transaction, best-effort
/// notification. A holding's failure never aborts the rest of the pass.
pub struct WorkflowRunner {
    holdings: HoldingManager,
    alerts: AlertManager,
    price: Arc<dyn PriceProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    forecaster: Arc<dyn Forecaster>,
    notifier: NotificationService,
    delegate: Option<Arc<dyn WorkflowDelegate>>,
    settings: RunnerSettings,
}

impl WorkflowRunner {
    pub fn new(
        db: StoreDb,
        price: Arc<dyn PriceProvider>,
        sentiment: Arc<dyn SentimentProvider>,
        forecaster: Arc<dyn Forecaster>,
        notifier: NotificationService,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            holdings: HoldingManager::new(db.clone()),
            alerts: AlertManager::new(db),
            price,
            sentiment,
            forecaster,
            notifier,
            delegate: None,
            settings,
        }
    }

    /// Register an externally supplied pass implementation. It takes
    /// priority over the local algorithm; a delegate error falls back.
    pub fn with_delegate(mut self, delegate: Arc<dyn WorkflowDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Run one analysis pass, over one portfolio's holdings or all of them.
    ///
    /// Returns Ok as long as the pass itself completed; per-holding
    /// failures are recorded in the summary, not raised. The only fatal
    /// error is being unable to enumerate holdings at all.
    pub async fn run_pass(&self, portfolio_id: Option<i64>) -> anyhow::Result<PassSummary> {
        if let Some(delegate) = &self.delegate {
            match delegate.run_pass(portfolio_id).await {
                Ok(summary) => {
                    tracing::info!(
                        alerts = summary.alerts_created,
                        "delegate completed analysis pass"
                    );
                    return Ok(summary);
                }
                Err(e) => {
                    tracing::warn!("workflow delegate failed, falling back to local pass: {e:#}");
                }
            }
        }

        self.run_local_pass(portfolio_id).await
    }

    async fn run_local_pass(&self, portfolio_id: Option<i64>) -> anyhow::Result<PassSummary> {
        let holdings = match portfolio_id {
            Some(id) => self.holdings.list_for_portfolio(id).await,
            None => self.holdings.list_all().await,
        }
        .context("failed to enumerate holdings for analysis pass")?;

        tracing::info!(
            holdings = holdings.len(),
            scope = ?portfolio_id,
            "starting analysis pass"
        );

        let mut summary = PassSummary {
            holdings_seen: holdings.len(),
            ..PassSummary::default()
        };

        for holding in &holdings {
            self.process_holding(holding, &mut summary).await;
        }

        tracing::info!(
            alerts = summary.alerts_created,
            failures = summary.failed.len(),
            "analysis pass complete"
        );
        Ok(summary)
    }

    async fn process_holding(&self, holding: &Holding, summary: &mut PassSummary) {
        let ticker = holding.ticker.as_str();

        let prices = match self
            .price
            .fetch_history(ticker, self.settings.lookback_days, Interval::Daily)
            .await
        {
            Ok(prices) => prices,
            Err(e) => {
                tracing::warn!(ticker, "price history fetch failed: {e}");
                summary.record_failure(ticker, format!("price history: {e}"));
                return;
            }
        };

        // Neutral on any collection failure, by contract
        let sentiment = self
            .sentiment
            .scan(ticker, self.settings.sentiment_max_posts)
            .await;

        let forecast = if prices.is_empty() {
            None
        } else {
            self.forecaster
                .forecast(&prices, self.settings.forecast_horizon)
        };

        let report = synthesize(
            ticker,
            chrono::Utc::now().date_naive(),
            &prices,
            &sentiment,
            forecast.as_ref(),
        );
        if report.hype_risk {
            tracing::info!(ticker, avg = sentiment.average_score, "hype risk flagged");
        }

        // One alert per holding, committed independently of the rest of
        // the pass
        match self
            .alerts
            .create_alert(AlertInput {
                portfolio_id: Some(holding.portfolio_id),
                message: report.text.clone(),
            })
            .await
        {
            Ok(_) => summary.alerts_created += 1,
            Err(e) => {
                tracing::warn!(ticker, "failed to persist alert: {e}");
                summary.record_failure(ticker, format!("persist alert: {e}"));
                return;
            }
        }

        let outcome = self.notifier.dispatch(&report.text).await;
        if outcome.failed > 0 {
            tracing::warn!(
                ticker,
                failed = outcome.failed,
                "some notification channels failed"
            );
        }
    }
}
