use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal::unix::SignalKind;

mod config;
mod scheduler;

use analysis_workflow::{RunnerSettings, WorkflowRunner};
use config::SentinelConfig;
use forecast_engine::TrendModel;
use market_data::ChartClient;
use notification_service::{NotificationConfig, NotificationService};
use portfolio_store::StoreDb;
use scheduler::{MarketSchedule, Scheduler};
use sentinel_core::WorkflowDelegate;
use social_sentiment::SocialScanner;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    tracing::info!("Starting Stock Sentinel");

    let config = SentinelConfig::from_env()?;
    tracing::info!("  Database: {}", config.database_url);
    tracing::info!(
        "  Schedule: weekdays at {:02}:{:02} local",
        config.market_close_hour,
        config.market_close_minute
    );
    tracing::info!(
        "  Lookback: {} days, forecast horizon: {} days",
        config.price_lookback_days,
        config.forecast_horizon
    );

    // The one unrecoverable startup failure
    let db = StoreDb::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open data store at {}", config.database_url))?;
    tracing::info!("Data store ready");

    let notifier = NotificationService::new(&NotificationConfig::from_env());

    let mut runner = WorkflowRunner::new(
        db,
        Arc::new(ChartClient::new(config.price_api_base.clone())),
        Arc::new(SocialScanner::new(config.social_search_url.clone())),
        Arc::new(TrendModel::new()),
        notifier,
        RunnerSettings {
            lookback_days: config.price_lookback_days,
            forecast_horizon: config.forecast_horizon,
            sentiment_max_posts: config.sentiment_max_posts,
        },
    );
    if let Some(delegate) = resolve_delegate(config.workflow_delegate.as_deref()) {
        runner = runner.with_delegate(delegate);
    }
    let runner = Arc::new(runner);

    // Manual trigger: `sentinel-agent run-once [--portfolio <id>]`
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("run-once") {
        let portfolio_id = parse_portfolio_arg(&args)?;
        let summary = runner.run_pass(portfolio_id).await?;
        tracing::info!(
            holdings = summary.holdings_seen,
            alerts = summary.alerts_created,
            failures = summary.failed.len(),
            "manual pass finished"
        );
        for (ticker, reason) in &summary.failed {
            tracing::warn!(ticker, "holding skipped: {reason}");
        }
        return Ok(());
    }

    let schedule = MarketSchedule::new(config.market_close_hour, config.market_close_minute)?;
    let mut scheduler = Scheduler::new(schedule, Arc::clone(&runner));
    scheduler.start();

    tracing::info!("Agent is running. Press Ctrl+C to stop.");

    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT");
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
    }

    scheduler.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve the configured external workflow implementation. None are
/// bundled with this build; an unrecognized name keeps the local
/// algorithm and says so, rather than probing the environment for one.
fn resolve_delegate(name: Option<&str>) -> Option<Arc<dyn WorkflowDelegate>> {
    match name {
        None => None,
        Some(other) => {
            tracing::warn!(
                "WORKFLOW_DELEGATE '{other}' is not a known implementation; using the local workflow"
            );
            None
        }
    }
}

fn parse_portfolio_arg(args: &[String]) -> Result<Option<i64>> {
    match args.iter().position(|a| a == "--portfolio") {
        None => Ok(None),
        Some(idx) => {
            let value = args
                .get(idx + 1)
                .context("--portfolio requires a portfolio id")?;
            let id = value
                .parse::<i64>()
                .with_context(|| format!("invalid portfolio id '{value}'"))?;
            Ok(Some(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portfolio_arg() {
        let args: Vec<String> = ["sentinel-agent", "run-once", "--portfolio", "7"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parse_portfolio_arg(&args).unwrap(), Some(7));

        let args: Vec<String> = ["sentinel-agent", "run-once"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parse_portfolio_arg(&args).unwrap(), None);

        let args: Vec<String> = ["sentinel-agent", "run-once", "--portfolio", "seven"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(parse_portfolio_arg(&args).is_err());
    }

    #[test]
    fn test_unknown_delegate_resolves_to_none() {
        assert!(resolve_delegate(None).is_none());
        assert!(resolve_delegate(Some("roma")).is_none());
    }
}
