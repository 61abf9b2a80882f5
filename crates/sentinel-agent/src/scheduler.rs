use std::sync::Arc;
use std::time::Duration;

use analysis_workflow::WorkflowRunner;
use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Weekday};
use tokio::task::JoinHandle;
use tokio::time;

/// How often the timer task re-checks the wall clock.
const TICK_SECONDS: u64 = 30;

/// A weekday fire time in local wall-clock hours and minutes.
#[derive(Debug, Clone, Copy)]
pub struct MarketSchedule {
    pub hour: u32,
    pub minute: u32,
}

impl MarketSchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            bail!("schedule hour must be in 0..=23, got {hour}");
        }
        if minute > 59 {
            bail!("schedule minute must be in 0..=59, got {minute}");
        }
        Ok(Self { hour, minute })
    }

    /// Whether the job is due: a weekday, at or past the fire time, and not
    /// already fired today.
    fn is_due(&self, now: DateTime<Local>, last_fired: Option<NaiveDate>) -> bool {
        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        if last_fired == Some(now.date_naive()) {
            return false;
        }
        now.hour() > self.hour || (now.hour() == self.hour && now.minute() >= self.minute)
    }
}

/// Owns the background timer that runs the full-scope analysis pass at
/// market close on weekdays. Explicit lifecycle: construct, `start`,
/// `shutdown`; start is idempotent and the timer task never dies to a
/// failing job.
pub struct Scheduler {
    schedule: MarketSchedule,
    runner: Arc<WorkflowRunner>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(schedule: MarketSchedule, runner: Arc<WorkflowRunner>) -> Self {
        Self {
            schedule,
            runner,
            handle: None,
        }
    }

    /// Spawn the timer task. Returns true if a new timer was started; a
    /// second call on a running scheduler is a no-op returning false.
    pub fn start(&mut self) -> bool {
        if self.handle.is_some() {
            tracing::info!("scheduler already running, start ignored");
            return false;
        }

        let schedule = self.schedule;
        let runner = Arc::clone(&self.runner);

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(TICK_SECONDS));
            let mut last_fired: Option<NaiveDate> = None;

            loop {
                interval.tick().await;
                let now = Local::now();
                if !schedule.is_due(now, last_fired) {
                    continue;
                }
                last_fired = Some(now.date_naive());

                tracing::info!("scheduled analysis pass firing at {now}");
                // The job boundary: a failing pass is logged, never allowed
                // to take the timer down with it
                match runner.run_pass(None).await {
                    Ok(summary) => tracing::info!(
                        alerts = summary.alerts_created,
                        failures = summary.failed.len(),
                        "scheduled pass finished"
                    ),
                    Err(e) => tracing::error!("scheduled pass failed: {e:#}"),
                }
            }
        }));

        tracing::info!(
            "scheduler started: weekday analysis pass at {:02}:{:02}",
            self.schedule.hour,
            self.schedule.minute
        );
        true
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the timer task. Any in-flight pass is abandoned with it.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("scheduler stopped");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use forecast_engine::TrendModel;
    use market_data::ChartClient;
    use notification_service::{NotificationConfig, NotificationService};
    use portfolio_store::StoreDb;
    use social_sentiment::SocialScanner;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_schedule_rejects_bad_hour_and_minute() {
        assert!(MarketSchedule::new(24, 0).is_err());
        assert!(MarketSchedule::new(0, 60).is_err());
        assert!(MarketSchedule::new(23, 59).is_ok());
    }

    #[test]
    fn test_due_on_weekday_after_fire_time() {
        let schedule = MarketSchedule::new(16, 30).unwrap();
        // 2026-08-05 is a Wednesday
        assert!(!schedule.is_due(local(2026, 8, 5, 16, 29), None));
        assert!(schedule.is_due(local(2026, 8, 5, 16, 30), None));
        assert!(schedule.is_due(local(2026, 8, 5, 17, 0), None));
    }

    #[test]
    fn test_not_due_on_weekend() {
        let schedule = MarketSchedule::new(16, 30).unwrap();
        // 2026-08-08 is a Saturday
        assert!(!schedule.is_due(local(2026, 8, 8, 17, 0), None));
        assert!(!schedule.is_due(local(2026, 8, 9, 17, 0), None));
    }

    #[test]
    fn test_fires_once_per_day() {
        let schedule = MarketSchedule::new(16, 30).unwrap();
        let now = local(2026, 8, 5, 16, 31);
        assert!(schedule.is_due(now, None));
        assert!(!schedule.is_due(now, Some(now.date_naive())));
        // A new day re-arms the job
        let next_day = local(2026, 8, 6, 16, 31);
        assert!(schedule.is_due(next_day, Some(now.date_naive())));
    }

    async fn test_runner() -> Arc<WorkflowRunner> {
        let db = StoreDb::new("sqlite::memory:").await.unwrap();
        Arc::new(WorkflowRunner::new(
            db,
            Arc::new(ChartClient::new("http://127.0.0.1:9")),
            Arc::new(SocialScanner::new(None)),
            Arc::new(TrendModel::new()),
            NotificationService::new(&NotificationConfig::default()),
            Default::default(),
        ))
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let mut scheduler = Scheduler::new(MarketSchedule::new(16, 30).unwrap(), test_runner().await);

        assert!(!scheduler.is_running());
        assert!(scheduler.start());
        assert!(scheduler.is_running());
        // second start is a no-op; exactly one timer stays active
        assert!(!scheduler.start());
        assert!(scheduler.is_running());

        scheduler.shutdown();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_restart_after_shutdown() {
        let mut scheduler = Scheduler::new(MarketSchedule::new(9, 0).unwrap(), test_runner().await);
        assert!(scheduler.start());
        scheduler.shutdown();
        assert!(scheduler.start());
        scheduler.shutdown();
    }
}
