use anyhow::{bail, Result};
use std::env;

const DEFAULT_PRICE_API_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone)]
pub struct SentinelConfig {
    // Data store
    pub database_url: String,

    // Schedule (local time, weekdays)
    pub market_close_hour: u32,
    pub market_close_minute: u32,

    // Analysis parameters
    pub price_lookback_days: i64,
    pub forecast_horizon: usize,
    pub sentiment_max_posts: usize,

    // External services
    pub price_api_base: String,
    pub social_search_url: Option<String>,

    // Optional external workflow implementation, by name
    pub workflow_delegate: Option<String>,
}

impl SentinelConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:stocks.db".to_string()),

            market_close_hour: env::var("MARKET_CLOSE_HOUR")
                .unwrap_or_else(|_| "16".to_string())
                .parse()?,
            market_close_minute: env::var("MARKET_CLOSE_MINUTE")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,

            price_lookback_days: env::var("PRICE_LOOKBACK_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()?,
            forecast_horizon: env::var("FORECAST_HORIZON_DAYS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            sentiment_max_posts: env::var("SENTIMENT_MAX_POSTS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()?,

            price_api_base: env::var("PRICE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_PRICE_API_BASE.to_string()),
            social_search_url: env::var("SOCIAL_SEARCH_URL").ok().filter(|s| !s.is_empty()),

            workflow_delegate: env::var("WORKFLOW_DELEGATE").ok().filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Range checks happen here, at load time; a misconfigured schedule must
    /// fail startup, not be silently wrapped into the timer.
    pub fn validate(&self) -> Result<()> {
        if self.market_close_hour > 23 {
            bail!(
                "MARKET_CLOSE_HOUR must be in 0..=23, got {}",
                self.market_close_hour
            );
        }
        if self.market_close_minute > 59 {
            bail!(
                "MARKET_CLOSE_MINUTE must be in 0..=59, got {}",
                self.market_close_minute
            );
        }
        if self.price_lookback_days <= 0 {
            bail!(
                "PRICE_LOOKBACK_DAYS must be positive, got {}",
                self.price_lookback_days
            );
        }
        if self.forecast_horizon == 0 {
            bail!("FORECAST_HORIZON_DAYS must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SentinelConfig {
        SentinelConfig {
            database_url: "sqlite::memory:".to_string(),
            market_close_hour: 16,
            market_close_minute: 30,
            price_lookback_days: 14,
            forecast_horizon: 3,
            sentiment_max_posts: 200,
            price_api_base: DEFAULT_PRICE_API_BASE.to_string(),
            social_search_url: None,
            workflow_delegate: None,
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_hour_out_of_range_rejected() {
        let mut config = base_config();
        config.market_close_hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minute_out_of_range_rejected() {
        let mut config = base_config();
        config.market_close_minute = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_midnight_schedule_is_valid() {
        let mut config = base_config();
        config.market_close_hour = 0;
        config.market_close_minute = 0;
        assert!(config.validate().is_ok());
    }
}
