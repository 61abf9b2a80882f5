use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sentinel_core::{Interval, PriceProvider, PricePoint, SignalError, SignalResult};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Price-history client against a Yahoo-style chart endpoint.
#[derive(Clone)]
pub struct ChartClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChartClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Parse a chart payload into an ordered close series. Missing data is
    /// an empty series; rows with null closes are skipped.
    fn parse_chart(json: &serde_json::Value) -> SignalResult<Vec<PricePoint>> {
        let Some(chart) = json
            .get("chart")
            .and_then(|v| v.get("result"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
        else {
            return Ok(Vec::new());
        };

        let timestamps = match chart.get("timestamp").and_then(|v| v.as_array()) {
            Some(ts) => ts,
            None => return Ok(Vec::new()),
        };

        let closes = chart
            .get("indicators")
            .and_then(|v| v.get("quote"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|q| q.get("close"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| SignalError::InvalidResponse("no close prices in chart".into()))?;

        let mut series = Vec::new();
        for (ts, close) in timestamps.iter().zip(closes.iter()) {
            if let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) {
                if let Some(timestamp) = DateTime::from_timestamp(ts, 0) {
                    series.push(PricePoint { timestamp, close });
                }
            }
        }

        Ok(series)
    }
}

impl Default for ChartClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl PriceProvider for ChartClient {
    async fn fetch_history(
        &self,
        ticker: &str,
        lookback_days: i64,
        interval: Interval,
    ) -> SignalResult<Vec<PricePoint>> {
        let now = Utc::now();
        let period1 = (now - Duration::days(lookback_days)).timestamp();
        let period2 = now.timestamp();

        let url = format!(
            "{}/{}?period1={}&period2={}&interval={}",
            self.base_url,
            ticker,
            period1,
            period2,
            interval.as_str()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SignalError::Http(e.to_string()))?;

        if !response.status().is_success() {
            // The chart endpoint answers 404 for unknown tickers; that is
            // "no data", not a provider failure.
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            return Err(SignalError::Http(format!(
                "chart endpoint returned {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SignalError::InvalidResponse(e.to_string()))?;

        let series = Self::parse_chart(&json)?;
        tracing::debug!(ticker, points = series.len(), "fetched price history");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_payload() {
        let json = serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "close": [189.71, null, 191.45]
                        }]
                    }
                }]
            }
        });

        let series = ChartClient::parse_chart(&json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, 189.71);
        assert_eq!(series[1].close, 191.45);
        assert!(series[0].timestamp < series[1].timestamp);
    }

    #[test]
    fn test_parse_empty_result_is_no_data() {
        let json = serde_json::json!({"chart": {"result": [], "error": null}});
        let series = ChartClient::parse_chart(&json).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_parse_missing_closes_is_invalid() {
        let json = serde_json::json!({
            "chart": {"result": [{"timestamp": [1700000000], "indicators": {"quote": [{}]}}]}
        });
        let err = ChartClient::parse_chart(&json).unwrap_err();
        assert!(matches!(err, SignalError::InvalidResponse(_)));
    }
}
