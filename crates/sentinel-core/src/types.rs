use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation in a closing-price time series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Sampling interval for price history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    Daily,
    Hourly,
}

impl Interval {
    /// Wire value used by chart-style APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Hourly => "1h",
        }
    }
}

/// Aggregated social polarity for one search term.
///
/// `average_score` is in [-1, 1]; a zero-count summary is the neutral
/// result substituted whenever collection fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub sample_count: usize,
    pub average_score: f64,
    pub scores: Vec<f64>,
}

impl SentimentSummary {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let average_score = scores.iter().sum::<f64>() / scores.len() as f64;
        Self {
            sample_count: scores.len(),
            average_score,
            scores,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// One predicted value with its uncertainty band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A short-horizon forecast, one point per future period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// The predicted value at the end of the horizon.
    pub fn final_point(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

/// Outcome of one analysis pass over a set of holdings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassSummary {
    pub holdings_seen: usize,
    pub alerts_created: usize,
    /// (ticker, reason) for holdings that produced no alert.
    pub failed: Vec<(String, String)>,
}

impl PassSummary {
    pub fn record_failure(&mut self, ticker: &str, reason: impl Into<String>) {
        self.failed.push((ticker.to_string(), reason.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_from_scores_averages() {
        let summary = SentimentSummary::from_scores(vec![0.5, -0.1, 0.2]);
        assert_eq!(summary.sample_count, 3);
        assert!((summary.average_score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn sentiment_from_empty_is_neutral() {
        let summary = SentimentSummary::from_scores(vec![]);
        assert!(summary.is_empty());
        assert_eq!(summary.average_score, 0.0);
    }
}
