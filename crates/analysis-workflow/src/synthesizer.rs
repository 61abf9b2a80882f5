use chrono::NaiveDate;
use sentinel_core::{Forecast, PricePoint, SentimentSummary};

/// Average polarity above which the report carries a hype warning.
/// Strictly greater: 0.6 itself does not trip the flag.
pub const HIGH_HYPE_THRESHOLD: f64 = 0.6;

/// A synthesized per-holding report.
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub hype_risk: bool,
}

/// Combine one ticker's signals into a multi-line report. Each section is
/// omitted when its signal is absent; with nothing available the report is
/// the dated header alone. Deterministic for a given set of inputs.
pub fn synthesize(
    ticker: &str,
    as_of: NaiveDate,
    prices: &[PricePoint],
    sentiment: &SentimentSummary,
    forecast: Option<&Forecast>,
) -> Report {
    let mut lines = Vec::new();
    let mut hype_risk = false;

    lines.push(format!("Report for {ticker} - {as_of}"));

    if let Some(last) = prices.last() {
        lines.push(format!("Last close: {:.2}", last.close));
    }

    if sentiment.sample_count > 0 {
        lines.push(format!(
            "Social sentiment (avg): {:.3} from {} posts",
            sentiment.average_score, sentiment.sample_count
        ));
        if sentiment.average_score > HIGH_HYPE_THRESHOLD {
            lines.push("Hype risk: HIGH (very positive social buzz)".to_string());
            hype_risk = true;
        }
    }

    if let Some(point) = forecast.and_then(|f| f.final_point()) {
        lines.push(format!(
            "Forecast {} days out: {:.2}",
            forecast.map(Forecast::horizon).unwrap_or_default(),
            point.predicted
        ));
    }

    Report {
        text: lines.join("\n"),
        hype_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sentinel_core::ForecastPoint;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    fn sample_prices() -> Vec<PricePoint> {
        vec![
            PricePoint {
                timestamp: Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap(),
                close: 187.30,
            },
            PricePoint {
                timestamp: Utc.with_ymd_and_hms(2026, 8, 4, 0, 0, 0).unwrap(),
                close: 189.71,
            },
        ]
    }

    fn sentiment(avg: f64, count: usize) -> SentimentSummary {
        SentimentSummary {
            sample_count: count,
            average_score: avg,
            scores: vec![avg; count],
        }
    }

    #[test]
    fn test_all_signals_absent_yields_header_only() {
        let report = synthesize("AAPL", as_of(), &[], &SentimentSummary::default(), None);
        assert_eq!(report.text, "Report for AAPL - 2026-08-05");
        assert!(!report.hype_risk);
    }

    #[test]
    fn test_full_report_contains_every_section() {
        let forecast = Forecast {
            points: vec![ForecastPoint {
                timestamp: Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap(),
                predicted: 192.40,
                lower: 190.0,
                upper: 195.0,
            }],
        };
        let report = synthesize(
            "AAPL",
            as_of(),
            &sample_prices(),
            &sentiment(0.25, 40),
            Some(&forecast),
        );

        let lines: Vec<&str> = report.text.lines().collect();
        assert_eq!(lines[0], "Report for AAPL - 2026-08-05");
        assert_eq!(lines[1], "Last close: 189.71");
        assert_eq!(lines[2], "Social sentiment (avg): 0.250 from 40 posts");
        assert_eq!(lines[3], "Forecast 1 days out: 192.40");
        assert!(!report.hype_risk);
    }

    #[test]
    fn test_hype_flag_above_threshold() {
        let report = synthesize("GME", as_of(), &[], &sentiment(0.61, 10), None);
        assert!(report.hype_risk);
        assert!(report.text.contains("Hype risk: HIGH"));
    }

    #[test]
    fn test_no_hype_flag_below_threshold() {
        let report = synthesize("GME", as_of(), &[], &sentiment(0.59, 10), None);
        assert!(!report.hype_risk);
        assert!(!report.text.contains("Hype risk"));
    }

    #[test]
    fn test_threshold_is_strict() {
        let report = synthesize("GME", as_of(), &[], &sentiment(0.6, 10), None);
        assert!(!report.hype_risk);
    }

    #[test]
    fn test_zero_sample_sentiment_is_omitted() {
        let report = synthesize("AAPL", as_of(), &sample_prices(), &SentimentSummary::default(), None);
        assert!(!report.text.contains("Social sentiment"));
        assert!(report.text.contains("Last close"));
    }
}
